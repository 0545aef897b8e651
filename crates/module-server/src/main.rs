use anyhow::Result;
use capability_engine::{module::Module, module_config::read_module_config_file};
use tracing::info;

use module_server::{bundle, cli, config::Config, tracing::setup_tracing, ModuleServer};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    let config = Config::from_args(&matches)?;

    setup_tracing(&config.log_level, &config.log_fmt, config.log_no_color)?;

    if let Some(bundle_check) = &config.module_bundle {
        bundle::verify_module_bundle(&bundle_check.path, &bundle_check.digest)?;
        info!(
            bundle = bundle_check.path.display().to_string().as_str(),
            "module bundle digest verified"
        );
    }

    let module_config = read_module_config_file(&config.module_config_path)?;
    info!(module = module_config.id.as_str(), "loading module");

    // Module authors embed this crate and register their capabilities on
    // the Module before serving; this entry point serves the
    // configuration-only module.
    let module = Module::new(module_config);

    let server = ModuleServer::new_from_config(config, module).await?;
    server.run().await
}
