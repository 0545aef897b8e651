use clap::builder::PossibleValue;
use clap::{crate_description, crate_name, crate_version, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LOG_LEVEL")
                .env("MODULE_SERVER_LOG_LEVEL")
                .default_value("info")
                .value_parser([
                    PossibleValue::new("trace"),
                    PossibleValue::new("debug"),
                    PossibleValue::new("info"),
                    PossibleValue::new("warn"),
                    PossibleValue::new("error"),
                ])
                .help("Log level"),
        )
        .arg(
            Arg::new("log-fmt")
                .long("log-fmt")
                .value_name("LOG_FMT")
                .env("MODULE_SERVER_LOG_FMT")
                .default_value("text")
                .value_parser([PossibleValue::new("text"), PossibleValue::new("json")])
                .help("Log output format"),
        )
        .arg(
            Arg::new("log-no-color")
                .long("log-no-color")
                .env("NO_COLOR")
                .action(ArgAction::SetTrue)
                .help("Disable colored output for logs"),
        )
        .arg(
            Arg::new("address")
                .long("addr")
                .value_name("BIND_ADDRESS")
                .default_value("0.0.0.0")
                .env("MODULE_SERVER_BIND_ADDRESS")
                .help("Bind against ADDRESS"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .value_name("PORT")
                .default_value("3000")
                .env("MODULE_SERVER_PORT")
                .help("Listen on PORT"),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .value_name("WORKERS_NUMBER")
                .env("MODULE_SERVER_WORKERS")
                .help("Number of admission requests processed concurrently"),
        )
        .arg(
            Arg::new("cert-file")
                .long("cert-file")
                .value_name("CERT_FILE")
                .default_value("")
                .env("MODULE_SERVER_CERT_FILE")
                .help("Path to an X.509 certificate file for HTTPS"),
        )
        .arg(
            Arg::new("key-file")
                .long("key-file")
                .value_name("KEY_FILE")
                .default_value("")
                .env("MODULE_SERVER_KEY_FILE")
                .help("Path to an X.509 private key file for HTTPS"),
        )
        .arg(
            Arg::new("module-config")
                .long("module-config")
                .value_name("MODULE_CONFIG_FILE")
                .default_value("module.yaml")
                .env("MODULE_SERVER_MODULE_CONFIG")
                .help("YAML file holding the module configuration"),
        )
        .arg(
            Arg::new("module-bundle")
                .long("module-bundle")
                .value_name("MODULE_BUNDLE_FILE")
                .env("MODULE_SERVER_MODULE_BUNDLE")
                .help("Path to the delivered module bundle"),
        )
        .arg(
            Arg::new("module-digest")
                .long("module-digest")
                .value_name("SHA256_HEX")
                .env("MODULE_SERVER_MODULE_DIGEST")
                .help("Expected SHA-256 content hash of the module bundle"),
        )
        .arg(
            Arg::new("admission-timeout")
                .long("admission-timeout")
                .value_name("SECONDS")
                .default_value("10")
                .env("MODULE_SERVER_ADMISSION_TIMEOUT")
                .help("Fail open on requests that take longer than the given time"),
        )
}
