pub mod api;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod tracing;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use ::tracing::{info, Level};
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use capability_engine::module::Module;
use tokio::sync::Semaphore;
use tower_http::trace::{self, TraceLayer};

use crate::api::handlers::{healthz_handler, mutate_handler};
use crate::api::state::ApiServerState;
use crate::config::Config;

/// The webhook runtime: owns the router and TLS material, serves the
/// module handed in at construction until the process exits.
pub struct ModuleServer {
    router: Router,
    addr: SocketAddr,
    tls_config: Option<RustlsConfig>,
}

impl ModuleServer {
    pub async fn new_from_config(config: Config, module: Module) -> Result<Self> {
        let state = Arc::new(ApiServerState {
            semaphore: Semaphore::new(config.pool_size),
            module: Arc::new(module),
            admission_timeout: Duration::from_secs(config.admission_timeout_seconds),
        });

        let tls_config = match config.tls_config {
            Some(tls) => {
                Some(RustlsConfig::from_pem_file(&tls.cert_file, &tls.key_file).await?)
            }
            None => None,
        };

        let router = Router::new()
            .route("/mutate", post(mutate_handler))
            .route("/healthz", get(healthz_handler))
            .with_state(state)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
            );

        Ok(Self {
            router,
            addr: config.addr,
            tls_config,
        })
    }

    pub async fn run(self) -> Result<()> {
        match self.tls_config {
            Some(tls_config) => {
                info!(address = self.addr.to_string().as_str(), "started HTTPS server");
                axum_server::bind_rustls(self.addr, tls_config)
                    .serve(self.router.into_make_service())
                    .await?;
            }
            None => {
                info!(address = self.addr.to_string().as_str(), "started HTTP server");
                axum_server::bind(self.addr)
                    .serve(self.router.into_make_service())
                    .await?;
            }
        }

        Ok(())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
