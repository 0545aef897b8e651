use std::{sync::Arc, time::Duration};

use capability_engine::module::Module;
use tokio::sync::Semaphore;

pub(crate) struct ApiServerState {
    pub(crate) semaphore: Semaphore,
    pub(crate) module: Arc<Module>,
    pub(crate) admission_timeout: Duration,
}
