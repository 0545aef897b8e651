use crate::{
    admission_request::AdmissionRequest,
    admission_response::AdmissionResponse,
    capability::Capability,
    module_config::ModuleConfig,
    processor,
};

/// A compiled module: the process-wide configuration plus the ordered
/// capabilities it registers. Immutable once built; safe to share across
/// concurrent request handlers.
pub struct Module {
    config: ModuleConfig,
    capabilities: Vec<Capability>,
}

impl Module {
    pub fn new(config: ModuleConfig) -> Self {
        Module {
            config,
            capabilities: Vec::new(),
        }
    }

    /// Capabilities run in registration order.
    #[must_use]
    pub fn register(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Per-request entry point.
    pub fn process(&self, request: &AdmissionRequest) -> AdmissionResponse {
        processor::process(&self.config, &self.capabilities, request)
    }
}
