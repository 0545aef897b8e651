pub mod admission_request;
pub mod admission_response;
pub mod capability;
pub mod constants;
pub mod errors;
pub mod filter;
pub mod module;
pub mod module_config;
pub mod processor;
pub mod request;
