use base64::{engine::general_purpose, Engine as _};
use tracing::{debug, error, warn};

use crate::{
    admission_request::AdmissionRequest,
    admission_response::AdmissionResponse,
    capability::Capability,
    constants::{ANNOTATION_PREFIX, JSON_PATCH_TYPE},
    filter::should_skip,
    module_config::ModuleConfig,
    request::MutationRequest,
};

const REJECT_ON_ERROR_MESSAGE: &str = "module configured to reject on error";
const PATCH_FAILURE_MESSAGE: &str = "patch computation failed";

/// Run every matching binding against the request and assemble the
/// admission response.
///
/// Pure with respect to its arguments: the configuration and capability
/// list are only read, the mutation wrapper is owned by this invocation.
/// Bindings run synchronously, first all bindings of the first
/// capability, then the next.
pub fn process(
    config: &ModuleConfig,
    capabilities: &[Capability],
    request: &AdmissionRequest,
) -> AdmissionResponse {
    let mut wrapper = MutationRequest::new(request);
    let mut warnings: Vec<String> = Vec::new();

    for capability in capabilities {
        if !capability_applies(capability, request) {
            debug!(
                capability = capability.name(),
                namespace = request.namespace(),
                "capability namespace restriction not met"
            );
            continue;
        }

        let annotation_key = format!(
            "{}/{}/{}",
            ANNOTATION_PREFIX,
            config.id,
            capability.name()
        );

        for binding in capability.bindings() {
            if should_skip(config, binding, request) {
                continue;
            }

            wrapper.set_annotation(&annotation_key, "started");
            debug!(
                capability = capability.name(),
                kind = binding.kind.kind.as_str(),
                "binding started"
            );

            match binding.run(&mut wrapper) {
                Ok(()) => {
                    wrapper.set_annotation(&annotation_key, "succeeded");
                }
                Err(failure) => {
                    warn!(
                        capability = capability.name(),
                        error = failure.to_string().as_str(),
                        "binding callback failed"
                    );
                    warnings.push(format!("Action failed: {failure}"));

                    if config.reject_on_error {
                        return AdmissionResponse::reject(
                            request.uid.clone(),
                            REJECT_ON_ERROR_MESSAGE,
                        )
                        .with_warnings(warnings);
                    }
                    wrapper.set_annotation(&annotation_key, "warning");
                }
            }
        }
    }

    let patch = json_patch::diff(wrapper.original(), &wrapper.raw);
    let patch = match serde_json::to_string(&patch) {
        Ok(serialized) => general_purpose::STANDARD.encode(serialized),
        Err(failure) => {
            error!(
                uid = request.uid.as_str(),
                error = failure.to_string().as_str(),
                "cannot serialize JSONPatch"
            );
            return AdmissionResponse::reject_internal(request.uid.clone(), PATCH_FAILURE_MESSAGE);
        }
    };

    AdmissionResponse {
        uid: request.uid.clone(),
        allowed: true,
        patch_type: Some(JSON_PATCH_TYPE.to_owned()),
        patch: Some(patch),
        status: None,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
    }
}

/// A capability with a non-empty namespace list only runs for requests
/// inside one of those namespaces.
fn capability_applies(capability: &Capability, request: &AdmissionRequest) -> bool {
    capability.namespaces().is_empty()
        || capability
            .namespaces()
            .iter()
            .any(|candidate| candidate == request.namespace())
}
