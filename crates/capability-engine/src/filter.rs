use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::{
    admission_request::{AdmissionRequest, GroupVersionKind},
    capability::{Binding, BindingFilters},
    module_config::ModuleConfig,
};

/// Decide whether a binding must NOT run for a request.
///
/// The conditions are evaluated in a fixed order and any hit skips the
/// binding. Global ignores come before binding-level matches so cluster
/// operators keep a hard opt-out that capabilities cannot override.
pub fn should_skip(config: &ModuleConfig, binding: &Binding, request: &AdmissionRequest) -> bool {
    if !binding.event.covers(request.operation) {
        return true;
    }
    if config.always_ignore.ignores_kind(&request.kind) {
        return true;
    }
    if config.always_ignore.ignores_namespace(request.namespace()) {
        return true;
    }

    let labels = metadata_map(request, "labels");
    if config
        .always_ignore
        .labels
        .iter()
        .any(|matcher| matcher_satisfied(matcher, labels))
    {
        return true;
    }

    if kind_mismatch(&binding.kind, &request.kind) {
        return true;
    }
    if namespace_mismatch(&binding.filters, request.namespace()) {
        return true;
    }
    if map_mismatch(&binding.filters.labels, labels) {
        return true;
    }
    if map_mismatch(&binding.filters.annotations, metadata_map(request, "annotations")) {
        return true;
    }

    false
}

/// Metadata map of the admitted object. DELETE requests carry no
/// `object`; their metadata comes from `oldObject`.
fn metadata_map<'a>(request: &'a AdmissionRequest, field: &str) -> Option<&'a Map<String, Value>> {
    request
        .admitted_object()?
        .get("metadata")?
        .get(field)?
        .as_object()
}

/// A global label matcher fires when all of its key/value pairs are
/// present on the object.
fn matcher_satisfied(
    matcher: &BTreeMap<String, String>,
    labels: Option<&Map<String, Value>>,
) -> bool {
    matcher.iter().all(|(key, value)| {
        labels
            .and_then(|labels| labels.get(key))
            .and_then(Value::as_str)
            == Some(value.as_str())
    })
}

fn kind_mismatch(binding_kind: &GroupVersionKind, request_kind: &GroupVersionKind) -> bool {
    binding_kind.kind != request_kind.kind
        || (!binding_kind.group.is_empty() && binding_kind.group != request_kind.group)
        || (!binding_kind.version.is_empty() && binding_kind.version != request_kind.version)
}

/// Cluster-scoped resources have an empty namespace, which is not "in"
/// any non-empty namespace set.
fn namespace_mismatch(filters: &BindingFilters, namespace: &str) -> bool {
    !filters.namespaces.is_empty()
        && !filters
            .namespaces
            .iter()
            .any(|candidate| candidate == namespace)
}

/// Binding-level label/annotation requirements: the key must be present;
/// a non-empty required value must match exactly.
fn map_mismatch(required: &BTreeMap<String, String>, present: Option<&Map<String, Value>>) -> bool {
    required.iter().any(|(key, value)| {
        match present.and_then(|map| map.get(key)).and_then(Value::as_str) {
            None => true,
            Some(stored) => !value.is_empty() && stored != value,
        }
    })
}
