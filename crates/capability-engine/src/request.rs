use serde_json::{Map, Value};

use crate::admission_request::{AdmissionRequest, Operation};

/// Mutable view of the inbound object handed to binding callbacks.
///
/// `raw` is a deep working copy the callbacks are free to rewrite; the
/// original document is kept aside, untouched, for the final patch
/// computation. One wrapper is owned by exactly one processing
/// invocation.
pub struct MutationRequest {
    request: AdmissionRequest,
    original: Value,
    pub raw: Value,
}

impl MutationRequest {
    /// DELETE requests carry no `object`; the working copy is seeded from
    /// `oldObject` so callbacks observe the state being deleted.
    pub fn new(request: &AdmissionRequest) -> Self {
        let original = match request.operation {
            Operation::Delete => request.old_object.as_ref(),
            _ => request.object.as_ref(),
        }
        .map(|extension| extension.0.clone())
        .unwrap_or(Value::Null);

        MutationRequest {
            request: request.clone(),
            raw: original.clone(),
            original,
        }
    }

    pub fn request(&self) -> &AdmissionRequest {
        &self.request
    }

    pub fn original(&self) -> &Value {
        &self.original
    }

    /// `metadata.labels` of the working copy, created on first access so
    /// callbacks can assign a single key without null-checks.
    pub fn labels_mut(&mut self) -> &mut Map<String, Value> {
        self.metadata_map_mut("labels")
    }

    /// `metadata.annotations` of the working copy, created on first access.
    pub fn annotations_mut(&mut self) -> &mut Map<String, Value> {
        self.metadata_map_mut("annotations")
    }

    pub fn set_label(&mut self, key: &str, value: &str) {
        self.labels_mut()
            .insert(key.to_owned(), Value::String(value.to_owned()));
    }

    pub fn set_annotation(&mut self, key: &str, value: &str) {
        self.annotations_mut()
            .insert(key.to_owned(), Value::String(value.to_owned()));
    }

    fn metadata_map_mut(&mut self, field: &str) -> &mut Map<String, Value> {
        if !self.raw.is_object() {
            self.raw = Value::Object(Map::new());
        }
        let metadata = self
            .raw
            .as_object_mut()
            .expect("raw was coerced to an object above")
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        if !metadata.is_object() {
            *metadata = Value::Object(Map::new());
        }
        let map = metadata
            .as_object_mut()
            .expect("metadata was coerced to an object above")
            .entry(field)
            .or_insert_with(|| Value::Object(Map::new()));
        if !map.is_object() {
            *map = Value::Object(Map::new());
        }
        map.as_object_mut()
            .expect("metadata map was coerced to an object above")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::admission_request::GroupVersionKind;

    fn request_with_object(operation: Operation, object: Value) -> AdmissionRequest {
        AdmissionRequest {
            uid: String::from("uid"),
            kind: GroupVersionKind::new("", "v1", "Pod"),
            name: Some(String::from("p1")),
            namespace: Some(String::from("default")),
            operation,
            user_info: Default::default(),
            object: Some(k8s_openapi::apimachinery::pkg::runtime::RawExtension(
                object,
            )),
            old_object: None,
            dry_run: None,
        }
    }

    #[test]
    fn mutations_leave_the_original_untouched() {
        let request = request_with_object(
            Operation::Create,
            json!({"metadata": {"name": "p1"}, "spec": {}}),
        );
        let mut wrapper = MutationRequest::new(&request);

        wrapper.set_label("x", "y");

        assert_eq!(wrapper.raw["metadata"]["labels"]["x"], "y");
        assert!(wrapper.original()["metadata"].get("labels").is_none());
    }

    #[test]
    fn metadata_maps_are_created_lazily() {
        let request = request_with_object(Operation::Create, json!({}));
        let mut wrapper = MutationRequest::new(&request);

        wrapper.set_annotation("a", "b");

        assert_eq!(wrapper.raw, json!({"metadata": {"annotations": {"a": "b"}}}));
    }

    #[test]
    fn existing_labels_are_preserved() {
        let request = request_with_object(
            Operation::Create,
            json!({"metadata": {"labels": {"keep": "me"}}}),
        );
        let mut wrapper = MutationRequest::new(&request);

        wrapper.set_label("x", "y");

        assert_eq!(wrapper.raw["metadata"]["labels"]["keep"], "me");
        assert_eq!(wrapper.raw["metadata"]["labels"]["x"], "y");
    }

    #[test]
    fn delete_requests_expose_the_old_object() {
        let mut request = request_with_object(Operation::Delete, json!({}));
        request.object = None;
        request.old_object = Some(k8s_openapi::apimachinery::pkg::runtime::RawExtension(
            json!({"metadata": {"name": "doomed"}}),
        ));

        let wrapper = MutationRequest::new(&request);
        assert_eq!(wrapper.raw["metadata"]["name"], "doomed");
        assert_eq!(wrapper.original()["metadata"]["name"], "doomed");
    }
}
