use std::fmt;

use crate::errors::RequestValidationError;

/// This models the admission/v1/AdmissionRequest object of Kubernetes,
/// restricted to the fields the processing pipeline consumes.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    pub uid: String,
    pub kind: GroupVersionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub operation: Operation,
    #[serde(default)]
    pub user_info: k8s_openapi::api::authentication::v1::UserInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<k8s_openapi::apimachinery::pkg::runtime::RawExtension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_object: Option<k8s_openapi::apimachinery::pkg::runtime::RawExtension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

impl AdmissionRequest {
    /// The document metadata filters are evaluated against: the inbound
    /// object, or the previous state for DELETE requests, which carry no
    /// `object`.
    pub fn admitted_object(&self) -> Option<&serde_json::Value> {
        match self.operation {
            Operation::Delete => self.old_object.as_ref().map(|extension| &extension.0),
            _ => self.object.as_ref().map(|extension| &extension.0),
        }
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }

    /// Reject requests the processor cannot meaningfully handle. The
    /// transport maps a failure to HTTP 400.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if self.uid.is_empty() {
            return Err(RequestValidationError::MissingUid);
        }
        if self.kind.kind.is_empty() {
            return Err(RequestValidationError::MissingKind);
        }
        if self.operation != Operation::Delete && self.object.is_none() {
            return Err(RequestValidationError::MissingObject {
                operation: self.operation,
            });
        }
        Ok(())
    }
}

/// The admission operation being intercepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
            Operation::Connect => write!(f, "CONNECT"),
        }
    }
}

/// Group/Version/Kind triple identifying a Kubernetes resource type.
/// The empty group is the core API; in matching positions an empty group
/// or version wildcards that dimension.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GroupVersionKind {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        GroupVersionKind {
            group: group.to_owned(),
            version: version.to_owned(),
            kind: kind.to_owned(),
        }
    }

    /// Kind-only selector: matches the named kind in any group and version.
    pub fn with_kind(kind: &str) -> Self {
        GroupVersionKind {
            kind: kind.to_owned(),
            ..Default::default()
        }
    }
}
