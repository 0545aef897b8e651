use serde::{Deserialize, Serialize};

/// This models the admission/v1/AdmissionResponse object of Kubernetes.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    /// UID is an identifier for the individual request/response.
    /// This must be copied over from the corresponding AdmissionRequest.
    pub uid: String,

    /// Allowed indicates whether or not the admission request was permitted.
    pub allowed: bool,

    /// The type of Patch. Currently we only allow "JSONPatch".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<String>,

    /// The patch body: base64 of an RFC 6902 JSON Patch document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,

    /// Status contains extra details into why an admission request was denied.
    /// This field IS NOT consulted in any way if "Allowed" is "true".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AdmissionResponseStatus>,

    /// warnings is a list of warning messages to return to the requesting
    /// API client. Warning messages describe a problem the client making
    /// the API request should correct or be aware of.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct AdmissionResponseStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl AdmissionResponse {
    /// Rejection: the message becomes the denial reason the API server
    /// renders to the requesting client.
    pub fn reject(uid: impl Into<String>, message: impl Into<String>) -> AdmissionResponse {
        AdmissionResponse {
            uid: uid.into(),
            allowed: false,
            status: Some(AdmissionResponseStatus {
                message: Some(message.into()),
                code: None,
            }),
            ..Default::default()
        }
    }

    /// Rejection caused by a processing fault rather than module policy,
    /// surfaced with a 500 status code.
    pub fn reject_internal(uid: impl Into<String>, message: impl Into<String>) -> AdmissionResponse {
        let mut response = AdmissionResponse::reject(uid, message);
        if let Some(status) = response.status.as_mut() {
            status.code = Some(500);
        }
        response
    }

    /// Attach accumulated callback warnings; an empty list stays off the
    /// wire.
    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        };
        self
    }

    /// Response emitted when the transport gives up on a request (deadline
    /// overrun): the object is admitted untouched.
    pub fn fail_open(uid: String) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_rejection_carries_a_reason_but_no_code() {
        let response = AdmissionResponse::reject("UID", "capability denied the request");

        assert_eq!(response.uid, "UID");
        assert!(!response.allowed);
        assert!(response.patch.is_none());
        assert!(response.patch_type.is_none());

        let status = response.status.unwrap();
        assert_eq!(status.message.as_deref(), Some("capability denied the request"));
        assert_eq!(status.code, None);
    }

    #[test]
    fn internal_rejection_reports_a_500() {
        let response = AdmissionResponse::reject_internal("UID", "patch computation failed");

        assert!(!response.allowed);
        let status = response.status.unwrap();
        assert_eq!(status.code, Some(500));
        assert_eq!(status.message.as_deref(), Some("patch computation failed"));
    }

    #[test]
    fn empty_warning_lists_stay_off_the_wire() {
        let rejected =
            AdmissionResponse::reject("UID", "boom").with_warnings(vec![String::from("one")]);
        assert_eq!(rejected.warnings, Some(vec![String::from("one")]));

        let clean = AdmissionResponse::reject("UID", "boom").with_warnings(Vec::new());
        assert!(clean.warnings.is_none());
    }

    #[test]
    fn fail_open_response_carries_no_patch() {
        let response = AdmissionResponse::fail_open(String::from("UID"));
        assert!(response.allowed);
        assert!(response.patch.is_none());
        assert!(response.patch_type.is_none());
        assert!(response.status.is_none());
        assert!(response.warnings.is_none());
    }

    #[test]
    fn optional_fields_are_omitted_on_the_wire() {
        let response = AdmissionResponse {
            uid: String::from("UID"),
            allowed: true,
            ..Default::default()
        };

        let serialized = serde_json::to_string(&response).unwrap();
        assert_eq!(serialized, r#"{"uid":"UID","allowed":true}"#);
    }
}
