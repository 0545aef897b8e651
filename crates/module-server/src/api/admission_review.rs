use capability_engine::{
    admission_request::AdmissionRequest, admission_response::AdmissionResponse, constants,
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub request: AdmissionRequest,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub response: AdmissionResponse,
}

impl AdmissionReviewResponse {
    pub fn new(response: AdmissionResponse) -> Self {
        AdmissionReviewResponse {
            api_version: Some(String::from(constants::ADMISSION_REVIEW_API_VERSION)),
            kind: Some(String::from(constants::ADMISSION_REVIEW_KIND)),
            response,
        }
    }
}

#[cfg(test)]
mod tests {
    use capability_engine::admission_request::Operation;

    use super::*;

    #[test]
    fn good_input() {
        let input = r#"
            {
                "apiVersion": "admission.k8s.io/v1",
                "kind": "AdmissionReview",
                "request": {
                    "uid": "hello",
                    "kind": {"group":"","version":"v1","kind":"Pod"},
                    "name": "p1",
                    "namespace": "default",
                    "operation": "CREATE",
                    "userInfo": {
                      "username": "admin",
                      "groups": ["system:authenticated"]
                    },
                    "object": {"apiVersion":"v1","kind":"Pod"}
                }
            }
        "#;

        let review: AdmissionReviewRequest =
            serde_json::from_str(input).expect("deserialization should work");

        assert_eq!(review.api_version.unwrap(), "admission.k8s.io/v1");
        assert_eq!(review.request.uid, "hello");
        assert_eq!(review.request.operation, Operation::Create);
        assert_eq!(review.request.kind.kind, "Pod");
    }

    #[test]
    fn response_wrapper_sets_api_version_and_kind() {
        let review =
            AdmissionReviewResponse::new(AdmissionResponse::fail_open(String::from("uid")));

        assert_eq!(review.api_version.as_deref(), Some("admission.k8s.io/v1"));
        assert_eq!(review.kind.as_deref(), Some("AdmissionReview"));
        assert_eq!(review.response.uid, "uid");
    }
}
