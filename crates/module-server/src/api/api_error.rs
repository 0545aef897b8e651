use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use capability_engine::errors::RequestValidationError;
use serde_json::json;

/// Error answered by the mutation endpoint instead of an AdmissionReview.
/// Carries the HTTP status alongside a reason the API server records in
/// its webhook failure events.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) reason: String,
}

/// Bodies that do not decode into an AdmissionReview with a populated
/// `request` never reach the processor.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            reason: format!("invalid AdmissionReview payload: {}", rejection.body_text()),
        }
    }
}

/// Reviews that decode but fail the processor's request validation are a
/// client error as well.
impl From<RequestValidationError> for ApiError {
    fn from(validation_error: RequestValidationError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            reason: validation_error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = json!({
            "reason": self.reason,
            "code": self.status.as_u16(),
        });

        (self.status, axum::Json(payload)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use capability_engine::admission_request::Operation;

    use super::*;

    #[test]
    fn request_validation_errors_map_to_bad_request() {
        let api_error = ApiError::from(RequestValidationError::MissingObject {
            operation: Operation::Create,
        });

        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            api_error.reason,
            "admission request for a CREATE operation carries no object"
        );
    }
}
