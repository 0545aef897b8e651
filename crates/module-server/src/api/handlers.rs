use std::sync::Arc;

use axum::{
    extract::{self, FromRequest},
    http::StatusCode,
    Json,
};
use capability_engine::{
    admission_request::AdmissionRequest, admission_response::AdmissionResponse,
};
use tokio::{task, time};
use tracing::{debug, warn, Span};

use crate::api::{
    admission_review::{AdmissionReviewRequest, AdmissionReviewResponse},
    api_error::ApiError,
    state::ApiServerState,
};

// create an extractor that internally uses `axum::Json` but has a custom rejection
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub(crate) struct JsonExtractor<T>(T);

#[tracing::instrument(
    name = "mutation",
    fields(
        request_uid = tracing::field::Empty,
        host = crate::config::HOSTNAME.as_str(),
        name = tracing::field::Empty,
        namespace = tracing::field::Empty,
        operation = tracing::field::Empty,
        kind_group = tracing::field::Empty,
        kind_version = tracing::field::Empty,
        kind = tracing::field::Empty,
        allowed = tracing::field::Empty,
        mutated = tracing::field::Empty,
    ),
    skip_all)]
/// Run the module against a mutating admission review.
pub(crate) async fn mutate_handler(
    extract::State(state): extract::State<Arc<ApiServerState>>,
    JsonExtractor(admission_review): JsonExtractor<AdmissionReviewRequest>,
) -> Result<Json<AdmissionReviewResponse>, ApiError> {
    let request = admission_review.request;
    populate_span_with_admission_request_data(&request);

    if let Err(validation_error) = request.validate() {
        debug!(
            error = validation_error.to_string().as_str(),
            "malformed admission request"
        );
        return Err(validation_error.into());
    }

    let uid = request.uid.clone();
    let response = match time::timeout(
        state.admission_timeout,
        acquire_semaphore_and_process(state, request),
    )
    .await
    {
        Ok(response) => response,
        Err(_) => {
            // the overrunning callback keeps running on its blocking
            // thread; its result is discarded
            warn!(
                request_uid = uid.as_str(),
                "admission deadline overrun, failing open"
            );
            AdmissionResponse::fail_open(uid)
        }
    };

    populate_span_with_processing_results(&response);

    Ok(Json(AdmissionReviewResponse::new(response)))
}

pub(crate) async fn healthz_handler() -> StatusCode {
    StatusCode::OK
}

async fn acquire_semaphore_and_process(
    state: Arc<ApiServerState>,
    request: AdmissionRequest,
) -> AdmissionResponse {
    let _permit = state
        .semaphore
        .acquire()
        .await
        .expect("semaphore acquire failed");

    let module = state.module.clone();
    let span = Span::current();
    let response = task::spawn_blocking(move || {
        let _enter = span.enter();
        module.process(&request)
    })
    .await
    .expect("task::spawn_blocking failed");

    debug!(response =? &response, "module processed request");

    response
}

fn populate_span_with_admission_request_data(request: &AdmissionRequest) {
    Span::current().record("request_uid", request.uid.as_str());
    Span::current().record("kind", request.kind.kind.as_str());
    Span::current().record("kind_group", request.kind.group.as_str());
    Span::current().record("kind_version", request.kind.version.as_str());
    Span::current().record("name", request.name.clone().unwrap_or_default().as_str());
    Span::current().record("namespace", request.namespace());
    Span::current().record("operation", request.operation.to_string().as_str());
}

fn populate_span_with_processing_results(response: &AdmissionResponse) {
    Span::current().record("allowed", response.allowed);
    Span::current().record("mutated", response.patch.is_some());
}
