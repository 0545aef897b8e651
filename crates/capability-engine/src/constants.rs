/// Prefix of the annotations stamped on mutated objects to record binding
/// execution outcomes.
pub const ANNOTATION_PREFIX: &str = "pepr.dev";

/// The only patch type emitted by mutating responses.
pub const JSON_PATCH_TYPE: &str = "JSONPatch";

pub const ADMISSION_REVIEW_API_VERSION: &str = "admission.k8s.io/v1";
pub const ADMISSION_REVIEW_KIND: &str = "AdmissionReview";
