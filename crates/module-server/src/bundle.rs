use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("cannot read module bundle: {0}")]
    Io(#[from] std::io::Error),

    #[error("module bundle digest mismatch: expected {expected}, computed {computed}")]
    DigestMismatch { expected: String, computed: String },
}

/// Verify the delivered module bundle against the SHA-256 content hash
/// passed as a startup argument. The expected digest may carry a
/// `sha256:` prefix.
pub fn verify_module_bundle(path: &Path, expected_digest: &str) -> Result<(), BundleError> {
    let computed = format!("{:x}", Sha256::digest(std::fs::read(path)?));
    let expected = expected_digest
        .trim()
        .trim_start_matches("sha256:")
        .to_lowercase();

    if computed != expected {
        return Err(BundleError::DigestMismatch { expected, computed });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn bundle_with_contents(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn accepts_matching_digest() {
        let bundle = bundle_with_contents(b"hello");
        assert!(verify_module_bundle(bundle.path(), HELLO_SHA256).is_ok());
    }

    #[test]
    fn accepts_prefixed_and_uppercase_digest() {
        let bundle = bundle_with_contents(b"hello");
        let prefixed = format!("sha256:{}", HELLO_SHA256.to_uppercase());
        assert!(verify_module_bundle(bundle.path(), &prefixed).is_ok());
    }

    #[test]
    fn rejects_mismatching_digest() {
        let bundle = bundle_with_contents(b"tampered");
        let failure = verify_module_bundle(bundle.path(), HELLO_SHA256).unwrap_err();
        assert!(matches!(failure, BundleError::DigestMismatch { .. }));
    }

    #[test]
    fn missing_bundle_is_an_io_error() {
        let failure =
            verify_module_bundle(Path::new("/nonexistent/bundle"), HELLO_SHA256).unwrap_err();
        assert!(matches!(failure, BundleError::Io(_)));
    }
}
