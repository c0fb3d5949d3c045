//! Error types for the verifier crate.
//!
//! Two classes matter here: errors that abort a whole `verify_key` call
//! (a malformed candidate key, a metadata source that cannot list
//! versions) and per-version errors (download failures, malformed
//! signature bytes) that are captured into the report and never
//! propagated past the version they belong to.

use miette::Diagnostic;
use provkey_gpg::GpgError;
use thiserror::Error;

/// Errors that can occur while verifying a provider signing key.
#[derive(Error, Diagnostic, Debug)]
pub enum VerifierError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Gpg(#[from] GpgError),

    #[error("failed to list versions for provider {provider}: {reason}")]
    #[diagnostic(
        code(provkey_verifier::metadata),
        help("Verify the provider exists in the registry metadata")
    )]
    Metadata { provider: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(provkey_verifier::network),
        help("Check your internet connection or try again later")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(code(provkey_verifier::http_error))]
    HttpStatus { status: u16, url: String },

    #[error("Invalid URL: {url}")]
    #[diagnostic(code(provkey_verifier::invalid_url))]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid version tag: {0}")]
    #[diagnostic(code(provkey_verifier::invalid_version))]
    InvalidVersion(String),
}

/// A specialized Result type for verifier operations.
pub type Result<T> = std::result::Result<T, VerifierError>;

impl From<ureq::Error> for VerifierError {
    fn from(e: ureq::Error) -> Self {
        Self::Network(Box::new(e))
    }
}
