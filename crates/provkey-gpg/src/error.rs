//! Error types for the GPG validation crate.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use pgp::crypto::public_key::PublicKeyAlgorithm;
use thiserror::Error;

/// Errors raised while building or using a [`GpgValidator`].
///
/// Parse failures are reported as strings rather than wrapping the
/// backing library's error types, keeping the crypto backend out of the
/// public API surface.
///
/// [`GpgValidator`]: crate::GpgValidator
#[derive(Error, Diagnostic, Debug)]
pub enum GpgError {
    #[error("could not parse GPG public key: {0}")]
    #[diagnostic(
        code(provkey_gpg::malformed_key),
        help("The key must be an ASCII-armored GPG public key")
    )]
    MalformedKey(String),

    #[error("could not parse detached signature: {0}")]
    #[diagnostic(code(provkey_gpg::malformed_signature))]
    MalformedSignature(String),

    #[error("failed to apply validator configuration:\n{}", .errors.join("\n"))]
    #[diagnostic(code(provkey_gpg::config))]
    Config { errors: Vec<String> },

    #[error("key algorithm {algorithm:?} is not in the accepted set")]
    #[diagnostic(code(provkey_gpg::unsupported_algorithm))]
    UnsupportedAlgorithm { algorithm: PublicKeyAlgorithm },

    #[error("key expired at {expired_at}")]
    #[diagnostic(
        code(provkey_gpg::expired_key),
        help("Pass the allow_expired option to accept expired keys")
    )]
    ExpiredKey { expired_at: DateTime<Utc> },
}

/// A specialized Result type for GPG validation operations.
pub type Result<T> = std::result::Result<T, GpgError>;
