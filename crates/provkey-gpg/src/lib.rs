//! GPG signature validation for the provkey registry tools.
//!
//! This crate wraps an ASCII-armored GPG public key into a reusable
//! [`SignatureValidator`] capability: given a checksum manifest and its
//! detached signature, decide whether the signature was produced over the
//! manifest by that key. The capability is the only surface the rest of
//! the workspace depends on; the backing crypto library never leaks out.
//!
//! Construction accepts an ordered list of [`config::ConfigOption`]
//! modifiers. Unset options are resolved from defaults derived from the
//! key itself, and every option-application failure is reported together
//! rather than one at a time.
//!
//! # Example
//!
//! ```no_run
//! use provkey_gpg::{GpgValidator, SignatureValidator, Verdict};
//!
//! fn check(key: &[u8], manifest: &[u8], sig: &[u8]) -> provkey_gpg::Result<bool> {
//!     let validator = GpgValidator::from_armored(key, Vec::new())?;
//!     Ok(validator.validate_signature(manifest, sig)? == Verdict::Valid)
//! }
//! ```

pub mod config;
pub mod error;
pub mod validator;

pub use config::{allow_expired, allowed_algorithms, ConfigOption, ValidatorConfig};
pub use error::{GpgError, Result};
pub use validator::{GpgValidator, SignatureValidator, Verdict};
