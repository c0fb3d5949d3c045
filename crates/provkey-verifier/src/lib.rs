//! Provider signing-key verification for the provkey registry tools.
//!
//! When a provider rotates or submits a signing key, the registry needs
//! to know whether that key actually signed the provider's recent
//! releases. This crate orchestrates that check: it lists the provider's
//! versions from a [`MetadataSource`], downloads each version's checksum
//! manifest and detached signature through an [`AssetFetcher`], validates
//! the signature with the `provkey-gpg` capability, and records every
//! per-version outcome into a `provkey-report` tree.
//!
//! Verification is partial by nature: some versions verify, some do not,
//! and some cannot be checked at all. Per-version problems are data, not
//! fatal errors; the run always completes and returns whichever versions
//! did verify, alongside the report a maintainer can read to see exactly
//! what happened.
//!
//! # Example
//!
//! ```no_run
//! use provkey_verifier::{MetadataSource, ProviderIdentity, ProviderKeyVerifier};
//!
//! fn check_rotation<S: MetadataSource>(source: S, key: &[u8]) -> provkey_verifier::Result<bool> {
//!     let provider = ProviderIdentity::new("hashicorp", "aws");
//!     let outcome = ProviderKeyVerifier::new(source).verify_key(key, &provider)?;
//!     Ok(!outcome.report.did_fail())
//! }
//! ```

pub mod error;
pub mod fetch;
pub mod source;
pub mod types;
pub mod verifier;

pub use error::{Result, VerifierError};
pub use fetch::{AssetFetcher, FetcherConfig, HttpFetcher};
pub use source::MetadataSource;
pub use types::{ProviderIdentity, ReleaseVersion, VersionNumber};
pub use verifier::{KeyVerification, ProviderKeyVerifier};
