//! Core types: provider identities and release versions.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifierError};

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v[0-9]+\.[0-9]+\.[0-9]+(-[a-zA-Z0-9.-]+)?$").unwrap());

const MAX_VERSION_LENGTH: usize = 255;

/// Identifies a provider in the registry by its `(namespace, name)` pair.
///
/// The identity is immutable and used only as a lookup key into the
/// release-metadata source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub namespace: String,
    pub name: String,
}

impl ProviderIdentity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ProviderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A semver version tag. Provider release tags carry a compulsory `v`
/// prefix; [`VersionNumber::normalize`] adds it when missing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionNumber(pub String);

impl VersionNumber {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the tag with a `v` prefix, adding one if absent.
    pub fn normalize(&self) -> VersionNumber {
        let stripped = self.0.strip_prefix('v').unwrap_or(&self.0);
        VersionNumber(format!("v{stripped}"))
    }

    /// Checks that the normalized tag is a well-formed semver version.
    pub fn validate(&self) -> Result<()> {
        let normalized = self.normalize();
        if normalized.0.len() > MAX_VERSION_LENGTH || !VERSION_RE.is_match(&normalized.0) {
            return Err(VerifierError::InvalidVersion(self.0.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One published release of a provider, as reported by the metadata
/// source: the version tag plus the URLs of its checksum manifest and
/// the manifest's detached signature. Read-only to the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseVersion {
    pub version: VersionNumber,
    pub shasums_url: String,
    pub signature_url: String,
}
