//! The release-metadata source seam.

use crate::{
    error::Result,
    types::{ProviderIdentity, ReleaseVersion},
};

/// Lists a provider's published release versions.
///
/// The registry's canonical metadata store lives behind this trait; the
/// verifier only requires that versions come back most-recent-first.
/// A provider with zero releases is a normal result, not an error.
pub trait MetadataSource: Send + Sync {
    /// Returns the provider's release versions, most recent first.
    fn list_versions(&self, provider: &ProviderIdentity) -> Result<Vec<ReleaseVersion>>;
}
