//! Release asset downloads.
//!
//! The verifier pulls two small assets per examined version: the checksum
//! manifest and its detached signature. [`AssetFetcher`] is the seam;
//! [`HttpFetcher`] is the real implementation, wrapping a `ureq` agent
//! built from a [`FetcherConfig`].

use std::time::Duration;

use tracing::debug;
use ureq::Agent;
use url::Url;

use crate::error::{Result, VerifierError};

/// Downloads a release asset into memory.
///
/// Transport errors and non-2xx responses are both download failures;
/// the verifier records either against the version being examined and
/// moves on.
pub trait AssetFetcher: Send + Sync {
    fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// Configuration for [`HttpFetcher`].
#[derive(Clone, Debug)]
pub struct FetcherConfig {
    pub user_agent: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: Some("provkey/registry-tools".into()),
            timeout: None,
        }
    }
}

impl FetcherConfig {
    /// Builds an HTTP `Agent` configured from this `FetcherConfig`.
    pub fn build(&self) -> Agent {
        let mut config = ureq::Agent::config_builder().timeout_global(self.timeout);

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        config.build().into()
    }
}

/// An [`AssetFetcher`] backed by a `ureq` agent.
#[derive(Clone)]
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Self {
        Self {
            agent: config.build(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(&FetcherConfig::default())
    }
}

impl AssetFetcher for HttpFetcher {
    fn download(&self, url: &str) -> Result<Vec<u8>> {
        Url::parse(url).map_err(|source| {
            VerifierError::InvalidUrl {
                url: url.to_string(),
                source,
            }
        })?;

        debug!(url, "downloading release asset");

        let resp = self.agent.get(url).call().map_err(|err| {
            match err {
                ureq::Error::StatusCode(status) => {
                    VerifierError::HttpStatus {
                        status,
                        url: url.to_string(),
                    }
                }
                other => VerifierError::Network(Box::new(other)),
            }
        })?;

        if !resp.status().is_success() {
            return Err(VerifierError::HttpStatus {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(resp.into_body().read_to_vec()?)
    }
}
