//! Construction-time configuration for [`GpgValidator`].
//!
//! Options are applied as an ordered list of modifiers; later options
//! override earlier ones. Application errors are aggregated into a single
//! [`GpgError::Config`] instead of stopping at the first, so a caller sees
//! every bad option at once. After the options run, unset fields are
//! resolved from defaults derived from the key itself, producing a fully
//! resolved configuration before the first validation call.
//!
//! [`GpgValidator`]: crate::GpgValidator

use chrono::{DateTime, Utc};
use pgp::crypto::public_key::PublicKeyAlgorithm;

use crate::error::{GpgError, Result};

/// A single configuration modifier, applied in order at construction.
pub type ConfigOption = Box<dyn FnOnce(&mut ValidatorConfig) -> Result<()>>;

/// Restricts the key algorithms the validator accepts.
///
/// By default the validator accepts exactly the candidate key's own
/// algorithm. The option fails to apply if the set is empty.
pub fn allowed_algorithms(algorithms: Vec<PublicKeyAlgorithm>) -> ConfigOption {
    Box::new(move |config| {
        if algorithms.is_empty() {
            return Err(GpgError::Config {
                errors: vec!["allowed_algorithms: accepted set must not be empty".to_string()],
            });
        }
        config.allowed_algorithms = Some(algorithms);
        Ok(())
    })
}

/// Accepts keys whose expiry time has already passed.
///
/// Expired keys are rejected at construction by default.
pub fn allow_expired(allow: bool) -> ConfigOption {
    Box::new(move |config| {
        config.allow_expired = Some(allow);
        Ok(())
    })
}

/// Partially specified validator configuration, before key-derived
/// defaults are filled in.
#[derive(Debug, Default)]
pub struct ValidatorConfig {
    pub allowed_algorithms: Option<Vec<PublicKeyAlgorithm>>,
    pub allow_expired: Option<bool>,
}

impl ValidatorConfig {
    /// Applies every option in order, aggregating all application errors
    /// into one [`GpgError::Config`].
    pub fn apply(options: Vec<ConfigOption>) -> Result<Self> {
        let mut config = ValidatorConfig::default();
        let mut errors = Vec::new();
        for option in options {
            if let Err(err) = option(&mut config) {
                errors.push(err.to_string());
            }
        }
        if !errors.is_empty() {
            return Err(GpgError::Config { errors });
        }
        Ok(config)
    }

    /// Fills unset fields from defaults derived from the candidate key and
    /// checks the key against the resulting configuration.
    ///
    /// Fails if the key's algorithm is outside the accepted set or if the
    /// key is expired and expired keys are not allowed.
    pub fn resolve(
        self,
        key_algorithm: PublicKeyAlgorithm,
        key_expiry: Option<DateTime<Utc>>,
    ) -> Result<ResolvedConfig> {
        let allowed_algorithms = self
            .allowed_algorithms
            .unwrap_or_else(|| vec![key_algorithm]);
        let allow_expired = self.allow_expired.unwrap_or(false);

        if !allowed_algorithms.contains(&key_algorithm) {
            return Err(GpgError::UnsupportedAlgorithm {
                algorithm: key_algorithm,
            });
        }
        if !allow_expired {
            if let Some(expired_at) = key_expiry.filter(|at| *at < Utc::now()) {
                return Err(GpgError::ExpiredKey { expired_at });
            }
        }

        Ok(ResolvedConfig {
            allowed_algorithms,
            allow_expired,
        })
    }
}

/// Fully resolved configuration; every field has a value.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub allowed_algorithms: Vec<PublicKeyAlgorithm>,
    pub allow_expired: bool,
}
