//! The GPG-backed signature validation capability.

use pgp::{
    composed::{Deserializable, SignedPublicKey, StandaloneSignature},
    types::KeyTrait,
};
use tracing::debug;

use crate::{
    config::{ConfigOption, ResolvedConfig, ValidatorConfig},
    error::{GpgError, Result},
};

/// Result of checking one (data, signature) pair.
///
/// A [`Verdict::Mismatch`] is a normal negative result: the inputs were
/// well-formed but the signature was not produced over the data by the
/// validator's key. Inputs that cannot even be parsed are reported as
/// errors instead, never as a mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Mismatch,
}

/// The verify-bytes capability: check whether a detached signature was
/// produced over some data by the key this validator was built from.
///
/// Implementations are read-only after construction and safe to call
/// from multiple threads.
pub trait SignatureValidator: Send + Sync {
    /// Checks `signature` against `data`.
    ///
    /// Returns `Ok(Verdict::Valid)` when the signature validates,
    /// `Ok(Verdict::Mismatch)` when it is well-formed but does not match,
    /// and an error when verification could not be attempted at all.
    fn validate_signature(&self, data: &[u8], signature: &[u8]) -> Result<Verdict>;
}

/// A [`SignatureValidator`] backed by an ASCII-armored GPG public key.
///
/// Construction derives a keyring (the primary key plus its subkeys) from
/// the key bytes and fails fatally if no usable key can be extracted or
/// any configuration option fails to apply. Once built, the keyring is
/// immutable and validation calls are stateless.
#[derive(Debug)]
pub struct GpgValidator {
    keyring: SignedPublicKey,
    config: ResolvedConfig,
}

impl GpgValidator {
    /// Builds a validator from ASCII-armored public key bytes.
    ///
    /// Options are applied in order; all application failures are
    /// aggregated into a single error. Construction is atomic: on any
    /// failure no validator is returned.
    pub fn from_armored(key_data: &[u8], options: Vec<ConfigOption>) -> Result<Self> {
        let armored = std::str::from_utf8(key_data)
            .map_err(|err| GpgError::MalformedKey(err.to_string()))?;
        let (keyring, _) = SignedPublicKey::from_string(armored)
            .map_err(|err| GpgError::MalformedKey(err.to_string()))?;

        let config = ValidatorConfig::apply(options)?
            .resolve(keyring.algorithm(), keyring.expires_at())?;

        debug!(
            algorithm = ?keyring.algorithm(),
            subkeys = keyring.public_subkeys.len(),
            "derived verification keyring"
        );

        Ok(Self { keyring, config })
    }

    /// The resolved configuration this validator was built with.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    fn parse_signature(signature: &[u8]) -> Result<StandaloneSignature> {
        // Detached signatures come either ASCII-armored (.asc) or raw (.sig).
        if let Ok(text) = std::str::from_utf8(signature) {
            if text.contains("-----BEGIN PGP SIGNATURE-----") {
                return StandaloneSignature::from_string(text)
                    .map(|(sig, _)| sig)
                    .map_err(|err| GpgError::MalformedSignature(err.to_string()));
            }
        }
        StandaloneSignature::from_bytes(signature)
            .map_err(|err| GpgError::MalformedSignature(err.to_string()))
    }
}

impl SignatureValidator for GpgValidator {
    fn validate_signature(&self, data: &[u8], signature: &[u8]) -> Result<Verdict> {
        let signature = Self::parse_signature(signature)?;

        if signature.verify(&self.keyring, data).is_ok() {
            return Ok(Verdict::Valid);
        }
        for subkey in &self.keyring.public_subkeys {
            if signature.verify(subkey, data).is_ok() {
                return Ok(Verdict::Valid);
            }
        }

        debug!("signature did not validate against the keyring");
        Ok(Verdict::Mismatch)
    }
}
