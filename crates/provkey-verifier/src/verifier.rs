//! The provider signing-key verification protocol.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use provkey_gpg::{GpgValidator, SignatureValidator, Verdict};
use provkey_report::{Report, Status};
use tracing::{debug, warn};

use crate::{
    error::Result,
    fetch::{AssetFetcher, HttpFetcher},
    source::MetadataSource,
    types::{ProviderIdentity, ReleaseVersion},
};

/// Default number of most-recent versions examined per provider.
const DEFAULT_VERSIONS_TO_CHECK: u8 = 10;

/// The outputs of one verification run: the versions the candidate key
/// signed successfully (in the order they were examined, most recent
/// first) and the report describing every examined version's outcome.
#[derive(Debug)]
pub struct KeyVerification {
    pub verified: Vec<String>,
    pub report: Report,
}

/// Verifies whether a candidate GPG key signed a provider's recent
/// releases.
///
/// For each of the provider's most recent versions the verifier downloads
/// the checksum manifest and its detached signature, then checks the
/// signature against the candidate key. A version that cannot be checked
/// (download failure, malformed signature bytes) or whose signature does
/// not match is recorded in the report and skipped; it never aborts the
/// run. The only fatal preconditions are a key that cannot be parsed and
/// a metadata source that cannot list versions at all.
///
/// # Example
///
/// ```no_run
/// use provkey_verifier::{MetadataSource, ProviderIdentity, ProviderKeyVerifier};
///
/// fn audit<S: MetadataSource>(source: S, key: &[u8]) -> provkey_verifier::Result<()> {
///     let verifier = ProviderKeyVerifier::new(source).versions_to_check(5);
///     let outcome = verifier.verify_key(key, &ProviderIdentity::new("hashicorp", "aws"))?;
///     println!("{}", outcome.report.render_markdown());
///     Ok(())
/// }
/// ```
pub struct ProviderKeyVerifier<S, F = HttpFetcher> {
    source: S,
    fetcher: F,
    versions_to_check: u8,
    cancelled: Option<Arc<AtomicBool>>,
}

impl<S: MetadataSource> ProviderKeyVerifier<S, HttpFetcher> {
    /// Creates a verifier bound to a release-metadata source, with the
    /// default HTTP fetcher and version count.
    pub fn new(source: S) -> Self {
        Self {
            source,
            fetcher: HttpFetcher::default(),
            versions_to_check: DEFAULT_VERSIONS_TO_CHECK,
            cancelled: None,
        }
    }
}

impl<S: MetadataSource, F: AssetFetcher> ProviderKeyVerifier<S, F> {
    /// Sets how many of the provider's most recent versions to examine.
    /// Zero means nothing is verified and no network access happens.
    pub fn versions_to_check(mut self, count: u8) -> Self {
        self.versions_to_check = count;
        self
    }

    /// Replaces the asset fetcher used for manifest and signature
    /// downloads.
    pub fn fetcher<F2: AssetFetcher>(self, fetcher: F2) -> ProviderKeyVerifier<S, F2> {
        ProviderKeyVerifier {
            source: self.source,
            fetcher,
            versions_to_check: self.versions_to_check,
            cancelled: self.cancelled,
        }
    }

    /// Supplies a cancellation flag checked before each version. Once the
    /// flag is set, completed outcomes are kept but no further versions
    /// are examined.
    pub fn cancelled(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(flag);
        self
    }

    /// Verifies a candidate key (GPG ASCII-armored) against the
    /// provider's recent releases.
    ///
    /// Building the validator from the key bytes happens before any
    /// metadata lookup or download; a malformed key fails the whole call
    /// without network access.
    pub fn verify_key(
        &self,
        key_data: &[u8],
        provider: &ProviderIdentity,
    ) -> Result<KeyVerification> {
        let validator = GpgValidator::from_armored(key_data, Vec::new())?;
        self.verify_with(&validator, provider)
    }

    /// Runs the verification protocol with an already-built validator.
    pub fn verify_with(
        &self,
        validator: &dyn SignatureValidator,
        provider: &ProviderIdentity,
    ) -> Result<KeyVerification> {
        let mut report = Report::new();
        let root = report.add_step(
            format!("Verify signing key for provider {provider}"),
            Status::Success,
        );

        if self.versions_to_check == 0 {
            root.remark("no versions requested; nothing to verify");
            return Ok(KeyVerification {
                verified: Vec::new(),
                report,
            });
        }

        let mut versions = self.source.list_versions(provider)?;
        debug!(provider = %provider, count = versions.len(), "listed release versions");

        if versions.is_empty() {
            root.remark("provider has no published releases; nothing to verify");
            return Ok(KeyVerification {
                verified: Vec::new(),
                report,
            });
        }
        versions.truncate(usize::from(self.versions_to_check));

        let mut verified = Vec::with_capacity(versions.len());
        for release in &versions {
            if self.is_cancelled() {
                warn!(provider = %provider, "verification cancelled, skipping remaining versions");
                root.remark("verification was cancelled before all versions were examined");
                break;
            }

            let tag = release.version.normalize();
            match self.check_version(validator, release) {
                Ok(Verdict::Valid) => {
                    debug!(version = %tag, "signature valid");
                    root.add_step(tag.to_string(), Status::Success);
                    verified.push(tag.to_string());
                }
                Ok(Verdict::Mismatch) => {
                    debug!(version = %tag, "signature mismatch");
                    root.add_step(tag.to_string(), Status::Failure)
                        .error("checksum manifest signature was not produced by the candidate key");
                }
                Err(err) => {
                    warn!(version = %tag, error = %err, "version could not be checked");
                    root.add_step(tag.to_string(), Status::Failure)
                        .error(err.to_string());
                }
            }
        }

        Ok(KeyVerification { verified, report })
    }

    /// Downloads one version's checksum manifest and detached signature
    /// and checks the signature. Any error here is scoped to this version.
    fn check_version(
        &self,
        validator: &dyn SignatureValidator,
        release: &ReleaseVersion,
    ) -> Result<Verdict> {
        release.version.validate()?;
        let manifest = self.fetcher.download(&release.shasums_url)?;
        let signature = self.fetcher.download(&release.signature_url)?;
        Ok(validator.validate_signature(&manifest, &signature)?)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::atomic::AtomicUsize};

    use provkey_gpg::GpgError;

    use super::*;
    use crate::{error::VerifierError, types::VersionNumber};

    struct FakeSource {
        versions: Vec<ReleaseVersion>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn new(versions: Vec<ReleaseVersion>) -> Self {
            Self {
                versions,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl MetadataSource for FakeSource {
        fn list_versions(&self, _provider: &ProviderIdentity) -> Result<Vec<ReleaseVersion>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.versions.clone())
        }
    }

    /// Serves canned bytes per URL; unknown URLs get a 404. Optionally
    /// sets a cancellation flag on every download.
    struct FakeFetcher {
        responses: HashMap<String, Vec<u8>>,
        calls: Arc<AtomicUsize>,
        cancel_on_download: Option<Arc<AtomicBool>>,
    }

    impl FakeFetcher {
        fn new(responses: HashMap<String, Vec<u8>>) -> Self {
            Self {
                responses,
                calls: Arc::new(AtomicUsize::new(0)),
                cancel_on_download: None,
            }
        }
    }

    impl AssetFetcher for FakeFetcher {
        fn download(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(flag) = &self.cancel_on_download {
                flag.store(true, Ordering::SeqCst);
            }
            self.responses.get(url).cloned().ok_or_else(|| {
                VerifierError::HttpStatus {
                    status: 404,
                    url: url.to_string(),
                }
            })
        }
    }

    /// Decides the verdict from the signature bytes alone.
    struct StubValidator;

    impl SignatureValidator for StubValidator {
        fn validate_signature(
            &self,
            _data: &[u8],
            signature: &[u8],
        ) -> provkey_gpg::Result<Verdict> {
            match signature {
                b"good" => Ok(Verdict::Valid),
                b"bad" => Ok(Verdict::Mismatch),
                _ => Err(GpgError::MalformedSignature("not a signature".to_string())),
            }
        }
    }

    fn release(tag: &str) -> ReleaseVersion {
        ReleaseVersion {
            version: VersionNumber::new(tag),
            shasums_url: format!("https://releases.example.com/{tag}/SHA256SUMS"),
            signature_url: format!("https://releases.example.com/{tag}/SHA256SUMS.sig"),
        }
    }

    /// Maps a release's assets: the manifest plus a signature with the
    /// given verdict-controlling bytes.
    fn assets(responses: &mut HashMap<String, Vec<u8>>, tag: &str, signature: &[u8]) {
        let rel = release(tag);
        responses.insert(rel.shasums_url, format!("sums for {tag}").into_bytes());
        responses.insert(rel.signature_url, signature.to_vec());
    }

    fn provider() -> ProviderIdentity {
        ProviderIdentity::new("hashicorp", "aws")
    }

    #[test]
    fn no_releases_is_vacuous_success() {
        let verifier = ProviderKeyVerifier::new(FakeSource::new(Vec::new()))
            .fetcher(FakeFetcher::new(HashMap::new()));

        let outcome = verifier.verify_with(&StubValidator, &provider()).unwrap();
        assert!(outcome.verified.is_empty());
        assert!(!outcome.report.did_fail());
        assert_eq!(outcome.report.steps[0].remarks.len(), 1);
    }

    #[test]
    fn malformed_key_fails_before_any_network_access() {
        let source = FakeSource::new(vec![release("v1.0.0")]);
        let source_calls = source.calls.clone();
        let fetcher = FakeFetcher::new(HashMap::new());
        let fetcher_calls = fetcher.calls.clone();

        let verifier = ProviderKeyVerifier::new(source).fetcher(fetcher);
        let err = verifier
            .verify_key(b"not a real key", &provider())
            .unwrap_err();

        assert!(matches!(err, VerifierError::Gpg(_)));
        assert_eq!(source_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fetcher_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn mixed_outcomes_across_four_versions() {
        let mut responses = HashMap::new();
        assets(&mut responses, "v1.2.0", b"good");
        assets(&mut responses, "v1.1.0", b"good");
        assets(&mut responses, "v1.0.0", b"bad");
        // v0.9.0 has no assets at all, so its downloads 404

        let source = FakeSource::new(vec![
            release("v1.2.0"),
            release("v1.1.0"),
            release("v1.0.0"),
            release("v0.9.0"),
        ]);
        let verifier = ProviderKeyVerifier::new(source)
            .versions_to_check(4)
            .fetcher(FakeFetcher::new(responses));

        let outcome = verifier.verify_with(&StubValidator, &provider()).unwrap();
        assert_eq!(outcome.verified, vec!["v1.2.0", "v1.1.0"]);

        let steps = &outcome.report.steps[0].sub_steps;
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].status, Status::Success);
        assert_eq!(steps[1].status, Status::Success);
        assert_eq!(steps[2].status, Status::Failure);
        assert!(steps[2].errors[0].contains("not produced by the candidate key"));
        assert_eq!(steps[3].status, Status::Failure);
        assert!(steps[3].errors[0].contains("HTTP 404"));
        assert!(outcome.report.did_fail());
    }

    #[test]
    fn download_failure_does_not_abort_later_versions() {
        let mut responses = HashMap::new();
        assets(&mut responses, "v1.0.0", b"good");
        // v1.1.0 missing: both downloads fail

        let source = FakeSource::new(vec![release("v1.1.0"), release("v1.0.0")]);
        let verifier =
            ProviderKeyVerifier::new(source).fetcher(FakeFetcher::new(responses));

        let outcome = verifier.verify_with(&StubValidator, &provider()).unwrap();
        assert_eq!(outcome.verified, vec!["v1.0.0"]);

        let steps = &outcome.report.steps[0].sub_steps;
        assert_eq!(steps[0].status, Status::Failure);
        assert!(!steps[0].errors.is_empty());
        assert_eq!(steps[1].status, Status::Success);
    }

    #[test]
    fn malformed_signature_bytes_are_a_per_version_failure() {
        let mut responses = HashMap::new();
        assets(&mut responses, "v2.0.0", b"garbage");
        assets(&mut responses, "v1.9.0", b"good");

        let source = FakeSource::new(vec![release("v2.0.0"), release("v1.9.0")]);
        let verifier =
            ProviderKeyVerifier::new(source).fetcher(FakeFetcher::new(responses));

        let outcome = verifier.verify_with(&StubValidator, &provider()).unwrap();
        assert_eq!(outcome.verified, vec!["v1.9.0"]);

        let steps = &outcome.report.steps[0].sub_steps;
        assert!(steps[0].errors[0].contains("could not parse detached signature"));
    }

    #[test]
    fn zero_versions_to_check_skips_all_network_access() {
        let source = FakeSource::new(vec![release("v1.0.0")]);
        let source_calls = source.calls.clone();
        let fetcher = FakeFetcher::new(HashMap::new());
        let fetcher_calls = fetcher.calls.clone();

        let verifier = ProviderKeyVerifier::new(source)
            .versions_to_check(0)
            .fetcher(fetcher);

        let outcome = verifier.verify_with(&StubValidator, &provider()).unwrap();
        assert!(outcome.verified.is_empty());
        assert!(!outcome.report.did_fail());
        assert_eq!(source_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fetcher_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn only_the_most_recent_versions_are_examined() {
        let mut responses = HashMap::new();
        assets(&mut responses, "v3.0.0", b"good");
        assets(&mut responses, "v2.0.0", b"good");
        assets(&mut responses, "v1.0.0", b"good");

        let source = FakeSource::new(vec![
            release("v3.0.0"),
            release("v2.0.0"),
            release("v1.0.0"),
        ]);
        let fetcher = FakeFetcher::new(responses);
        let fetcher_calls = fetcher.calls.clone();

        let verifier = ProviderKeyVerifier::new(source)
            .versions_to_check(2)
            .fetcher(fetcher);

        let outcome = verifier.verify_with(&StubValidator, &provider()).unwrap();
        assert_eq!(outcome.verified, vec!["v3.0.0", "v2.0.0"]);
        assert_eq!(outcome.report.steps[0].sub_steps.len(), 2);
        assert_eq!(fetcher_calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn tags_without_v_prefix_are_normalized_in_outputs() {
        let rel = ReleaseVersion {
            version: VersionNumber::new("1.2.0"),
            shasums_url: "https://releases.example.com/1.2.0/SHA256SUMS".to_string(),
            signature_url: "https://releases.example.com/1.2.0/SHA256SUMS.sig".to_string(),
        };
        let mut responses = HashMap::new();
        responses.insert(rel.shasums_url.clone(), b"sums".to_vec());
        responses.insert(rel.signature_url.clone(), b"good".to_vec());

        let source = FakeSource::new(vec![rel]);
        let verifier =
            ProviderKeyVerifier::new(source).fetcher(FakeFetcher::new(responses));

        let outcome = verifier.verify_with(&StubValidator, &provider()).unwrap();
        assert_eq!(outcome.verified, vec!["v1.2.0"]);
        assert_eq!(outcome.report.steps[0].sub_steps[0].name, "v1.2.0");
    }

    #[test]
    fn invalid_version_tag_is_a_per_version_failure() {
        let mut responses = HashMap::new();
        assets(&mut responses, "v1.0.0", b"good");

        let source = FakeSource::new(vec![release("not-semver"), release("v1.0.0")]);
        let fetcher = FakeFetcher::new(responses);
        let fetcher_calls = fetcher.calls.clone();

        let verifier = ProviderKeyVerifier::new(source).fetcher(fetcher);
        let outcome = verifier.verify_with(&StubValidator, &provider()).unwrap();

        assert_eq!(outcome.verified, vec!["v1.0.0"]);
        let steps = &outcome.report.steps[0].sub_steps;
        assert_eq!(steps[0].status, Status::Failure);
        assert!(steps[0].errors[0].contains("Invalid version tag"));
        // the bad tag never hit the network
        assert_eq!(fetcher_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cancellation_keeps_completed_outcomes() {
        let mut responses = HashMap::new();
        assets(&mut responses, "v1.2.0", b"good");
        assets(&mut responses, "v1.1.0", b"good");

        let flag = Arc::new(AtomicBool::new(false));
        let mut fetcher = FakeFetcher::new(responses);
        fetcher.cancel_on_download = Some(flag.clone());

        let source = FakeSource::new(vec![release("v1.2.0"), release("v1.1.0")]);
        let verifier = ProviderKeyVerifier::new(source)
            .fetcher(fetcher)
            .cancelled(flag);

        let outcome = verifier.verify_with(&StubValidator, &provider()).unwrap();
        assert_eq!(outcome.verified, vec!["v1.2.0"]);

        let root = &outcome.report.steps[0];
        assert_eq!(root.sub_steps.len(), 1);
        assert!(root.remarks[0].contains("cancelled"));
    }

    #[test]
    fn report_renders_all_examined_versions() {
        let mut responses = HashMap::new();
        assets(&mut responses, "v1.1.0", b"good");
        assets(&mut responses, "v1.0.0", b"bad");

        let source = FakeSource::new(vec![release("v1.1.0"), release("v1.0.0")]);
        let verifier =
            ProviderKeyVerifier::new(source).fetcher(FakeFetcher::new(responses));

        let outcome = verifier.verify_with(&StubValidator, &provider()).unwrap();
        let rendered = outcome.report.render_markdown();

        assert!(rendered.contains("## Verify signing key for provider hashicorp/aws"));
        assert!(rendered.contains("### v1.1.0\n✅ **Success**"));
        assert!(rendered.contains("### v1.0.0\n❌ **Failure**"));
        assert_eq!(rendered, outcome.report.render_markdown());
    }
}
