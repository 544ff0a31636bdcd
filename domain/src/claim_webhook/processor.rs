//! Orchestrates one webhook delivery: authenticate, then link under retry and deadline.

use super::linker::EstimateLinker;
use super::outcome::ProcessingOutcome;
use super::{parse_claim, RawDeliveryContext};
use crate::claims::ClaimPayload;
use crate::error::{Error, ProcessingFailureKind};
use crate::resilience::{BackoffRetryExecutor, DeadlineGuard, RetryPolicy};
use crate::{EstimateStore, Id};
use log::*;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use webhook_auth::webhook::{HmacSignatureVerifier, SignatureVerifier};

/// Provider id the insurance webhook verifier logs under.
pub const INSURANCE_PROVIDER_ID: &str = "insurance";

/// Retry and deadline tuning for [`WebhookProcessor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorSettings {
    pub max_attempts: u32,
    pub retry_delays: Vec<Duration>,
    /// Upper bound on the whole linking sequence, backoff sleeps included
    pub deadline: Duration,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts(),
            retry_delays: policy.delays().to_vec(),
            deadline: Duration::from_secs(3),
        }
    }
}

/// Handles insurance claim webhook deliveries.
///
/// Holds no per-delivery state, so one instance serves any number of concurrent
/// deliveries.
pub struct WebhookProcessor {
    verifier: Arc<dyn SignatureVerifier>,
    linker: EstimateLinker,
    retry: BackoffRetryExecutor,
    deadline: DeadlineGuard,
}

impl WebhookProcessor {
    /// Builds a processor that verifies HMAC-SHA256 signatures keyed by `secret`.
    ///
    /// Fails with a config error when the secret is empty.
    pub fn new(
        secret: SecretString,
        store: Arc<dyn EstimateStore>,
        settings: ProcessorSettings,
    ) -> Result<Self, Error> {
        let verifier = HmacSignatureVerifier::new(INSURANCE_PROVIDER_ID, secret)?;
        Ok(Self::with_verifier(Arc::new(verifier), store, settings))
    }

    pub fn with_verifier(
        verifier: Arc<dyn SignatureVerifier>,
        store: Arc<dyn EstimateStore>,
        settings: ProcessorSettings,
    ) -> Self {
        Self {
            verifier,
            linker: EstimateLinker::new(store),
            retry: BackoffRetryExecutor::new(RetryPolicy::new(
                settings.max_attempts,
                settings.retry_delays,
            )),
            deadline: DeadlineGuard::new(settings.deadline),
        }
    }

    /// Authenticates a raw delivery, then parses and links the claim it carries.
    ///
    /// The signature is checked before the body is parsed, so an unsigned delivery is
    /// rejected as an authentication failure whatever its content. Exactly one audit line
    /// is logged per call.
    pub async fn process_delivery(
        &self,
        delivery: RawDeliveryContext<'_>,
    ) -> Result<ProcessingOutcome, Error> {
        let correlation_id = Id::new_v4();
        let context = format!("[correlation_id={correlation_id}]");
        debug!(
            "{context} Processing {} byte delivery from provider {}",
            delivery.raw_body().len(),
            self.verifier.provider_id()
        );

        let mut claim_id = None;
        let result = match self.authenticate(delivery) {
            Ok(()) => match parse_claim(delivery.raw_body()) {
                Ok(claim) => {
                    claim_id = Some(claim.claim_id.clone());
                    self.link(&claim, correlation_id, &context).await
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        audit(&context, claim_id.as_deref(), correlation_id, &result);
        result
    }

    /// Processes one delivery of `claim`, which must have been parsed from
    /// `delivery.raw_body()`.
    ///
    /// Exactly one audit line is logged per call, whether it succeeds or fails. Failures
    /// are an authentication failure (the store is never touched) or a processing
    /// failure wrapping the deadline or the last store error.
    pub async fn process(
        &self,
        claim: &ClaimPayload,
        delivery: RawDeliveryContext<'_>,
    ) -> Result<ProcessingOutcome, Error> {
        let correlation_id = Id::new_v4();
        let context = format!("[correlation_id={correlation_id}]");
        debug!(
            "{context} Processing claim {} from provider {}",
            claim.claim_id,
            self.verifier.provider_id()
        );

        let result = match self.authenticate(delivery) {
            Ok(()) => self.link(claim, correlation_id, &context).await,
            Err(e) => Err(e),
        };

        audit(&context, Some(&claim.claim_id), correlation_id, &result);
        result
    }

    fn authenticate(&self, delivery: RawDeliveryContext<'_>) -> Result<(), Error> {
        if self
            .verifier
            .verify(delivery.raw_body(), delivery.signature_header())
        {
            Ok(())
        } else {
            Err(Error::authentication_failure("Invalid webhook signature"))
        }
    }

    async fn link(
        &self,
        claim: &ClaimPayload,
        correlation_id: Id,
        context: &str,
    ) -> Result<ProcessingOutcome, Error> {
        let linker = &self.linker;
        let link = self
            .deadline
            .run(self.retry.run(context, move || linker.link(claim)))
            .await
            .map_err(|e| Error::processing_failure(ProcessingFailureKind::DeadlineExceeded, e))?
            .map_err(|e| Error::processing_failure(ProcessingFailureKind::RetriesExhausted, e))?;

        Ok(ProcessingOutcome::new(&claim.claim_id, link, correlation_id))
    }
}

fn audit(
    context: &str,
    claim_id: Option<&str>,
    correlation_id: Id,
    result: &Result<ProcessingOutcome, Error>,
) {
    let claim_id = claim_id.unwrap_or("unknown");
    match result {
        Ok(outcome) => info!(
            target: "audit",
            "{context} claim_id={claim_id} status={} estimate_linked={} correlation_id={correlation_id}",
            outcome.status(),
            outcome.estimate_linked()
        ),
        Err(err) => error!(
            target: "audit",
            "{context} claim_id={claim_id} status=failed estimate_linked=false correlation_id={correlation_id} error={err}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim_webhook::ProcessingStatus;
    use crate::error::{DomainErrorKind, InternalErrorKind, ProcessingErrorKind};
    use crate::estimate_status::EstimateStatus;
    use crate::estimates::Model;
    use crate::resilience::RetryError;
    use crate::vin::Vin;
    use crate::InMemoryEstimateStore;
    use async_trait::async_trait;
    use entity_api::error::Error as EntityApiError;
    use entity_api::MockEstimateStore;
    use webhook_auth::webhook::sign_payload;

    const SECRET: &str = "whsec_test_secret";
    const LINKED_VIN: &str = "1HGCM82633A004352";
    const OTHER_VIN: &str = "2T1BURHE0JC034461";
    const UNKNOWN_VIN: &str = "5YJ3E1EA7KF317000";

    fn body(claim_id: &str, vin: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "claimId": claim_id,
            "adjusterName": "R. Alvarez",
            "insuredVehicle": { "make": "Honda", "model": "Accord", "vin": vin },
            "claimStatus": "approved"
        }))
        .unwrap()
    }

    fn signed(raw_body: &[u8]) -> String {
        sign_payload(SECRET.as_bytes(), raw_body).unwrap()
    }

    fn processor(store: Arc<dyn EstimateStore>) -> WebhookProcessor {
        WebhookProcessor::new(
            SecretString::new(SECRET.to_string()),
            store,
            ProcessorSettings::default(),
        )
        .unwrap()
    }

    fn estimate(vin: &str) -> Model {
        Model::new_draft(Id::new_v4(), Vin::parse(vin).unwrap())
    }

    /// Store seeded with an estimate already reconciled with "mock-linked-claim" and an
    /// unlinked estimate for `OTHER_VIN`. Returns the store and both estimate ids.
    fn seeded_store() -> (Arc<InMemoryEstimateStore>, Id, Id) {
        let store = InMemoryEstimateStore::new();
        let linked = estimate(LINKED_VIN).with_claim_id("mock-linked-claim");
        let other = estimate(OTHER_VIN);
        let ids = (linked.id, other.id);
        store.insert(linked);
        store.insert(other);
        (Arc::new(store), ids.0, ids.1)
    }

    async fn deliver(
        processor: &WebhookProcessor,
        raw_body: &[u8],
        signature: &str,
    ) -> Result<ProcessingOutcome, Error> {
        let claim = parse_claim(raw_body).unwrap();
        processor
            .process(&claim, RawDeliveryContext::new(raw_body, signature))
            .await
    }

    #[tokio::test]
    async fn known_claim_id_is_processed_and_linked() {
        let (store, linked_id, _) = seeded_store();
        let processor = processor(store.clone());
        let raw_body = body("mock-linked-claim", UNKNOWN_VIN);

        let outcome = deliver(&processor, &raw_body, &signed(&raw_body))
            .await
            .unwrap();

        assert!(outcome.estimate_linked());
        assert_eq!(outcome.status(), ProcessingStatus::Processed);
        assert_eq!(outcome.claim_id(), "mock-linked-claim");
        assert_eq!(
            store.get(linked_id).unwrap().status,
            EstimateStatus::Approved
        );
    }

    #[tokio::test]
    async fn unknown_claim_and_vin_is_processed_unlinked() {
        let (store, _, _) = seeded_store();
        let processor = processor(store);
        let raw_body = body("CLM-404", UNKNOWN_VIN);

        let outcome = deliver(&processor, &raw_body, &signed(&raw_body))
            .await
            .unwrap();

        assert!(!outcome.estimate_linked());
        assert_eq!(outcome.status(), ProcessingStatus::ProcessedUnlinked);
    }

    #[tokio::test]
    async fn invalid_signature_never_touches_the_store() {
        let mut store = MockEstimateStore::new();
        store.expect_find_by_claim_id().times(0);
        store.expect_find_by_vin().times(0);
        store.expect_apply_claim_update().times(0);
        let processor = processor(Arc::new(store));
        let raw_body = body("mock-linked-claim", LINKED_VIN);
        let forged = sign_payload(b"not-the-secret", &raw_body).unwrap();

        for signature in [forged.as_str(), "", "sha256=deadbeef"] {
            let err = deliver(&processor, &raw_body, signature).await.unwrap_err();

            assert!(err.is_authentication_failure());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_store_failure_gives_up_after_three_attempts() {
        let mut store = MockEstimateStore::new();
        store
            .expect_find_by_claim_id()
            .times(3)
            .returning(|_| Err(EntityApiError::system("connection reset")));
        store.expect_find_by_vin().times(0);
        let processor = processor(Arc::new(store));
        let raw_body = body("CLM-500", LINKED_VIN);

        let err = deliver(&processor, &raw_body, &signed(&raw_body))
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Processing(ProcessingErrorKind::ProcessingFailure(
                ProcessingFailureKind::RetriesExhausted
            ))
        );
        let retry_error = err
            .source
            .as_ref()
            .and_then(|source| source.downcast_ref::<RetryError<EntityApiError>>())
            .unwrap();
        assert_eq!(retry_error.attempts, 3);
        assert!(retry_error.last_error.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn redelivery_is_idempotent() {
        let (store, linked_id, _) = seeded_store();
        let processor = processor(store.clone());
        let raw_body = body("mock-linked-claim", LINKED_VIN);
        let signature = signed(&raw_body);

        let first = deliver(&processor, &raw_body, &signature).await.unwrap();
        let after_first = store.get(linked_id).unwrap();
        let second = deliver(&processor, &raw_body, &signature).await.unwrap();
        let after_second = store.get(linked_id).unwrap();

        assert!(first.estimate_linked() && second.estimate_linked());
        assert_ne!(first.correlation_id(), second.correlation_id());
        assert_eq!(store.len(), 2);
        assert_eq!(
            Model {
                updated_at: after_first.updated_at,
                ..after_second
            },
            after_first
        );
    }

    #[tokio::test]
    async fn claim_id_match_beats_a_vin_match_on_another_estimate() {
        let (store, linked_id, other_id) = seeded_store();
        let processor = processor(store.clone());
        let raw_body = body("mock-linked-claim", OTHER_VIN);

        deliver(&processor, &raw_body, &signed(&raw_body))
            .await
            .unwrap();

        assert_eq!(
            store.get(linked_id).unwrap().status,
            EstimateStatus::Approved
        );
        assert_eq!(store.get(other_id).unwrap().claim_id, None);
    }

    #[tokio::test]
    async fn vin_fallback_records_the_claim_id() {
        let (store, _, other_id) = seeded_store();
        let processor = processor(store.clone());
        let raw_body = body("CLM-NEW", OTHER_VIN);

        let outcome = deliver(&processor, &raw_body, &signed(&raw_body))
            .await
            .unwrap();

        assert!(outcome.estimate_linked());
        assert!(outcome.message().contains("by VIN"));
        assert_eq!(
            store.get(other_id).unwrap().claim_id.as_deref(),
            Some("CLM-NEW")
        );
    }

    #[tokio::test]
    async fn padded_claim_id_redelivery_matches_by_claim_id() {
        let (store, _, other_id) = seeded_store();
        let processor = processor(store.clone());
        let raw_body = body(" CLM-9 ", OTHER_VIN);
        let signature = signed(&raw_body);

        let first = deliver(&processor, &raw_body, &signature).await.unwrap();
        let second = deliver(&processor, &raw_body, &signature).await.unwrap();

        assert!(first.message().ends_with("by VIN"), "{}", first.message());
        assert!(
            second.message().ends_with("by claim id"),
            "{}",
            second.message()
        );
        assert_eq!(
            store.get(other_id).unwrap().claim_id.as_deref(),
            Some("CLM-9")
        );
    }

    #[tokio::test]
    async fn raw_delivery_is_authenticated_before_it_is_parsed() {
        let mut store = MockEstimateStore::new();
        store.expect_find_by_claim_id().times(0);
        store.expect_find_by_vin().times(0);
        let processor = processor(Arc::new(store));

        let unsigned = processor
            .process_delivery(RawDeliveryContext::new(b"not json", ""))
            .await
            .unwrap_err();
        assert!(unsigned.is_authentication_failure());

        let signature = signed(b"not json");
        let signed_garbage = processor
            .process_delivery(RawDeliveryContext::new(b"not json", &signature))
            .await
            .unwrap_err();
        assert_eq!(
            signed_garbage.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::InvalidPayload)
        );
    }

    #[tokio::test]
    async fn raw_delivery_links_a_signed_claim() {
        let (store, _, _) = seeded_store();
        let processor = processor(store);
        let raw_body = body("mock-linked-claim", LINKED_VIN);
        let signature = signed(&raw_body);

        let outcome = processor
            .process_delivery(RawDeliveryContext::new(&raw_body, &signature))
            .await
            .unwrap();

        assert!(outcome.estimate_linked());
        assert_eq!(outcome.claim_id(), "mock-linked-claim");
    }

    /// Captures `audit` log records emitted on the current thread.
    mod audit_capture {
        use log::{LevelFilter, Log, Metadata, Record};
        use std::cell::RefCell;
        use std::sync::Once;

        thread_local! {
            static AUDIT_LINES: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
        }

        struct AuditCapture;

        impl Log for AuditCapture {
            fn enabled(&self, _metadata: &Metadata) -> bool {
                true
            }

            fn log(&self, record: &Record) {
                if record.target() == "audit" {
                    AUDIT_LINES.with(|lines| lines.borrow_mut().push(record.args().to_string()));
                }
            }

            fn flush(&self) {}
        }

        static LOGGER: AuditCapture = AuditCapture;
        static INIT: Once = Once::new();

        pub fn start() {
            INIT.call_once(|| {
                let _ = log::set_logger(&LOGGER);
                log::set_max_level(LevelFilter::Trace);
            });
            AUDIT_LINES.with(|lines| lines.borrow_mut().clear());
        }

        pub fn lines() -> Vec<String> {
            AUDIT_LINES.with(|lines| lines.borrow().clone())
        }
    }

    fn single_audit_line() -> String {
        let lines = audit_capture::lines();
        assert_eq!(lines.len(), 1, "audit lines: {lines:?}");
        lines[0].clone()
    }

    #[tokio::test]
    async fn linked_delivery_logs_one_audit_line() {
        audit_capture::start();
        let (store, _, _) = seeded_store();
        let processor = processor(store);
        let raw_body = body("mock-linked-claim", UNKNOWN_VIN);

        let outcome = deliver(&processor, &raw_body, &signed(&raw_body))
            .await
            .unwrap();

        let line = single_audit_line();
        assert!(line.contains("claim_id=mock-linked-claim"), "{line}");
        assert!(line.contains("status=processed "), "{line}");
        assert!(line.contains("estimate_linked=true"), "{line}");
        assert!(
            line.contains(&format!("correlation_id={}", outcome.correlation_id())),
            "{line}"
        );
    }

    #[tokio::test]
    async fn rejected_signature_logs_one_audit_line() {
        audit_capture::start();
        let mut store = MockEstimateStore::new();
        store.expect_find_by_claim_id().times(0);
        let processor = processor(Arc::new(store));
        let raw_body = body("mock-linked-claim", LINKED_VIN);

        deliver(&processor, &raw_body, "sha256=00").await.unwrap_err();

        let line = single_audit_line();
        assert!(line.contains("claim_id=mock-linked-claim"), "{line}");
        assert!(line.contains("status=failed"), "{line}");
        assert!(line.contains("estimate_linked=false"), "{line}");
        assert!(line.contains("correlation_id="), "{line}");
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_log_one_audit_line() {
        audit_capture::start();
        let mut store = MockEstimateStore::new();
        store
            .expect_find_by_claim_id()
            .times(3)
            .returning(|_| Err(EntityApiError::system("connection reset")));
        let processor = processor(Arc::new(store));
        let raw_body = body("CLM-500", LINKED_VIN);

        deliver(&processor, &raw_body, &signed(&raw_body))
            .await
            .unwrap_err();

        let line = single_audit_line();
        assert!(line.contains("claim_id=CLM-500"), "{line}");
        assert!(line.contains("status=failed"), "{line}");
        assert!(line.contains("estimate_linked=false"), "{line}");
        assert!(line.contains("correlation_id="), "{line}");
    }

    struct StalledStore;

    #[async_trait]
    impl EstimateStore for StalledStore {
        async fn find_by_claim_id(&self, _claim_id: &str) -> Result<Option<Model>, EntityApiError> {
            std::future::pending().await
        }

        async fn find_by_vin(&self, _vin: &Vin) -> Result<Option<Model>, EntityApiError> {
            std::future::pending().await
        }

        async fn apply_claim_update(
            &self,
            _estimate_id: Id,
            _claim: &ClaimPayload,
        ) -> Result<(), EntityApiError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_store_hits_the_deadline() {
        let processor = processor(Arc::new(StalledStore));
        let raw_body = body("CLM-SLOW", LINKED_VIN);

        let err = deliver(&processor, &raw_body, &signed(&raw_body))
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Processing(ProcessingErrorKind::ProcessingFailure(
                ProcessingFailureKind::DeadlineExceeded
            ))
        );
    }

    #[test]
    fn empty_secret_is_a_config_error() {
        let result = WebhookProcessor::new(
            SecretString::new(String::new()),
            Arc::new(InMemoryEstimateStore::new()),
            ProcessorSettings::default(),
        );

        assert!(matches!(
            result.err().map(|e| e.error_kind),
            Some(DomainErrorKind::Internal(InternalErrorKind::Config))
        ));
    }
}
