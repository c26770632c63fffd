use std::sync::Arc;

use anyhow::anyhow;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::usercases::enrollment_activation::EnrollmentActivationUseCase;
use crate::domain::{
    entities::transactions::TransactionEntity,
    repositories::{
        notifications::NotificationDispatcher, payment_gateway::PaymentGateway,
        transactions::TransactionRepository,
    },
    value_objects::{
        enums::transaction_statuses::TransactionStatus,
        payment_callback::PaymentStatusCallback,
    },
};

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("invalid callback signature")]
    InvalidSignature,
    #[error("malformed callback payload: {0}")]
    MalformedPayload(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CallbackError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CallbackError::InvalidSignature | CallbackError::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            CallbackError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// What the reconciler did with a verified callback. Every variant is
/// acknowledged to the gateway; only signature/parse failures are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    Applied(TransactionStatus),
    AlreadySettled(TransactionStatus),
    ConflictIgnored {
        kept: TransactionStatus,
        reported: TransactionStatus,
    },
    UnknownTransaction,
    UnrecognizedStatus,
}

/// Reconciles asynchronous payment-status webhooks into transaction state.
/// The status transition itself is a guarded update in the repository, so
/// two near-simultaneous deliveries cannot both win.
pub struct PaymentCallbackUseCase {
    transaction_repository: Arc<dyn TransactionRepository + Send + Sync>,
    payment_gateway: Arc<dyn PaymentGateway + Send + Sync>,
    notification_dispatcher: Arc<dyn NotificationDispatcher + Send + Sync>,
    enrollment_activation: Arc<EnrollmentActivationUseCase>,
}

impl PaymentCallbackUseCase {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepository + Send + Sync>,
        payment_gateway: Arc<dyn PaymentGateway + Send + Sync>,
        notification_dispatcher: Arc<dyn NotificationDispatcher + Send + Sync>,
        enrollment_activation: Arc<EnrollmentActivationUseCase>,
    ) -> Self {
        Self {
            transaction_repository,
            payment_gateway,
            notification_dispatcher,
            enrollment_activation,
        }
    }

    pub async fn handle_payment_status(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<CallbackOutcome, CallbackError> {
        if let Err(err) = self
            .payment_gateway
            .verify_callback_signature(payload, signature)
        {
            warn!(error = %err, "payment_callback: signature verification failed");
            return Err(CallbackError::InvalidSignature);
        }

        let callback: PaymentStatusCallback = serde_json::from_slice(payload).map_err(|err| {
            warn!(error = %err, "payment_callback: unparseable payload");
            CallbackError::MalformedPayload(err.to_string())
        })?;

        info!(
            merchant_ref = %callback.merchant_ref,
            gateway_status = %callback.status,
            "payment_callback: verified callback received"
        );

        let Some(reported) = TransactionStatus::from_gateway_status(&callback.status) else {
            info!(
                gateway_status = %callback.status,
                "payment_callback: status carries no local transition, acknowledging"
            );
            return Ok(CallbackOutcome::UnrecognizedStatus);
        };

        let Some(transaction) = self
            .transaction_repository
            .find_by_merchant_ref_or_invoice(callback.merchant_ref.clone())
            .await?
        else {
            // Often a duplicate or gateway test ping; ack so the gateway does
            // not retry indefinitely.
            warn!(
                merchant_ref = %callback.merchant_ref,
                "payment_callback: no matching transaction, acknowledging"
            );
            return Ok(CallbackOutcome::UnknownTransaction);
        };

        let current = TransactionStatus::from_str(&transaction.status).ok_or_else(|| {
            anyhow!(
                "transaction {} has unknown status {}",
                transaction.id,
                transaction.status
            )
        })?;

        if current.is_terminal() {
            return Ok(Self::settled_outcome(&transaction, current, reported));
        }

        let Some(updated) = self
            .transaction_repository
            .transition_from_pending(transaction.id, reported)
            .await?
        else {
            // Lost the race against a concurrent delivery; re-read and report
            // against whatever terminal status won.
            return match self.transaction_repository.find_by_id(transaction.id).await? {
                Some(refreshed) => {
                    let current =
                        TransactionStatus::from_str(&refreshed.status).ok_or_else(|| {
                            anyhow!(
                                "transaction {} has unknown status {}",
                                refreshed.id,
                                refreshed.status
                            )
                        })?;
                    Ok(Self::settled_outcome(&refreshed, current, reported))
                }
                None => Ok(CallbackOutcome::UnknownTransaction),
            };
        };

        info!(
            invoice_number = %updated.invoice_number,
            status = %reported,
            "payment_callback: transaction settled"
        );

        match reported {
            TransactionStatus::Paid => {
                self.enrollment_activation
                    .activate(updated.user_id, updated.course_id)
                    .await?;
                if let Err(err) = self
                    .notification_dispatcher
                    .payment_succeeded(updated.clone())
                    .await
                {
                    warn!(
                        invoice_number = %updated.invoice_number,
                        error = ?err,
                        "payment_callback: failed to dispatch success notification"
                    );
                }
            }
            TransactionStatus::Expired | TransactionStatus::Failed => {
                if let Err(err) = self
                    .notification_dispatcher
                    .payment_failed(updated.clone(), reported)
                    .await
                {
                    warn!(
                        invoice_number = %updated.invoice_number,
                        error = ?err,
                        "payment_callback: failed to dispatch failure notification"
                    );
                }
            }
            // Refund flips the status only; enrollment revocation is
            // unconfirmed business intent. Pending never comes back from
            // the gateway-status mapping.
            TransactionStatus::Refund | TransactionStatus::Pending => {}
        }

        Ok(CallbackOutcome::Applied(reported))
    }

    fn settled_outcome(
        transaction: &TransactionEntity,
        current: TransactionStatus,
        reported: TransactionStatus,
    ) -> CallbackOutcome {
        if current == reported {
            info!(
                invoice_number = %transaction.invoice_number,
                status = %current,
                "payment_callback: duplicate terminal callback, acknowledging"
            );
            CallbackOutcome::AlreadySettled(current)
        } else {
            warn!(
                invoice_number = %transaction.invoice_number,
                kept = %current,
                reported = %reported,
                "payment_callback: conflicting terminal callback, keeping first terminal status"
            );
            CallbackOutcome::ConflictIgnored { kept: current, reported }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::enrollments::EnrollmentEntity,
        repositories::{
            enrollments::{EnrollmentRepository, MockEnrollmentRepository},
            notifications::MockNotificationDispatcher,
            payment_gateway::MockPaymentGateway,
            transactions::MockTransactionRepository,
        },
    };
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn sample_transaction(id: i64, status: TransactionStatus) -> TransactionEntity {
        let now = Utc::now();
        TransactionEntity {
            id,
            invoice_number: "INV/20250101/AAAA11".to_string(),
            user_id: Uuid::new_v4(),
            course_id: 9,
            amount: 300_000,
            discount: 0,
            admin_fee: 6_000,
            total: 306_000,
            promo_code_id: None,
            payment_method: "gateway".to_string(),
            payment_channel: Some("BRIVA".to_string()),
            gateway_reference: Some("T12345".to_string()),
            merchant_ref: "INV/20250101/AAAA11".to_string(),
            payment_url: Some("https://pay.example.com/T12345".to_string()),
            payment_instructions: None,
            expired_at: None,
            status: status.to_string(),
            metadata: json!({ "source": "course-market/checkout" }),
            paid_at: matches!(status, TransactionStatus::Paid).then(Utc::now),
            created_at: now,
            updated_at: now,
        }
    }

    fn callback_body(merchant_ref: &str, status: &str) -> Vec<u8> {
        json!({
            "reference": "T12345",
            "merchant_ref": merchant_ref,
            "status": status,
            "total_amount": 306_000,
        })
        .to_string()
        .into_bytes()
    }

    struct Mocks {
        transaction_repo: MockTransactionRepository,
        payment_gateway: MockPaymentGateway,
        notification_dispatcher: MockNotificationDispatcher,
        enrollment_repo: MockEnrollmentRepository,
    }

    impl Mocks {
        fn new() -> Self {
            let mut payment_gateway = MockPaymentGateway::new();
            payment_gateway
                .expect_verify_callback_signature()
                .returning(|_, _| Ok(()));
            Self {
                transaction_repo: MockTransactionRepository::new(),
                payment_gateway,
                notification_dispatcher: MockNotificationDispatcher::new(),
                enrollment_repo: MockEnrollmentRepository::new(),
            }
        }

        fn into_usecase(self) -> PaymentCallbackUseCase {
            let enrollment_repo = Arc::new(self.enrollment_repo);
            let enrollment_activation = Arc::new(EnrollmentActivationUseCase::new(
                Arc::clone(&enrollment_repo) as Arc<dyn EnrollmentRepository + Send + Sync>,
            ));
            PaymentCallbackUseCase::new(
                Arc::new(self.transaction_repo),
                Arc::new(self.payment_gateway),
                Arc::new(self.notification_dispatcher),
                enrollment_activation,
            )
        }
    }

    #[tokio::test]
    async fn paid_callback_settles_enrolls_and_notifies_once() {
        let mut mocks = Mocks::new();
        let pending = sample_transaction(1, TransactionStatus::Pending);
        let paid = sample_transaction(1, TransactionStatus::Paid);
        let user_id = paid.user_id;

        {
            let pending = pending.clone();
            mocks
                .transaction_repo
                .expect_find_by_merchant_ref_or_invoice()
                .returning(move |_| {
                    let pending = pending.clone();
                    Box::pin(async move { Ok(Some(pending)) })
                });
        }
        {
            let paid = paid.clone();
            mocks
                .transaction_repo
                .expect_transition_from_pending()
                .withf(|_, status| *status == TransactionStatus::Paid)
                .times(1)
                .returning(move |_, _| {
                    let paid = paid.clone();
                    Box::pin(async move { Ok(Some(paid)) })
                });
        }

        mocks
            .enrollment_repo
            .expect_find_by_user_and_course()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        mocks
            .enrollment_repo
            .expect_find_or_create()
            .withf(move |insert| insert.user_id == user_id && insert.course_id == 9)
            .times(1)
            .returning(|insert| {
                let enrollment = EnrollmentEntity {
                    id: 1,
                    user_id: insert.user_id,
                    course_id: insert.course_id,
                    status: insert.status,
                    enrolled_at: insert.enrolled_at,
                    completed_at: None,
                    expires_at: None,
                };
                Box::pin(async move { Ok(enrollment) })
            });

        mocks
            .notification_dispatcher
            .expect_payment_succeeded()
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let usecase = mocks.into_usecase();
        let outcome = usecase
            .handle_payment_status(&callback_body("INV/20250101/AAAA11", "PAID"), "sig")
            .await
            .unwrap();

        assert_eq!(outcome, CallbackOutcome::Applied(TransactionStatus::Paid));
    }

    #[tokio::test]
    async fn duplicate_terminal_callback_is_acknowledged_without_side_effects() {
        let mut mocks = Mocks::new();
        let paid = sample_transaction(1, TransactionStatus::Paid);

        mocks
            .transaction_repo
            .expect_find_by_merchant_ref_or_invoice()
            .returning(move |_| {
                let paid = paid.clone();
                Box::pin(async move { Ok(Some(paid)) })
            });
        // no transition, enrollment, or notification expectations: any call
        // would fail the test

        let usecase = mocks.into_usecase();
        let outcome = usecase
            .handle_payment_status(&callback_body("INV/20250101/AAAA11", "PAID"), "sig")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CallbackOutcome::AlreadySettled(TransactionStatus::Paid)
        );
    }

    #[tokio::test]
    async fn conflicting_terminal_callback_keeps_the_first_status() {
        let mut mocks = Mocks::new();
        let paid = sample_transaction(1, TransactionStatus::Paid);

        mocks
            .transaction_repo
            .expect_find_by_merchant_ref_or_invoice()
            .returning(move |_| {
                let paid = paid.clone();
                Box::pin(async move { Ok(Some(paid)) })
            });

        let usecase = mocks.into_usecase();
        let outcome = usecase
            .handle_payment_status(&callback_body("INV/20250101/AAAA11", "FAILED"), "sig")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CallbackOutcome::ConflictIgnored {
                kept: TransactionStatus::Paid,
                reported: TransactionStatus::Failed,
            }
        );
    }

    #[tokio::test]
    async fn race_loser_reports_against_the_winning_status() {
        let mut mocks = Mocks::new();
        let pending = sample_transaction(1, TransactionStatus::Pending);
        let expired = sample_transaction(1, TransactionStatus::Expired);

        mocks
            .transaction_repo
            .expect_find_by_merchant_ref_or_invoice()
            .returning(move |_| {
                let pending = pending.clone();
                Box::pin(async move { Ok(Some(pending)) })
            });
        mocks
            .transaction_repo
            .expect_transition_from_pending()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        mocks
            .transaction_repo
            .expect_find_by_id()
            .returning(move |_| {
                let expired = expired.clone();
                Box::pin(async move { Ok(Some(expired)) })
            });

        let usecase = mocks.into_usecase();
        let outcome = usecase
            .handle_payment_status(&callback_body("INV/20250101/AAAA11", "PAID"), "sig")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CallbackOutcome::ConflictIgnored {
                kept: TransactionStatus::Expired,
                reported: TransactionStatus::Paid,
            }
        );
    }

    #[tokio::test]
    async fn expired_callback_notifies_failure_without_enrollment() {
        let mut mocks = Mocks::new();
        let pending = sample_transaction(1, TransactionStatus::Pending);
        let expired = sample_transaction(1, TransactionStatus::Expired);

        mocks
            .transaction_repo
            .expect_find_by_merchant_ref_or_invoice()
            .returning(move |_| {
                let pending = pending.clone();
                Box::pin(async move { Ok(Some(pending)) })
            });
        mocks
            .transaction_repo
            .expect_transition_from_pending()
            .withf(|_, status| *status == TransactionStatus::Expired)
            .returning(move |_, _| {
                let expired = expired.clone();
                Box::pin(async move { Ok(Some(expired)) })
            });
        mocks
            .notification_dispatcher
            .expect_payment_failed()
            .withf(|_, status| *status == TransactionStatus::Expired)
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let usecase = mocks.into_usecase();
        let outcome = usecase
            .handle_payment_status(&callback_body("INV/20250101/AAAA11", "EXPIRED"), "sig")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CallbackOutcome::Applied(TransactionStatus::Expired)
        );
    }

    #[tokio::test]
    async fn unknown_transaction_is_acknowledged_as_noop() {
        let mut mocks = Mocks::new();

        mocks
            .transaction_repo
            .expect_find_by_merchant_ref_or_invoice()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = mocks.into_usecase();
        let outcome = usecase
            .handle_payment_status(&callback_body("INV/NOPE", "PAID"), "sig")
            .await
            .unwrap();

        assert_eq!(outcome, CallbackOutcome::UnknownTransaction);
    }

    #[tokio::test]
    async fn invalid_signature_is_rejected_without_lookup() {
        let mut payment_gateway = MockPaymentGateway::new();
        payment_gateway
            .expect_verify_callback_signature()
            .returning(|_, _| Err(anyhow!("signature mismatch")));

        let mocks = Mocks {
            transaction_repo: MockTransactionRepository::new(),
            payment_gateway,
            notification_dispatcher: MockNotificationDispatcher::new(),
            enrollment_repo: MockEnrollmentRepository::new(),
        };

        let usecase = mocks.into_usecase();
        let err = usecase
            .handle_payment_status(&callback_body("INV/20250101/AAAA11", "PAID"), "bad")
            .await
            .unwrap_err();

        assert!(matches!(err, CallbackError::InvalidSignature));
    }

    #[tokio::test]
    async fn interim_gateway_status_is_acknowledged_without_lookup() {
        let mocks = Mocks::new();

        let usecase = mocks.into_usecase();
        let outcome = usecase
            .handle_payment_status(&callback_body("INV/20250101/AAAA11", "UNPAID"), "sig")
            .await
            .unwrap();

        assert_eq!(outcome, CallbackOutcome::UnrecognizedStatus);
    }
}
