use std::sync::Arc;

use anyhow::{Context, anyhow};
use chrono::{TimeZone, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::usercases::enrollment_activation::EnrollmentActivationUseCase;
use crate::domain::{
    entities::{
        courses::CourseEntity,
        transactions::{
            InsertTransactionEntity, TransactionEntity, TransactionGatewayUpdateEntity,
        },
    },
    repositories::{
        app_users::AppUserRepository, courses::CourseRepository,
        enrollments::EnrollmentRepository, payment_gateway::PaymentGateway,
        promo_codes::PromoCodeRepository, transactions::TransactionRepository,
    },
    value_objects::{
        checkout::{CheckoutRequest, PaymentChannelDto},
        enums::{payment_methods::PaymentMethod, transaction_statuses::TransactionStatus},
        money::{TotalsBreakdown, compute_totals},
        payment_gateway::{CreateGatewayTransaction, GatewayOrderItem},
    },
};

/// Provenance tag stored under `metadata.source` on every transaction this
/// orchestrator creates.
pub const METADATA_SOURCE: &str = "course-market/checkout";

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("course not found")]
    CourseNotFound,
    #[error("user is already enrolled in this course")]
    AlreadyEnrolled,
    #[error("unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),
    #[error("payment channel is required for gateway payments")]
    ChannelRequired,
    #[error("promo code is invalid or inactive")]
    InvalidPromoCode,
    #[error("payment gateway rejected the transaction: {0}")]
    Gateway(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CheckoutError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CheckoutError::CourseNotFound => StatusCode::NOT_FOUND,
            CheckoutError::AlreadyEnrolled
            | CheckoutError::UnsupportedPaymentMethod(_)
            | CheckoutError::ChannelRequired
            | CheckoutError::InvalidPromoCode => StatusCode::BAD_REQUEST,
            CheckoutError::Gateway(_) => StatusCode::BAD_GATEWAY,
            CheckoutError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Form field the validation error is scoped to, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            CheckoutError::AlreadyEnrolled => Some("course_id"),
            CheckoutError::UnsupportedPaymentMethod(_) => Some("payment_method"),
            CheckoutError::ChannelRequired => Some("payment_channel"),
            CheckoutError::InvalidPromoCode => Some("promo_code"),
            _ => None,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CheckoutError>;

pub struct CheckoutUseCase<T, E, P, C, U, G>
where
    T: TransactionRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    P: PromoCodeRepository + Send + Sync + 'static,
    C: CourseRepository + Send + Sync + 'static,
    U: AppUserRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    transaction_repo: Arc<T>,
    enrollment_repo: Arc<E>,
    promo_code_repo: Arc<P>,
    course_repo: Arc<C>,
    app_user_repo: Arc<U>,
    payment_gateway: Arc<G>,
    enrollment_activation: Arc<EnrollmentActivationUseCase>,
    admin_fee_percent: String,
    return_url: String,
}

impl<T, E, P, C, U, G> CheckoutUseCase<T, E, P, C, U, G>
where
    T: TransactionRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    P: PromoCodeRepository + Send + Sync + 'static,
    C: CourseRepository + Send + Sync + 'static,
    U: AppUserRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transaction_repo: Arc<T>,
        enrollment_repo: Arc<E>,
        promo_code_repo: Arc<P>,
        course_repo: Arc<C>,
        app_user_repo: Arc<U>,
        payment_gateway: Arc<G>,
        enrollment_activation: Arc<EnrollmentActivationUseCase>,
        admin_fee_percent: String,
        return_url: String,
    ) -> Self {
        Self {
            transaction_repo,
            enrollment_repo,
            promo_code_repo,
            course_repo,
            app_user_repo,
            payment_gateway,
            enrollment_activation,
            admin_fee_percent,
            return_url,
        }
    }

    pub async fn initiate(
        &self,
        user_id: Uuid,
        request: CheckoutRequest,
    ) -> UseCaseResult<TransactionEntity> {
        info!(
            %user_id,
            course_id = request.course_id,
            payment_method = %request.payment_method,
            "checkout: initiate requested"
        );

        let course = self
            .course_repo
            .find_published_by_id(request.course_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    course_id = request.course_id,
                    db_error = ?err,
                    "checkout: failed to load course"
                );
                CheckoutError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(
                    %user_id,
                    course_id = request.course_id,
                    "checkout: course not found or unpublished"
                );
                CheckoutError::CourseNotFound
            })?;

        if let Some(existing) = self
            .enrollment_repo
            .find_by_user_and_course(user_id, course.id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    course_id = course.id,
                    db_error = ?err,
                    "checkout: failed to check existing enrollment"
                );
                CheckoutError::Internal(err)
            })?
        {
            warn!(
                %user_id,
                course_id = course.id,
                enrollment_id = existing.id,
                "checkout: user already enrolled"
            );
            return Err(CheckoutError::AlreadyEnrolled);
        }

        let payment_method = PaymentMethod::from_str(&request.payment_method).ok_or_else(|| {
            warn!(
                %user_id,
                payment_method = %request.payment_method,
                "checkout: unsupported payment method"
            );
            CheckoutError::UnsupportedPaymentMethod(request.payment_method.clone())
        })?;

        let payment_channel = request
            .payment_channel
            .as_deref()
            .map(str::trim)
            .filter(|channel| !channel.is_empty())
            .map(str::to_string);
        if payment_method == PaymentMethod::Gateway && payment_channel.is_none() {
            warn!(%user_id, course_id = course.id, "checkout: payment channel missing");
            return Err(CheckoutError::ChannelRequired);
        }

        let promo = match request
            .promo_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
        {
            Some(code) => {
                let normalized = code.to_uppercase();
                let promo = self
                    .promo_code_repo
                    .find_active_by_code(normalized.clone())
                    .await
                    .map_err(|err| {
                        error!(
                            %user_id,
                            promo_code = %normalized,
                            db_error = ?err,
                            "checkout: failed to resolve promo code"
                        );
                        CheckoutError::Internal(err)
                    })?
                    .ok_or_else(|| {
                        warn!(
                            %user_id,
                            promo_code = %normalized,
                            "checkout: promo code invalid or inactive"
                        );
                        CheckoutError::InvalidPromoCode
                    })?;
                Some(promo)
            }
            None => None,
        };

        let totals = compute_totals(
            course.price,
            promo.as_ref().map(|promo| promo.discount),
            Some(self.admin_fee_percent.as_str()),
            payment_method == PaymentMethod::Gateway,
        );

        let invoice_number = generate_invoice_number();
        let transaction = self
            .transaction_repo
            .create(InsertTransactionEntity {
                invoice_number: invoice_number.clone(),
                user_id,
                course_id: course.id,
                amount: course.price,
                discount: totals.discount,
                admin_fee: totals.admin_fee,
                total: totals.grand_total,
                promo_code_id: promo.as_ref().map(|promo| promo.id),
                payment_method: payment_method.to_string(),
                payment_channel: payment_channel.clone(),
                merchant_ref: invoice_number,
                status: TransactionStatus::Pending.to_string(),
                metadata: json!({ "source": METADATA_SOURCE }),
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    course_id = course.id,
                    db_error = ?err,
                    "checkout: failed to persist transaction"
                );
                CheckoutError::Internal(err)
            })?;

        info!(
            %user_id,
            invoice_number = %transaction.invoice_number,
            total = transaction.total,
            "checkout: transaction created"
        );

        match payment_method {
            PaymentMethod::Cash => self.settle_cash(transaction).await,
            PaymentMethod::Gateway => {
                let channel = payment_channel.ok_or_else(|| {
                    CheckoutError::Internal(anyhow!("payment channel missing after validation"))
                })?;
                self.create_gateway_transaction(transaction, course, channel, totals)
                    .await
            }
        }
    }

    pub async fn list_payment_channels(&self) -> UseCaseResult<Vec<PaymentChannelDto>> {
        let channels = self
            .payment_gateway
            .get_payment_channels()
            .await
            .map_err(|err| {
                error!(error = ?err, "checkout: failed to list payment channels");
                CheckoutError::Internal(err)
            })?;

        Ok(channels
            .into_iter()
            .filter(|channel| channel.active)
            .map(PaymentChannelDto::from)
            .collect())
    }

    /// Cash has no external verification step: settle in the same request
    /// and activate the enrollment synchronously.
    async fn settle_cash(
        &self,
        transaction: TransactionEntity,
    ) -> UseCaseResult<TransactionEntity> {
        let paid = self
            .transaction_repo
            .transition_from_pending(transaction.id, TransactionStatus::Paid)
            .await
            .map_err(CheckoutError::Internal)?
            .ok_or_else(|| {
                CheckoutError::Internal(anyhow!(
                    "freshly created transaction {} is no longer pending",
                    transaction.id
                ))
            })?;

        self.enrollment_activation
            .activate(paid.user_id, paid.course_id)
            .await
            .map_err(CheckoutError::Internal)?;

        info!(
            invoice_number = %paid.invoice_number,
            "checkout: cash transaction settled and enrollment activated"
        );
        Ok(paid)
    }

    async fn create_gateway_transaction(
        &self,
        transaction: TransactionEntity,
        course: CourseEntity,
        channel: String,
        totals: TotalsBreakdown,
    ) -> UseCaseResult<TransactionEntity> {
        let buyer = self
            .app_user_repo
            .find_by_id(transaction.user_id)
            .await
            .map_err(CheckoutError::Internal)?
            .ok_or_else(|| CheckoutError::Internal(anyhow!("buyer account not found")))?;

        let request = CreateGatewayTransaction {
            method: channel,
            merchant_ref: transaction.merchant_ref.clone(),
            amount: transaction.total,
            customer_name: buyer.name,
            customer_email: buyer.email,
            customer_phone: buyer.phone,
            order_items: vec![GatewayOrderItem {
                sku: course.slug,
                name: course.title,
                price: transaction.total,
                quantity: 1,
                product_url: None,
            }],
            return_url: self.return_url.clone(),
        };

        let envelope = match self.payment_gateway.create_transaction(request).await {
            Ok(envelope) => envelope,
            Err(err) => {
                // Ambiguous outcome: the gateway may have accepted the request
                // despite the transport failure. Keep the pending row so the
                // callback can still reconcile it.
                warn!(
                    invoice_number = %transaction.invoice_number,
                    error = ?err,
                    "checkout: gateway call failed, keeping pending transaction"
                );
                return Err(CheckoutError::Gateway(
                    "payment gateway is unreachable, please retry later".to_string(),
                ));
            }
        };

        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "payment gateway rejected the transaction".to_string());
            warn!(
                invoice_number = %transaction.invoice_number,
                message = %message,
                "checkout: gateway rejected transaction, rolling back"
            );
            self.transaction_repo
                .delete(transaction.id)
                .await
                .map_err(CheckoutError::Internal)?;
            return Err(CheckoutError::Gateway(message));
        }

        let data = envelope.data.ok_or_else(|| {
            CheckoutError::Internal(anyhow!("gateway accepted the transaction but sent no data"))
        })?;

        // The gateway-confirmed amount is authoritative. The admin fee absorbs
        // any drift so total always equals amount - discount + admin_fee.
        let (total_override, admin_fee_override) = match data.amount {
            Some(gateway_amount) if gateway_amount != transaction.total => (
                Some(gateway_amount),
                Some(gateway_amount - totals.base_total),
            ),
            _ => (None, None),
        };

        let mut metadata = transaction.metadata.clone();
        if let Some(object) = metadata.as_object_mut() {
            object.insert(
                "tripay".to_string(),
                serde_json::to_value(&data).context("failed to serialize gateway payload")?,
            );
        }

        let expired_at = data
            .expired_time
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single());

        let update = TransactionGatewayUpdateEntity {
            payment_channel: data.payment_method.clone(),
            gateway_reference: data.reference.clone(),
            merchant_ref: data.merchant_ref.clone(),
            payment_url: data.checkout_url.clone(),
            payment_instructions: data.instructions.clone(),
            expired_at,
            total: total_override,
            admin_fee: admin_fee_override,
            metadata: Some(metadata),
            updated_at: Utc::now(),
        };

        let updated = self
            .transaction_repo
            .apply_gateway_details(transaction.id, update)
            .await
            .map_err(CheckoutError::Internal)?;

        info!(
            invoice_number = %updated.invoice_number,
            gateway_reference = ?updated.gateway_reference,
            "checkout: gateway transaction created"
        );
        Ok(updated)
    }
}

/// `INV/<date>/<random suffix>`; the unique column on invoice_number is the
/// collision backstop.
fn generate_invoice_number() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();
    format!("INV/{}/{}", Utc::now().format("%Y%m%d"), suffix)
}
