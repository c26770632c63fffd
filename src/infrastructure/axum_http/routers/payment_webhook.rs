use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tracing::{error, info, warn};
use url::Url;

use crate::{
    application::usercases::{
        enrollment_activation::EnrollmentActivationUseCase,
        payment_callback::{CallbackError, PaymentCallbackUseCase},
    },
    config::config_model::DotEnvyConfig,
    infrastructure::{
        notifications::webhook::WebhookNotifier,
        payments::tripay_client::TripayClient,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{enrollments::EnrollmentPostgres, transactions::TransactionPostgres},
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let transaction_repo = Arc::new(TransactionPostgres::new(Arc::clone(&db_pool)));
    let enrollment_repo = Arc::new(EnrollmentPostgres::new(Arc::clone(&db_pool)));
    let payment_gateway = Arc::new(TripayClient::new(&config.tripay));

    let webhook_url = match config.notifications.webhook_url.as_deref() {
        Some(raw) => match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(
                    error = %err,
                    "payment_webhook: NOTIFICATION_WEBHOOK_URL is invalid, notifications disabled"
                );
                None
            }
        },
        None => None,
    };
    let notification_dispatcher = Arc::new(WebhookNotifier::new(webhook_url));
    let enrollment_activation = Arc::new(EnrollmentActivationUseCase::new(enrollment_repo));

    let payment_callback_usecase = PaymentCallbackUseCase::new(
        transaction_repo,
        payment_gateway,
        notification_dispatcher,
        enrollment_activation,
    );

    Router::new()
        .route("/callback", post(payment_status))
        .with_state(Arc::new(payment_callback_usecase))
}

pub async fn payment_status(
    State(payment_callback_usecase): State<Arc<PaymentCallbackUseCase>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get("x-callback-signature")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    match payment_callback_usecase
        .handle_payment_status(&body, signature)
        .await
    {
        Ok(outcome) => {
            info!(outcome = ?outcome, "payment_webhook: callback acknowledged");
            (StatusCode::OK, Json(json!({ "success": true }))).into_response()
        }
        Err(err) => {
            let status = err.status_code();
            let message = match &err {
                CallbackError::Internal(_) => "internal server error".to_string(),
                other => other.to_string(),
            };
            error!(
                status = status.as_u16(),
                error = %err,
                "payment_webhook: callback rejected"
            );
            (
                status,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response()
        }
    }
}
