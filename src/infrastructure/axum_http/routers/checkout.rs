use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tracing::error;

use crate::{
    application::usercases::{
        checkout::{CheckoutError, CheckoutUseCase},
        enrollment_activation::EnrollmentActivationUseCase,
    },
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{
            app_users::AppUserRepository, courses::CourseRepository,
            enrollments::EnrollmentRepository, payment_gateway::PaymentGateway,
            promo_codes::PromoCodeRepository, transactions::TransactionRepository,
        },
        value_objects::checkout::{CheckoutRequest, TransactionDto},
    },
    infrastructure::{
        axum_http::auth::AuthUser,
        payments::tripay_client::TripayClient,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                app_users::AppUserPostgres, courses::CoursePostgres,
                enrollments::EnrollmentPostgres, promo_codes::PromoCodePostgres,
                transactions::TransactionPostgres,
            },
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let transaction_repo = Arc::new(TransactionPostgres::new(Arc::clone(&db_pool)));
    let enrollment_repo = Arc::new(EnrollmentPostgres::new(Arc::clone(&db_pool)));
    let promo_code_repo = Arc::new(PromoCodePostgres::new(Arc::clone(&db_pool)));
    let course_repo = Arc::new(CoursePostgres::new(Arc::clone(&db_pool)));
    let app_user_repo = Arc::new(AppUserPostgres::new(Arc::clone(&db_pool)));
    let payment_gateway = Arc::new(TripayClient::new(&config.tripay));
    let activation_repo: Arc<dyn EnrollmentRepository + Send + Sync> = enrollment_repo.clone();
    let enrollment_activation = Arc::new(EnrollmentActivationUseCase::new(activation_repo));

    let checkout_usecase = CheckoutUseCase::new(
        transaction_repo,
        enrollment_repo,
        promo_code_repo,
        course_repo,
        app_user_repo,
        payment_gateway,
        enrollment_activation,
        config.checkout.admin_fee_percent.clone(),
        config.tripay.return_url.clone(),
    );

    Router::new()
        .route("/", post(initiate))
        .route("/channels", get(list_payment_channels))
        .with_state(Arc::new(checkout_usecase))
}

pub async fn initiate<T, E, P, C, U, G>(
    State(checkout_usecase): State<Arc<CheckoutUseCase<T, E, P, C, U, G>>>,
    AuthUser { user_id }: AuthUser,
    Json(request): Json<CheckoutRequest>,
) -> Response
where
    T: TransactionRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    P: PromoCodeRepository + Send + Sync + 'static,
    C: CourseRepository + Send + Sync + 'static,
    U: AppUserRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match checkout_usecase.initiate(user_id, request).await {
        Ok(transaction) => (
            StatusCode::CREATED,
            Json(TransactionDto::from(transaction)),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn list_payment_channels<T, E, P, C, U, G>(
    State(checkout_usecase): State<Arc<CheckoutUseCase<T, E, P, C, U, G>>>,
) -> Response
where
    T: TransactionRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    P: PromoCodeRepository + Send + Sync + 'static,
    C: CourseRepository + Send + Sync + 'static,
    U: AppUserRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match checkout_usecase.list_payment_channels().await {
        Ok(channels) => (StatusCode::OK, Json(channels)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: CheckoutError) -> Response {
    let status = err.status_code();
    // Internal detail stays in the logs, not the client response.
    let message = match &err {
        CheckoutError::Internal(_) => "internal server error".to_string(),
        other => other.to_string(),
    };

    if status.is_server_error() {
        error!(status = status.as_u16(), error = %err, "checkout router: request failed");
    }

    let body = json!({
        "code": status.as_u16(),
        "message": message,
        "field": err.field(),
    });

    (status, Json(body)).into_response()
}
