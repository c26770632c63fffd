use anyhow::{Ok, Result};

use super::config_model::{
    Checkout, Database, DotEnvyConfig, Notifications, Server, Tripay,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let tripay = Tripay {
        base_url: std::env::var("TRIPAY_BASE_URL")
            .unwrap_or_else(|_| "https://tripay.co.id/api-sandbox".to_string()),
        api_key: std::env::var("TRIPAY_API_KEY").expect("TRIPAY_API_KEY is invalid"),
        private_key: std::env::var("TRIPAY_PRIVATE_KEY").expect("TRIPAY_PRIVATE_KEY is invalid"),
        merchant_code: std::env::var("TRIPAY_MERCHANT_CODE")
            .expect("TRIPAY_MERCHANT_CODE is invalid"),
        return_url: std::env::var("TRIPAY_RETURN_URL").expect("TRIPAY_RETURN_URL is invalid"),
    };

    let checkout = Checkout {
        admin_fee_percent: std::env::var("CHECKOUT_ADMIN_FEE_PERCENT")
            .unwrap_or_else(|_| "0".to_string()),
    };

    let notifications = Notifications {
        webhook_url: std::env::var("NOTIFICATION_WEBHOOK_URL")
            .ok()
            .filter(|value| !value.trim().is_empty()),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        tripay,
        checkout,
        notifications,
    })
}
