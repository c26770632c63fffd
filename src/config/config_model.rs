#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub tripay: Tripay,
    pub checkout: Checkout,
    pub notifications: Notifications,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Tripay {
    pub base_url: String,
    pub api_key: String,
    pub private_key: String,
    pub merchant_code: String,
    pub return_url: String,
}

#[derive(Debug, Clone)]
pub struct Checkout {
    /// Raw admin-fee percentage as configured; may be a localized numeric
    /// string ("2,5"). Parsed defensively at computation time.
    pub admin_fee_percent: String,
}

#[derive(Debug, Clone)]
pub struct Notifications {
    pub webhook_url: Option<String>,
}
