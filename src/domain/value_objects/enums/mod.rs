pub mod enrollment_statuses;
pub mod payment_methods;
pub mod transaction_statuses;
