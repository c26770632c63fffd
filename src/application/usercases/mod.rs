pub mod checkout;
pub mod enrollment_activation;
pub mod payment_callback;
