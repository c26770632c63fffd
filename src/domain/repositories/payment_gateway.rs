use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::payment_gateway::{
    CreateGatewayTransaction, GatewayPaymentChannel, GatewayTransactionEnvelope,
};

/// Boundary adapter to the external payment-channel provider. Network and
/// protocol failures surface as `Err`; a well-formed rejection comes back as
/// an envelope with `success == false` so the caller can roll back.
#[async_trait]
#[automock]
pub trait PaymentGateway {
    async fn create_transaction(
        &self,
        request: CreateGatewayTransaction,
    ) -> Result<GatewayTransactionEnvelope>;

    async fn get_payment_channels(&self) -> Result<Vec<GatewayPaymentChannel>>;

    fn verify_callback_signature(&self, payload: &[u8], signature: &str) -> Result<()>;
}
