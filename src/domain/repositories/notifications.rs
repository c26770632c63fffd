use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::transactions::TransactionEntity;
use crate::domain::value_objects::enums::transaction_statuses::TransactionStatus;

/// Outbound buyer notifications triggered by payment-state changes.
/// Template rendering and delivery mechanics live behind this port.
#[async_trait]
#[automock]
pub trait NotificationDispatcher {
    async fn payment_succeeded(&self, transaction: TransactionEntity) -> Result<()>;

    async fn payment_failed(
        &self,
        transaction: TransactionEntity,
        status: TransactionStatus,
    ) -> Result<()>;
}
