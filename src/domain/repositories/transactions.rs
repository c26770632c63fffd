use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::transactions::{
    InsertTransactionEntity, TransactionEntity, TransactionGatewayUpdateEntity,
};
use crate::domain::value_objects::enums::transaction_statuses::TransactionStatus;

#[async_trait]
#[automock]
pub trait TransactionRepository {
    async fn create(
        &self,
        insert_transaction_entity: InsertTransactionEntity,
    ) -> Result<TransactionEntity>;

    async fn find_by_id(&self, transaction_id: i64) -> Result<Option<TransactionEntity>>;

    /// Looks up by gateway merchant reference, falling back to the invoice
    /// number (they coincide unless the gateway rewrote the reference).
    async fn find_by_merchant_ref_or_invoice(
        &self,
        reference: String,
    ) -> Result<Option<TransactionEntity>>;

    async fn apply_gateway_details(
        &self,
        transaction_id: i64,
        update: TransactionGatewayUpdateEntity,
    ) -> Result<TransactionEntity>;

    /// Guarded status transition: updates only while the stored status is
    /// still `pending`, setting `paid_at` when the target is `paid`.
    /// Returns `None` when another writer already settled the row.
    async fn transition_from_pending(
        &self,
        transaction_id: i64,
        status: TransactionStatus,
    ) -> Result<Option<TransactionEntity>>;

    async fn delete(&self, transaction_id: i64) -> Result<()>;
}
