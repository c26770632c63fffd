use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::domain::{
    entities::transactions::TransactionEntity,
    repositories::notifications::NotificationDispatcher,
    value_objects::enums::transaction_statuses::TransactionStatus,
};

/// Posts payment-state notifications to the configured webhook endpoint.
/// Without a configured URL it only logs, which keeps local development
/// quiet without stubbing the dispatcher.
pub struct WebhookNotifier {
    webhook_url: Option<Url>,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(webhook_url: Option<Url>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(3))
            .build()
            .expect("reqwest client must build");

        Self {
            webhook_url,
            client,
        }
    }

    async fn post(&self, content: String) -> Result<()> {
        let Some(webhook_url) = self.webhook_url.as_ref() else {
            debug!(content = %content, "notifications: no webhook configured, skipping dispatch");
            return Ok(());
        };

        let response = self
            .client
            .post(webhook_url.clone())
            .json(&json!({ "content": content }))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "notification webhook returned non-success status: {}",
            response.status()
        ))
    }
}

#[async_trait]
impl NotificationDispatcher for WebhookNotifier {
    async fn payment_succeeded(&self, transaction: TransactionEntity) -> Result<()> {
        self.post(format!(
            "**Payment received**\ninvoice: `{}`\nuser: `{}`\ncourse: `{}`\ntotal: `{}`",
            transaction.invoice_number,
            transaction.user_id,
            transaction.course_id,
            transaction.total,
        ))
        .await
    }

    async fn payment_failed(
        &self,
        transaction: TransactionEntity,
        status: TransactionStatus,
    ) -> Result<()> {
        let reason = match status {
            TransactionStatus::Expired => "payment window expired",
            _ => "payment failed",
        };

        self.post(format!(
            "**Payment not completed** ({reason})\ninvoice: `{}`\nuser: `{}`\ncourse: `{}`",
            transaction.invoice_number, transaction.user_id, transaction.course_id,
        ))
        .await
    }
}
