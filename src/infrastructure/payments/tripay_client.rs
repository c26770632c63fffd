use anyhow::Result;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use tracing::error;

use crate::config::config_model::Tripay;
use crate::domain::{
    repositories::payment_gateway::PaymentGateway,
    value_objects::payment_gateway::{
        CreateGatewayTransaction, GatewayPaymentChannel, GatewayTransactionEnvelope,
    },
};

type HmacSha256 = Hmac<Sha256>;

/// Minimal Tripay client built on reqwest.
pub struct TripayClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    private_key: String,
    merchant_code: String,
}

impl TripayClient {
    pub fn new(config: &Tripay) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("reqwest client must build");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            private_key: config.private_key.clone(),
            merchant_code: config.merchant_code.clone(),
        }
    }

    /// Transaction signature: HMAC-SHA256 over merchant_code + merchant_ref
    /// + amount, keyed with the merchant private key.
    fn transaction_signature(&self, merchant_ref: &str, amount: i64) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.private_key.as_bytes())?;
        mac.update(format!("{}{}{}", self.merchant_code, merchant_ref, amount).as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    pub async fn create_transaction(
        &self,
        request: CreateGatewayTransaction,
    ) -> Result<GatewayTransactionEnvelope> {
        // https://tripay.co.id/developer?tab=transaction-create
        let signature = self.transaction_signature(&request.merchant_ref, request.amount)?;
        let body = json!({
            "method": request.method,
            "merchant_ref": request.merchant_ref,
            "amount": request.amount,
            "customer_name": request.customer_name,
            "customer_email": request.customer_email,
            "customer_phone": request.customer_phone,
            "order_items": request.order_items,
            "return_url": request.return_url,
            "signature": signature,
        });

        let resp = self
            .http
            .post(format!("{}/transaction/create", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        // Rejections come back as non-2xx with the same envelope shape, so
        // parse the body before deciding anything on the status code.
        let status = resp.status();
        let text = resp.text().await?;
        match serde_json::from_str::<GatewayTransactionEnvelope>(&text) {
            Ok(envelope) => Ok(envelope),
            Err(parse_error) => {
                error!(
                    status = %status,
                    response_body = %text,
                    parse_error = %parse_error,
                    "tripay transaction create returned an unexpected response"
                );
                anyhow::bail!("Tripay transaction create failed with status {}", status);
            }
        }
    }

    pub async fn get_payment_channels(&self) -> Result<Vec<GatewayPaymentChannel>> {
        // https://tripay.co.id/developer?tab=merchant-payment-channel
        #[derive(Deserialize)]
        struct ChannelsEnvelope {
            success: bool,
            message: Option<String>,
            data: Option<Vec<GatewayPaymentChannel>>,
        }

        let resp = self
            .http
            .get(format!("{}/merchant/payment-channel", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let envelope: ChannelsEnvelope = resp.json().await?;
        if !envelope.success {
            anyhow::bail!(
                "Tripay payment channel listing failed: {}",
                envelope.message.unwrap_or_else(|| "no message".to_string())
            );
        }

        Ok(envelope.data.unwrap_or_default())
    }

    /// Callback signature: HMAC-SHA256 over the raw request body, keyed with
    /// the merchant private key, hex-encoded in the signature header.
    pub fn verify_callback_signature(&self, payload: &[u8], signature: &str) -> Result<()> {
        let mut mac = HmacSha256::new_from_slice(self.private_key.as_bytes())?;
        mac.update(payload);
        let expected = mac.finalize().into_bytes();
        let provided = hex::decode(signature)?;

        if expected[..] != provided[..] {
            anyhow::bail!("invalid callback signature");
        }

        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for TripayClient {
    async fn create_transaction(
        &self,
        request: CreateGatewayTransaction,
    ) -> Result<GatewayTransactionEnvelope> {
        self.create_transaction(request).await
    }

    async fn get_payment_channels(&self) -> Result<Vec<GatewayPaymentChannel>> {
        self.get_payment_channels().await
    }

    fn verify_callback_signature(&self, payload: &[u8], signature: &str) -> Result<()> {
        self.verify_callback_signature(payload, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_client() -> TripayClient {
        TripayClient::new(&Tripay {
            base_url: "https://tripay.co.id/api-sandbox".to_string(),
            api_key: "api-key".to_string(),
            private_key: "private-key".to_string(),
            merchant_code: "T0001".to_string(),
            return_url: "https://courses.example.com/payment/finish".to_string(),
        })
    }

    fn sign(payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(b"private-key").unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn callback_signature_roundtrip_verifies() {
        let client = sample_client();
        let payload = br#"{"merchant_ref":"INV/20250101/ABCDEF","status":"PAID"}"#;

        client
            .verify_callback_signature(payload, &sign(payload))
            .unwrap();
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let client = sample_client();
        let payload = br#"{"merchant_ref":"INV/20250101/ABCDEF","status":"PAID"}"#;
        let tampered = br#"{"merchant_ref":"INV/20250101/ABCDEF","status":"FAILED"}"#;

        assert!(
            client
                .verify_callback_signature(tampered, &sign(payload))
                .is_err()
        );
    }

    #[test]
    fn non_hex_signature_fails_verification() {
        let client = sample_client();

        assert!(
            client
                .verify_callback_signature(b"{}", "not-hex!")
                .is_err()
        );
    }
}
