use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Paid,
    Expired,
    Failed,
    Refund,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Paid => "paid",
            TransactionStatus::Expired => "expired",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Refund => "refund",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(TransactionStatus::Pending),
            "paid" => Some(TransactionStatus::Paid),
            "expired" => Some(TransactionStatus::Expired),
            "failed" => Some(TransactionStatus::Failed),
            "refund" => Some(TransactionStatus::Refund),
            _ => None,
        }
    }

    /// Maps the status string reported by the payment gateway callback.
    pub fn from_gateway_status(value: &str) -> Option<Self> {
        match value.to_uppercase().as_str() {
            "PAID" => Some(TransactionStatus::Paid),
            "EXPIRED" => Some(TransactionStatus::Expired),
            "FAILED" => Some(TransactionStatus::Failed),
            "REFUND" => Some(TransactionStatus::Refund),
            _ => None,
        }
    }

    /// The reconciler performs no further automated transition out of these.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
