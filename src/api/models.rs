use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fees::FeeBreakdown;
use crate::ledger::models::{SwapTransaction, TransactionStatus};

// ========== REQUEST MODELS ==========

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditsQuery {
    pub wallet_address: String,
}

/// Admin-gated credit adjustment
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCreditsRequest {
    pub wallet_address: String,
    /// Signed delta: positive grants, negative revokes
    pub amount: i64,
    pub admin_wallet: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub wallet_address: String,
    pub credits_amount: u64,
    pub btc_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub transaction_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub admin_wallet: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminQuery {
    pub admin_wallet: String,
}

// ========== RESPONSE MODELS ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalanceResponse {
    pub wallet_address: String,
    pub credits: u64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapAmounts {
    pub credits_amount: u64,
    pub sol_amount: Decimal,
    pub total_credits_charged: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    pub transaction_id: Uuid,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sol_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge_transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u64>,
    pub fees: FeeBreakdown,
    pub amounts: SwapAmounts,
    pub message: String,
}

impl SwapResponse {
    pub fn from_transaction(tx: &SwapTransaction) -> Self {
        Self {
            transaction_id: tx.id,
            status: tx.status,
            sol_signature: tx.sol_signature.clone(),
            bridge_transaction_id: tx.bridge_transaction_id.clone(),
            estimated_time: tx.estimated_seconds,
            fees: FeeBreakdown {
                credits_amount: tx.credits_amount,
                swap_fee: tx.swap_fee,
                network_fee: tx.network_fee,
                total_fees: tx.total_fees,
                total_credits_required: tx.total_credits_charged,
                sol_amount: tx.sol_amount,
                fee_percentage: if tx.credits_amount > 0 {
                    Decimal::from(tx.total_fees) / Decimal::from(tx.credits_amount)
                        * Decimal::from(100)
                } else {
                    Decimal::ZERO
                },
            },
            amounts: SwapAmounts {
                credits_amount: tx.credits_amount,
                sol_amount: tx.sol_amount,
                total_credits_charged: tx.total_credits_charged,
            },
            message: "Swap initiated successfully".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<SwapTransaction>,
}

/// Current swap configuration, admin view
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfigResponse {
    pub credit_to_sol_rate: Decimal,
    pub min_withdrawal_amount: u64,
    pub max_withdrawal_amount: u64,
    pub swap_fee_percentage: Decimal,
    pub min_fee_credits: u64,
    pub network_fee_credits: u64,
}
