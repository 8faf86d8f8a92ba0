use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fees::FeeBreakdown;

/// Per-wallet credit balance. Keyed by lowercased wallet address; only
/// mutated through `CreditLedger::adjust`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalance {
    pub wallet_address: String,
    pub credits: u64,
    pub last_updated: DateTime<Utc>,
}

impl CreditBalance {
    pub fn empty(wallet_address: &str) -> Self {
        Self {
            wallet_address: wallet_address.to_lowercase(),
            credits: 0,
            last_updated: Utc::now(),
        }
    }
}

/// Swap lifecycle states. Strict forward progression; `failed` is reachable
/// from every non-terminal state; `completed` and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    SettledOnChain,
    Bridging,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }

    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        use TransactionStatus::*;
        match (self, next) {
            // No-op updates (reference/error attachment) keep the status
            (current, next) if *current == next => !current.is_terminal(),
            (Pending, SettledOnChain) => true,
            (SettledOnChain, Bridging) => true,
            (Bridging, Completed) => true,
            (current, Failed) => !current.is_terminal(),
            _ => false,
        }
    }
}

/// Authoritative record of one swap attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
    pub id: Uuid,
    pub wallet_address: String,
    pub credits_amount: u64,
    pub sol_amount: Decimal,
    pub btc_address: String,
    pub status: TransactionStatus,
    pub swap_fee: u64,
    pub network_fee: u64,
    pub total_fees: u64,
    pub total_credits_charged: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sol_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge_transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btc_tx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_seconds: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SwapTransaction {
    /// Fresh `pending` record with the fee breakdown attached.
    pub fn new(wallet_address: &str, btc_address: &str, fees: &FeeBreakdown) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            wallet_address: wallet_address.to_lowercase(),
            credits_amount: fees.credits_amount,
            sol_amount: fees.sol_amount,
            btc_address: btc_address.to_string(),
            status: TransactionStatus::Pending,
            swap_fee: fees.swap_fee,
            network_fee: fees.network_fee,
            total_fees: fees.total_fees,
            total_credits_charged: fees.total_credits_required,
            sol_signature: None,
            bridge_transaction_id: None,
            btc_tx_id: None,
            estimated_seconds: None,
            created_at: now,
            updated_at: now,
            error_message: None,
        }
    }
}

/// Partial update applied by `TransactionStore::update` as a single atomic
/// merge. Only the mutable fields of a transaction appear here.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub status: Option<TransactionStatus>,
    pub sol_signature: Option<String>,
    pub bridge_transaction_id: Option<String>,
    pub btc_tx_id: Option<String>,
    pub estimated_seconds: Option<u64>,
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_allowed() {
        use TransactionStatus::*;
        assert!(Pending.can_transition_to(SettledOnChain));
        assert!(SettledOnChain.can_transition_to(Bridging));
        assert!(Bridging.can_transition_to(Completed));
    }

    #[test]
    fn failed_reachable_from_any_non_terminal() {
        use TransactionStatus::*;
        assert!(Pending.can_transition_to(Failed));
        assert!(SettledOnChain.can_transition_to(Failed));
        assert!(Bridging.can_transition_to(Failed));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Failed));
    }

    #[test]
    fn no_backward_or_skipping_transitions() {
        use TransactionStatus::*;
        assert!(!Pending.can_transition_to(Bridging));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!SettledOnChain.can_transition_to(Pending));
        assert!(!Bridging.can_transition_to(SettledOnChain));
        assert!(!Completed.can_transition_to(Bridging));
        assert!(!Failed.can_transition_to(Pending));
    }

    #[test]
    fn same_status_update_allowed_unless_terminal() {
        use TransactionStatus::*;
        assert!(Bridging.can_transition_to(Bridging));
        assert!(!Completed.can_transition_to(Completed));
    }
}
