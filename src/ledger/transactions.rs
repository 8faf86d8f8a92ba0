use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::models::{SwapTransaction, TransactionUpdate};
use crate::error::{AppError, AppResult};

/// In-memory store of every swap attempt. Enforces the status state machine
/// on update; each update is applied as a single atomic merge so readers
/// never observe a partially-written record.
pub struct TransactionStore {
    transactions: RwLock<HashMap<Uuid, SwapTransaction>>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self {
            transactions: RwLock::new(HashMap::new()),
        }
    }

    pub fn create(&self, tx: SwapTransaction) -> AppResult<()> {
        let mut transactions = self.transactions.write();
        if transactions.contains_key(&tx.id) {
            // Ids are uuid v4; a collision is a programming error
            return Err(AppError::DuplicateTransaction(tx.id));
        }
        transactions.insert(tx.id, tx);
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> AppResult<SwapTransaction> {
        self.transactions
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("transaction {}", id)))
    }

    /// All transactions for one wallet, oldest first (creation order is the
    /// deterministic order exposed to callers).
    pub fn list_by_wallet(&self, wallet_address: &str) -> Vec<SwapTransaction> {
        let key = wallet_address.to_lowercase();
        let mut txs: Vec<SwapTransaction> = self
            .transactions
            .read()
            .values()
            .filter(|tx| tx.wallet_address == key)
            .cloned()
            .collect();
        txs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        txs
    }

    pub fn list_all(&self) -> Vec<SwapTransaction> {
        let mut txs: Vec<SwapTransaction> = self.transactions.read().values().cloned().collect();
        txs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        txs
    }

    /// Merge `update` into the stored record and stamp `updated_at`.
    /// A status change that violates the state machine fails with
    /// `InvalidTransition` and leaves the record untouched.
    pub fn update(&self, id: Uuid, update: TransactionUpdate) -> AppResult<SwapTransaction> {
        let mut transactions = self.transactions.write();
        let tx = transactions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("transaction {}", id)))?;

        if let Some(next) = update.status {
            if !tx.status.can_transition_to(next) {
                return Err(AppError::InvalidTransition {
                    from: tx.status,
                    to: next,
                });
            }
            tx.status = next;
        }
        if let Some(sig) = update.sol_signature {
            tx.sol_signature = Some(sig);
        }
        if let Some(bridge_id) = update.bridge_transaction_id {
            tx.bridge_transaction_id = Some(bridge_id);
        }
        if let Some(btc_tx_id) = update.btc_tx_id {
            tx.btc_tx_id = Some(btc_tx_id);
        }
        if let Some(secs) = update.estimated_seconds {
            tx.estimated_seconds = Some(secs);
        }
        if let Some(msg) = update.error_message {
            tx.error_message = Some(msg);
        }
        tx.updated_at = Utc::now();

        Ok(tx.clone())
    }
}

impl Default for TransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeeSchedule;
    use crate::fees::calculate_swap_fees;
    use crate::ledger::models::TransactionStatus;
    use rust_decimal_macros::dec;

    fn sample_tx(wallet: &str) -> SwapTransaction {
        let schedule = FeeSchedule {
            swap_fee_percentage: dec!(15),
            min_fee_credits: 5,
            network_fee_credits: 2,
        };
        let fees = calculate_swap_fees(100, &schedule, dec!(0.001)).unwrap();
        SwapTransaction::new(wallet, "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", &fees)
    }

    #[test]
    fn create_and_get() {
        let store = TransactionStore::new();
        let tx = sample_tx("wallet-a");
        store.create(tx.clone()).unwrap();
        assert_eq!(store.get(tx.id).unwrap(), tx);
    }

    #[test]
    fn duplicate_id_rejected() {
        let store = TransactionStore::new();
        let tx = sample_tx("wallet-a");
        store.create(tx.clone()).unwrap();
        let err = store.create(tx).unwrap_err();
        assert!(matches!(err, AppError::DuplicateTransaction(_)));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = TransactionStore::new();
        assert!(matches!(
            store.get(Uuid::new_v4()).unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            store
                .update(Uuid::new_v4(), TransactionUpdate::default())
                .unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn update_merges_and_stamps_updated_at() {
        let store = TransactionStore::new();
        let tx = sample_tx("wallet-a");
        store.create(tx.clone()).unwrap();

        let updated = store
            .update(
                tx.id,
                TransactionUpdate {
                    status: Some(TransactionStatus::SettledOnChain),
                    sol_signature: Some("sig123".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.status, TransactionStatus::SettledOnChain);
        assert_eq!(updated.sol_signature.as_deref(), Some("sig123"));
        assert!(updated.updated_at >= tx.updated_at);
        // Immutable fields untouched
        assert_eq!(updated.credits_amount, tx.credits_amount);
        assert_eq!(updated.btc_address, tx.btc_address);
    }

    #[test]
    fn invalid_transition_leaves_record_unchanged() {
        let store = TransactionStore::new();
        let tx = sample_tx("wallet-a");
        store.create(tx.clone()).unwrap();

        let err = store
            .update(
                tx.id,
                TransactionUpdate {
                    status: Some(TransactionStatus::Completed),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
        assert_eq!(store.get(tx.id).unwrap(), tx);
    }

    #[test]
    fn terminal_states_reject_further_updates() {
        let store = TransactionStore::new();
        let tx = sample_tx("wallet-a");
        store.create(tx.clone()).unwrap();
        store
            .update(
                tx.id,
                TransactionUpdate {
                    status: Some(TransactionStatus::Failed),
                    ..Default::default()
                },
            )
            .unwrap();

        let err = store
            .update(
                tx.id,
                TransactionUpdate {
                    status: Some(TransactionStatus::Failed),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[test]
    fn list_by_wallet_is_deterministic_and_scoped() {
        let store = TransactionStore::new();
        let a1 = sample_tx("wallet-a");
        let a2 = sample_tx("Wallet-A");
        let b = sample_tx("wallet-b");
        store.create(a1.clone()).unwrap();
        store.create(a2.clone()).unwrap();
        store.create(b).unwrap();

        let listed = store.list_by_wallet("WALLET-A");
        assert_eq!(listed.len(), 2);
        let again = store.list_by_wallet("wallet-a");
        assert_eq!(listed, again);
        assert_eq!(store.list_all().len(), 3);
    }
}
