use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;

use super::models::CreditBalance;

/// In-memory credit store. Keys are lowercased wallet addresses.
///
/// `adjust` is atomic per owner: the whole read-modify-write happens under
/// one short write-lock critical section with no awaits inside. Overdraft
/// checking is deliberately NOT here - sufficiency spans fee calculation,
/// which is the orchestrator's concern.
pub struct CreditLedger {
    balances: RwLock<HashMap<String, CreditBalance>>,
}

impl CreditLedger {
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
        }
    }

    /// Current balance for a wallet; a zero-balance record if absent.
    pub fn balance(&self, wallet_address: &str) -> CreditBalance {
        let key = wallet_address.to_lowercase();
        self.balances
            .read()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| CreditBalance::empty(&key))
    }

    /// Apply a signed delta (negative = debit, positive = credit/refund) and
    /// stamp `last_updated`. Debits saturate at zero: a balance can never be
    /// observed negative.
    pub fn adjust(&self, wallet_address: &str, delta: i64) -> CreditBalance {
        let key = wallet_address.to_lowercase();
        let mut balances = self.balances.write();
        let entry = balances
            .entry(key.clone())
            .or_insert_with(|| CreditBalance::empty(&key));

        entry.credits = if delta >= 0 {
            entry.credits.saturating_add(delta as u64)
        } else {
            entry.credits.saturating_sub(delta.unsigned_abs())
        };
        entry.last_updated = Utc::now();
        entry.clone()
    }
}

impl Default for CreditLedger {
    fn default() -> Self {
        Self::new()
    }
}
