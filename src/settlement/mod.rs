pub mod solana;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::SettlementError;

pub use solana::{SolanaConfig, SolanaSettlement};

/// On-chain settlement leg (step 1 of the pipeline).
///
/// Once `transfer` returns Ok the transfer is on-chain and cannot be undone
/// by this system; the orchestrator must never call it twice for the same
/// transaction.
#[async_trait]
pub trait SettlementClient: Send + Sync {
    /// Transfer `amount_sol` from the custodial wallet to `recipient`.
    /// Returns the on-chain transaction signature.
    async fn transfer(&self, recipient: &str, amount_sol: Decimal)
        -> Result<String, SettlementError>;
}
