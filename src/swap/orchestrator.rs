use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, info};

use crate::bridge::{BridgeClient, BridgeRequest};
use crate::config::{FeeSchedule, WithdrawalLimits};
use crate::error::{AppError, AppResult, SettlementError};
use crate::fees::calculate_swap_fees;
use crate::ledger::models::{SwapTransaction, TransactionStatus, TransactionUpdate};
use crate::ledger::{CreditLedger, TransactionStore};
use crate::settlement::SettlementClient;
use crate::validation::{
    validate_btc_address, validate_credits_amount, validate_solana_address,
    validate_transaction_value,
};

/// Drives the two-step settlement pipeline:
/// validate -> reserve credits -> on-chain SOL transfer -> bridge to BTC.
///
/// Compensation rule: the ONLY automatic refund path is a definite
/// settlement failure. Once the on-chain transfer may have happened, every
/// downstream failure is terminal-but-unrefunded and the settlement
/// signature is preserved for operator reconciliation. Refunding past that
/// point would double-pay.
pub struct SwapOrchestrator {
    ledger: Arc<CreditLedger>,
    transactions: Arc<TransactionStore>,
    settlement: Arc<dyn SettlementClient>,
    bridge: Arc<dyn BridgeClient>,
    fees: FeeSchedule,
    limits: WithdrawalLimits,
    credit_to_sol_rate: Decimal,
    // Serializes the balance-check-then-debit window per owner so two
    // concurrent submits cannot both pass the sufficiency check against the
    // same stale balance. Never held across a network call.
    owner_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SwapOrchestrator {
    pub fn new(
        ledger: Arc<CreditLedger>,
        transactions: Arc<TransactionStore>,
        settlement: Arc<dyn SettlementClient>,
        bridge: Arc<dyn BridgeClient>,
        fees: FeeSchedule,
        limits: WithdrawalLimits,
        credit_to_sol_rate: Decimal,
    ) -> Self {
        Self {
            ledger,
            transactions,
            settlement,
            bridge,
            fees,
            limits,
            credit_to_sol_rate,
            owner_locks: Mutex::new(HashMap::new()),
        }
    }

    fn owner_lock(&self, wallet_address: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.owner_locks.lock();
        // Entries nobody else holds belong to finished submits; drop them so
        // the map stays bounded by in-flight owners
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(wallet_address.to_lowercase())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Submit a swap: debit credits, transfer SOL on-chain, hand off to the
    /// bridge. Returns the transaction record in `bridging` state on
    /// success.
    pub async fn submit(
        &self,
        wallet_address: &str,
        credits_amount: u64,
        btc_address: &str,
    ) -> AppResult<SwapTransaction> {
        // Step 1: pure validation, no state touched on failure
        validate_solana_address(wallet_address)?;
        validate_credits_amount(credits_amount, &self.limits)?;
        validate_btc_address(btc_address)?;

        let fees = calculate_swap_fees(credits_amount, &self.fees, self.credit_to_sol_rate)?;

        // Derived SOL amount must still match the configured rate
        validate_transaction_value(credits_amount, fees.sol_amount, self.credit_to_sol_rate)?;

        let total_required = fees.total_credits_required;

        // Step 2: reserve funds. Sufficiency check, record creation and
        // debit happen under the per-owner lock so concurrent submits for
        // the same owner cannot both pass against a stale balance
        let tx = {
            let lock = self.owner_lock(wallet_address);
            let _guard = lock.lock().await;

            let balance = self.ledger.balance(wallet_address);
            if balance.credits < total_required {
                return Err(AppError::InsufficientCredits {
                    available: balance.credits,
                    required: total_required,
                    fees,
                });
            }

            let tx = SwapTransaction::new(wallet_address, btc_address, &fees);
            self.transactions.create(tx.clone())?;
            self.ledger.adjust(wallet_address, -(total_required as i64));
            tx
        };

        info!(
            "🔄 Swap {} started: {} credits -> {} SOL -> {}",
            tx.id, credits_amount, tx.sol_amount, btc_address
        );

        // Step 3: on-chain leg. The at-most-once boundary: a definite
        // failure refunds, an ambiguous outcome does not.
        let sol_signature = match self.settlement.transfer(wallet_address, tx.sol_amount).await {
            Ok(signature) => signature,
            Err(err @ SettlementError::TransferFailed(_)) => {
                error!("❌ Swap {} settlement failed, refunding: {}", tx.id, err);
                self.ledger.adjust(wallet_address, total_required as i64);
                self.transactions.update(
                    tx.id,
                    TransactionUpdate {
                        status: Some(TransactionStatus::Failed),
                        error_message: Some(err.to_string()),
                        ..Default::default()
                    },
                )?;
                return Err(err.into());
            }
            Err(err @ SettlementError::OutcomeUnknown(_)) => {
                // The transfer may have landed on-chain: keep the debit and
                // flag the record for manual review
                error!(
                    "❌ Swap {} settlement outcome unknown, NOT refunding: {}",
                    tx.id, err
                );
                self.transactions.update(
                    tx.id,
                    TransactionUpdate {
                        status: Some(TransactionStatus::Failed),
                        error_message: Some(err.to_string()),
                        ..Default::default()
                    },
                )?;
                return Err(err.into());
            }
        };

        // Settlement is committed and irreversible from here on
        self.transactions.update(
            tx.id,
            TransactionUpdate {
                status: Some(TransactionStatus::SettledOnChain),
                sol_signature: Some(sol_signature.clone()),
                ..Default::default()
            },
        )?;

        // Step 4: bridge leg; failure past settlement never refunds
        let bridge_request = BridgeRequest::sol_to_btc(tx.sol_amount, btc_address, &sol_signature);
        let handle = match self.bridge.initiate(&bridge_request).await {
            Ok(handle) => handle,
            Err(err) => {
                error!(
                    "❌ Swap {} bridge initiation failed after settlement {} - requires operator reconciliation: {}",
                    tx.id, sol_signature, err
                );
                self.transactions.update(
                    tx.id,
                    TransactionUpdate {
                        status: Some(TransactionStatus::Failed),
                        error_message: Some(err.to_string()),
                        ..Default::default()
                    },
                )?;
                return Err(err.into());
            }
        };

        // Hand-off accepted
        let tx = self.transactions.update(
            tx.id,
            TransactionUpdate {
                status: Some(TransactionStatus::Bridging),
                bridge_transaction_id: Some(handle.bridge_transaction_id),
                estimated_seconds: Some(handle.estimated_seconds),
                ..Default::default()
            },
        )?;

        info!(
            "✅ Swap {} bridging: sol_signature={} bridge={:?}",
            tx.id, sol_signature, tx.bridge_transaction_id
        );
        Ok(tx)
    }
}
