use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::info;

use super::models::*;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::ledger::{CreditLedger, TransactionStore};
use crate::swap::{StatusReconciler, SwapOrchestrator};
use crate::validation::validate_solana_address;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: Arc<CreditLedger>,
    pub transactions: Arc<TransactionStore>,
    pub orchestrator: Arc<SwapOrchestrator>,
    pub reconciler: Arc<StatusReconciler>,
}

/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /credits?walletAddress=
pub async fn get_credits(
    State(state): State<AppState>,
    Query(query): Query<CreditsQuery>,
) -> AppResult<Json<CreditBalanceResponse>> {
    validate_solana_address(&query.wallet_address)?;
    let balance = state.ledger.balance(&query.wallet_address);
    Ok(Json(CreditBalanceResponse {
        wallet_address: balance.wallet_address,
        credits: balance.credits,
        last_updated: balance.last_updated,
    }))
}

/// POST /credits - grant or revoke credits, admin only
pub async fn update_credits(
    State(state): State<AppState>,
    Json(request): Json<UpdateCreditsRequest>,
) -> AppResult<Json<CreditBalanceResponse>> {
    if !state.config.is_admin(&request.admin_wallet) {
        return Err(AppError::Unauthorized);
    }
    validate_solana_address(&request.wallet_address)?;

    let balance = state.ledger.adjust(&request.wallet_address, request.amount);
    info!(
        "💳 Admin adjusted credits for {}: {:+} -> {}",
        balance.wallet_address, request.amount, balance.credits
    );
    Ok(Json(CreditBalanceResponse {
        wallet_address: balance.wallet_address,
        credits: balance.credits,
        last_updated: balance.last_updated,
    }))
}

/// POST /swap - run the full credits -> SOL -> BTC pipeline
pub async fn submit_swap(
    State(state): State<AppState>,
    Json(request): Json<SwapRequest>,
) -> AppResult<Json<SwapResponse>> {
    let tx = state
        .orchestrator
        .submit(
            &request.wallet_address,
            request.credits_amount,
            &request.btc_address,
        )
        .await?;
    Ok(Json(SwapResponse::from_transaction(&tx)))
}

/// GET /status?transactionId= - refreshes stalled bridging records first
pub async fn get_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<crate::ledger::models::SwapTransaction>> {
    let tx = state.reconciler.refresh(query.transaction_id).await?;
    Ok(Json(tx))
}

/// GET /transactions?walletAddress=&adminWallet=
///
/// Admin sees every wallet (optionally filtered); everyone else only their
/// own wallet's history.
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionsQuery>,
) -> AppResult<Json<TransactionsResponse>> {
    let is_admin = query
        .admin_wallet
        .as_deref()
        .map(|w| state.config.is_admin(w))
        .unwrap_or(false);

    let transactions = if is_admin {
        match &query.wallet_address {
            Some(wallet) => state.transactions.list_by_wallet(wallet),
            None => state.transactions.list_all(),
        }
    } else {
        match &query.wallet_address {
            Some(wallet) => state.transactions.list_by_wallet(wallet),
            None => {
                return Err(AppError::Validation(
                    "Wallet address is required".to_string(),
                ))
            }
        }
    };

    Ok(Json(TransactionsResponse { transactions }))
}

/// GET /admin/config?adminWallet= - current rate, bounds and fee schedule
pub async fn get_admin_config(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> AppResult<Json<AdminConfigResponse>> {
    if !state.config.is_admin(&query.admin_wallet) {
        return Err(AppError::Unauthorized);
    }
    Ok(Json(AdminConfigResponse {
        credit_to_sol_rate: state.config.credit_to_sol_rate,
        min_withdrawal_amount: state.config.limits.min_withdrawal,
        max_withdrawal_amount: state.config.limits.max_withdrawal,
        swap_fee_percentage: state.config.fees.swap_fee_percentage,
        min_fee_credits: state.config.fees.min_fee_credits,
        network_fee_credits: state.config.fees.network_fee_credits,
    }))
}
