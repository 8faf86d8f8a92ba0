use std::sync::Arc;

use solana_sdk::signature::Keypair;
use tracing::info;

use crate::api::handlers::AppState;
use crate::bridge::HttpBridgeClient;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::ledger::{CreditLedger, TransactionStore};
use crate::settlement::{SolanaConfig, SolanaSettlement};
use crate::swap::{StatusReconciler, SwapOrchestrator};

pub fn initialize_app_state(config: Config) -> AppResult<AppState> {
    info!("Initializing application components ...");

    let ledger = Arc::new(CreditLedger::new());
    let transactions = Arc::new(TransactionStore::new());

    if config.custodial_secret_key.is_empty() {
        return Err(AppError::Config(
            "CUSTODIAL_SECRET_KEY not set - settlement disabled".to_string(),
        ));
    }
    let custodial_keypair = Keypair::from_base58_string(&config.custodial_secret_key);

    let solana_config = SolanaConfig {
        rpc_url: config.solana_rpc_url.clone(),
        confirmation_timeout: config.settlement_timeout,
        ..SolanaConfig::default()
    };
    let settlement = Arc::new(SolanaSettlement::new(solana_config, custodial_keypair));
    info!(
        "✅ Solana settlement client initialized for network: {}",
        config.solana_network
    );

    let bridge = Arc::new(
        HttpBridgeClient::new(
            &config.bridge_api_url,
            &config.bridge_api_key,
            config.bridge_timeout,
        )
        .map_err(AppError::Bridge)?,
    );
    info!("✅ Bridge client initialized: {}", config.bridge_api_url);

    let orchestrator = Arc::new(SwapOrchestrator::new(
        ledger.clone(),
        transactions.clone(),
        settlement,
        bridge.clone(),
        config.fees,
        config.limits,
        config.credit_to_sol_rate,
    ));
    let reconciler = Arc::new(StatusReconciler::new(transactions.clone(), bridge));

    Ok(AppState {
        config: Arc::new(config),
        ledger,
        transactions,
        orchestrator,
        reconciler,
    })
}
