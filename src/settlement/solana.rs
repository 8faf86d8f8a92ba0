use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use solana_client::{rpc_client::RpcClient, rpc_config::CommitmentConfig};
use solana_sdk::{
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use tracing::{error, info};

use super::SettlementClient;
use crate::error::SettlementError;

const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

#[derive(Debug, Clone)]
pub struct SolanaConfig {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    pub confirmation_timeout: Duration,
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            commitment: CommitmentConfig::confirmed(),
            confirmation_timeout: Duration::from_secs(60),
        }
    }
}

/// Settlement via a native SOL system transfer from the custodial wallet.
///
/// The blocking RPC flow runs on the blocking pool under an overall timeout.
/// A timeout after the transaction was handed to the network is ambiguous -
/// the transfer may have landed - so it surfaces as `OutcomeUnknown`, never
/// as a refundable failure.
pub struct SolanaSettlement {
    config: SolanaConfig,
    client: Arc<RpcClient>,
    custodial_keypair: Arc<Keypair>,
}

impl SolanaSettlement {
    pub fn new(config: SolanaConfig, custodial_keypair: Keypair) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(
            config.rpc_url.clone(),
            config.commitment,
        ));
        Self {
            config,
            client,
            custodial_keypair: Arc::new(custodial_keypair),
        }
    }
}

#[async_trait]
impl SettlementClient for SolanaSettlement {
    async fn transfer(
        &self,
        recipient: &str,
        amount_sol: Decimal,
    ) -> Result<String, SettlementError> {
        let recipient: Pubkey = recipient
            .parse()
            .map_err(|e| SettlementError::TransferFailed(format!("invalid recipient: {:?}", e)))?;

        let lamports = (amount_sol * Decimal::from(LAMPORTS_PER_SOL))
            .floor()
            .to_u64()
            .ok_or_else(|| {
                SettlementError::TransferFailed(format!("invalid SOL amount: {}", amount_sol))
            })?;
        if lamports == 0 {
            return Err(SettlementError::TransferFailed(
                "transfer amount must be greater than zero".to_string(),
            ));
        }

        info!(
            "🔄 Settlement transfer initiated: {} lamports -> {}",
            lamports, recipient
        );

        let client = self.client.clone();
        let keypair = self.custodial_keypair.clone();
        let timeout = self.config.confirmation_timeout;

        let result = tokio::time::timeout(
            timeout,
            tokio::task::spawn_blocking(move || transfer_blocking(&client, &keypair, recipient, lamports)),
        )
        .await;

        match result {
            Err(_) => {
                error!(
                    "⏱️  Settlement confirmation timed out after {:?} - manual review required",
                    timeout
                );
                Err(SettlementError::OutcomeUnknown(format!(
                    "confirmation timed out after {:?}",
                    timeout
                )))
            }
            Ok(Err(join_err)) => Err(SettlementError::OutcomeUnknown(format!(
                "settlement task aborted: {}",
                join_err
            ))),
            Ok(Ok(inner)) => inner,
        }
    }
}

fn transfer_blocking(
    client: &RpcClient,
    custodial_keypair: &Keypair,
    recipient: Pubkey,
    lamports: u64,
) -> Result<String, SettlementError> {
    let custodial_pubkey = custodial_keypair.pubkey();

    let recent_blockhash = client
        .get_latest_blockhash()
        .map_err(|e| SettlementError::TransferFailed(format!("failed to get blockhash: {}", e)))?;

    let transfer_instruction =
        solana_system_interface::instruction::transfer(&custodial_pubkey, &recipient, lamports);

    let message = Message::new(&[transfer_instruction], Some(&custodial_pubkey));
    let mut transaction = Transaction::new_unsigned(message);
    transaction.sign(&[custodial_keypair], recent_blockhash);

    // Simulate before sending; a simulation failure happens strictly before
    // anything irreversible, so it is a refundable TransferFailed
    match client.simulate_transaction(&transaction) {
        Ok(sim_result) => {
            if let Some(err) = sim_result.value.err {
                return Err(SettlementError::TransferFailed(format!(
                    "transaction simulation failed: {:?}",
                    err
                )));
            }
        }
        Err(e) => {
            return Err(SettlementError::TransferFailed(format!(
                "simulation error: {}",
                e
            )));
        }
    }

    // Past this point the transaction may reach the chain; any error is
    // ambiguous and must not trigger a refund
    let signature = client
        .send_and_confirm_transaction(&transaction)
        .map_err(|e| {
            SettlementError::OutcomeUnknown(format!("send/confirm did not complete: {}", e))
        })?;

    info!("✅ Settlement transfer confirmed: {}", signature);
    Ok(signature.to_string())
}
