use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::warn;

/// Withdrawal bounds, in credits.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct WithdrawalLimits {
    pub min_withdrawal: u64,
    pub max_withdrawal: u64,
}

/// Fee schedule applied to every swap.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct FeeSchedule {
    /// Percentage-based swap fee (e.g. 15 = 15%)
    pub swap_fee_percentage: Decimal,
    /// Floor applied when the percentage fee comes out too low
    pub min_fee_credits: u64,
    /// Fixed network/gas fee in credits
    pub network_fee_credits: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub bind_address: String,
    pub solana_network: String,
    pub solana_rpc_url: String,
    pub admin_wallet_address: String,
    pub custodial_secret_key: String,
    pub bridge_api_url: String,
    pub bridge_api_key: String,
    pub credit_to_sol_rate: Decimal,
    pub limits: WithdrawalLimits,
    pub fees: FeeSchedule,
    pub settlement_timeout: Duration,
    pub bridge_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Ok(Self {
            bind_address: env_or("BIND_ADDRESS", "0.0.0.0:8080"),
            solana_network: env_or("SOLANA_NETWORK", "devnet"),
            solana_rpc_url: env_or("SOLANA_RPC_URL", "https://api.devnet.solana.com"),
            admin_wallet_address: env_or("ADMIN_WALLET_ADDRESS", ""),
            custodial_secret_key: env_or("CUSTODIAL_SECRET_KEY", ""),
            bridge_api_url: env_or("BRIDGE_API_URL", ""),
            bridge_api_key: env_or("BRIDGE_API_KEY", ""),
            credit_to_sol_rate: env_parse("CREDIT_TO_SOL_RATE", dec!(0.001)),
            limits: WithdrawalLimits {
                min_withdrawal: env_parse("MIN_WITHDRAWAL_AMOUNT", 10),
                max_withdrawal: env_parse("MAX_WITHDRAWAL_AMOUNT", 10_000),
            },
            fees: FeeSchedule {
                swap_fee_percentage: env_parse("SWAP_FEE_PERCENTAGE", dec!(15)),
                min_fee_credits: env_parse("MIN_FEE_CREDITS", 5),
                network_fee_credits: env_parse("NETWORK_FEE_CREDITS", 2),
            },
            settlement_timeout: Duration::from_secs(env_parse("SETTLEMENT_TIMEOUT_SECS", 60)),
            bridge_timeout: Duration::from_secs(env_parse("BRIDGE_TIMEOUT_SECS", 30)),
        })
    }

    /// Placeholder trust boundary: exact-match wallet comparison, case-insensitive.
    /// An unset admin wallet never matches anything.
    pub fn is_admin(&self, wallet_address: &str) -> bool {
        !self.admin_wallet_address.is_empty()
            && wallet_address.eq_ignore_ascii_case(&self.admin_wallet_address)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a numeric env var, falling back to the default on a malformed value.
/// A typo in a fee variable must never silently waive fee collection.
fn env_parse<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!("⚠️  Malformed {}={:?}, using default {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
