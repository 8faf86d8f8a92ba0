use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::FeeSchedule;
use crate::error::{AppError, AppResult};

/// Complete fee breakdown for a swap. Fees are additive: the full requested
/// amount converts to SOL, and fees are charged as extra credits on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    /// Original amount requested, in credits
    pub credits_amount: u64,
    /// Percentage-based swap fee in credits, floored at the configured minimum
    pub swap_fee: u64,
    /// Fixed network/gas fee in credits
    pub network_fee: u64,
    pub total_fees: u64,
    /// Total credits debited: amount + fees
    pub total_credits_required: u64,
    /// SOL the full requested amount converts to
    pub sol_amount: Decimal,
    /// Actual fee percentage applied, for display
    pub fee_percentage: Decimal,
}

/// Calculate fees for a swap of `credits_amount` credits.
///
/// `swap_fee = max(ceil(credits_amount * pct / 100), min_fee_credits)`, plus
/// a fixed network fee. A zero amount is a caller error, never divided.
pub fn calculate_swap_fees(
    credits_amount: u64,
    schedule: &FeeSchedule,
    credit_to_sol_rate: Decimal,
) -> AppResult<FeeBreakdown> {
    if credits_amount == 0 {
        return Err(AppError::Validation(
            "Amount must be greater than 0".to_string(),
        ));
    }

    let credits = Decimal::from(credits_amount);

    let pct_fee = (credits * schedule.swap_fee_percentage / Decimal::from(100)).ceil();
    let pct_fee = pct_fee
        .to_u64()
        .ok_or_else(|| AppError::Internal(format!("fee overflow for amount {}", credits_amount)))?;
    let swap_fee = pct_fee.max(schedule.min_fee_credits);

    let network_fee = schedule.network_fee_credits;
    let total_fees = swap_fee + network_fee;
    let total_credits_required = credits_amount + total_fees;

    // Full requested amount converts; fees are not carved out of it
    let sol_amount = credits * credit_to_sol_rate;

    let fee_percentage = Decimal::from(total_fees) / credits * Decimal::from(100);

    Ok(FeeBreakdown {
        credits_amount,
        swap_fee,
        network_fee,
        total_fees,
        total_credits_required,
        sol_amount,
        fee_percentage,
    })
}
