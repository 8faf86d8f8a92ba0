use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::WithdrawalLimits;
use crate::error::{AppError, AppResult};

/// Tolerance for credits-to-SOL value drift between request time and
/// execution time.
const VALUE_TOLERANCE: Decimal = dec!(0.0001);

fn is_base58_char(c: char) -> bool {
    c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l')
}

/// Check withdrawal bounds for a requested credits amount.
pub fn validate_credits_amount(amount: u64, limits: &WithdrawalLimits) -> AppResult<()> {
    if amount == 0 {
        return Err(AppError::Validation(
            "Amount must be greater than 0".to_string(),
        ));
    }
    if amount < limits.min_withdrawal {
        return Err(AppError::Validation(format!(
            "Minimum withdrawal amount is {} credits",
            limits.min_withdrawal
        )));
    }
    if amount > limits.max_withdrawal {
        return Err(AppError::Validation(format!(
            "Maximum withdrawal amount is {} credits",
            limits.max_withdrawal
        )));
    }
    Ok(())
}

/// Structural Solana address check: base58 alphabet, 32-44 chars.
/// No on-curve or checksum verification.
pub fn validate_solana_address(address: &str) -> AppResult<()> {
    let ok = (32..=44).contains(&address.len()) && address.chars().all(is_base58_char);
    if !ok {
        return Err(AppError::InvalidAddress(
            "Invalid Solana wallet address".to_string(),
        ));
    }
    Ok(())
}

// Bech32 bodies legitimately contain '0' and 'l', so this is looser than
// base58: only ambiguous uppercase I and O are excluded.
fn is_btc_body_char(c: char) -> bool {
    c.is_ascii_digit() || c.is_ascii_lowercase() || (c.is_ascii_uppercase() && !matches!(c, 'I' | 'O'))
}

/// Structural Bitcoin address check covering legacy (1...), script (3...)
/// and bech32 (bc1...) shapes. Structure only, no checksum verification.
pub fn validate_btc_address(address: &str) -> AppResult<()> {
    let body = if let Some(rest) = address.strip_prefix("bc1") {
        rest
    } else if address.starts_with('1') || address.starts_with('3') {
        &address[1..]
    } else {
        return Err(AppError::InvalidAddress(
            "Invalid Bitcoin address".to_string(),
        ));
    };

    let ok = (25..=62).contains(&body.len()) && body.chars().all(is_btc_body_char);
    if !ok {
        return Err(AppError::InvalidAddress(
            "Invalid Bitcoin address".to_string(),
        ));
    }
    Ok(())
}

/// Reject when the derived SOL amount has drifted from `credits * rate`
/// beyond tolerance. Defends against rate changes between request time and
/// execution time.
pub fn validate_transaction_value(
    credits_amount: u64,
    sol_amount: Decimal,
    expected_rate: Decimal,
) -> AppResult<()> {
    let expected_sol = Decimal::from(credits_amount) * expected_rate;
    if (expected_sol - sol_amount).abs() > VALUE_TOLERANCE {
        return Err(AppError::Validation(
            "Transaction value mismatch - amounts do not match expected rate".to_string(),
        ));
    }
    Ok(())
}
