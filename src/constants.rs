//! Constants and amount helpers for the vault SDK

use alloy::primitives::U256;
use eyre::{ensure, eyre, Result};

/// Gas limit override for `deposit`; the vault facet routes part of every
/// deposit into the staking protocol, so estimation is unreliable
pub const DEPOSIT_GAS_LIMIT: u64 = 1_000_000;

/// Gas limit override for `withdraw`
pub const WITHDRAW_GAS_LIMIT: u64 = 1_500_000;

/// Gas budget for `processCompletedWithdrawals`
pub const PROCESS_WITHDRAWALS_GAS_LIMIT: u64 = 2_000_000;

/// Confirmations awaited for deposits, approvals, admin and deployment transactions
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// Confirmations awaited for withdrawals and staking withdrawal processing
pub const WITHDRAW_CONFIRMATIONS: u64 = 3;

/// A deposit above `totalAssets / LARGE_DEPOSIT_DIVISOR` goes through the timelock queue
pub const LARGE_DEPOSIT_DIVISOR: u64 = 10;

/// Timelock between queueing a large deposit and executing it (1 hour)
pub const LARGE_DEPOSIT_TIMELOCK_SECS: u64 = 3600;

/// Share of a deposit kept liquid, in percent
pub const LIQUID_PERCENT: u64 = 60;

/// Share of a deposit staked and locked, in percent
pub const LOCKED_PERCENT: u64 = 100 - LIQUID_PERCENT;

/// ABI functions never registered as diamond selectors
pub const RESERVED_FUNCTIONS: &[&str] = &["init", "supportsInterface"];

/// Whether a deposit must be queued before it can be executed
pub fn is_large_deposit(amount: U256, total_assets: U256) -> bool {
    amount > total_assets / U256::from(LARGE_DEPOSIT_DIVISOR)
}

/// Split a deposit into its (liquid, locked) portions
pub fn split_deposit(amount: U256) -> (U256, U256) {
    let liquid = amount * U256::from(LIQUID_PERCENT) / U256::from(100u64);
    (liquid, amount - liquid)
}

/// Scale a decimal string (e.g. `"1.5"`) to the token's smallest unit
pub fn scale_to_decimals(value: &str, decimals: u8) -> Result<U256> {
    let value = value.trim();
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    ensure!(
        !whole.is_empty() || !fraction.is_empty(),
        "Empty amount"
    );
    ensure!(
        fraction.len() <= decimals as usize,
        "Amount {} has more than {} decimals",
        value,
        decimals
    );

    let digits = format!("{whole}{fraction:0<width$}", width = decimals as usize);
    U256::from_str_radix(&digits, 10).map_err(|e| eyre!("Invalid amount {}: {}", value, e))
}

/// Unscale a U256 value to floating point with specified decimals (display only)
pub fn unscale_from_decimals(value: U256, decimals: u8) -> f64 {
    let divisor = 10f64.powi(decimals as i32);
    let value_u128: u128 = value.try_into().unwrap_or(u128::MAX);
    value_u128 as f64 / divisor
}
