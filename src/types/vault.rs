//! Vault types for user-facing API

use crate::constants::{split_deposit, unscale_from_decimals};
use alloy::primitives::{Address, TxHash, U256};

/// A deposit being orchestrated; lives for one `deposit` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositIntent {
    /// Amount in the asset's smallest unit
    pub amount: U256,
    /// Receiver of the minted shares
    pub receiver: Address,
    /// Account paying the asset
    pub depositor: Address,
}

impl DepositIntent {
    /// Portions of this deposit that stay liquid and that get staked and locked
    pub fn split(&self) -> (U256, U256) {
        split_deposit(self.amount)
    }
}

/// Result of a confirmed deposit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Receiver's share balance after the deposit, `None` if it could not be read
    pub shares: Option<U256>,
    /// Depositor's remaining asset balance, `None` if it could not be read
    pub asset_balance: Option<U256>,
}

/// Result of a confirmed withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Shares burned according to the pre-withdrawal preview
    pub shares_burned: U256,
}

/// Result of finalizing a staking-protocol withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessWithdrawalsReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Caller's share balance after the newly minted shares, `None` if it could not be read
    pub shares: Option<U256>,
}

/// Withdrawal-related state of one account, as reported by the vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalState {
    /// Liquid allocation not yet withdrawn plus matured locked funds
    pub withdrawable: U256,
    /// Locked (staked) amount, matured or not
    pub locked: U256,
    /// Share balance
    pub shares: U256,
    /// ERC-4626 `maxWithdraw`
    pub max_withdraw: U256,
    /// Unlock timestamp of each deposit (unix seconds)
    pub unlock_times: Vec<u64>,
}

impl WithdrawalState {
    /// Unlock timestamps still in the future, soonest first
    pub fn pending_unlocks(&self, now: u64) -> Vec<u64> {
        pending_unlocks(&self.unlock_times, now)
    }

    /// Number of deposits whose locked portion has matured
    pub fn matured_deposits(&self, now: u64) -> usize {
        self.unlock_times.iter().filter(|t| **t <= now).count()
    }
}

/// Filter and sort unlock timestamps that have not passed yet
pub fn pending_unlocks(unlock_times: &[u64], now: u64) -> Vec<u64> {
    let mut pending: Vec<u64> = unlock_times.iter().copied().filter(|t| *t > now).collect();
    pending.sort_unstable();
    pending
}

/// Convert on-chain timestamps, saturating values that do not fit a u64
pub fn timestamps_from_u256(values: &[U256]) -> Vec<u64> {
    values
        .iter()
        .map(|v| u64::try_from(*v).unwrap_or(u64::MAX))
        .collect()
}

/// Vault-wide snapshot for dashboards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultOverview {
    pub vault: Address,
    pub owner: Address,
    pub total_assets: U256,
    pub total_shares: U256,
    pub paused: bool,
    pub shutdown: bool,
    /// Number of facets routed by the diamond
    pub facet_count: usize,
}

/// User's vault position
#[derive(Debug, Clone)]
pub struct VaultPosition {
    /// Share balance
    pub shares: U256,
    /// Withdrawable now
    pub withdrawable: U256,
    /// Locked amount
    pub locked: U256,
    /// Asset decimals, for display
    pub decimals: u8,
}

impl VaultPosition {
    /// Withdrawable amount in token units (display only)
    pub fn withdrawable_f64(&self) -> f64 {
        unscale_from_decimals(self.withdrawable, self.decimals)
    }

    /// Locked amount in token units (display only)
    pub fn locked_f64(&self) -> f64 {
        unscale_from_decimals(self.locked, self.decimals)
    }
}
