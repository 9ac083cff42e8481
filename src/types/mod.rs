//! User-facing types

pub mod vault;

pub use vault::{
    pending_unlocks, DepositIntent, DepositReceipt, ProcessWithdrawalsReceipt, VaultOverview,
    VaultPosition, WithdrawReceipt, WithdrawalState,
};
