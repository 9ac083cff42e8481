//! Error types for the vault SDK
//!
//! Plumbing (RPC, IO, decoding) uses `eyre` for ergonomic error handling with context.
//! Orchestrator outcomes are typed as [`VaultError`] so callers can tell a failed
//! precondition apart from a revert or a transport failure.

pub use eyre::{eyre, Context, Report, Result};

use crate::revert::RevertReason;
use alloy::primitives::{Address, U256};

/// Outcome of a failed deposit, withdrawal or admin operation
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    // ========== Precondition failures (no transaction sent) ==========
    #[error("Vault is paused")]
    VaultPaused,

    #[error("Vault has been shut down")]
    VaultShutdown,

    #[error("Insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: U256, required: U256 },

    #[error("Deposit exceeds limit: max allowed {max_allowed}")]
    DepositLimitExceeded { max_allowed: U256 },

    #[error("Large deposit queued, retry after {retry_after_secs}s")]
    DepositQueued { retry_after_secs: u64 },

    #[error("Withdrawal exceeds available amount: max available {max_available}")]
    WithdrawalLimitExceeded { max_available: U256 },

    #[error("Insufficient shares: have {available}, need {required}")]
    InsufficientShares { available: U256, required: U256 },

    #[error("Caller {caller} is not the vault owner ({owner})")]
    NotOwner { caller: Address, owner: Address },

    #[error("Vault address not configured")]
    VaultNotConfigured,

    // ========== Revert outcomes ==========
    #[error("Funds are still locked, pending unlocks: {pending_unlocks:?}")]
    FundsLocked { pending_unlocks: Vec<u64> },

    #[error("{message}")]
    Reverted {
        reason: RevertReason,
        message: String,
    },

    // ========== Transport ==========
    #[error(transparent)]
    Transport(#[from] Report),
}

impl VaultError {
    /// Classify an error raised while simulating, sending or confirming a transaction
    ///
    /// Recognized reverts, and reverts carrying revert data, become
    /// [`VaultError::Reverted`]. Anything else (RPC down, nonce errors) is passed
    /// through untouched.
    pub fn from_submission(err: Report) -> Self {
        match RevertReason::classify(&err) {
            RevertReason::Unknown if RevertReason::revert_data(&err).is_none() => {
                Self::Transport(err)
            }
            reason => Self::Reverted {
                reason,
                message: format!("{err:#}"),
            },
        }
    }

    /// Revert reason, if this is a classified revert
    pub fn revert_reason(&self) -> Option<RevertReason> {
        match self {
            Self::Reverted { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Whether the failure was detected locally before anything was submitted
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::VaultPaused
                | Self::VaultShutdown
                | Self::InsufficientBalance { .. }
                | Self::DepositLimitExceeded { .. }
                | Self::WithdrawalLimitExceeded { .. }
                | Self::InsufficientShares { .. }
                | Self::NotOwner { .. }
                | Self::VaultNotConfigured
        )
    }

    /// Human-readable description for end users
    pub fn user_message(&self) -> String {
        match self {
            Self::VaultPaused => "The vault is currently paused. Please try again later.".into(),
            Self::VaultShutdown => {
                "The vault has been shut down and no longer accepts this operation.".into()
            }
            Self::InsufficientBalance { .. } => {
                "Insufficient token balance for this deposit.".into()
            }
            Self::DepositLimitExceeded { max_allowed } => {
                format!("Deposit exceeds the vault limit. Maximum allowed: {max_allowed}")
            }
            Self::DepositQueued { retry_after_secs } => format!(
                "Large deposit has been queued. Please retry in {} minutes.",
                retry_after_secs / 60
            ),
            Self::WithdrawalLimitExceeded { max_available } => {
                format!("Withdrawal exceeds available amount. Maximum available: {max_available}")
            }
            Self::InsufficientShares { .. } => {
                "Insufficient vault shares for this withdrawal.".into()
            }
            Self::NotOwner { .. } => "Only the vault owner can perform this action.".into(),
            Self::VaultNotConfigured => "No vault address is configured.".into(),
            Self::FundsLocked { pending_unlocks } => match pending_unlocks.iter().min() {
                Some(next) => format!(
                    "Part of your funds are still locked. \
                     Next unlock at unix time {next} ({} pending).",
                    pending_unlocks.len()
                ),
                None => "Amount exceeds your unlocked balance.".into(),
            },
            Self::Reverted { reason, message } => reason
                .user_message()
                .map(str::to_owned)
                .unwrap_or_else(|| message.clone()),
            Self::Transport(err) => format!("Network error: {err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_failures_are_flagged() {
        assert!(VaultError::VaultPaused.is_precondition());
        assert!(VaultError::WithdrawalLimitExceeded {
            max_available: U256::from(80u64)
        }
        .is_precondition());
        assert!(!VaultError::DepositQueued {
            retry_after_secs: 3600
        }
        .is_precondition());
    }

    #[test]
    fn test_unknown_revert_keeps_raw_message() {
        let err = eyre!("execution reverted: custom error 0xdeadbeef: SomethingOdd");
        let vault_err = VaultError::Reverted {
            reason: RevertReason::Unknown,
            message: format!("{err:#}"),
        };
        assert!(vault_err.user_message().contains("SomethingOdd"));
    }

    #[test]
    fn test_submission_errors_split_into_revert_and_transport() {
        let err = VaultError::from_submission(eyre!("execution reverted: DepositAlreadyQueued"));
        assert_eq!(err.revert_reason(), Some(RevertReason::DepositAlreadyQueued));

        let err = VaultError::from_submission(eyre!("connection refused"));
        assert!(matches!(err, VaultError::Transport(_)));
        assert!(err.user_message().contains("connection refused"));
    }

    #[test]
    fn test_transport_error_keeps_provider_cause() {
        let err = eyre!("error sending request for url: connection refused")
            .wrap_err("Failed to send transaction");
        let vault_err = VaultError::from_submission(err);

        assert!(matches!(vault_err, VaultError::Transport(_)));
        let message = vault_err.user_message();
        assert!(message.contains("Failed to send transaction"));
        assert!(message.contains("connection refused"));
        assert!(format!("{vault_err:#}").contains("connection refused"));
    }

    #[test]
    fn test_queued_message_in_minutes() {
        let err = VaultError::DepositQueued {
            retry_after_secs: 3600,
        };
        assert!(err.user_message().contains("60 minutes"));
    }
}
