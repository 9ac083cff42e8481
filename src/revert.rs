//! Revert reason classification
//!
//! Providers report reverts in different shapes: some return the raw revert data
//! (custom error selector or `Error(string)`), others only a message such as
//! `execution reverted: ...`. Revert data is decoded first, then the rendered
//! error chain is pattern-matched.

use crate::contracts::IVaultDiamond::IVaultDiamondErrors;
use alloy::primitives::Bytes;
use alloy::sol_types::{Revert, SolError, SolInterface};
use alloy::transports::TransportError;
use eyre::Report;

/// Known revert reasons of the vault diamond
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertReason {
    /// A large deposit was already queued for this account
    DepositAlreadyQueued,
    /// Withdrawal touches locked funds that have not matured yet
    AmountExceedsUnlocked,
    /// No staking-protocol withdrawal is pending
    NoWithdrawalInProgress,
    /// The staking-protocol withdrawal has not been finalized yet
    WithdrawalNotReady,
    /// Generic revert without a recognizable reason
    ExecutionReverted,
    /// Anything else; the raw message is surfaced
    Unknown,
}

impl RevertReason {
    /// Classify a provider error
    pub fn classify(err: &Report) -> Self {
        Self::revert_data(err)
            .and_then(|data| Self::from_revert_data(&data))
            .unwrap_or_else(|| Self::from_message(&format!("{err:#}")))
    }

    /// Raw revert data carried by a JSON-RPC error anywhere in the chain
    pub fn revert_data(err: &Report) -> Option<Bytes> {
        err.chain()
            .filter_map(|cause| cause.downcast_ref::<TransportError>())
            .find_map(|rpc| rpc.as_error_resp().and_then(|payload| payload.as_revert_data()))
    }

    /// Decode raw revert data: vault custom errors, then `Error(string)`
    ///
    /// `None` when the data decodes to nothing recognizable.
    pub fn from_revert_data(data: &Bytes) -> Option<Self> {
        if let Ok(decoded) = IVaultDiamondErrors::abi_decode(data) {
            return Some(match decoded {
                IVaultDiamondErrors::DepositAlreadyQueued(_) => Self::DepositAlreadyQueued,
                IVaultDiamondErrors::NoWithdrawalInProgress(_) => Self::NoWithdrawalInProgress,
                IVaultDiamondErrors::WithdrawalNotReady(_) => Self::WithdrawalNotReady,
            });
        }

        Revert::abi_decode(data)
            .ok()
            .map(|revert| Self::from_message(&revert.reason))
            .filter(|reason| *reason != Self::Unknown)
    }

    /// Match a rendered error message against the known reasons
    pub fn from_message(message: &str) -> Self {
        // Specific reasons first, the generic marker appears in most of them.
        if message.contains("DepositAlreadyQueued") {
            Self::DepositAlreadyQueued
        } else if message.contains("Amount exceeds unlocked balance") {
            Self::AmountExceedsUnlocked
        } else if message.contains("NoWithdrawalInProgress") {
            Self::NoWithdrawalInProgress
        } else if message.contains("WithdrawalNotReady") {
            Self::WithdrawalNotReady
        } else if message.contains("execution reverted") {
            Self::ExecutionReverted
        } else {
            Self::Unknown
        }
    }

    /// User-facing message, `None` when the raw message should be shown instead
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::DepositAlreadyQueued => {
                Some("A large deposit is already queued for this account.")
            }
            Self::AmountExceedsUnlocked => {
                Some("Amount exceeds your unlocked balance. Locked funds have not matured yet.")
            }
            Self::NoWithdrawalInProgress => Some("There is no staking withdrawal in progress."),
            Self::WithdrawalNotReady => {
                Some("The staking withdrawal is not ready yet. Please try again later.")
            }
            Self::ExecutionReverted => Some(
                "Transaction was rejected by the vault contract. Check amounts and try again.",
            ),
            Self::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::IVaultDiamond;
    use crate::error::VaultError;
    use eyre::eyre;
    use serde_json::json;

    /// JSON-RPC error response wrapped the way the local signer wraps it
    fn rpc_error(message: &str, data: &Bytes) -> Report {
        let body = json!({"code": 3, "message": message, "data": data.to_string()});
        let payload = serde_json::from_str(&body.to_string()).unwrap();
        Report::new(<TransportError>::ErrorResp(payload)).wrap_err("Failed to send transaction")
    }

    fn revert_string(reason: &str) -> Bytes {
        Bytes::from(
            Revert {
                reason: reason.into(),
            }
            .abi_encode(),
        )
    }

    #[test]
    fn test_specific_reason_wins_over_generic() {
        let err = eyre!("error code 3: execution reverted: DepositAlreadyQueued");
        assert_eq!(RevertReason::classify(&err), RevertReason::DepositAlreadyQueued);

        let err = eyre!("execution reverted: Amount exceeds unlocked balance");
        assert_eq!(RevertReason::classify(&err), RevertReason::AmountExceedsUnlocked);
    }

    #[test]
    fn test_generic_and_unknown() {
        let err = eyre!("execution reverted");
        assert_eq!(RevertReason::classify(&err), RevertReason::ExecutionReverted);

        let err = eyre!("nonce too low");
        assert_eq!(RevertReason::classify(&err), RevertReason::Unknown);
        assert!(RevertReason::Unknown.user_message().is_none());
    }

    #[test]
    fn test_reason_found_in_context_chain() {
        let err = eyre!("WithdrawalNotReady()").wrap_err("Failed to send transaction");
        assert_eq!(RevertReason::classify(&err), RevertReason::WithdrawalNotReady);
    }

    #[test]
    fn test_custom_error_data() {
        let data = Bytes::from(IVaultDiamond::NoWithdrawalInProgress {}.abi_encode());
        assert_eq!(
            RevertReason::from_revert_data(&data),
            Some(RevertReason::NoWithdrawalInProgress)
        );
    }

    #[test]
    fn test_revert_string_data() {
        let data = revert_string("Amount exceeds unlocked balance");
        assert_eq!(
            RevertReason::from_revert_data(&data),
            Some(RevertReason::AmountExceedsUnlocked)
        );
    }

    #[test]
    fn test_unrecognized_revert_string_falls_back_to_message() {
        let data = revert_string("Ownable: caller is not the owner");
        assert_eq!(RevertReason::from_revert_data(&data), None);

        let err = rpc_error("execution reverted: Ownable: caller is not the owner", &data);
        assert_eq!(RevertReason::classify(&err), RevertReason::ExecutionReverted);

        let vault_err = VaultError::from_submission(err);
        assert_eq!(vault_err.revert_reason(), Some(RevertReason::ExecutionReverted));
        match vault_err {
            VaultError::Reverted { message, .. } => assert!(message.contains("Ownable")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_custom_error_in_rpc_response() {
        let data = Bytes::from(IVaultDiamond::DepositAlreadyQueued {}.abi_encode());
        let err = rpc_error("execution reverted", &data);

        assert_eq!(RevertReason::revert_data(&err), Some(data));
        assert_eq!(RevertReason::classify(&err), RevertReason::DepositAlreadyQueued);
    }

    #[test]
    fn test_revert_with_data_is_never_transport() {
        let data = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        let err = rpc_error("VM Exception while processing transaction: revert", &data);

        let vault_err = VaultError::from_submission(err);
        assert_eq!(vault_err.revert_reason(), Some(RevertReason::Unknown));
        assert!(vault_err.user_message().contains("VM Exception"));
    }
}
