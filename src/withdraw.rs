//! Withdrawal orchestration
//!
//! Every deposit is split into a liquid part (60%) and a part staked through the
//! staking protocol (40%) that only becomes withdrawable once its unlock time has
//! passed. The vault computes the withdrawable amount; this module checks against it,
//! submits the withdrawal and explains lock-related reverts.

use crate::client::{now_secs, VaultClient};
use crate::constants::{
    PROCESS_WITHDRAWALS_GAS_LIMIT, WITHDRAW_CONFIRMATIONS, WITHDRAW_GAS_LIMIT,
};
use crate::contracts::IVaultDiamond;
use crate::error::VaultError;
use crate::revert::RevertReason;
use crate::signer::{ContractReader, TransactionSigner, TxRequest};
use crate::types::vault::timestamps_from_u256;
use crate::types::{
    pending_unlocks, ProcessWithdrawalsReceipt, WithdrawReceipt, WithdrawalState,
};
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;

impl<S: TransactionSigner, R: ContractReader> VaultClient<S, R> {
    /// Withdraw assets from the vault
    ///
    /// # Arguments
    ///
    /// * `amount` - Amount of assets in the smallest unit
    /// * `receiver` - Receiver of the assets
    /// * `owner` - Owner of the shares being burned
    ///
    /// # Returns
    ///
    /// The withdrawal after three confirmations. A revert caused by locked funds comes
    /// back as [`VaultError::FundsLocked`] with the pending unlock times.
    pub async fn withdraw(
        &self,
        amount: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<WithdrawReceipt, VaultError> {
        let vault = self.vault()?;
        tracing::info!(%amount, %receiver, %owner, %vault, "starting withdrawal");

        let max_available = self
            .read(vault, IVaultDiamond::getWithdrawableAmountCall { user: owner })
            .await?;
        if amount > max_available {
            return Err(VaultError::WithdrawalLimitExceeded { max_available });
        }

        let required = self
            .read(vault, IVaultDiamond::previewWithdrawCall { assets: amount })
            .await?;
        let available = self
            .read(vault, IVaultDiamond::balanceOfCall { account: owner })
            .await?;
        if available < required {
            return Err(VaultError::InsufficientShares {
                available,
                required,
            });
        }

        let fees = self.signer().estimate_fees().await?;
        let call = IVaultDiamond::withdrawCall {
            assets: amount,
            receiver,
            owner,
        };
        let tx = TxRequest::new(vault, call.abi_encode())
            .with_gas_limit(WITHDRAW_GAS_LIMIT)
            .with_fees(fees);

        match self.submit("withdraw", tx, WITHDRAW_CONFIRMATIONS).await {
            Ok(confirmation) => {
                tracing::info!(tx_hash = %confirmation.tx_hash, "withdrawal confirmed");
                Ok(WithdrawReceipt {
                    tx_hash: confirmation.tx_hash,
                    block_number: confirmation.block_number,
                    shares_burned: required,
                })
            }
            Err(err) if err.revert_reason() == Some(RevertReason::AmountExceedsUnlocked) => {
                let pending_unlocks = match self.unlock_times(owner).await {
                    Ok(unlock_times) => pending_unlocks(&unlock_times, now_secs()),
                    Err(err) => {
                        tracing::warn!(
                            error = %format_args!("{err:#}"),
                            "could not read unlock times"
                        );
                        Vec::new()
                    }
                };
                tracing::warn!(?pending_unlocks, "withdrawal touches locked funds");
                Err(VaultError::FundsLocked { pending_unlocks })
            }
            Err(err) => Err(err),
        }
    }

    /// Finalize a completed staking-protocol withdrawal and mint the corresponding shares
    pub async fn process_completed_withdrawals(
        &self,
    ) -> Result<ProcessWithdrawalsReceipt, VaultError> {
        let vault = self.vault()?;

        let tx = TxRequest::new(
            vault,
            IVaultDiamond::processCompletedWithdrawalsCall {}.abi_encode(),
        )
        .with_gas_limit(PROCESS_WITHDRAWALS_GAS_LIMIT);
        let confirmation = self
            .submit("processCompletedWithdrawals", tx, WITHDRAW_CONFIRMATIONS)
            .await?;

        let shares = Self::after_confirmation(
            "share balance",
            self.share_balance(self.address()).await,
        );

        Ok(ProcessWithdrawalsReceipt {
            tx_hash: confirmation.tx_hash,
            block_number: confirmation.block_number,
            shares,
        })
    }

    /// Unlock timestamp of each of the owner's deposits
    pub async fn unlock_times(&self, owner: Address) -> Result<Vec<u64>, VaultError> {
        let vault = self.vault()?;
        let times = self
            .read(vault, IVaultDiamond::getUnlockTimeCall { user: owner })
            .await?;
        Ok(timestamps_from_u256(&times))
    }

    /// Withdrawal-related state of an account, read concurrently
    pub async fn withdrawal_state(&self, owner: Address) -> Result<WithdrawalState, VaultError> {
        let vault = self.vault()?;

        let (withdrawable, locked, shares, max_withdraw, unlock_times) = tokio::try_join!(
            self.read(vault, IVaultDiamond::getWithdrawableAmountCall { user: owner }),
            self.read(vault, IVaultDiamond::getLockedAmountCall { user: owner }),
            self.read(vault, IVaultDiamond::balanceOfCall { account: owner }),
            self.read(vault, IVaultDiamond::maxWithdrawCall { owner }),
            self.read(vault, IVaultDiamond::getUnlockTimeCall { user: owner }),
        )?;

        Ok(WithdrawalState {
            withdrawable,
            locked,
            shares,
            max_withdraw,
            unlock_times: timestamps_from_u256(&unlock_times),
        })
    }
}
