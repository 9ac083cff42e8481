//! Deposit orchestration
//!
//! Guards run in a fixed order and stop at the first failure:
//! circuit breakers, asset balance, `maxDeposit`, large-deposit queue, allowance.
//! Only then is the deposit itself submitted.

use crate::client::VaultClient;
use crate::constants::{
    is_large_deposit, DEFAULT_CONFIRMATIONS, DEPOSIT_GAS_LIMIT, LARGE_DEPOSIT_TIMELOCK_SECS,
};
use crate::contracts::{IVaultDiamond, IERC20};
use crate::error::VaultError;
use crate::revert::RevertReason;
use crate::signer::{ContractReader, TransactionSigner, TxRequest};
use crate::types::{DepositIntent, DepositReceipt};
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;

impl<S: TransactionSigner, R: ContractReader> VaultClient<S, R> {
    /// Deposit assets into the vault
    ///
    /// # Arguments
    ///
    /// * `amount` - Amount in the asset's smallest unit
    /// * `receiver` - Receiver of the minted shares
    ///
    /// # Returns
    ///
    /// The confirmed deposit with the receiver's refreshed share balance. Balances that
    /// could not be re-read are `None`; the deposit itself still succeeded.
    ///
    /// A deposit above a tenth of the vault's assets is not executed right away: the
    /// first call queues it on-chain and fails with [`VaultError::DepositQueued`]; calling
    /// again after the timelock executes it.
    pub async fn deposit(
        &self,
        amount: U256,
        receiver: Address,
    ) -> Result<DepositReceipt, VaultError> {
        let vault = self.vault()?;
        let intent = DepositIntent {
            amount,
            receiver,
            depositor: self.address(),
        };
        tracing::info!(?intent, %vault, "starting deposit");

        self.ensure_vault_open(vault).await?;

        let available = self.asset_balance(intent.depositor).await?;
        if available < amount {
            return Err(VaultError::InsufficientBalance {
                available,
                required: amount,
            });
        }

        let max_allowed = self
            .read(vault, IVaultDiamond::maxDepositCall { receiver })
            .await?;
        if amount > max_allowed {
            return Err(VaultError::DepositLimitExceeded { max_allowed });
        }

        let total_assets = self
            .read(vault, IVaultDiamond::totalAssetsCall {})
            .await?;
        if is_large_deposit(amount, total_assets) {
            self.queue_large_deposit(vault, &intent).await?;
        }

        self.ensure_allowance(vault, amount).await?;

        let call = IVaultDiamond::depositCall {
            assets: amount,
            receiver,
        };
        let tx = TxRequest::new(vault, call.abi_encode()).with_gas_limit(DEPOSIT_GAS_LIMIT);
        let confirmation = self.submit("deposit", tx, DEFAULT_CONFIRMATIONS).await?;

        let (shares, asset_balance) = tokio::join!(
            self.share_balance(receiver),
            self.asset_balance(intent.depositor),
        );
        let shares = Self::after_confirmation("share balance", shares);
        let asset_balance = Self::after_confirmation("asset balance", asset_balance);

        tracing::info!(
            tx_hash = %confirmation.tx_hash,
            ?shares,
            "deposit confirmed"
        );

        Ok(DepositReceipt {
            tx_hash: confirmation.tx_hash,
            block_number: confirmation.block_number,
            shares,
            asset_balance,
        })
    }

    /// Shares a deposit of `amount` would mint right now
    pub async fn preview_deposit(&self, amount: U256) -> Result<U256, VaultError> {
        let vault = self.vault()?;
        Ok(self
            .read(vault, IVaultDiamond::previewDepositCall { assets: amount })
            .await?)
    }

    /// Fail fast when the vault is paused or shut down
    pub(crate) async fn ensure_vault_open(&self, vault: Address) -> Result<(), VaultError> {
        let (paused, shutdown) = tokio::try_join!(
            self.read(vault, IVaultDiamond::pausedCall {}),
            self.read(vault, IVaultDiamond::isShutdownCall {}),
        )?;

        if shutdown {
            return Err(VaultError::VaultShutdown);
        }
        if paused {
            return Err(VaultError::VaultPaused);
        }

        Ok(())
    }

    /// Queue a large deposit behind the vault's timelock
    ///
    /// This guard sends a transaction. A successful queueing ends the current attempt;
    /// an `DepositAlreadyQueued` revert means an earlier attempt queued it and the
    /// deposit may go ahead.
    async fn queue_large_deposit(
        &self,
        vault: Address,
        intent: &DepositIntent,
    ) -> Result<(), VaultError> {
        tracing::info!(amount = %intent.amount, "large deposit, queueing behind timelock");

        let tx = TxRequest::new(vault, IVaultDiamond::queueLargeDepositCall {}.abi_encode());
        match self
            .submit("queueLargeDeposit", tx, DEFAULT_CONFIRMATIONS)
            .await
        {
            Ok(confirmation) => {
                tracing::info!(
                    tx_hash = %confirmation.tx_hash,
                    retry_after_secs = LARGE_DEPOSIT_TIMELOCK_SECS,
                    "large deposit queued"
                );
                Err(VaultError::DepositQueued {
                    retry_after_secs: LARGE_DEPOSIT_TIMELOCK_SECS,
                })
            }
            Err(err) if err.revert_reason() == Some(RevertReason::DepositAlreadyQueued) => {
                tracing::info!("large deposit already queued, proceeding");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Approve the vault for `amount` unless the current allowance already covers it
    async fn ensure_allowance(&self, spender: Address, amount: U256) -> Result<(), VaultError> {
        let current = self.allowance(self.address(), spender).await?;
        if current >= amount {
            return Ok(());
        }

        tracing::info!(%spender, %current, %amount, "approving asset");
        let call = IERC20::approveCall { spender, amount };
        let tx = TxRequest::new(self.config().asset, call.abi_encode());
        self.submit("approve", tx, DEFAULT_CONFIRMATIONS).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChain;
    use alloy::sol_types::SolValue;
    use tokio_test::assert_err;

    /// A chain where a deposit of up to `balance` passes every guard
    fn open_vault(balance: u64, total_assets: u64) -> MockChain {
        let mock = MockChain::new();
        mock.respond(IVaultDiamond::pausedCall::SELECTOR, false.abi_encode());
        mock.respond(IVaultDiamond::isShutdownCall::SELECTOR, false.abi_encode());
        mock.respond_at(
            MockChain::ASSET,
            IERC20::balanceOfCall::SELECTOR,
            U256::from(balance).abi_encode(),
        );
        mock.respond(IVaultDiamond::maxDepositCall::SELECTOR, U256::MAX.abi_encode());
        mock.respond(
            IVaultDiamond::totalAssetsCall::SELECTOR,
            U256::from(total_assets).abi_encode(),
        );
        mock.respond(IERC20::allowanceCall::SELECTOR, U256::ZERO.abi_encode());
        mock.respond_at(
            MockChain::VAULT,
            IVaultDiamond::balanceOfCall::SELECTOR,
            U256::from(7u64).abi_encode(),
        );
        mock
    }

    #[tokio::test]
    async fn test_insufficient_balance_sends_nothing() {
        let mock = open_vault(50, 1_000_000);
        let client = mock.client();

        let err = client
            .deposit(U256::from(100u64), mock.address())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            VaultError::InsufficientBalance { available, required }
                if available == U256::from(50u64) && required == U256::from(100u64)
        ));
        assert!(mock.sent().is_empty());
    }

    #[tokio::test]
    async fn test_deposit_limit() {
        let mock = open_vault(1_000, 1_000_000);
        mock.respond(
            IVaultDiamond::maxDepositCall::SELECTOR,
            U256::from(10u64).abi_encode(),
        );
        let client = mock.client();

        let err = client
            .deposit(U256::from(100u64), mock.address())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            VaultError::DepositLimitExceeded { max_allowed } if max_allowed == U256::from(10u64)
        ));
        assert!(mock.sent().is_empty());
    }

    #[tokio::test]
    async fn test_paused_vault() {
        let mock = open_vault(1_000, 1_000_000);
        mock.respond(IVaultDiamond::pausedCall::SELECTOR, true.abi_encode());
        let client = mock.client();

        let result = client.deposit(U256::from(1u64), mock.address()).await;
        assert!(matches!(assert_err!(result), VaultError::VaultPaused));
        assert!(mock.sent().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_wins_over_pause() {
        let mock = open_vault(1_000, 1_000_000);
        mock.respond(IVaultDiamond::pausedCall::SELECTOR, true.abi_encode());
        mock.respond(IVaultDiamond::isShutdownCall::SELECTOR, true.abi_encode());
        let client = mock.client();

        let result = client.deposit(U256::from(1u64), mock.address()).await;
        assert!(matches!(assert_err!(result), VaultError::VaultShutdown));
        assert!(mock.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_confirmed_deposit() {
        let mock = open_vault(1_000, 1_000_000);
        mock.forget_at(MockChain::VAULT, IVaultDiamond::balanceOfCall::SELECTOR);
        let client = mock.client();

        let receipt = client
            .deposit(U256::from(100u64), mock.address())
            .await
            .unwrap();

        assert_eq!(receipt.shares, None);
        assert_eq!(receipt.asset_balance, Some(U256::from(1_000u64)));
        assert_eq!(
            mock.sent_selectors(),
            vec![IERC20::approveCall::SELECTOR, IVaultDiamond::depositCall::SELECTOR]
        );
    }

    #[tokio::test]
    async fn test_small_deposit_approves_then_deposits() {
        let mock = open_vault(1_000, 1_000_000);
        let client = mock.client();

        let receipt = client
            .deposit(U256::from(100u64), mock.address())
            .await
            .unwrap();

        assert_eq!(receipt.shares, Some(U256::from(7u64)));
        assert_eq!(receipt.asset_balance, Some(U256::from(1_000u64)));
        assert_eq!(
            mock.sent_selectors(),
            vec![IERC20::approveCall::SELECTOR, IVaultDiamond::depositCall::SELECTOR]
        );

        let sent = mock.sent();
        assert_eq!(sent[0].to, Some(MockChain::ASSET));
        let approve = IERC20::approveCall::abi_decode(&sent[0].data).unwrap();
        assert_eq!(approve.spender, MockChain::VAULT);
        assert_eq!(approve.amount, U256::from(100u64));
        assert_eq!(sent[1].gas_limit, Some(DEPOSIT_GAS_LIMIT));
    }

    #[tokio::test]
    async fn test_existing_allowance_skips_approval() {
        let mock = open_vault(1_000, 1_000_000);
        mock.respond(IERC20::allowanceCall::SELECTOR, U256::MAX.abi_encode());
        let client = mock.client();

        client
            .deposit(U256::from(100u64), mock.address())
            .await
            .unwrap();

        assert_eq!(
            mock.sent_selectors(),
            vec![IVaultDiamond::depositCall::SELECTOR]
        );
    }

    #[tokio::test]
    async fn test_large_deposit_already_queued_proceeds() {
        let mock = open_vault(1_000, 1_000);
        mock.revert_on(
            IVaultDiamond::queueLargeDepositCall::SELECTOR,
            "execution reverted: DepositAlreadyQueued()",
        );
        let client = mock.client();

        client
            .deposit(U256::from(150u64), mock.address())
            .await
            .unwrap();

        assert_eq!(
            mock.sent_selectors(),
            vec![
                IVaultDiamond::queueLargeDepositCall::SELECTOR,
                IERC20::approveCall::SELECTOR,
                IVaultDiamond::depositCall::SELECTOR,
            ]
        );
    }

    #[tokio::test]
    async fn test_large_deposit_gets_queued() {
        let mock = open_vault(1_000, 1_000);
        let client = mock.client();

        let err = client
            .deposit(U256::from(150u64), mock.address())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            VaultError::DepositQueued { retry_after_secs }
                if retry_after_secs == LARGE_DEPOSIT_TIMELOCK_SECS
        ));
        assert_eq!(
            mock.sent_selectors(),
            vec![IVaultDiamond::queueLargeDepositCall::SELECTOR]
        );
    }

    #[tokio::test]
    async fn test_unknown_revert_keeps_raw_message() {
        let mock = open_vault(1_000, 1_000_000);
        mock.revert_on(
            IVaultDiamond::depositCall::SELECTOR,
            "insufficient funds for gas * price + value",
        );
        let client = mock.client();

        let err = client
            .deposit(U256::from(100u64), mock.address())
            .await
            .unwrap_err();

        assert!(matches!(err, VaultError::Transport(_)));
        assert!(err.user_message().contains("insufficient funds for gas"));
    }

    #[tokio::test]
    async fn test_generic_revert_is_translated() {
        let mock = open_vault(1_000, 1_000_000);
        mock.revert_on(IVaultDiamond::depositCall::SELECTOR, "execution reverted");
        let client = mock.client();

        let err = client
            .deposit(U256::from(100u64), mock.address())
            .await
            .unwrap_err();

        assert_eq!(err.revert_reason(), Some(RevertReason::ExecutionReverted));
        assert!(err.user_message().contains("rejected by the vault contract"));
        // Simulation caught it, the deposit was never broadcast
        assert_eq!(mock.sent_selectors(), vec![IERC20::approveCall::SELECTOR]);
    }
}
