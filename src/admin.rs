//! Owner-only configuration and diamond introspection

use crate::client::VaultClient;
use crate::constants::DEFAULT_CONFIRMATIONS;
use crate::contracts::{Facet, IDiamondLoupe, IVaultDiamond, IERC173};
use crate::error::VaultError;
use crate::signer::{ContractReader, TransactionSigner, TxConfirmation, TxRequest};
use crate::types::{VaultOverview, VaultPosition};
use alloy::primitives::Address;
use alloy::sol_types::SolCall;

impl<S: TransactionSigner, R: ContractReader> VaultClient<S, R> {
    /// Current diamond owner
    pub async fn owner(&self) -> Result<Address, VaultError> {
        let vault = self.vault()?;
        Ok(self.read(vault, IERC173::ownerCall {}).await?)
    }

    /// Facets and their selectors, as reported by the loupe
    pub async fn facets(&self) -> Result<Vec<Facet>, VaultError> {
        let vault = self.vault()?;
        Ok(self.read(vault, IDiamondLoupe::facetsCall {}).await?)
    }

    /// Addresses of all facets routed by the diamond
    pub async fn facet_addresses(&self) -> Result<Vec<Address>, VaultError> {
        let vault = self.vault()?;
        Ok(self.read(vault, IDiamondLoupe::facetAddressesCall {}).await?)
    }

    pub async fn set_lido_withdrawal_address(
        &self,
        lido_withdrawal: Address,
    ) -> Result<TxConfirmation, VaultError> {
        self.admin_call(
            "setLidoWithdrawalAddress",
            IVaultDiamond::setLidoWithdrawalAddressCall { lidoWithdrawal: lido_withdrawal },
        )
        .await
    }

    pub async fn set_wsteth_address(&self, wsteth: Address) -> Result<TxConfirmation, VaultError> {
        self.admin_call(
            "setWstETHAddress",
            IVaultDiamond::setWstETHAddressCall { wstETH: wsteth },
        )
        .await
    }

    pub async fn set_receiver_contract(
        &self,
        receiver: Address,
    ) -> Result<TxConfirmation, VaultError> {
        self.admin_call(
            "setReceiverContract",
            IVaultDiamond::setReceiverContractCall { receiver },
        )
        .await
    }

    pub async fn set_swap_contract(
        &self,
        swap_contract: Address,
    ) -> Result<TxConfirmation, VaultError> {
        self.admin_call(
            "setSwapContract",
            IVaultDiamond::setSwapContractCall {
                swapContract: swap_contract,
            },
        )
        .await
    }

    pub async fn set_fee_collector(
        &self,
        fee_collector: Address,
    ) -> Result<TxConfirmation, VaultError> {
        self.admin_call(
            "setFeeCollector",
            IVaultDiamond::setFeeCollectorCall {
                feeCollector: fee_collector,
            },
        )
        .await
    }

    /// Push every integration address from the client's configuration to the vault
    ///
    /// Ownership is checked once. Setters then run one after another and stop at the
    /// first failure.
    pub async fn sync_integrations(&self) -> Result<Vec<TxConfirmation>, VaultError> {
        self.ensure_owner().await?;
        let config = self.config().clone();

        Ok(vec![
            self.send_admin(
                "setLidoWithdrawalAddress",
                IVaultDiamond::setLidoWithdrawalAddressCall {
                    lidoWithdrawal: config.lido_withdrawal,
                },
            )
            .await?,
            self.send_admin(
                "setWstETHAddress",
                IVaultDiamond::setWstETHAddressCall {
                    wstETH: config.wsteth,
                },
            )
            .await?,
            self.send_admin(
                "setReceiverContract",
                IVaultDiamond::setReceiverContractCall {
                    receiver: config.receiver_contract,
                },
            )
            .await?,
            self.send_admin(
                "setSwapContract",
                IVaultDiamond::setSwapContractCall {
                    swapContract: config.swap_contract,
                },
            )
            .await?,
            self.send_admin(
                "setFeeCollector",
                IVaultDiamond::setFeeCollectorCall {
                    feeCollector: config.fee_collector,
                },
            )
            .await?,
        ])
    }

    /// Fail with [`VaultError::NotOwner`] unless the signer owns the diamond
    pub async fn ensure_owner(&self) -> Result<(), VaultError> {
        let owner = self.owner().await?;
        let caller = self.address();
        if owner != caller {
            return Err(VaultError::NotOwner { caller, owner });
        }
        Ok(())
    }

    async fn admin_call<C: SolCall>(
        &self,
        operation: &'static str,
        call: C,
    ) -> Result<TxConfirmation, VaultError> {
        self.ensure_owner().await?;
        self.send_admin(operation, call).await
    }

    /// Submit an owner-only call; ownership must already be checked
    async fn send_admin<C: SolCall>(
        &self,
        operation: &'static str,
        call: C,
    ) -> Result<TxConfirmation, VaultError> {
        let vault = self.vault()?;

        tracing::info!(operation, %vault, "sending admin transaction");
        let tx = TxRequest::new(vault, call.abi_encode());
        self.submit(operation, tx, DEFAULT_CONFIRMATIONS).await
    }

    /// Vault-wide snapshot, all reads issued concurrently
    pub async fn vault_overview(&self) -> Result<VaultOverview, VaultError> {
        let vault = self.vault()?;

        let (owner, total_assets, total_shares, paused, shutdown, facets) = tokio::try_join!(
            self.read(vault, IERC173::ownerCall {}),
            self.read(vault, IVaultDiamond::totalAssetsCall {}),
            self.read(vault, IVaultDiamond::totalSharesCall {}),
            self.read(vault, IVaultDiamond::pausedCall {}),
            self.read(vault, IVaultDiamond::isShutdownCall {}),
            self.read(vault, IDiamondLoupe::facetAddressesCall {}),
        )?;

        Ok(VaultOverview {
            vault,
            owner,
            total_assets,
            total_shares,
            paused,
            shutdown,
            facet_count: facets.len(),
        })
    }

    /// Position of one account
    pub async fn position(&self, account: Address) -> Result<VaultPosition, VaultError> {
        let vault = self.vault()?;

        let (shares, withdrawable, locked, decimals) = tokio::try_join!(
            self.read(vault, IVaultDiamond::balanceOfCall { account }),
            self.read(vault, IVaultDiamond::getWithdrawableAmountCall { user: account }),
            self.read(vault, IVaultDiamond::getLockedAmountCall { user: account }),
            self.asset_decimals(),
        )?;

        Ok(VaultPosition {
            shares,
            withdrawable,
            locked,
            decimals,
        })
    }
}
