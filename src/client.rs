//! VaultClient - main entry point for the SDK
//!
//! A client is an explicit connection context: signer, reader and configuration are
//! bound at [`VaultClient::connect`] and released at [`VaultClient::disconnect`].
//! Deposit, withdrawal and admin operations live in their own modules as further
//! `impl` blocks on this type.

use crate::config::NetworkConfig;
use crate::contracts::{IVaultDiamond, IERC20};
use crate::error::VaultError;
use crate::events::{StageEmitter, TxEvent, TxStage};
use crate::signer::{ContractReader, RpcReader, TransactionSigner, TxConfirmation, TxRequest};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use eyre::{Context, Result};
use tokio::sync::mpsc;

/// Main client for interacting with the vault diamond
pub struct VaultClient<S: TransactionSigner, R: ContractReader = RpcReader> {
    signer: S,
    reader: R,
    config: NetworkConfig,
    events: StageEmitter,
}

impl<S: TransactionSigner> VaultClient<S, RpcReader> {
    /// Connect a signer to the network described by `config`
    ///
    /// Fails when the RPC endpoint serves a different chain than `config.chain_id`.
    pub async fn connect(signer: S, config: NetworkConfig) -> Result<Self> {
        let reader = RpcReader::connect(&config.rpc_url)?;
        config.ensure_chain(reader.chain_id().await?)?;
        let client = Self::with_reader(signer, reader, config);

        tracing::info!(
            address = %client.address(),
            chain_id = client.config.chain_id,
            rpc_url = %client.config.rpc_url,
            vault = ?client.config.vault,
            "vault client connected"
        );

        Ok(client)
    }
}

impl<S: TransactionSigner, R: ContractReader> VaultClient<S, R> {
    /// Create a client from an existing signer and reader
    pub fn with_reader(signer: S, reader: R, config: NetworkConfig) -> Self {
        Self {
            signer,
            reader,
            config,
            events: StageEmitter::default(),
        }
    }

    /// End the session and hand the signer back
    pub fn disconnect(self) -> S {
        tracing::info!(address = %self.signer.address(), "vault client disconnected");
        self.signer
    }

    /// Get the signer's address
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the network configuration
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// Receive stage events for every transaction this client submits
    ///
    /// A new subscription replaces the previous one.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<TxEvent> {
        self.events.subscribe()
    }

    /// Configured vault diamond address
    pub fn vault(&self) -> Result<Address, VaultError> {
        self.config.vault.ok_or(VaultError::VaultNotConfigured)
    }

    /// Point the client at a vault diamond, checking that code is deployed there
    pub async fn bind_vault(&mut self, vault: Address) -> Result<()> {
        let code = self.reader.code_at(vault).await?;
        eyre::ensure!(!code.is_empty(), "No contract deployed at {}", vault);

        self.config.vault = Some(vault);
        tracing::info!(%vault, "bound vault diamond");
        Ok(())
    }

    // ========== Reads ==========

    /// Encode a call, run it with `eth_call` and decode the return value
    pub(crate) async fn read<C: SolCall>(&self, to: Address, call: C) -> Result<C::Return> {
        let result: Bytes = self
            .reader
            .call(to, Bytes::from(call.abi_encode()))
            .await
            .with_context(|| format!("Failed to call {}", C::SIGNATURE))?;

        C::abi_decode_returns(&result).with_context(|| format!("Failed to decode {}", C::SIGNATURE))
    }

    /// Deposit asset balance of an account
    pub async fn asset_balance(&self, account: Address) -> Result<U256> {
        self.read(self.config.asset, IERC20::balanceOfCall { account })
            .await
    }

    /// Deposit asset decimals
    pub async fn asset_decimals(&self) -> Result<u8> {
        self.read(self.config.asset, IERC20::decimalsCall {}).await
    }

    /// Asset allowance granted by `owner` to `spender`
    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        self.read(self.config.asset, IERC20::allowanceCall { owner, spender })
            .await
    }

    /// Vault share balance of an account
    pub async fn share_balance(&self, account: Address) -> Result<U256, VaultError> {
        let vault = self.vault()?;
        Ok(self
            .read(vault, IVaultDiamond::balanceOfCall { account })
            .await?)
    }

    /// Value re-read after a confirmed transaction
    ///
    /// The transaction already went through, so a failed read is logged and yields
    /// `None` instead of failing the operation.
    pub(crate) fn after_confirmation<T, E: std::fmt::Debug>(
        what: &'static str,
        result: std::result::Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(what, error = ?err, "refresh after confirmation failed");
                None
            }
        }
    }

    // ========== Transactions ==========

    /// Run one transaction through its stages: optional simulation, signing,
    /// submission and confirmation
    ///
    /// Simulation is skipped for calls without a gas override, where the provider's gas
    /// estimation already surfaces reverts.
    pub(crate) async fn submit(
        &self,
        operation: &'static str,
        tx: TxRequest,
        confirmations: u64,
    ) -> Result<TxConfirmation, VaultError> {
        let outcome = self.submit_inner(operation, tx, confirmations).await;

        if let Err(err) = &outcome {
            tracing::error!(operation, error = %format_args!("{err:#}"), "transaction failed");
            self.events.emit(
                operation,
                TxStage::Failed {
                    message: err.user_message(),
                },
            );
        }

        outcome
    }

    async fn submit_inner(
        &self,
        operation: &'static str,
        tx: TxRequest,
        confirmations: u64,
    ) -> Result<TxConfirmation, VaultError> {
        if tx.gas_limit.is_some() {
            self.events.emit(operation, TxStage::EstimatingGas);
            self.signer
                .simulate(&tx)
                .await
                .map_err(VaultError::from_submission)?;
        }

        self.events.emit(operation, TxStage::Signing);
        let tx_hash = self
            .signer
            .sign_and_send(tx)
            .await
            .map_err(VaultError::from_submission)?;

        tracing::info!(operation, %tx_hash, "transaction submitted");
        self.events.emit(operation, TxStage::Submitted { tx_hash });
        self.events.emit(
            operation,
            TxStage::Confirming {
                tx_hash,
                confirmations,
            },
        );

        let confirmation = self
            .signer
            .wait_for_confirmations(tx_hash, confirmations)
            .await?;

        if !confirmation.success {
            return Err(VaultError::from_submission(eyre::eyre!(
                "execution reverted (transaction {} in block {})",
                tx_hash,
                confirmation.block_number
            )));
        }

        tracing::info!(
            operation,
            %tx_hash,
            block = confirmation.block_number,
            gas_used = confirmation.gas_used,
            "transaction confirmed"
        );
        self.events.emit(
            operation,
            TxStage::Completed {
                tx_hash,
                block_number: confirmation.block_number,
            },
        );

        Ok(confirmation)
    }

    /// Get native token (ETH) balance
    pub async fn get_eth_balance(&self) -> Result<U256> {
        self.signer.get_balance().await
    }
}

/// Current unix time in seconds
pub(crate) fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
