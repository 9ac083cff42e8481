//! Local private key signer and JSON-RPC reader

use super::{ContractReader, FeeEstimate, TransactionSigner, TxConfirmation, TxRequest};
use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use eyre::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

/// Interval between receipt / block number polls
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Local signer using a private key
pub struct LocalSigner {
    /// Provider with wallet filler - handles nonce, gas, chain_id, and signing
    provider: Arc<dyn Provider<Ethereum>>,
    address: Address,
}

impl LocalSigner {
    /// Create a new LocalSigner from a private key hex string
    ///
    /// # Arguments
    ///
    /// * `private_key` - Hex-encoded private key (with or without 0x prefix)
    /// * `rpc_url` - RPC endpoint URL
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let signer = LocalSigner::from_private_key("0x...", "http://127.0.0.1:8545").await?;
    /// ```
    pub async fn from_private_key(
        private_key: impl AsRef<str>,
        rpc_url: impl AsRef<str>,
    ) -> Result<Self> {
        let key = private_key.as_ref();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let signer: PrivateKeySigner = key.parse().context("Failed to parse private key")?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let url: Url = rpc_url.as_ref().parse().context("Invalid RPC URL")?;

        // Build provider with wallet filler - this handles nonce, gas, and signing
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        tracing::debug!(%address, "local signer connected");

        Ok(Self {
            provider: Arc::new(provider),
            address,
        })
    }

    fn to_request(&self, tx: &TxRequest) -> TransactionRequest {
        let mut request = TransactionRequest::default()
            .with_from(self.address)
            .with_value(tx.value);

        request = match tx.to {
            Some(to) => request.with_to(to).with_input(tx.data.clone()),
            None => request.with_deploy_code(tx.data.clone()),
        };

        if let Some(gas_limit) = tx.gas_limit {
            request = request.with_gas_limit(gas_limit);
        }

        if let Some(fees) = tx.fees {
            request = request
                .with_max_fee_per_gas(fees.max_fee_per_gas)
                .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas);
        }

        request
    }
}

impl TransactionSigner for LocalSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn simulate(&self, tx: &TxRequest) -> Result<Bytes> {
        let request = self.to_request(tx);
        self.provider
            .call(request)
            .await
            .context("Transaction simulation failed")
    }

    async fn sign_and_send(&self, tx: TxRequest) -> Result<TxHash> {
        let request = self.to_request(&tx);

        // Send transaction - provider will fill nonce, gas, chain_id and sign
        let pending_tx = self
            .provider
            .send_transaction(request)
            .await
            .context("Failed to send transaction")?;

        Ok(*pending_tx.tx_hash())
    }

    async fn wait_for_confirmations(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> Result<TxConfirmation> {
        let receipt: TransactionReceipt = loop {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .context("Failed to get transaction receipt")?;

            if let Some(receipt) = receipt {
                break receipt;
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        };

        let mined_at = receipt.block_number.unwrap_or_default();

        // The inclusion block counts as the first confirmation
        loop {
            let head = self
                .provider
                .get_block_number()
                .await
                .context("Failed to get block number")?;

            let depth = head.saturating_sub(mined_at) + 1;
            if depth >= confirmations {
                break;
            }

            tracing::debug!(%tx_hash, depth, confirmations, "waiting for confirmations");
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        Ok(TxConfirmation {
            tx_hash,
            block_number: mined_at,
            success: receipt.status(),
            contract_address: receipt.contract_address,
            gas_used: receipt.gas_used,
        })
    }

    async fn estimate_fees(&self) -> Result<FeeEstimate> {
        let estimate = self
            .provider
            .estimate_eip1559_fees()
            .await
            .context("Failed to estimate fees")?;

        Ok(FeeEstimate {
            max_fee_per_gas: estimate.max_fee_per_gas,
            max_priority_fee_per_gas: estimate.max_priority_fee_per_gas,
        })
    }

    async fn get_balance(&self) -> Result<U256> {
        let balance: U256 = self
            .provider
            .get_balance(self.address)
            .await
            .context("Failed to get balance")?;

        Ok(balance)
    }
}

/// Read-only JSON-RPC provider without fillers (eth_call only)
#[derive(Clone)]
pub struct RpcReader {
    provider: Arc<RootProvider<Ethereum>>,
}

impl RpcReader {
    /// Connect to an HTTP RPC endpoint
    pub fn connect(rpc_url: impl AsRef<str>) -> Result<Self> {
        let url: Url = rpc_url.as_ref().parse().context("Invalid RPC URL")?;
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .network::<Ethereum>()
            .connect_http(url);

        Ok(Self {
            provider: Arc::new(provider),
        })
    }

    /// Chain ID reported by the endpoint
    pub async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .context("Failed to get chain id")
    }
}

impl ContractReader for RpcReader {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.provider
            .call(TransactionRequest::default().with_to(to).with_input(data))
            .await
            .context("eth_call failed")
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        self.provider
            .get_code_at(address)
            .await
            .context("Failed to get code")
    }
}
