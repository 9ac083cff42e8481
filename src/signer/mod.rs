//! Transaction signer abstraction for the vault SDK
//!
//! This module provides a trait-based abstraction for reading contract state and for
//! simulating, signing and sending transactions, so the orchestrators can run against
//! a live node through [`LocalSigner`] / [`RpcReader`] or against an in-memory chain
//! in tests.

mod local;

pub use local::{LocalSigner, RpcReader};

use alloy::primitives::{Address, Bytes, TxHash, U256};
use eyre::Result;

/// Transaction request parameters
#[derive(Debug, Clone)]
pub struct TxRequest {
    /// Target contract address, `None` for a contract creation
    pub to: Option<Address>,
    /// Transaction value in wei
    pub value: U256,
    /// Encoded calldata, or init code for a contract creation
    pub data: Bytes,
    /// Optional gas limit override
    pub gas_limit: Option<u64>,
    /// Optional EIP-1559 fee override
    pub fees: Option<FeeEstimate>,
}

impl TxRequest {
    /// Create a new transaction request
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to: Some(to),
            value: U256::ZERO,
            data: data.into(),
            gas_limit: None,
            fees: None,
        }
    }

    /// Create a contract deployment from init code (bytecode plus encoded constructor args)
    pub fn deploy(init_code: impl Into<Bytes>) -> Self {
        Self {
            to: None,
            value: U256::ZERO,
            data: init_code.into(),
            gas_limit: None,
            fees: None,
        }
    }

    /// Set transaction value
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set gas limit
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Set EIP-1559 fee fields
    pub fn with_fees(mut self, fees: FeeEstimate) -> Self {
        self.fees = Some(fees);
        self
    }

    /// 4-byte function selector of the calldata, if any
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.to?;
        self.data.get(..4).and_then(|s| s.try_into().ok())
    }
}

/// EIP-1559 fee parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// Summary of a mined transaction once the requested confirmation depth is reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxConfirmation {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// `false` when the transaction was mined but reverted
    pub success: bool,
    /// Address of the created contract for deployments
    pub contract_address: Option<Address>,
    pub gas_used: u64,
}

/// Trait for read-only contract calls (`eth_call`)
pub trait ContractReader: Send + Sync {
    /// Executes a call against the latest block and returns the raw return data
    fn call(
        &self,
        to: Address,
        data: Bytes,
    ) -> impl std::future::Future<Output = Result<Bytes>> + Send;

    /// Returns the deployed bytecode at an address
    fn code_at(&self, address: Address) -> impl std::future::Future<Output = Result<Bytes>> + Send;
}

/// Trait for signing and sending EVM transactions
pub trait TransactionSigner: Send + Sync {
    /// Returns the signer's EVM address
    fn address(&self) -> Address;

    /// Executes the transaction as a call from the signer's address without sending it,
    /// surfacing revert reasons before any gas is spent
    fn simulate(&self, tx: &TxRequest) -> impl std::future::Future<Output = Result<Bytes>> + Send;

    /// Signs and sends a transaction, returning the transaction hash
    fn sign_and_send(
        &self,
        tx: TxRequest,
    ) -> impl std::future::Future<Output = Result<TxHash>> + Send;

    /// Waits until the transaction is mined and `confirmations` blocks deep
    ///
    /// There is no timeout here; only the provider's own transport timeouts apply.
    fn wait_for_confirmations(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> impl std::future::Future<Output = Result<TxConfirmation>> + Send;

    /// Current EIP-1559 fee estimate from the network
    fn estimate_fees(&self) -> impl std::future::Future<Output = Result<FeeEstimate>> + Send;

    /// Gets the native token balance
    fn get_balance(&self) -> impl std::future::Future<Output = Result<U256>> + Send;
}
