//! Network configuration for the vault SDK

use alloy::primitives::{address, Address};
use eyre::{Context, Result};
use std::path::PathBuf;

/// Lido withdrawal queue on Ethereum mainnet
pub const MAINNET_LIDO_WITHDRAWAL: Address = address!("889edC2eDab5f40e902b864aD4d7AdE8E412F9B1");

/// wstETH on Ethereum mainnet
pub const MAINNET_WSTETH: Address = address!("7f39C581F595B53c5cb19bD0b3f8dA6c935E2Ca0");

/// WETH on Ethereum mainnet, the default deposit asset
pub const MAINNET_WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

/// Network configuration containing RPC URL and contract addresses
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Chain ID (1 for Ethereum mainnet)
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// Deposit asset (ERC20)
    pub asset: Address,
    /// Vault diamond proxy (unset before the first deployment)
    pub vault: Option<Address>,
    /// Staking protocol withdrawal queue
    pub lido_withdrawal: Address,
    /// Wrapped staked ETH token
    pub wsteth: Address,
    /// Contract receiving withdrawn staking funds
    pub receiver_contract: Address,
    /// Swap contract used to exit staked positions
    pub swap_contract: Address,
    /// Protocol fee recipient
    pub fee_collector: Address,
    /// Build artifacts (Hardhat or Foundry output) used by the deployer
    pub artifacts_dir: PathBuf,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkConfig {
    /// Create Ethereum mainnet configuration against a local node
    pub fn new() -> Self {
        Self {
            chain_id: 1,
            rpc_url: "http://127.0.0.1:8545".to_string(),
            asset: MAINNET_WETH,
            vault: None,
            lido_withdrawal: MAINNET_LIDO_WITHDRAWAL,
            wsteth: MAINNET_WSTETH,
            receiver_contract: Address::ZERO,
            swap_contract: Address::ZERO,
            fee_collector: Address::ZERO,
            artifacts_dir: PathBuf::from("out"),
        }
    }

    /// Build configuration from environment variables, falling back to mainnet defaults
    ///
    /// Recognized variables: `RPC_URL`, `CHAIN_ID`, `VAULT_ADDRESS`, `ASSET_ADDRESS`,
    /// `LIDO_WITHDRAWAL_ADDRESS`, `WSTETH_ADDRESS`, `RECEIVER_CONTRACT`, `SWAP_CONTRACT`,
    /// `FEE_COLLECTOR`, `ARTIFACTS_DIR`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();

        if let Some(rpc_url) = env_var("RPC_URL") {
            config.rpc_url = rpc_url;
        }
        if let Some(chain_id) = env_var("CHAIN_ID") {
            config.chain_id = chain_id
                .parse()
                .with_context(|| format!("Invalid CHAIN_ID: {chain_id}"))?;
        }
        if let Some(dir) = env_var("ARTIFACTS_DIR") {
            config.artifacts_dir = PathBuf::from(dir);
        }

        config.vault = env_address("VAULT_ADDRESS")?;
        config.asset = env_address("ASSET_ADDRESS")?.unwrap_or(config.asset);
        config.lido_withdrawal =
            env_address("LIDO_WITHDRAWAL_ADDRESS")?.unwrap_or(config.lido_withdrawal);
        config.wsteth = env_address("WSTETH_ADDRESS")?.unwrap_or(config.wsteth);
        config.receiver_contract =
            env_address("RECEIVER_CONTRACT")?.unwrap_or(config.receiver_contract);
        config.swap_contract = env_address("SWAP_CONTRACT")?.unwrap_or(config.swap_contract);
        config.fee_collector = env_address("FEE_COLLECTOR")?.unwrap_or(config.fee_collector);

        Ok(config)
    }

    /// Fail unless `chain_id` is the configured chain
    pub fn ensure_chain(&self, chain_id: u64) -> Result<()> {
        eyre::ensure!(
            chain_id == self.chain_id,
            "RPC endpoint {} serves chain {}, configured for chain {}",
            self.rpc_url,
            chain_id,
            self.chain_id
        );
        Ok(())
    }

    /// Set the expected chain ID
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Create custom configuration with specific RPC URL
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    /// Set the vault diamond address
    pub fn with_vault(mut self, vault: Address) -> Self {
        self.vault = Some(vault);
        self
    }

    /// Set the deposit asset
    pub fn with_asset(mut self, asset: Address) -> Self {
        self.asset = asset;
        self
    }

    /// Set the artifacts directory
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_address(name: &str) -> Result<Option<Address>> {
    env_var(name)
        .map(|v| {
            v.trim()
                .parse::<Address>()
                .with_context(|| format!("Invalid address in {name}: {v}"))
        })
        .transpose()
}
