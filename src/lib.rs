//! Diamond Vault SDK for Rust
//!
//! A Rust SDK and operator programs for a multi-facet (EIP-2535 "diamond") vault that
//! splits every deposit between a liquid reserve and a staking protocol.
//!
//! # Features
//!
//! - Derive facet selectors from JSON ABIs and resolve collisions between facets
//! - Assemble the diamond cut and deploy the whole diamond in one run
//! - Deposit with balance, limit, timelock-queue and allowance guards
//! - Withdraw with lock/unlock inspection and finalize staking withdrawals
//! - Owner-only configuration and vault overview
//!
//! # Example
//!
//! ```rust,ignore
//! use diamond_vault_sdk::{LocalSigner, NetworkConfig, VaultClient};
//! use alloy::primitives::U256;
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let config = NetworkConfig::from_env()?;
//!     let signer = LocalSigner::from_private_key("0x...", &config.rpc_url).await?;
//!     let mut client = VaultClient::connect(signer, config).await?;
//!
//!     // Follow every transaction stage
//!     let mut events = client.subscribe();
//!     tokio::spawn(async move {
//!         while let Some(event) = events.recv().await {
//!             println!("{}: {:?}", event.operation, event.stage);
//!         }
//!     });
//!
//!     let receipt = client.deposit(U256::from(1_000_000u64), client.address()).await?;
//!     println!("shares: {:?}", receipt.shares);
//!
//!     client.disconnect();
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod contracts;
pub mod cut;
pub mod deploy;
pub mod deposit;
pub mod error;
pub mod events;
pub mod registry;
pub mod revert;
pub mod selector;
pub mod signer;
pub mod types;
pub mod withdraw;

#[cfg(test)]
mod mock;

// Re-export main types for convenience
pub use client::VaultClient;
pub use config::NetworkConfig;
pub use cut::{build_cuts, FacetCut, FacetCutAction};
pub use deploy::{
    ArtifactStore, DeployError, DeployPlan, DeployStage, DeploymentReport, DeploymentSequencer,
    FacetDescriptor,
};
pub use error::{eyre, Context, Report, Result, VaultError};
pub use events::{TxEvent, TxStage};
pub use registry::{SelectorCollision, SelectorRegistry};
pub use revert::RevertReason;
pub use selector::{selector, selectors_of, Abi, Selector};
pub use signer::{
    ContractReader, FeeEstimate, LocalSigner, RpcReader, TransactionSigner, TxConfirmation,
    TxRequest,
};
pub use types::{
    DepositIntent, DepositReceipt, ProcessWithdrawalsReceipt, VaultOverview, VaultPosition,
    WithdrawReceipt, WithdrawalState,
};
