//! Shared setup for the operator programs in `src/bin`

use crate::client::VaultClient;
use crate::config::NetworkConfig;
use crate::constants::scale_to_decimals;
use crate::error::VaultError;
use crate::signer::{LocalSigner, TransactionSigner};
use alloy::primitives::U256;
use eyre::{eyre, Result};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Load `.env` and install the log subscriber (`RUST_LOG`, default `info`)
///
/// Logs go to stderr; stdout carries only program output.
pub fn init() {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read a variable that must be set and non-empty
pub fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| eyre!("{} must be set", name))
}

/// Connect a client using `PRIVATE_KEY` and the environment configuration
pub async fn connect() -> Result<VaultClient<LocalSigner>> {
    let config = NetworkConfig::from_env()?;
    let private_key = required_var("PRIVATE_KEY")?;
    let signer = LocalSigner::from_private_key(&private_key, &config.rpc_url).await?;

    VaultClient::connect(signer, config).await
}

/// Amount from a decimal-string variable, scaled by the asset's decimals
pub async fn amount_from_env<S: TransactionSigner>(
    client: &VaultClient<S>,
    name: &str,
) -> Result<U256> {
    let value = required_var(name)?;
    let decimals = client.asset_decimals().await?;
    scale_to_decimals(&value, decimals)
}

/// Balance for display; refreshed balances may be missing after a confirmed transaction
pub fn balance_or_unavailable(balance: Option<U256>) -> String {
    balance.map_or_else(|| "unavailable".to_string(), |value| value.to_string())
}

/// Print the outcome of a program run and turn it into its exit code
pub fn finish(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, "program failed");
            eprintln!("Error: {}", error_message(&err));
            ExitCode::FAILURE
        }
    }
}

/// What the operator sees for a failed run
///
/// Vault errors use their user message, which keeps the provider's text for
/// unclassified failures. Anything else prints its full context chain.
pub fn error_message(err: &eyre::Report) -> String {
    match err.downcast_ref::<VaultError>() {
        Some(vault_err) => vault_err.user_message(),
        None => format!("{err:#}"),
    }
}
