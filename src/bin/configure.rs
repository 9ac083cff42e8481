//! Push the integration addresses from the environment to the vault (owner only)
//!
//! Uses `LIDO_WITHDRAWAL_ADDRESS`, `WSTETH_ADDRESS`, `RECEIVER_CONTRACT`,
//! `SWAP_CONTRACT` and `FEE_COLLECTOR`, falling back to the mainnet defaults.

use diamond_vault_sdk::cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cli::init();
    cli::finish(run().await)
}

async fn run() -> eyre::Result<()> {
    let client = cli::connect().await?;
    let config = client.config();

    println!("Lido withdrawal: {}", config.lido_withdrawal);
    println!("wstETH:          {}", config.wsteth);
    println!("Receiver:        {}", config.receiver_contract);
    println!("Swap:            {}", config.swap_contract);
    println!("Fee collector:   {}", config.fee_collector);

    let confirmations = client.sync_integrations().await?;
    for confirmation in confirmations {
        println!("Confirmed {} in block {}", confirmation.tx_hash, confirmation.block_number);
    }

    Ok(())
}
