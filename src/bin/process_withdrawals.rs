//! Finalize completed staking withdrawals and mint the resulting shares

use diamond_vault_sdk::cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cli::init();
    cli::finish(run().await)
}

async fn run() -> eyre::Result<()> {
    let client = cli::connect().await?;

    let receipt = client.process_completed_withdrawals().await?;

    println!("Processed in {} (block {})", receipt.tx_hash, receipt.block_number);
    println!("Share balance: {}", cli::balance_or_unavailable(receipt.shares));

    Ok(())
}
