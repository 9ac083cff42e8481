//! Deposit `DEPOSIT_AMOUNT` (in token units) into the vault

use diamond_vault_sdk::cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cli::init();
    cli::finish(run().await)
}

async fn run() -> eyre::Result<()> {
    let mut client = cli::connect().await?;
    let amount = cli::amount_from_env(&client, "DEPOSIT_AMOUNT").await?;

    let mut events = client.subscribe();
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            println!("[{}] {:?}", event.operation, event.stage);
        }
    });

    let preview = client.preview_deposit(amount).await?;
    println!("Depositing {} (expected shares: {})", amount, preview);

    let receipt = client.deposit(amount, client.address()).await?;

    println!("\n=== Deposit confirmed ===");
    println!("Transaction:   {}", receipt.tx_hash);
    println!("Block:         {}", receipt.block_number);
    println!("Share balance: {}", cli::balance_or_unavailable(receipt.shares));
    println!("Asset balance: {}", cli::balance_or_unavailable(receipt.asset_balance));

    Ok(())
}
