//! Withdraw `WITHDRAW_AMOUNT` (in token units) from the vault to the signer

use diamond_vault_sdk::cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cli::init();
    cli::finish(run().await)
}

async fn run() -> eyre::Result<()> {
    let client = cli::connect().await?;
    let amount = cli::amount_from_env(&client, "WITHDRAW_AMOUNT").await?;
    let owner = client.address();

    let state = client.withdrawal_state(owner).await?;
    println!("Withdrawable: {}", state.withdrawable);
    println!("Locked:       {}", state.locked);
    println!("Shares:       {}", state.shares);

    let receipt = client.withdraw(amount, owner, owner).await?;

    println!("\n=== Withdrawal confirmed ===");
    println!("Transaction:   {}", receipt.tx_hash);
    println!("Block:         {}", receipt.block_number);
    println!("Shares burned: {}", receipt.shares_burned);

    Ok(())
}
