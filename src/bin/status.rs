//! Print the vault overview and the signer's position

use diamond_vault_sdk::{cli, types::pending_unlocks};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

#[tokio::main]
async fn main() -> ExitCode {
    cli::init();
    cli::finish(run().await)
}

async fn run() -> eyre::Result<()> {
    let client = cli::connect().await?;
    let account = client.address();

    let (overview, position, state, eth_balance) = tokio::join!(
        client.vault_overview(),
        client.position(account),
        client.withdrawal_state(account),
        client.get_eth_balance(),
    );
    let overview = overview?;

    println!("=== Vault {} ===", overview.vault);
    println!("Owner:        {}", overview.owner);
    println!("Total assets: {}", overview.total_assets);
    println!("Total shares: {}", overview.total_shares);
    println!("Paused:       {}", overview.paused);
    println!("Shut down:    {}", overview.shutdown);
    println!("Facets:       {}", overview.facet_count);

    println!("\n=== Account {} ===", account);
    if let Ok(balance) = eth_balance {
        println!("ETH balance:  {}", balance);
    }

    let position = position?;
    println!("Shares:       {}", position.shares);
    println!("Withdrawable: {:.6}", position.withdrawable_f64());
    println!("Locked:       {:.6}", position.locked_f64());

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let state = state?;
    let pending = pending_unlocks(&state.unlock_times, now);
    println!(
        "Deposits:     {} matured, {} pending",
        state.matured_deposits(now),
        pending.len()
    );
    if let Some(next) = pending.first() {
        println!("Next unlock in {} min", next.saturating_sub(now).div_ceil(60));
    }

    Ok(())
}
