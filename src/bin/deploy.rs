//! Deploy the vault diamond with all of its facets
//!
//! Artifacts are read from `ARTIFACTS_DIR`; the signer becomes the diamond owner.

use diamond_vault_sdk::{cli, ArtifactStore, DeployPlan, DeploymentSequencer};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cli::init();
    cli::finish(run().await)
}

async fn run() -> eyre::Result<()> {
    let client = cli::connect().await?;

    let plan = DeployPlan::new(client.address());
    let store = ArtifactStore::new(client.config().artifacts_dir.clone());
    let artifacts = store.load_all(plan.contract_names())?;

    println!("Deploying diamond from {}", store.dir().display());
    let report = DeploymentSequencer::new(&client, plan, artifacts)
        .run()
        .await?;

    println!("\n=== Deployment ===");
    println!("Diamond:     {}", report.diamond);
    println!("Initializer: {}", report.initializer);
    for facet in &report.facets {
        println!("  {:<24} {} ({} selectors)", facet.name, facet.address, facet.selectors.len());
    }
    for cut in &report.cuts {
        println!("  cut {:<20} {} selectors", cut.facet_name, cut.selectors.len());
    }
    match report.cut_tx {
        Some(tx_hash) => println!("diamondCut tx: {}", tx_hash),
        None => println!("diamondCut skipped, nothing to cut"),
    }
    for collision in &report.collisions {
        println!(
            "Collision: {} {} kept by {}, dropped from {}",
            collision.selector,
            collision.signature,
            collision.existing_facet,
            collision.incoming_facet
        );
    }
    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }
    println!("\nSet VAULT_ADDRESS={} to operate this vault", report.diamond);

    Ok(())
}
