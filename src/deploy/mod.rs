//! Diamond deployment sequencing
//!
//! A deployment walks a fixed sequence of stages:
//!
//! ```text
//! NotStarted → CoreFacetDeployed → DiamondDeployed → FacetsDeployed
//!            → CutPrepared → CutExecuted → Verified → Done
//! ```
//!
//! The cut facet is deployed first because the diamond's constructor needs its
//! address. Every other facet and the initializer follow, then a single `diamondCut`
//! transaction routes all selectors and runs the initializer. Any failure before
//! verification aborts the run; verification itself only warns.

mod artifact;

pub use artifact::{Artifact, ArtifactStore, Artifacts};

use crate::client::VaultClient;
use crate::constants::DEFAULT_CONFIRMATIONS;
use crate::contracts::{IDiamondCut, IDiamondInit, IDiamondLoupe, IVaultDiamond, IERC173};
use crate::cut::{build_cuts, to_abi_cuts, FacetCut};
use crate::error::VaultError;
use crate::registry::{SelectorCollision, SelectorRegistry};
use crate::selector::{selectors_of, Abi, Selector};
use crate::signer::{ContractReader, TransactionSigner, TxRequest};
use alloy::primitives::{Address, TxHash, U256};
use alloy::sol_types::{SolCall, SolValue};
use eyre::eyre;
use futures::future::try_join_all;
use std::collections::HashSet;
use std::fmt;

/// Name of the facet deployed first and handed to the diamond constructor
pub const CUT_FACET: &str = "DiamondCutFacet";

/// Name of the diamond proxy contract
pub const DIAMOND: &str = "Diamond";

/// Name of the initializer run through `diamondCut`
pub const INITIALIZER: &str = "DiamondInit";

/// Facets cut into the diamond after the cut facet, in order
pub const DEFAULT_FACETS: &[&str] = &[
    "DiamondLoupeFacet",
    "OwnershipFacet",
    "VaultFacet",
    "LidoWithdrawalFacet",
    "AdminFacet",
];

/// Stage of a deployment run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeployStage {
    #[default]
    NotStarted,
    CoreFacetDeployed,
    DiamondDeployed,
    FacetsDeployed,
    CutPrepared,
    CutExecuted,
    Verified,
    Done,
    Failed,
}

impl DeployStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeployStage::Done | DeployStage::Failed)
    }
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A deployment run that failed; `stage` is the last stage reached
#[derive(Debug, thiserror::Error)]
#[error("Deployment failed after stage {stage}: {source}")]
pub struct DeployError {
    pub stage: DeployStage,
    #[source]
    pub source: VaultError,
    /// Contracts deployed before the failure
    pub deployed: Vec<(String, Address)>,
}

/// A deployed facet and the selectors its ABI exports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetDescriptor {
    pub name: String,
    pub abi: Abi,
    pub address: Address,
    /// In ABI declaration order
    pub selectors: Vec<Selector>,
}

/// What to deploy
#[derive(Debug, Clone)]
pub struct DeployPlan {
    /// Diamond owner passed to the constructor
    pub owner: Address,
    pub facets: Vec<String>,
}

impl DeployPlan {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            facets: DEFAULT_FACETS.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn with_facets<I, T>(mut self, facets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.facets = facets.into_iter().map(Into::into).collect();
        self
    }

    /// Every contract whose artifact the run needs
    pub fn contract_names(&self) -> Vec<&str> {
        let mut names = vec![CUT_FACET, DIAMOND];
        names.extend(self.facets.iter().map(String::as_str));
        names.push(INITIALIZER);
        names
    }
}

/// Outcome of a deployment run
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub diamond: Address,
    pub initializer: Address,
    /// Cut facet first, then the remaining facets in deployment order
    pub facets: Vec<FacetDescriptor>,
    pub cuts: Vec<FacetCut>,
    /// `None` when there was nothing to cut
    pub cut_tx: Option<TxHash>,
    pub collisions: Vec<SelectorCollision>,
    /// Post-deployment checks that did not pass
    pub warnings: Vec<String>,
    pub stage: DeployStage,
}

impl DeploymentReport {
    pub fn facet_address(&self, name: &str) -> Option<Address> {
        self.facets
            .iter()
            .find(|facet| facet.name == name)
            .map(|facet| facet.address)
    }
}

/// Deploys a diamond and its facets through a client's signer
pub struct DeploymentSequencer<'a, S: TransactionSigner, R: ContractReader> {
    client: &'a VaultClient<S, R>,
    plan: DeployPlan,
    artifacts: Artifacts,
    stage: DeployStage,
    deployed: Vec<(String, Address)>,
    registry: SelectorRegistry,
}

impl<'a, S: TransactionSigner, R: ContractReader> DeploymentSequencer<'a, S, R> {
    pub fn new(client: &'a VaultClient<S, R>, plan: DeployPlan, artifacts: Artifacts) -> Self {
        Self {
            client,
            plan,
            artifacts,
            stage: DeployStage::NotStarted,
            deployed: Vec::new(),
            registry: SelectorRegistry::new(),
        }
    }

    pub fn stage(&self) -> DeployStage {
        self.stage
    }

    /// Run the deployment to completion
    ///
    /// On failure the sequencer moves to [`DeployStage::Failed`]; the error carries
    /// the last stage reached. A sequencer runs once.
    pub async fn run(&mut self) -> Result<DeploymentReport, DeployError> {
        if self.stage.is_terminal() {
            return Err(DeployError {
                stage: self.stage,
                source: eyre!("Deployment already finished with stage {}", self.stage).into(),
                deployed: self.deployed.clone(),
            });
        }

        match self.execute().await {
            Ok(report) => Ok(report),
            Err(source) => {
                let stage = self.stage;
                self.stage = DeployStage::Failed;
                tracing::error!(%stage, error = %format_args!("{source:#}"), "deployment failed");

                Err(DeployError {
                    stage,
                    source,
                    deployed: self.deployed.clone(),
                })
            }
        }
    }

    async fn execute(&mut self) -> Result<DeploymentReport, VaultError> {
        let missing: Vec<&str> = self
            .plan
            .contract_names()
            .into_iter()
            .filter(|name| !self.artifacts.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(eyre!("Missing artifacts: {}", missing.join(", ")).into());
        }

        let cut_facet = self.deploy_facet(CUT_FACET).await?;
        self.advance(DeployStage::CoreFacetDeployed);

        let constructor_args = (self.plan.owner, cut_facet.address).abi_encode_params();
        let diamond = self.deploy_contract(DIAMOND, constructor_args).await?;
        self.advance(DeployStage::DiamondDeployed);

        let mut facets = vec![cut_facet];
        for name in self.plan.facets.clone() {
            facets.push(self.deploy_facet(&name).await?);
        }
        let initializer = self.deploy_contract(INITIALIZER, Vec::new()).await?;
        self.advance(DeployStage::FacetsDeployed);

        let cuts = self.prepare_cuts(&facets);
        self.advance(DeployStage::CutPrepared);

        let cut_tx = self.execute_cut(diamond, initializer, &cuts).await?;
        self.advance(DeployStage::CutExecuted);

        let warnings = self.verify(diamond, &cuts).await;
        self.advance(DeployStage::Verified);

        self.advance(DeployStage::Done);
        Ok(DeploymentReport {
            diamond,
            initializer,
            facets,
            cuts,
            cut_tx,
            collisions: self.registry.collisions().to_vec(),
            warnings,
            stage: self.stage,
        })
    }

    fn advance(&mut self, next: DeployStage) {
        tracing::info!(from = %self.stage, to = %next, "deployment stage");
        self.stage = next;
    }

    async fn deploy_facet(&mut self, name: &str) -> Result<FacetDescriptor, VaultError> {
        let address = self.deploy_contract(name, Vec::new()).await?;
        let abi = self.artifact(name)?.abi.clone();
        let selectors = selectors_of(&abi);

        Ok(FacetDescriptor {
            name: name.to_string(),
            abi,
            address,
            selectors,
        })
    }

    async fn deploy_contract(
        &mut self,
        name: &str,
        constructor_args: Vec<u8>,
    ) -> Result<Address, VaultError> {
        let mut init_code = self.artifact(name)?.bytecode()?.to_vec();
        init_code.extend_from_slice(&constructor_args);

        let confirmation = self
            .client
            .submit("deploy", TxRequest::deploy(init_code), DEFAULT_CONFIRMATIONS)
            .await?;
        let address = confirmation
            .contract_address
            .ok_or_else(|| eyre!("Receipt of {} deployment has no contract address", name))?;

        tracing::info!(
            contract = name,
            %address,
            tx_hash = %confirmation.tx_hash,
            "deployed contract"
        );
        self.deployed.push((name.to_string(), address));
        Ok(address)
    }

    fn artifact(&self, name: &str) -> Result<&Artifact, VaultError> {
        self.artifacts
            .get(name)
            .ok_or_else(|| eyre!("No artifact loaded for {}", name).into())
    }

    /// Register every facet's selectors and assemble the cut list
    fn prepare_cuts(&mut self, facets: &[FacetDescriptor]) -> Vec<FacetCut> {
        let Some((cut_facet, rest)) = facets.split_first() else {
            return Vec::new();
        };

        // The constructor already routes the cut facet's selectors
        self.registry.register_deployed(
            &cut_facet.selectors,
            &cut_facet.name,
            &cut_facet.abi,
            cut_facet.address,
        );
        for facet in rest {
            self.registry
                .register_selectors(&facet.selectors, &facet.name, &facet.abi, facet.address);
        }

        let order: Vec<&str> = rest.iter().map(|facet| facet.name.as_str()).collect();
        let cuts = build_cuts(&self.registry, &order);

        tracing::info!(
            cuts = cuts.len(),
            selectors = self.registry.len(),
            collisions = self.registry.collisions().len(),
            "diamond cut prepared"
        );
        cuts
    }

    async fn execute_cut(
        &self,
        diamond: Address,
        initializer: Address,
        cuts: &[FacetCut],
    ) -> Result<Option<TxHash>, VaultError> {
        if cuts.is_empty() {
            tracing::info!("nothing to cut, skipping diamondCut");
            return Ok(None);
        }

        let config = self.client.config();
        let init = IDiamondInit::initCall {
            asset: config.asset,
            lidoWithdrawal: config.lido_withdrawal,
            wstETH: config.wsteth,
            receiverContract: config.receiver_contract,
            swapContract: config.swap_contract,
            feeCollector: config.fee_collector,
        };
        let call = IDiamondCut::diamondCutCall {
            _diamondCut: to_abi_cuts(cuts),
            _init: initializer,
            _calldata: init.abi_encode().into(),
        };

        let confirmation = self
            .client
            .submit(
                "diamondCut",
                TxRequest::new(diamond, call.abi_encode()),
                DEFAULT_CONFIRMATIONS,
            )
            .await?;
        Ok(Some(confirmation.tx_hash))
    }

    /// Read back facets, owner and total assets; mismatches are reported, never fatal
    async fn verify(&self, diamond: Address, cuts: &[FacetCut]) -> Vec<String> {
        let mut warnings = Vec::new();

        let routed = cuts.iter().map(|cut| async move {
            let selectors = self
                .client
                .read(
                    diamond,
                    IDiamondLoupe::facetFunctionSelectorsCall {
                        _facet: cut.facet_address,
                    },
                )
                .await?;
            Ok::<_, eyre::Report>((cut, selectors))
        });
        match try_join_all(routed).await {
            Ok(results) => {
                for (cut, selectors) in results {
                    let routed: HashSet<Selector> = selectors.into_iter().collect();
                    let missing = cut
                        .selectors
                        .iter()
                        .filter(|selector| !routed.contains(*selector))
                        .count();
                    if missing > 0 {
                        warnings.push(format!(
                            "{} is missing {} of {} selectors",
                            cut.facet_name,
                            missing,
                            cut.selectors.len()
                        ));
                    }
                }
            }
            Err(err) => warnings.push(format!("Could not read facet selectors: {err:#}")),
        }

        match self.client.read(diamond, IDiamondLoupe::facetsCall {}).await {
            Ok(facets) => tracing::info!(facets = facets.len(), "diamond facets"),
            Err(err) => warnings.push(format!("Could not read facets: {err:#}")),
        }

        match self.client.read(diamond, IERC173::ownerCall {}).await {
            Ok(owner) if owner == self.plan.owner => {}
            Ok(owner) => warnings.push(format!(
                "Owner is {owner}, expected {}",
                self.plan.owner
            )),
            Err(err) => warnings.push(format!("Could not read owner: {err:#}")),
        }

        match self
            .client
            .read(diamond, IVaultDiamond::totalAssetsCall {})
            .await
        {
            Ok(total_assets) if total_assets == U256::ZERO => {}
            Ok(total_assets) => warnings.push(format!(
                "Fresh vault reports {total_assets} total assets"
            )),
            Err(err) => warnings.push(format!("Could not read totalAssets: {err:#}")),
        }

        for warning in &warnings {
            tracing::warn!(%diamond, "verification: {}", warning);
        }
        warnings
    }
}
