//! Diamond cut assembly

use crate::contracts;
use crate::registry::SelectorRegistry;
use crate::selector::Selector;
use alloy::primitives::Address;
use std::collections::HashSet;

/// Cut action as encoded in `FacetCut.action`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FacetCutAction {
    #[default]
    Add = 0,
    Replace = 1,
    Remove = 2,
}

impl From<FacetCutAction> for u8 {
    fn from(action: FacetCutAction) -> u8 {
        action as u8
    }
}

/// One facet's entry in a diamond cut
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetCut {
    /// Facet name, for logs only
    pub facet_name: String,
    pub facet_address: Address,
    pub action: FacetCutAction,
    pub selectors: Vec<Selector>,
}

impl FacetCut {
    /// Route new selectors to a facet
    pub fn add(
        facet_name: impl Into<String>,
        facet_address: Address,
        selectors: Vec<Selector>,
    ) -> Self {
        Self {
            facet_name: facet_name.into(),
            facet_address,
            action: FacetCutAction::Add,
            selectors,
        }
    }

    /// Re-route existing selectors to a new facet implementation
    pub fn replace(
        facet_name: impl Into<String>,
        facet_address: Address,
        selectors: Vec<Selector>,
    ) -> Self {
        Self {
            facet_name: facet_name.into(),
            facet_address,
            action: FacetCutAction::Replace,
            selectors,
        }
    }

    /// Drop selectors from the diamond; the facet address must be zero
    pub fn remove(facet_name: impl Into<String>, selectors: Vec<Selector>) -> Self {
        Self {
            facet_name: facet_name.into(),
            facet_address: Address::ZERO,
            action: FacetCutAction::Remove,
            selectors,
        }
    }
}

impl From<&FacetCut> for contracts::FacetCut {
    fn from(cut: &FacetCut) -> Self {
        contracts::FacetCut {
            facetAddress: cut.facet_address,
            action: cut.action.into(),
            functionSelectors: cut.selectors.clone(),
        }
    }
}

/// Build the `Add` cuts of an initial deployment
///
/// One cut per facet in `facet_order` that still owns at least one selector which the
/// diamond does not already route. Facets left empty after collision resolution are
/// skipped, as are unknown and repeated names.
pub fn build_cuts(registry: &SelectorRegistry, facet_order: &[&str]) -> Vec<FacetCut> {
    let mut seen = HashSet::new();
    let mut cuts = Vec::new();

    for facet_name in facet_order {
        if !seen.insert(*facet_name) {
            continue;
        }

        let Some(facet_address) = registry.facet_address(facet_name) else {
            continue;
        };

        let selectors: Vec<Selector> = registry
            .accepted(facet_name)
            .iter()
            .filter(|selector| {
                registry
                    .owner_of(selector)
                    .is_some_and(|entry| !entry.already_deployed)
            })
            .copied()
            .collect();

        if selectors.is_empty() {
            tracing::debug!(facet = facet_name, "no selectors left, facet excluded from cut");
            continue;
        }

        cuts.push(FacetCut::add(*facet_name, facet_address, selectors));
    }

    cuts
}

/// ABI form of a cut list, ready for `diamondCut`
pub fn to_abi_cuts(cuts: &[FacetCut]) -> Vec<contracts::FacetCut> {
    cuts.iter().map(contracts::FacetCut::from).collect()
}
