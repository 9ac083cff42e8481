//! Selector registry: which facet owns which function selector
//!
//! Registration is a first-writer-wins fold. A selector that is already owned by a
//! different facet is rejected and logged, the existing owner is never replaced.
//! The caller decides precedence through the order in which facets are registered.

use crate::selector::{Abi, Selector};
use alloy::primitives::Address;
use std::collections::HashMap;

/// Owner record of one selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorEntry {
    /// Facet name, e.g. `"VaultFacet"`
    pub facet: String,
    /// Human-readable signature, e.g. `"deposit(uint256,address)"`
    pub signature: String,
    pub address: Address,
    /// Selector is already routed by the diamond (e.g. `diamondCut` added by the constructor)
    pub already_deployed: bool,
}

/// A rejected registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorCollision {
    pub selector: Selector,
    pub existing_facet: String,
    pub incoming_facet: String,
    pub signature: String,
}

/// Selector → facet mapping for one deployment run
#[derive(Debug, Clone, Default)]
pub struct SelectorRegistry {
    entries: HashMap<Selector, SelectorEntry>,
    /// Accepted selectors per facet, in registration order
    accepted: HashMap<String, Vec<Selector>>,
    addresses: HashMap<String, Address>,
    collisions: Vec<SelectorCollision>,
}

impl SelectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a facet's selectors, returning the ones this facet ended up owning
    ///
    /// # Arguments
    ///
    /// * `selectors` - Selectors derived from the facet ABI, in declaration order
    /// * `facet_name` - Facet name used in logs and cut assembly
    /// * `abi` - Facet ABI, used to name the colliding signature
    /// * `address` - Deployed facet address
    pub fn register_selectors(
        &mut self,
        selectors: &[Selector],
        facet_name: &str,
        abi: &Abi,
        address: Address,
    ) -> Vec<Selector> {
        self.register(selectors, facet_name, abi, address, false)
    }

    /// Register selectors the diamond already routes, so they are never cut again
    /// and never lost to a later facet
    pub fn register_deployed(
        &mut self,
        selectors: &[Selector],
        facet_name: &str,
        abi: &Abi,
        address: Address,
    ) -> Vec<Selector> {
        self.register(selectors, facet_name, abi, address, true)
    }

    fn register(
        &mut self,
        selectors: &[Selector],
        facet_name: &str,
        abi: &Abi,
        address: Address,
        already_deployed: bool,
    ) -> Vec<Selector> {
        self.addresses.insert(facet_name.to_string(), address);
        let accepted_list = self.accepted.entry(facet_name.to_string()).or_default();
        let mut accepted = Vec::with_capacity(selectors.len());

        for selector in selectors {
            let signature = abi
                .signature_of(selector)
                .unwrap_or_else(|| selector.to_string());

            if let Some(existing) = self.entries.get(selector) {
                // Re-registering the same facet is a no-op
                if existing.facet == facet_name && existing.address == address {
                    accepted.push(*selector);
                    continue;
                }

                tracing::warn!(
                    %selector,
                    existing_facet = %existing.facet,
                    existing_signature = %existing.signature,
                    incoming_facet = facet_name,
                    incoming_signature = %signature,
                    "selector collision, keeping existing facet"
                );
                self.collisions.push(SelectorCollision {
                    selector: *selector,
                    existing_facet: existing.facet.clone(),
                    incoming_facet: facet_name.to_string(),
                    signature,
                });
                continue;
            }

            self.entries.insert(
                *selector,
                SelectorEntry {
                    facet: facet_name.to_string(),
                    signature,
                    address,
                    already_deployed,
                },
            );
            accepted_list.push(*selector);
            accepted.push(*selector);
        }

        tracing::debug!(
            facet = facet_name,
            %address,
            accepted = accepted.len(),
            offered = selectors.len(),
            "registered facet selectors"
        );

        accepted
    }

    /// Owner record of a selector
    pub fn owner_of(&self, selector: &Selector) -> Option<&SelectorEntry> {
        self.entries.get(selector)
    }

    /// Selectors accepted for a facet, in registration order
    pub fn accepted(&self, facet_name: &str) -> &[Selector] {
        self.accepted
            .get(facet_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Address a facet was registered with
    pub fn facet_address(&self, facet_name: &str) -> Option<Address> {
        self.addresses.get(facet_name).copied()
    }

    /// All rejected registrations so far
    pub fn collisions(&self) -> &[SelectorCollision] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::selector;

    fn facet_a() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn facet_b() -> Address {
        Address::repeat_byte(0xbb)
    }

    #[test]
    fn test_first_writer_wins() {
        let s1 = selector("a()");
        let s2 = selector("shared()");
        let s3 = selector("b()");
        let mut registry = SelectorRegistry::new();

        let accepted_a =
            registry.register_selectors(&[s1, s2], "FacetA", &Abi::default(), facet_a());
        let accepted_b =
            registry.register_selectors(&[s2, s3], "FacetB", &Abi::default(), facet_b());

        assert_eq!(accepted_a, vec![s1, s2]);
        assert_eq!(accepted_b, vec![s3]);
        assert_eq!(registry.owner_of(&s2).unwrap().facet, "FacetA");
        assert_eq!(registry.owner_of(&s2).unwrap().address, facet_a());
        assert_eq!(registry.len(), 3);

        let collisions = registry.collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].existing_facet, "FacetA");
        assert_eq!(collisions[0].incoming_facet, "FacetB");
    }

    #[test]
    fn test_collision_names_signature_from_abi() {
        let abi = Abi::from_json(
            r#"[{"type": "function", "name": "shared", "inputs": [], "outputs": []}]"#,
        )
        .unwrap();
        let shared = selector("shared()");
        let mut registry = SelectorRegistry::new();

        registry.register_selectors(&[shared], "FacetA", &abi, facet_a());
        registry.register_selectors(&[shared], "FacetB", &abi, facet_b());

        assert_eq!(registry.collisions()[0].signature, "shared()");
        assert_eq!(registry.owner_of(&shared).unwrap().signature, "shared()");
    }

    #[test]
    fn test_order_decides_owner() {
        let shared = selector("shared()");

        let mut forward = SelectorRegistry::new();
        forward.register_selectors(&[shared], "FacetA", &Abi::default(), facet_a());
        forward.register_selectors(&[shared], "FacetB", &Abi::default(), facet_b());

        let mut reverse = SelectorRegistry::new();
        reverse.register_selectors(&[shared], "FacetB", &Abi::default(), facet_b());
        reverse.register_selectors(&[shared], "FacetA", &Abi::default(), facet_a());

        assert_eq!(forward.owner_of(&shared).unwrap().facet, "FacetA");
        assert_eq!(reverse.owner_of(&shared).unwrap().facet, "FacetB");
    }

    #[test]
    fn test_reregistering_same_facet_is_idempotent() {
        let s1 = selector("a()");
        let mut registry = SelectorRegistry::new();

        registry.register_selectors(&[s1], "FacetA", &Abi::default(), facet_a());
        let again = registry.register_selectors(&[s1], "FacetA", &Abi::default(), facet_a());

        assert_eq!(again, vec![s1]);
        assert_eq!(registry.accepted("FacetA"), &[s1]);
        assert!(registry.collisions().is_empty());
    }

    #[test]
    fn test_deployed_selectors_block_later_facets() {
        let cut = selector("diamondCut((address,uint8,bytes4[])[],address,bytes)");
        let mut registry = SelectorRegistry::new();

        registry.register_deployed(&[cut], "DiamondCutFacet", &Abi::default(), facet_a());
        let accepted = registry.register_selectors(&[cut], "Other", &Abi::default(), facet_b());

        assert!(accepted.is_empty());
        assert!(registry.owner_of(&cut).unwrap().already_deployed);
        assert!(registry.accepted("Unknown").is_empty());
    }
}
