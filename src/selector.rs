//! Function selector derivation from JSON ABIs
//!
//! The ABI is kept as the ordered list of its items so selectors come out in
//! declaration order, which keeps deployments and their logs reproducible.

use crate::constants::RESERVED_FUNCTIONS;
use alloy::json_abi::{AbiItem, Function};
use alloy::primitives::keccak256;
use eyre::{Context, Result};
use serde::Deserialize;

pub use alloy::primitives::Selector;

/// Contract ABI in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Abi(pub Vec<AbiItem<'static>>);

impl Abi {
    /// Parse a JSON ABI array
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse ABI")
    }

    /// Function items in declaration order
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.0.iter().filter_map(|item| match item {
            AbiItem::Function(function) => Some(&**function),
            _ => None,
        })
    }

    /// Functions eligible for diamond registration, in declaration order
    pub fn facet_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions()
            .filter(|function| !RESERVED_FUNCTIONS.contains(&function.name.as_str()))
    }

    /// Canonical signature of a selector exported by this ABI
    pub fn signature_of(&self, selector: &Selector) -> Option<String> {
        self.functions()
            .find(|function| function.selector() == *selector)
            .map(Function::signature)
    }
}

/// Selector of a canonical signature: first 4 bytes of its Keccak-256 hash
pub fn selector(signature: &str) -> Selector {
    Selector::from_slice(&keccak256(signature.as_bytes())[..4])
}

/// Selectors of every function in the ABI except `init` and `supportsInterface`,
/// in declaration order
pub fn selectors_of(abi: &Abi) -> Vec<Selector> {
    abi.facet_functions().map(Function::selector).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{IDiamondCut, IVaultDiamond, IERC20};
    use alloy::sol_types::SolCall;

    const VAULT_ABI: &str = r#"[
        {"type": "constructor", "inputs": []},
        {"type": "function", "name": "deposit", "inputs": [
            {"name": "assets", "type": "uint256"},
            {"name": "receiver", "type": "address"}
        ], "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "nonpayable"},
        {"type": "event", "name": "Deposit", "inputs": [], "anonymous": false},
        {"type": "function", "name": "init", "inputs": [{"name": "a", "type": "address"}],
            "outputs": []},
        {"type": "function", "name": "totalAssets", "inputs": [], "outputs": []},
        {"type": "function", "name": "supportsInterface",
            "inputs": [{"name": "id", "type": "bytes4"}], "outputs": []},
        {"type": "error", "name": "DepositAlreadyQueued", "inputs": []},
        {"type": "function", "name": "balanceOf",
            "inputs": [{"name": "account", "type": "address"}], "outputs": []}
    ]"#;

    #[test]
    fn test_known_selectors() {
        assert_eq!(
            selector("transfer(address,uint256)"),
            Selector::from([0xa9, 0x05, 0x9c, 0xbb])
        );
        assert_eq!(
            selector("balanceOf(address)"),
            Selector::from(IERC20::balanceOfCall::SELECTOR)
        );
    }

    #[test]
    fn test_selectors_in_declaration_order_without_reserved() {
        let abi = Abi::from_json(VAULT_ABI).unwrap();
        let selectors = selectors_of(&abi);

        assert_eq!(
            selectors,
            vec![
                Selector::from(IVaultDiamond::depositCall::SELECTOR),
                Selector::from(IVaultDiamond::totalAssetsCall::SELECTOR),
                Selector::from(IVaultDiamond::balanceOfCall::SELECTOR),
            ]
        );
        assert!(!selectors.contains(&selector("supportsInterface(bytes4)")));
        assert!(!selectors.contains(&selector("init(address)")));
    }

    #[test]
    fn test_tuple_parameters_are_expanded() {
        let abi = Abi::from_json(
            r#"[{"type": "function", "name": "diamondCut", "inputs": [
                {"name": "_diamondCut", "type": "tuple[]", "components": [
                    {"name": "facetAddress", "type": "address"},
                    {"name": "action", "type": "uint8"},
                    {"name": "functionSelectors", "type": "bytes4[]"}
                ]},
                {"name": "_init", "type": "address"},
                {"name": "_calldata", "type": "bytes"}
            ], "outputs": []}]"#,
        )
        .unwrap();

        let function = abi.functions().next().unwrap();
        assert_eq!(
            function.signature(),
            "diamondCut((address,uint8,bytes4[])[],address,bytes)"
        );
        assert_eq!(
            selectors_of(&abi),
            vec![Selector::from(IDiamondCut::diamondCutCall::SELECTOR)]
        );
    }

    #[test]
    fn test_no_eligible_functions() {
        let abi = Abi::from_json(
            r#"[{"type": "function", "name": "init", "inputs": [], "outputs": []},
                {"type": "event", "name": "Initialized", "inputs": [], "anonymous": false}]"#,
        )
        .unwrap();
        assert!(selectors_of(&abi).is_empty());
        assert!(selectors_of(&Abi::default()).is_empty());
    }

    #[test]
    fn test_signature_lookup() {
        let abi = Abi::from_json(VAULT_ABI).unwrap();
        assert_eq!(
            abi.signature_of(&selector("totalAssets()")).as_deref(),
            Some("totalAssets()")
        );
        assert_eq!(abi.signature_of(&selector("nope()")), None);
    }
}
