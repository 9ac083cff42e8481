//! EIP-2535 diamond bindings: cut, loupe, ownership and initializer

use alloy::sol;

sol! {
    /// One facet cut as consumed by `diamondCut`
    #[derive(Debug, Default, PartialEq, Eq)]
    struct FacetCut {
        address facetAddress;
        uint8 action;          // 0 = Add, 1 = Replace, 2 = Remove
        bytes4[] functionSelectors;
    }

    /// Facet as reported by the loupe
    #[derive(Debug, Default, PartialEq, Eq)]
    struct Facet {
        address facetAddress;
        bytes4[] functionSelectors;
    }

    /// Cut facet interface
    #[sol(rpc)]
    interface IDiamondCut {
        /// Add/replace/remove any number of functions and optionally execute
        /// a function with delegatecall
        function diamondCut(
            FacetCut[] calldata _diamondCut,
            address _init,
            bytes calldata _calldata
        ) external;

        event DiamondCut(FacetCut[] _diamondCut, address _init, bytes _calldata);
    }

    /// Loupe facet interface
    #[sol(rpc)]
    interface IDiamondLoupe {
        function facets() external view returns (Facet[] memory);
        function facetFunctionSelectors(address _facet) external view returns (bytes4[] memory);
        function facetAddresses() external view returns (address[] memory);
        function facetAddress(bytes4 _functionSelector) external view returns (address);
    }

    /// Ownership facet interface
    #[sol(rpc)]
    interface IERC173 {
        function owner() external view returns (address);
        function transferOwnership(address _newOwner) external;
    }

    /// Initializer run by the diamond through delegatecall during the cut
    #[sol(rpc)]
    interface IDiamondInit {
        function init(
            address asset,
            address lidoWithdrawal,
            address wstETH,
            address receiverContract,
            address swapContract,
            address feeCollector
        ) external;
    }
}
