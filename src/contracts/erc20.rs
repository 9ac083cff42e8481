//! ERC20 bindings for the vault's deposit asset

use alloy::sol;

sol! {
    /// The part of ERC20 the deposit flow touches
    #[sol(rpc)]
    interface IERC20 {
        function symbol() external view returns (string memory);

        /// Used to scale human-entered amounts
        function decimals() external view returns (uint8);

        function balanceOf(address account) external view returns (uint256);

        /// Checked before every deposit; the vault pulls the asset with `transferFrom`
        function allowance(address owner, address spender) external view returns (uint256);

        function approve(address spender, uint256 amount) external returns (bool);

        event Approval(address indexed owner, address indexed spender, uint256 value);
    }
}
