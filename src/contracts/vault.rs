//! Vault diamond bindings (the combined surface of all vault facets)

use alloy::sol;

sol! {
    /// Vault surface exposed through the diamond proxy
    #[sol(rpc)]
    interface IVaultDiamond {
        // ERC-4626 style accounting

        /// Returns total assets managed by vault
        function totalAssets() external view returns (uint256);

        /// Returns total vault shares
        function totalShares() external view returns (uint256);

        /// Returns share balance of account
        function balanceOf(address account) external view returns (uint256);

        /// Returns max deposit amount for a receiver
        function maxDeposit(address receiver) external view returns (uint256);

        /// Returns max withdraw amount for an owner
        function maxWithdraw(address owner) external view returns (uint256);

        /// Preview deposit shares
        function previewDeposit(uint256 assets) external view returns (uint256);

        /// Preview shares burned by a withdrawal
        function previewWithdraw(uint256 assets) external view returns (uint256);

        /// Deposit assets and receive shares
        function deposit(uint256 assets, address receiver) external returns (uint256 shares);

        /// Withdraw assets by burning shares
        function withdraw(uint256 assets, address receiver, address owner) external returns (uint256 shares);

        // Large deposit timelock

        /// Queue a large deposit; it may be executed once the timelock has passed
        function queueLargeDeposit() external;

        // Liquid / locked accounting

        /// Liquid allocation not yet withdrawn plus matured locked funds
        function getWithdrawableAmount(address user) external view returns (uint256);

        /// Locked (staked) portion of the user's deposits
        function getLockedAmount(address user) external view returns (uint256);

        /// Unlock timestamp of each of the user's deposits
        function getUnlockTime(address user) external view returns (uint256[] memory);

        // Staking protocol bridge

        /// Finalize a completed staking withdrawal and mint the corresponding shares
        function processCompletedWithdrawals() external returns (uint256 sharesMinted);

        // Circuit breakers

        /// Whether deposits and withdrawals are paused
        function paused() external view returns (bool);

        /// Whether the vault has been permanently shut down
        function isShutdown() external view returns (bool);

        // Admin

        function setLidoWithdrawalAddress(address lidoWithdrawal) external;
        function setWstETHAddress(address wstETH) external;
        function setReceiverContract(address receiver) external;
        function setSwapContract(address swapContract) external;
        function setFeeCollector(address feeCollector) external;

        // Errors

        error DepositAlreadyQueued();
        error NoWithdrawalInProgress();
        error WithdrawalNotReady();

        // Events

        /// Emitted on deposit
        event Deposit(address indexed sender, address indexed owner, uint256 assets, uint256 shares);

        /// Emitted on withdraw
        event Withdraw(
            address indexed sender,
            address indexed receiver,
            address indexed owner,
            uint256 assets,
            uint256 shares
        );

        /// Emitted when a large deposit is queued
        event LargeDepositQueued(address indexed user, uint256 unlockTime);
    }
}
