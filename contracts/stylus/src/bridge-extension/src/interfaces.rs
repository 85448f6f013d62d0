//! Solidity ABI of the collaborators this extension calls.

use stylus_sdk::alloy_sol_types::sol;

sol! {
    /// LxLy bridge: asset transport and message transport in one contract.
    interface ILxLyBridge {
        function depositCount() external view returns (uint256);
        function networkID() external view returns (uint32);
        function WETHToken() external view returns (address);
        function bridgeAsset(
            uint32 destinationNetwork,
            address destinationAddress,
            uint256 amount,
            address token,
            bool forceUpdateGlobalExitRoot,
            bytes permitData
        ) external payable;
        function bridgeMessage(
            uint32 destinationNetwork,
            address destinationAddress,
            bool forceUpdateGlobalExitRoot,
            bytes metadata
        ) external payable;
        function isClaimed(uint32 leafIndex, uint32 sourceBridgeNetwork)
            external
            view
            returns (bool);
    }

    interface IERC20 {
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}
