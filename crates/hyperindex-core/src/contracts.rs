use alloy_sol_types::sol;

sol! {
    /// Read-only surface of the HyperIndex pair factory
    interface IHyperIndexFactory {
        function pairCodeHash() external view returns (bytes32);
        function INIT_CODE_PAIR_HASH() external view returns (bytes32);
        function getPair(address tokenA, address tokenB) external view returns (address pair);
        function allPairsLength() external view returns (uint256);
    }

    /// Only used to label tokens in diagnostic output
    interface IERC20Metadata {
        function symbol() external view returns (string);
    }
}
