//! Solidity bindings of the router methods this crate encodes calls to.
//!
//! Overloaded methods are declared in separate interfaces so every binding keeps its plain name.
use alloy::sol;

sol! {
    interface IV2SwapRouter {
        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to
        ) external payable;

        function swapExactTokensForTokensSupportingFeeOnTransferTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to
        ) external payable;

        function swapTokensForExactTokens(
            uint256 amountOut,
            uint256 amountInMax,
            address[] calldata path,
            address to
        ) external payable;
    }

    interface IV3SwapRouter {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        struct ExactInputParams {
            bytes path;
            address recipient;
            uint256 amountIn;
            uint256 amountOutMinimum;
        }

        struct ExactOutputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 amountOut;
            uint256 amountInMaximum;
            uint160 sqrtPriceLimitX96;
        }

        struct ExactOutputParams {
            bytes path;
            address recipient;
            uint256 amountOut;
            uint256 amountInMaximum;
        }

        function exactInputSingle(ExactInputSingleParams calldata params) external payable;
        function exactInput(ExactInputParams calldata params) external payable;
        function exactOutputSingle(ExactOutputSingleParams calldata params) external payable;
        function exactOutput(ExactOutputParams calldata params) external payable;
    }

    interface IMulticallDeadline {
        function multicall(uint256 deadline, bytes[] calldata data) external payable;
    }

    interface IMulticallBlockhash {
        function multicall(bytes32 previousBlockhash, bytes[] calldata data) external payable;
    }

    interface IPaymentsToRecipient {
        function unwrapWETH9(uint256 amountMinimum, address recipient) external payable;
        function unwrapWETH9WithFee(
            uint256 amountMinimum,
            address recipient,
            uint256 feeBips,
            address feeRecipient
        ) external payable;
        function sweepToken(address token, uint256 amountMinimum, address recipient) external payable;
        function sweepTokenWithFee(
            address token,
            uint256 amountMinimum,
            address recipient,
            uint256 feeBips,
            address feeRecipient
        ) external payable;
    }

    interface IPaymentsToSender {
        function unwrapWETH9(uint256 amountMinimum) external payable;
        function unwrapWETH9WithFee(uint256 amountMinimum, uint256 feeBips, address feeRecipient)
            external payable;
        function sweepToken(address token, uint256 amountMinimum) external payable;
        function sweepTokenWithFee(
            address token,
            uint256 amountMinimum,
            uint256 feeBips,
            address feeRecipient
        ) external payable;
    }

    interface IPaymentsExtended {
        function pull(address token, uint256 value) external payable;
        function wrapETH(uint256 value) external payable;
        function refundETH() external payable;
    }

    interface ISelfPermit {
        function selfPermit(address token, uint256 value, uint256 deadline, uint8 v, bytes32 r, bytes32 s)
            external payable;
        function selfPermitIfNecessary(
            address token,
            uint256 value,
            uint256 deadline,
            uint8 v,
            bytes32 r,
            bytes32 s
        ) external payable;
        function selfPermitAllowed(address token, uint256 nonce, uint256 expiry, uint8 v, bytes32 r, bytes32 s)
            external payable;
        function selfPermitAllowedIfNecessary(
            address token,
            uint256 nonce,
            uint256 expiry,
            uint8 v,
            bytes32 r,
            bytes32 s
        ) external payable;
    }

    interface IApproveAndCall {
        struct MintParams {
            address token0;
            address token1;
            uint24 fee;
            int24 tickLower;
            int24 tickUpper;
            uint256 amount0Min;
            uint256 amount1Min;
            address recipient;
        }

        struct IncreaseLiquidityParams {
            address token0;
            address token1;
            uint256 tokenId;
            uint256 amount0Min;
            uint256 amount1Min;
        }

        function approveMax(address token) external payable;
        function approveMaxMinusOne(address token) external payable;
        function approveZeroThenMax(address token) external payable;
        function approveZeroThenMaxMinusOne(address token) external payable;
        function callPositionManager(bytes memory data) external payable;
        function mint(MintParams calldata params) external payable;
        function increaseLiquidity(IncreaseLiquidityParams calldata params) external payable;
    }
}
