use crate::encoding::{
    errors::EncodingError,
    models::{AddLiquidityOptions, ApprovalType, MethodParameters, Position, SwapOptions, Trade},
};

/// A high-level interface for encoding already computed trades into a single router transaction.
///
/// Implementations are pure: the same trades and options always produce byte-identical calldata,
/// and nothing is looked up on chain. In particular, approvals are never inferred. The caller is
/// responsible for knowing which allowances the router already holds.
pub trait RouterEncoder {
    /// Produces the calldata and native value for executing one or more trades.
    ///
    /// All trades must share their input token, output token and trade type. The resulting
    /// calldata is a single multicall guarded by the deadline or previous blockhash of
    /// `options.validation`.
    ///
    /// # Returns
    /// A [`MethodParameters`] holding the router address, the multicall calldata, the value to
    /// send and the bundled calls in execution order.
    fn swap_call_parameters(
        &self,
        trades: &[Trade],
        options: &SwapOptions,
    ) -> Result<MethodParameters, EncodingError>;

    /// Produces the calldata for swapping part of the input and depositing the result together
    /// with the remaining input into a concentrated-liquidity position.
    ///
    /// The swap output is always held by the router until the deposit. Leftovers of both tokens
    /// are swept back to the caller at the end.
    ///
    /// # Arguments
    /// * `trades` - Trades converting part of the input into the position's other token.
    /// * `options` - Swap options. Fees on the output are not supported here.
    /// * `position` - The position to open or increase, with the desired amounts.
    /// * `add_liquidity_options` - Mint a new position or increase an existing one.
    /// * `token_in_approval` - Allowance the router grants the position manager for the input.
    /// * `token_out_approval` - Allowance the router grants the position manager for the output.
    fn swap_and_add_call_parameters(
        &self,
        trades: &[Trade],
        options: &SwapOptions,
        position: &Position,
        add_liquidity_options: &AddLiquidityOptions,
        token_in_approval: ApprovalType,
        token_out_approval: ApprovalType,
    ) -> Result<MethodParameters, EncodingError>;
}
