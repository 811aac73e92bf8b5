use std::cmp::min;

use num_bigint::BigUint;
use tracing::{debug, trace};
use tycho_common::{models::Chain, Bytes};

use crate::encoding::{
    errors::EncodingError,
    evm::{
        approve_and_call::{encode_add_liquidity, encode_approve},
        classifier::classify_trades,
        constants::{AGGREGATED_SLIPPAGE_CHECK_THRESHOLD, NATIVE_TOKEN_ADDRESS},
        multicall::encode_multicall,
        payments::{
            encode_permit, encode_pull, encode_refund_eth, encode_sweep_token, encode_unwrap_weth9,
            encode_wrap_eth,
        },
        swap_encoder::{
            concentrated_liquidity::ConcentratedLiquiditySwapEncoder,
            constant_product::ConstantProductSwapEncoder,
        },
        utils::{bytes_to_address, check_hops_chain},
    },
    models::{
        AddLiquidityOptions, ApprovalType, EncodedCall, EncodingContext, MethodParameters,
        Position, Recipient, SwapOptions, Trade, TradeType,
    },
    position_math::PositionMath,
    router_encoder::RouterEncoder,
    swap_encoder::SwapEncoder,
};

/// Encodes trades into calls to a swap router supporting both constant-product (V2) and
/// concentrated-liquidity (V3) pools.
///
/// # Fields
/// * `chain`: Chain the router is deployed on.
/// * `router_address`: Address of the router the calldata is sent to.
/// * `native_address`: Address standing for the native currency in trades.
/// * `wrapped_address`: Address of the wrapped native token the pools trade.
/// * `constant_product`: Encoder for routes over constant-product pools.
/// * `concentrated_liquidity`: Encoder for routes over concentrated-liquidity pools.
/// * `position_math`: Computes the position reachable with the worst case swap output.
#[derive(Clone)]
pub struct SwapRouterEncoder {
    chain: Chain,
    router_address: Bytes,
    native_address: Bytes,
    wrapped_address: Bytes,
    constant_product: Box<dyn SwapEncoder>,
    concentrated_liquidity: Box<dyn SwapEncoder>,
    position_math: Box<dyn PositionMath>,
}

/// The swap part of a multicall, together with what settling it requires.
///
/// Token addresses are already wrapped. Amounts are sums over the whole trade set.
struct EncodedSwaps {
    calls: Vec<EncodedCall>,
    trade_type: TradeType,
    input_is_native: bool,
    output_is_native: bool,
    router_must_custody: bool,
    input_token: Bytes,
    output_token: Bytes,
    maximum_amount_in: BigUint,
    minimum_amount_out: BigUint,
    quote_amount_out: BigUint,
}

impl SwapRouterEncoder {
    pub fn new(
        chain: Chain,
        router_address: Bytes,
        position_math: Box<dyn PositionMath>,
    ) -> Result<Self, EncodingError> {
        bytes_to_address(&router_address)?;
        Ok(SwapRouterEncoder {
            chain,
            router_address,
            native_address: Bytes::from(NATIVE_TOKEN_ADDRESS.to_vec()),
            wrapped_address: chain.wrapped_native_token().address,
            constant_product: Box::new(ConstantProductSwapEncoder),
            concentrated_liquidity: Box::new(ConcentratedLiquiditySwapEncoder),
            position_math,
        })
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn router_address(&self) -> &Bytes {
        &self.router_address
    }

    fn is_native(&self, token: &Bytes) -> bool {
        *token == self.native_address
    }

    fn wrapped(&self, token: &Bytes) -> Bytes {
        if self.is_native(token) {
            self.wrapped_address.clone()
        } else {
            token.clone()
        }
    }

    /// Checks that the trades can be executed together in one multicall.
    ///
    /// All trades must share input token, output token and trade type, and every route must lead
    /// from the (wrapped) input token to the (wrapped) output token.
    pub fn validate_trades(&self, trades: &[Trade]) -> Result<(), EncodingError> {
        let first = trades
            .first()
            .ok_or_else(|| EncodingError::InvalidTradeSet("No trades to encode".to_string()))?;

        for trade in &trades[1..] {
            if trade.input_token != first.input_token {
                return Err(EncodingError::InvalidTradeSet(format!(
                    "Trades have different input tokens: {} and {}",
                    first.input_token, trade.input_token
                )));
            }
            if trade.output_token != first.output_token {
                return Err(EncodingError::InvalidTradeSet(format!(
                    "Trades have different output tokens: {} and {}",
                    first.output_token, trade.output_token
                )));
            }
            if trade.trade_type != first.trade_type {
                return Err(EncodingError::InvalidTradeSet(
                    "Trades have different trade types".to_string(),
                ));
            }
        }

        if self.wrapped(&first.input_token) == self.wrapped(&first.output_token) {
            return Err(EncodingError::InvalidTradeSet(format!(
                "Input and output token are the same: {}",
                first.input_token
            )));
        }

        let input_token = self.wrapped(&first.input_token);
        let output_token = self.wrapped(&first.output_token);
        for trade in trades {
            if trade.fee_on_transfer && trade.trade_type == TradeType::ExactOutput {
                return Err(EncodingError::InvalidTradeSet(
                    "Fee-on-transfer tokens can not be swapped with an exact output".to_string(),
                ));
            }
            if trade.routes.is_empty() {
                return Err(EncodingError::InvalidTradeSet("Trade has no routes".to_string()));
            }
            for route in &trade.routes {
                check_hops_chain(&route.hops)?;
                let first_hop = &route.hops[0];
                let last_hop = &route.hops[route.hops.len() - 1];
                if first_hop.token_in != input_token {
                    return Err(EncodingError::InvalidRoute(format!(
                        "Route starts with {} instead of the input token {}",
                        first_hop.token_in, input_token
                    )));
                }
                if last_hop.token_out != output_token {
                    return Err(EncodingError::InvalidRoute(format!(
                        "Route ends with {} instead of the output token {}",
                        last_hop.token_out, output_token
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_options(&self, options: &SwapOptions, input_is_native: bool) -> Result<(), EncodingError> {
        options
            .slippage_tolerance
            .validate_slippage()?;
        if let Some(recipient) = &options.recipient {
            bytes_to_address(recipient)?;
        }
        if let Some(fee) = &options.fee {
            fee.fee_bips()?;
            bytes_to_address(&fee.recipient)?;
        }
        if input_is_native && options.input_token_permit.is_some() {
            return Err(EncodingError::InvalidInput(
                "The native currency can not be permitted".to_string(),
            ));
        }
        Ok(())
    }

    /// Encodes the permit, the wrap of native input and all swaps, and decides where the swap
    /// output goes.
    ///
    /// The router keeps custody of the output whenever a later call has to act on it: unwrapping
    /// native output, taking a fee, adding liquidity or checking the aggregated minimum output.
    /// Native input is wrapped once, covering the input side of `position` if one is deposited.
    fn encode_swaps(
        &self,
        trades: &[Trade],
        options: &SwapOptions,
        position: Option<&Position>,
    ) -> Result<EncodedSwaps, EncodingError> {
        self.validate_trades(trades)?;
        let first = &trades[0];
        let trade_type = first.trade_type;
        let input_is_native = self.is_native(&first.input_token);
        let output_is_native = self.is_native(&first.output_token);
        self.validate_options(options, input_is_native)?;

        let classified = classify_trades(trades)?;
        trace!(kinds = ?classified.kinds, "classified trades");
        let constant_product_legs = self
            .constant_product
            .plan_swaps(classified.constant_product)?;
        let concentrated_liquidity_legs = self
            .concentrated_liquidity
            .plan_swaps(classified.concentrated_liquidity)?;
        let number_of_swaps = constant_product_legs.len() + concentrated_liquidity_legs.len();

        let aggregated_slippage_check = trade_type == TradeType::ExactInput &&
            number_of_swaps > AGGREGATED_SLIPPAGE_CHECK_THRESHOLD;
        let router_must_custody = output_is_native ||
            options.fee.is_some() ||
            position.is_some() ||
            aggregated_slippage_check;

        if router_must_custody &&
            constant_product_legs
                .iter()
                .any(|leg| leg.fee_on_transfer)
        {
            return Err(EncodingError::MixedRecipientConflict(
                "Fee-on-transfer swaps must pay out directly, but the router has to hold the output"
                    .to_string(),
            ));
        }

        let recipient = if router_must_custody {
            Recipient::Router
        } else {
            match &options.recipient {
                Some(address) => Recipient::Address(address.clone()),
                None => Recipient::MsgSender,
            }
        };
        debug!(
            trades = trades.len(),
            number_of_swaps,
            aggregated_slippage_check,
            router_must_custody,
            "encoding swaps"
        );

        let slippage = &options.slippage_tolerance;
        let total_amount_in: BigUint = trades
            .iter()
            .map(Trade::input_amount)
            .sum();
        let quote_amount_out: BigUint = trades
            .iter()
            .map(Trade::output_amount)
            .sum();
        let (maximum_amount_in, minimum_amount_out) = match trade_type {
            TradeType::ExactInput => {
                (total_amount_in, slippage.minimum_amount_out(&quote_amount_out))
            }
            TradeType::ExactOutput => {
                (slippage.maximum_amount_in(&total_amount_in), quote_amount_out.clone())
            }
        };

        let input_token = self.wrapped(&first.input_token);
        let mut calls = Vec::with_capacity(number_of_swaps + 2);
        if let Some(permit) = &options.input_token_permit {
            calls.push(encode_permit(&input_token, permit)?);
        }
        if input_is_native {
            let position_amount_in = position.map(|position| {
                if position.pool.token0 == input_token {
                    position.amount0.clone()
                } else {
                    position.amount1.clone()
                }
            });
            let wrap_amount = match position_amount_in {
                Some(amount) => &maximum_amount_in + amount,
                None => maximum_amount_in.clone(),
            };
            calls.push(encode_wrap_eth(&wrap_amount)?);
        }

        let context = EncodingContext {
            recipient,
            trade_type,
            slippage_tolerance: slippage.clone(),
            aggregated_slippage_check,
        };
        for leg in &constant_product_legs {
            calls.push(
                self.constant_product
                    .encode_swap(leg, &context)?,
            );
        }
        for leg in &concentrated_liquidity_legs {
            calls.push(
                self.concentrated_liquidity
                    .encode_swap(leg, &context)?,
            );
        }

        Ok(EncodedSwaps {
            calls,
            trade_type,
            input_is_native,
            output_is_native,
            router_must_custody,
            input_token,
            output_token: self.wrapped(&first.output_token),
            maximum_amount_in,
            minimum_amount_out,
            quote_amount_out,
        })
    }

    fn validate_position(
        &self,
        position: &Position,
        swaps: &EncodedSwaps,
    ) -> Result<(), EncodingError> {
        let pool = &position.pool;
        let matches_swap = (pool.token0 == swaps.input_token && pool.token1 == swaps.output_token) ||
            (pool.token0 == swaps.output_token && pool.token1 == swaps.input_token);
        if !matches_swap {
            return Err(EncodingError::InvalidPosition(format!(
                "Position tokens {} and {} do not match the swapped tokens {} and {}",
                pool.token0, pool.token1, swaps.input_token, swaps.output_token
            )));
        }
        if position.tick_lower >= position.tick_upper {
            return Err(EncodingError::InvalidPosition(format!(
                "Lower tick {} must be below upper tick {}",
                position.tick_lower, position.tick_upper
            )));
        }
        Ok(())
    }
}

impl RouterEncoder for SwapRouterEncoder {
    fn swap_call_parameters(
        &self,
        trades: &[Trade],
        options: &SwapOptions,
    ) -> Result<MethodParameters, EncodingError> {
        let swaps = self.encode_swaps(trades, options, None)?;
        let mut calls = swaps.calls;

        if swaps.router_must_custody {
            if swaps.output_is_native {
                calls.push(encode_unwrap_weth9(
                    &swaps.minimum_amount_out,
                    options.recipient.as_ref(),
                    options.fee.as_ref(),
                )?);
            } else {
                calls.push(encode_sweep_token(
                    &swaps.output_token,
                    &swaps.minimum_amount_out,
                    options.recipient.as_ref(),
                    options.fee.as_ref(),
                )?);
            }
        }

        if swaps.input_is_native {
            // Wrapped native not spent by the swaps goes back to the caller.
            calls.push(encode_unwrap_weth9(&BigUint::ZERO, None, None)?);
            if swaps.trade_type == TradeType::ExactOutput {
                calls.push(encode_refund_eth());
            }
        }

        let value = if swaps.input_is_native { swaps.maximum_amount_in } else { BigUint::ZERO };
        let calldata = encode_multicall(&calls, &options.validation)?;
        trace!(calls = ?calls.iter().map(|call| call.selector.as_str()).collect::<Vec<_>>(), %value, "encoded swap call parameters");

        Ok(MethodParameters { to: self.router_address.clone(), calldata, value, calls })
    }

    fn swap_and_add_call_parameters(
        &self,
        trades: &[Trade],
        options: &SwapOptions,
        position: &Position,
        add_liquidity_options: &AddLiquidityOptions,
        token_in_approval: ApprovalType,
        token_out_approval: ApprovalType,
    ) -> Result<MethodParameters, EncodingError> {
        if options.fee.is_some() {
            return Err(EncodingError::InvalidInput(
                "Output fees are not supported when adding liquidity".to_string(),
            ));
        }
        let swaps = self.encode_swaps(trades, options, Some(position))?;
        self.validate_position(position, &swaps)?;
        let mut calls = swaps.calls;

        let zero_for_one = position.pool.token0 == swaps.input_token;
        let (position_amount_in, position_amount_out) = if zero_for_one {
            (&position.amount0, &position.amount1)
        } else {
            (&position.amount1, &position.amount0)
        };

        // The swap output alone may not cover the output side of the position.
        let amount_out_remaining = if *position_amount_out > swaps.quote_amount_out {
            position_amount_out - &swaps.quote_amount_out
        } else {
            BigUint::ZERO
        };
        if amount_out_remaining > BigUint::ZERO {
            if swaps.output_is_native {
                calls.push(encode_wrap_eth(&amount_out_remaining)?);
            } else {
                calls.push(encode_pull(&swaps.output_token, &amount_out_remaining)?);
            }
        }

        // Native input was already wrapped together with the swap input.
        if !swaps.input_is_native {
            calls.push(encode_pull(&swaps.input_token, position_amount_in)?);
        }

        if let Some(call) = encode_approve(&swaps.input_token, token_in_approval)? {
            calls.push(call);
        }
        if let Some(call) = encode_approve(&swaps.output_token, token_out_approval)? {
            calls.push(call);
        }

        // Position reachable if every swap executes at its worst acceptable price.
        let (available0, available1) = if zero_for_one {
            (position_amount_in, &swaps.minimum_amount_out)
        } else {
            (&swaps.minimum_amount_out, position_amount_in)
        };
        let (minimal0, minimal1) = self
            .position_math
            .amounts_for_position(position, available0, available1)?;
        let slippage = &options.slippage_tolerance;
        let amount0_min = min(minimal0, slippage.minimum_amount_out(&position.amount0));
        let amount1_min = min(minimal1, slippage.minimum_amount_out(&position.amount1));
        calls.push(encode_add_liquidity(position, add_liquidity_options, &amount0_min, &amount1_min)?);

        // Return whatever the deposit did not use.
        if swaps.input_is_native {
            calls.push(encode_unwrap_weth9(&BigUint::ZERO, None, None)?);
        } else {
            calls.push(encode_sweep_token(&swaps.input_token, &BigUint::ZERO, None, None)?);
        }
        if swaps.output_is_native {
            calls.push(encode_unwrap_weth9(&BigUint::ZERO, None, None)?);
        } else {
            calls.push(encode_sweep_token(&swaps.output_token, &BigUint::ZERO, None, None)?);
        }

        let value = if swaps.input_is_native {
            swaps.maximum_amount_in + position_amount_in
        } else if swaps.output_is_native {
            amount_out_remaining
        } else {
            BigUint::ZERO
        };
        let calldata = encode_multicall(&calls, &options.validation)?;
        debug!(calls = calls.len(), %value, zero_for_one, "encoded swap and add call parameters");

        Ok(MethodParameters { to: self.router_address.clone(), calldata, value, calls })
    }
}
