use alloy::primitives::{aliases::U160, U256};

use crate::encoding::{
    errors::EncodingError,
    evm::{
        abi::IV3SwapRouter,
        utils::{
            biguint_to_u256, bytes_to_address, check_hops_chain, encode_call,
            encode_hops_to_path, fee_to_u24, recipient_to_address,
        },
    },
    models::{EncodedCall, EncodingContext, TradeType},
    swap_encoder::{SwapEncoder, SwapLeg},
};

/// Encodes swaps over concentrated-liquidity pools through the router's V3 methods.
///
/// Routes traversing the exact same pools are swapped in one call with their amounts summed.
/// Single-hop legs use the `...Single` methods, longer legs the packed path methods.
#[derive(Clone, Debug, Default)]
pub struct ConcentratedLiquiditySwapEncoder;

impl SwapEncoder for ConcentratedLiquiditySwapEncoder {
    fn plan_swaps<'a>(&self, legs: Vec<SwapLeg<'a>>) -> Result<Vec<SwapLeg<'a>>, EncodingError> {
        let mut planned: Vec<SwapLeg<'a>> = Vec::with_capacity(legs.len());
        for leg in legs {
            check_hops_chain(leg.hops)?;
            match planned
                .iter_mut()
                .find(|existing| existing.hops == leg.hops)
            {
                Some(existing) => {
                    existing.amount_in += leg.amount_in;
                    existing.amount_out += leg.amount_out;
                }
                None => planned.push(leg),
            }
        }
        Ok(planned)
    }

    fn encode_swap(
        &self,
        leg: &SwapLeg,
        encoding_context: &EncodingContext,
    ) -> Result<EncodedCall, EncodingError> {
        check_hops_chain(leg.hops)?;
        let recipient = recipient_to_address(&encoding_context.recipient)?;
        let slippage = &encoding_context.slippage_tolerance;
        let exact_output = encoding_context.trade_type == TradeType::ExactOutput;

        let (amount_in, amount_out) = if exact_output {
            (
                biguint_to_u256(&slippage.maximum_amount_in(&leg.amount_in))?,
                biguint_to_u256(&leg.amount_out)?,
            )
        } else if encoding_context.aggregated_slippage_check {
            (biguint_to_u256(&leg.amount_in)?, U256::ZERO)
        } else {
            (
                biguint_to_u256(&leg.amount_in)?,
                biguint_to_u256(&slippage.minimum_amount_out(&leg.amount_out))?,
            )
        };

        if let [hop] = leg.hops {
            let token_in = bytes_to_address(&hop.token_in)?;
            let token_out = bytes_to_address(&hop.token_out)?;
            let fee = fee_to_u24(hop.fee.ok_or_else(|| {
                EncodingError::InvalidRoute(format!("Missing fee tier for pool {}", hop.pool))
            })?)?;
            if exact_output {
                return Ok(encode_call(IV3SwapRouter::exactOutputSingleCall {
                    params: IV3SwapRouter::ExactOutputSingleParams {
                        tokenIn: token_in,
                        tokenOut: token_out,
                        fee,
                        recipient,
                        amountOut: amount_out,
                        amountInMaximum: amount_in,
                        sqrtPriceLimitX96: U160::ZERO,
                    },
                }));
            }
            return Ok(encode_call(IV3SwapRouter::exactInputSingleCall {
                params: IV3SwapRouter::ExactInputSingleParams {
                    tokenIn: token_in,
                    tokenOut: token_out,
                    fee,
                    recipient,
                    amountIn: amount_in,
                    amountOutMinimum: amount_out,
                    sqrtPriceLimitX96: U160::ZERO,
                },
            }));
        }

        let path = encode_hops_to_path(leg.hops, exact_output)?;
        if exact_output {
            Ok(encode_call(IV3SwapRouter::exactOutputCall {
                params: IV3SwapRouter::ExactOutputParams {
                    path: path.into(),
                    recipient,
                    amountOut: amount_out,
                    amountInMaximum: amount_in,
                },
            }))
        } else {
            Ok(encode_call(IV3SwapRouter::exactInputCall {
                params: IV3SwapRouter::ExactInputParams {
                    path: path.into(),
                    recipient,
                    amountIn: amount_in,
                    amountOutMinimum: amount_out,
                },
            }))
        }
    }

    fn clone_box(&self) -> Box<dyn SwapEncoder> {
        Box::new(self.clone())
    }
}
