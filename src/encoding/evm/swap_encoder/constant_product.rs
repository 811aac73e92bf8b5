use alloy::primitives::U256;

use crate::encoding::{
    errors::EncodingError,
    evm::{
        abi::IV2SwapRouter,
        utils::{biguint_to_u256, encode_call, hops_to_token_path, recipient_to_address},
    },
    models::{EncodedCall, EncodingContext, TradeType},
    swap_encoder::{SwapEncoder, SwapLeg},
};

/// Encodes swaps over constant-product pools through the router's V2 methods.
///
/// Every route becomes its own call: the V2 methods take the full token path, so routes never need
/// to be merged.
#[derive(Clone, Debug, Default)]
pub struct ConstantProductSwapEncoder;

impl SwapEncoder for ConstantProductSwapEncoder {
    fn plan_swaps<'a>(&self, legs: Vec<SwapLeg<'a>>) -> Result<Vec<SwapLeg<'a>>, EncodingError> {
        Ok(legs)
    }

    fn encode_swap(
        &self,
        leg: &SwapLeg,
        encoding_context: &EncodingContext,
    ) -> Result<EncodedCall, EncodingError> {
        let path = hops_to_token_path(leg.hops)?;
        let to = recipient_to_address(&encoding_context.recipient)?;
        let slippage = &encoding_context.slippage_tolerance;

        match encoding_context.trade_type {
            TradeType::ExactInput => {
                let amount_in = biguint_to_u256(&leg.amount_in)?;
                let amount_out_min = if encoding_context.aggregated_slippage_check {
                    U256::ZERO
                } else {
                    biguint_to_u256(&slippage.minimum_amount_out(&leg.amount_out))?
                };
                if leg.fee_on_transfer {
                    Ok(encode_call(
                        IV2SwapRouter::swapExactTokensForTokensSupportingFeeOnTransferTokensCall {
                            amountIn: amount_in,
                            amountOutMin: amount_out_min,
                            path,
                            to,
                        },
                    ))
                } else {
                    Ok(encode_call(IV2SwapRouter::swapExactTokensForTokensCall {
                        amountIn: amount_in,
                        amountOutMin: amount_out_min,
                        path,
                        to,
                    }))
                }
            }
            TradeType::ExactOutput => {
                if leg.fee_on_transfer {
                    return Err(EncodingError::InvalidTradeSet(
                        "Fee-on-transfer tokens can not be swapped with an exact output".to_string(),
                    ));
                }
                Ok(encode_call(IV2SwapRouter::swapTokensForExactTokensCall {
                    amountOut: biguint_to_u256(&leg.amount_out)?,
                    amountInMax: biguint_to_u256(&slippage.maximum_amount_in(&leg.amount_in))?,
                    path,
                    to,
                }))
            }
        }
    }

    fn clone_box(&self) -> Box<dyn SwapEncoder> {
        Box::new(self.clone())
    }
}
