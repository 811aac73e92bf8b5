use alloy::{primitives::aliases::I24, sol_types::SolCall};
use num_bigint::BigUint;
use tycho_common::Bytes;

use crate::encoding::{
    errors::EncodingError,
    evm::{
        abi::IApproveAndCall,
        utils::{biguint_to_u256, bytes_to_address, encode_call, fee_to_u24},
    },
    models::{AddLiquidityOptions, ApprovalType, EncodedCall, Position},
};

const MAX_TICK: i32 = 887_272;

/// Encodes the router granting the position manager an allowance for `token`, if one is needed.
pub fn encode_approve(
    token: &Bytes,
    approval_type: ApprovalType,
) -> Result<Option<EncodedCall>, EncodingError> {
    let token = bytes_to_address(token)?;
    let call = match approval_type {
        ApprovalType::NotRequired => return Ok(None),
        ApprovalType::Max => encode_call(IApproveAndCall::approveMaxCall { token }),
        ApprovalType::MaxMinusOne => encode_call(IApproveAndCall::approveMaxMinusOneCall { token }),
        ApprovalType::ZeroThenMax => encode_call(IApproveAndCall::approveZeroThenMaxCall { token }),
        ApprovalType::ZeroThenMaxMinusOne => {
            encode_call(IApproveAndCall::approveZeroThenMaxMinusOneCall { token })
        }
    };
    Ok(Some(call))
}

fn tick_to_i24(tick: i32) -> Result<I24, EncodingError> {
    if !(-MAX_TICK..=MAX_TICK).contains(&tick) {
        return Err(EncodingError::InvalidPosition(format!("Tick {tick} is out of range")));
    }
    I24::try_from(tick)
        .map_err(|_| EncodingError::InvalidPosition(format!("Tick {tick} does not fit into int24")))
}

/// Encodes the position manager call that deposits into `position`, wrapped in the router's
/// `callPositionManager`.
///
/// `amount0_min` and `amount1_min` bound the deposit against price movement between signing and
/// execution.
pub fn encode_add_liquidity(
    position: &Position,
    add_liquidity_options: &AddLiquidityOptions,
    amount0_min: &BigUint,
    amount1_min: &BigUint,
) -> Result<EncodedCall, EncodingError> {
    let token0 = bytes_to_address(&position.pool.token0)?;
    let token1 = bytes_to_address(&position.pool.token1)?;
    let (amount0_min, amount1_min) = (biguint_to_u256(amount0_min)?, biguint_to_u256(amount1_min)?);

    let inner = match add_liquidity_options {
        AddLiquidityOptions::Mint { recipient } => IApproveAndCall::mintCall {
            params: IApproveAndCall::MintParams {
                token0,
                token1,
                fee: fee_to_u24(position.pool.fee)?,
                tickLower: tick_to_i24(position.tick_lower)?,
                tickUpper: tick_to_i24(position.tick_upper)?,
                amount0Min: amount0_min,
                amount1Min: amount1_min,
                recipient: bytes_to_address(recipient)?,
            },
        }
        .abi_encode(),
        AddLiquidityOptions::Increase { token_id } => IApproveAndCall::increaseLiquidityCall {
            params: IApproveAndCall::IncreaseLiquidityParams {
                token0,
                token1,
                tokenId: biguint_to_u256(token_id)?,
                amount0Min: amount0_min,
                amount1Min: amount1_min,
            },
        }
        .abi_encode(),
    };

    Ok(encode_call(IApproveAndCall::callPositionManagerCall { data: inner.into() }))
}

#[cfg(test)]
mod tests {
    use alloy::hex::encode;
    use rstest::rstest;

    use super::*;
    use crate::encoding::models::PositionPool;

    fn position() -> Position {
        Position {
            pool: PositionPool {
                token0: Bytes::from("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
                token1: Bytes::from("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
                fee: 500,
            },
            tick_lower: -10,
            tick_upper: 10,
            amount0: BigUint::from(1000u32),
            amount1: BigUint::from(2000u32),
        }
    }

    #[rstest]
    #[case::max(ApprovalType::Max, "571ac8b0")]
    #[case::max_minus_one(ApprovalType::MaxMinusOne, "cab372ce")]
    #[case::zero_then_max(ApprovalType::ZeroThenMax, "639d71a9")]
    #[case::zero_then_max_minus_one(ApprovalType::ZeroThenMaxMinusOne, "ab3fdd50")]
    fn test_encode_approve(#[case] approval_type: ApprovalType, #[case] expected_selector: &str) {
        let token = Bytes::from("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        let call = encode_approve(&token, approval_type)
            .unwrap()
            .unwrap();
        assert_eq!(
            encode(&call.data),
            format!(
                "{expected_selector}000000000000000000000000a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
            )
        );
    }

    #[test]
    fn test_encode_approve_not_required() {
        let token = Bytes::from("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        assert_eq!(encode_approve(&token, ApprovalType::NotRequired).unwrap(), None);
    }

    #[test]
    fn test_encode_mint() {
        let options = AddLiquidityOptions::Mint {
            recipient: Bytes::from("0xcd09f75E2BF2A4d11F3AB23f1389FcC1621c0cc2"),
        };
        let call = encode_add_liquidity(
            &position(),
            &options,
            &BigUint::from(990u32),
            &BigUint::from(1980u32),
        )
        .unwrap();

        assert_eq!(call.selector, "callPositionManager(bytes)");
        assert_eq!(
            encode(&call.data),
            String::from(concat!(
                // callPositionManager selector
                "b3a2af13",
                // data offset
                "0000000000000000000000000000000000000000000000000000000000000020",
                // data length: selector and 8 words
                "0000000000000000000000000000000000000000000000000000000000000104",
                // mint selector
                "11ed56c9",
                // token0
                "000000000000000000000000a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
                // token1
                "000000000000000000000000c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
                // fee
                "00000000000000000000000000000000000000000000000000000000000001f4",
                // tick lower
                "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff6",
                // tick upper
                "000000000000000000000000000000000000000000000000000000000000000a",
                // amount0 min
                "00000000000000000000000000000000000000000000000000000000000003de",
                // amount1 min
                "00000000000000000000000000000000000000000000000000000000000007bc",
                // recipient
                "000000000000000000000000cd09f75e2bf2a4d11f3ab23f1389fcc1621c0cc2",
                // padding
                "00000000000000000000000000000000000000000000000000000000",
            ))
        );
    }

    #[test]
    fn test_encode_increase_liquidity() {
        let options = AddLiquidityOptions::Increase { token_id: BigUint::from(42u32) };
        let call =
            encode_add_liquidity(&position(), &options, &BigUint::ZERO, &BigUint::ZERO).unwrap();
        let hex_call = encode(&call.data);
        // callPositionManager selector, offset, length, then the wrapped call
        assert_eq!(&hex_call[..8], "b3a2af13");
        assert_eq!(&hex_call[136..144], "f100b205");
        assert_eq!(&hex_call[272..336], format!("{:064x}", 42));
    }

    #[test]
    fn test_encode_out_of_range_tick_fails() {
        let mut position = position();
        position.tick_upper = 900_000;
        let options = AddLiquidityOptions::Increase { token_id: BigUint::from(1u32) };
        let res = encode_add_liquidity(&position, &options, &BigUint::ZERO, &BigUint::ZERO);
        assert!(matches!(res, Err(EncodingError::InvalidPosition(_))));
    }
}
