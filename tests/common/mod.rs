#![allow(dead_code)]

use std::str::FromStr;

use num_bigint::BigUint;
use swap_router_encoding::encoding::{
    evm::encoder_builders::SwapRouterEncoderBuilder,
    models::{Hop, Percent, Route, SwapOptions, Trade, TradeType, Validation},
    router_encoder::RouterEncoder,
};
use tycho_common::{models::Chain, Bytes};

pub const DEADLINE: u32 = 1_700_000_000;

pub fn router_address() -> Bytes {
    Bytes::from_str("0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45").unwrap()
}

pub fn eth() -> Bytes {
    Bytes::from_str("0x0000000000000000000000000000000000000000").unwrap()
}

pub fn weth() -> Bytes {
    Bytes::from_str("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2").unwrap()
}

pub fn usdc() -> Bytes {
    Bytes::from_str("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48").unwrap()
}

pub fn dai() -> Bytes {
    Bytes::from_str("0x6b175474e89094c44da98b954eedeac495271d0f").unwrap()
}

pub fn wbtc() -> Bytes {
    Bytes::from_str("0x2260fac5e5542a773aa44fbcfedf7c193bc2c599").unwrap()
}

pub fn alice() -> Bytes {
    Bytes::from_str("0xcd09f75E2BF2A4d11F3AB23f1389FcC1621c0cc2").unwrap()
}

pub fn bob() -> Bytes {
    Bytes::from_str("0x9964bff29baa37b47604f3f3f51f3b3c5149d6de").unwrap()
}

pub fn weth_dai_v2_pool() -> Bytes {
    Bytes::from_str("0xA478c2975Ab1Ea89e8196811F51A7B7Ade33eB11").unwrap()
}

pub fn weth_usdc_v3_pool() -> Bytes {
    Bytes::from_str("0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640").unwrap()
}

pub fn usdc_dai_v3_pool() -> Bytes {
    Bytes::from_str("0x5777d92f208679db4b9778590fa3cab3ac9e2168").unwrap()
}

pub fn get_router_encoder() -> Box<dyn RouterEncoder> {
    SwapRouterEncoderBuilder::new()
        .chain(Chain::Ethereum)
        .router_address(router_address())
        .build()
        .expect("Failed to build encoder")
}

pub fn v2_hop(pool: Bytes, token_in: Bytes, token_out: Bytes) -> Hop {
    Hop::new("uniswap_v2", pool, None, token_in, token_out)
}

pub fn v3_hop(pool: Bytes, fee: u32, token_in: Bytes, token_out: Bytes) -> Hop {
    Hop::new("uniswap_v3", pool, Some(fee), token_in, token_out)
}

pub fn route(hops: Vec<Hop>, input_amount: u64, output_amount: u64) -> Route {
    Route::new(hops, BigUint::from(input_amount), BigUint::from(output_amount))
}

pub fn trade(
    trade_type: TradeType,
    input_token: Bytes,
    output_token: Bytes,
    routes: Vec<Route>,
) -> Trade {
    Trade { trade_type, input_token, output_token, routes, fee_on_transfer: false }
}

/// 0.5% slippage, output to the caller, guarded by a fixed deadline.
pub fn swap_options() -> SwapOptions {
    SwapOptions {
        slippage_tolerance: Percent::new(50u32, 10_000u32),
        recipient: None,
        validation: Validation::Deadline(BigUint::from(DEADLINE)),
        input_token_permit: None,
        fee: None,
    }
}
