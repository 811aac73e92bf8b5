use std::{collections::HashSet, sync::LazyLock};

use alloy::primitives::{address, Address};

pub const DEFAULT_ROUTERS_JSON: &str = include_str!("../../../config/router_addresses.json");

/// Router sentinel resolving to the caller of the multicall.
pub const MSG_SENDER: Address = address!("0000000000000000000000000000000000000001");

/// Router sentinel resolving to the router itself, used whenever the router must hold the output.
pub const ADDRESS_THIS: Address = address!("0000000000000000000000000000000000000002");

/// Above this number of swap calls, exact input trade sets check slippage once on the total
/// output instead of on every call.
pub const AGGREGATED_SLIPPAGE_CHECK_THRESHOLD: usize = 2;

/// These protocols are constant-product AMMs and are swapped through the router's V2 methods.
pub static CONSTANT_PRODUCT_PROTOCOLS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    let mut set = HashSet::new();
    set.insert("uniswap_v2");
    set.insert("sushiswap_v2");
    set.insert("pancakeswap_v2");
    set
});

/// These protocols are concentrated-liquidity AMMs with fee tiers and are swapped through the
/// router's V3 methods.
pub static CONCENTRATED_LIQUIDITY_PROTOCOLS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| {
        let mut set = HashSet::new();
        set.insert("uniswap_v3");
        set.insert("pancakeswap_v3");
        set
    });

/// Address standing for the chain's native currency in trades. Pools only ever see the wrapped
/// native token.
pub const NATIVE_TOKEN_ADDRESS: Address = Address::ZERO;
