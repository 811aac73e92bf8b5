use tracing::trace;

use crate::encoding::{
    errors::EncodingError,
    evm::constants::{CONCENTRATED_LIQUIDITY_PROTOCOLS, CONSTANT_PRODUCT_PROTOCOLS},
    models::{Protocol, Route, Trade, TradeKind},
    swap_encoder::SwapLeg,
};

/// The legs of a trade set, partitioned by the protocol family that swaps them.
///
/// Within each bucket the legs keep the order of the trades and routes they come from.
#[derive(Debug)]
pub struct ClassifiedTrades<'a> {
    pub constant_product: Vec<SwapLeg<'a>>,
    pub concentrated_liquidity: Vec<SwapLeg<'a>>,
    pub kinds: Vec<TradeKind>,
}

/// Maps a pool's protocol system to the protocol family it is swapped with.
pub fn protocol_of(protocol_system: &str) -> Result<Protocol, EncodingError> {
    if CONSTANT_PRODUCT_PROTOCOLS.contains(protocol_system) {
        Ok(Protocol::ConstantProduct)
    } else if CONCENTRATED_LIQUIDITY_PROTOCOLS.contains(protocol_system) {
        Ok(Protocol::ConcentratedLiquidity)
    } else {
        Err(EncodingError::UnsupportedTradeType(format!(
            "Protocol system {protocol_system} is not supported"
        )))
    }
}

/// A route is swapped by a single router call, so all of its hops must share a protocol family.
pub fn classify_route(route: &Route) -> Result<Protocol, EncodingError> {
    let first = route
        .hops
        .first()
        .ok_or_else(|| EncodingError::InvalidRoute("Route has no hops".to_string()))?;
    let protocol = protocol_of(&first.protocol_system)?;
    for hop in &route.hops[1..] {
        if protocol_of(&hop.protocol_system)? != protocol {
            return Err(EncodingError::UnsupportedTradeType(format!(
                "Route mixes protocol families: {} and {}",
                first.protocol_system, hop.protocol_system
            )));
        }
    }
    Ok(protocol)
}

pub fn classify_trade(trade: &Trade) -> Result<TradeKind, EncodingError> {
    let mut has_constant_product = false;
    let mut has_concentrated_liquidity = false;
    for route in &trade.routes {
        match classify_route(route)? {
            Protocol::ConstantProduct => has_constant_product = true,
            Protocol::ConcentratedLiquidity => has_concentrated_liquidity = true,
        }
    }
    match (has_constant_product, has_concentrated_liquidity) {
        (true, true) => Ok(TradeKind::Mixed),
        (true, false) => Ok(TradeKind::ConstantProduct),
        (false, true) => Ok(TradeKind::ConcentratedLiquidity),
        (false, false) => Err(EncodingError::InvalidTradeSet("Trade has no routes".to_string())),
    }
}

/// Distributes the routes of all trades into the protocol buckets.
///
/// Fee-on-transfer trades are only supported on constant-product routes, since only those have a
/// swap variant that settles on balances.
pub fn classify_trades(trades: &[Trade]) -> Result<ClassifiedTrades<'_>, EncodingError> {
    let mut classified = ClassifiedTrades {
        constant_product: Vec::new(),
        concentrated_liquidity: Vec::new(),
        kinds: Vec::with_capacity(trades.len()),
    };
    for trade in trades {
        let kind = classify_trade(trade)?;
        trace!(?kind, routes = trade.routes.len(), "classified trade");
        for route in &trade.routes {
            let leg = SwapLeg::from_route(route, trade.fee_on_transfer);
            match classify_route(route)? {
                Protocol::ConstantProduct => classified.constant_product.push(leg),
                Protocol::ConcentratedLiquidity => {
                    if trade.fee_on_transfer {
                        return Err(EncodingError::InvalidTradeSet(
                            "Fee-on-transfer trades can only route through constant-product pools"
                                .to_string(),
                        ));
                    }
                    classified
                        .concentrated_liquidity
                        .push(leg)
                }
            }
        }
        classified.kinds.push(kind);
    }
    Ok(classified)
}
