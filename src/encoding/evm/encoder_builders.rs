use std::{collections::HashMap, fs};

use tracing::debug;
use tycho_common::{models::Chain, Bytes};

use crate::encoding::{
    errors::EncodingError,
    evm::{constants::DEFAULT_ROUTERS_JSON, swap_router::SwapRouterEncoder},
    position_math::{PositionMath, ProportionalPositionMath},
    router_encoder::RouterEncoder,
};

/// Builder pattern for constructing a `SwapRouterEncoder` with customizable options.
///
/// Only the chain is required. The router address defaults to the one configured for the chain in
/// `config/router_addresses.json`.
pub struct SwapRouterEncoderBuilder {
    chain: Option<Chain>,
    router_address: Option<Bytes>,
    router_addresses_file_path: Option<String>,
    position_math: Option<Box<dyn PositionMath>>,
}

impl Default for SwapRouterEncoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SwapRouterEncoderBuilder {
    pub fn new() -> Self {
        SwapRouterEncoderBuilder {
            chain: None,
            router_address: None,
            router_addresses_file_path: None,
            position_math: None,
        }
    }

    pub fn chain(mut self, chain: Chain) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Sets the `router_address` manually.
    /// If it's not set, the default router address will be used (config/router_addresses.json)
    pub fn router_address(mut self, router_address: Bytes) -> Self {
        self.router_address = Some(router_address);
        self
    }

    /// Sets a JSON file mapping chains to router addresses, replacing the embedded defaults.
    /// Ignored if `router_address` is set.
    pub fn router_addresses_file_path(mut self, path: String) -> Self {
        self.router_addresses_file_path = Some(path);
        self
    }

    /// Sets how the minimal position of a swap-and-add is computed.
    /// Defaults to `ProportionalPositionMath`.
    pub fn position_math(mut self, position_math: Box<dyn PositionMath>) -> Self {
        self.position_math = Some(position_math);
        self
    }

    fn resolve_router_address(&self, chain: Chain) -> Result<Bytes, EncodingError> {
        if let Some(address) = &self.router_address {
            return Ok(address.clone());
        }
        let routers_json = match &self.router_addresses_file_path {
            Some(path) => fs::read_to_string(path)?,
            None => DEFAULT_ROUTERS_JSON.to_string(),
        };
        let routers: HashMap<Chain, Bytes> = serde_json::from_str(&routers_json)?;
        let address = routers
            .get(&chain)
            .ok_or_else(|| {
                EncodingError::FatalError(format!("No router address found for chain {chain}"))
            })?
            .to_owned();
        debug!(%chain, %address, "resolved router address");
        Ok(address)
    }

    /// Builds the `SwapRouterEncoder` instance using the configured chain.
    /// Returns an error if the chain has not been set or no router address can be found for it.
    pub fn build(self) -> Result<Box<dyn RouterEncoder>, EncodingError> {
        let chain = self.chain.ok_or(EncodingError::FatalError(
            "Please set the chain before building the encoder".to_string(),
        ))?;
        let router_address = self.resolve_router_address(chain)?;
        let position_math = self
            .position_math
            .unwrap_or_else(|| Box::new(ProportionalPositionMath));
        Ok(Box::new(SwapRouterEncoder::new(chain, router_address, position_math)?))
    }
}
