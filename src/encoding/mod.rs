pub mod errors;
#[cfg(feature = "evm")]
pub mod evm;
pub mod models;
pub mod position_math;
pub mod router_encoder;
pub mod serde_primitives;
pub mod swap_encoder;
