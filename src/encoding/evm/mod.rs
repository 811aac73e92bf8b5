pub mod abi;
pub mod approve_and_call;
pub mod classifier;
mod constants;
pub mod encoder_builders;
pub mod multicall;
pub mod payments;
mod swap_encoder;
pub mod swap_router;
pub mod utils;
