use num_bigint::BigUint;

use crate::encoding::{
    errors::EncodingError,
    models::{EncodingContext, EncodedCall, Hop, Route},
};

/// A planned swap call: the hops it traverses and the (possibly aggregated) amounts.
///
/// A leg starts out as a single route. Encoders that can combine routes sharing the same hops
/// merge several legs into one, summing their amounts.
#[derive(Clone, Debug, PartialEq)]
pub struct SwapLeg<'a> {
    pub hops: &'a [Hop],
    pub amount_in: BigUint,
    pub amount_out: BigUint,
    pub fee_on_transfer: bool,
}

impl<'a> SwapLeg<'a> {
    pub fn from_route(route: &'a Route, fee_on_transfer: bool) -> Self {
        Self {
            hops: &route.hops,
            amount_in: route.input_amount.clone(),
            amount_out: route.output_amount.clone(),
            fee_on_transfer,
        }
    }
}

/// A trait for protocol-family-specific swap encoding logic.
pub trait SwapEncoder: Sync + Send {
    /// Turns the legs routed through this protocol family into the legs that are actually
    /// encoded, one per router call. The relative order of first appearance is preserved.
    fn plan_swaps<'a>(&self, legs: Vec<SwapLeg<'a>>) -> Result<Vec<SwapLeg<'a>>, EncodingError>;

    /// Encodes one planned leg into a router swap call, deriving its bounds from the context.
    fn encode_swap(
        &self,
        leg: &SwapLeg,
        encoding_context: &EncodingContext,
    ) -> Result<EncodedCall, EncodingError>;

    /// Clones the swap encoder as a trait object.
    /// This allows the encoder to be cloned when it is being used as a `Box<dyn SwapEncoder>`.
    fn clone_box(&self) -> Box<dyn SwapEncoder>;
}

impl Clone for Box<dyn SwapEncoder> {
    fn clone(&self) -> Box<dyn SwapEncoder> {
        self.clone_box()
    }
}
