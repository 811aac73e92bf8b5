use num_bigint::BigUint;

use crate::encoding::{errors::EncodingError, models::Position};

/// Computes the token amounts a position can actually be minted with, given what is available.
///
/// Exact results depend on the pool's current price and tick math, which are not part of this
/// crate. Callers with access to pool state can plug in their own implementation.
pub trait PositionMath: Send + Sync {
    /// Returns `(amount0, amount1)` such that neither exceeds the available amount and the
    /// resulting liquidity is as large as possible.
    fn amounts_for_position(
        &self,
        position: &Position,
        amount0_available: &BigUint,
        amount1_available: &BigUint,
    ) -> Result<(BigUint, BigUint), EncodingError>;

    fn clone_box(&self) -> Box<dyn PositionMath>;
}

impl Clone for Box<dyn PositionMath> {
    fn clone(&self) -> Box<dyn PositionMath> {
        self.clone_box()
    }
}

/// Scales the position's desired amounts by the most constraining available-to-desired ratio.
///
/// The pool price is assumed to be reflected by the desired amounts, so the ratio between the two
/// tokens is kept. Results are rounded down.
#[derive(Clone, Debug, Default)]
pub struct ProportionalPositionMath;

impl PositionMath for ProportionalPositionMath {
    fn amounts_for_position(
        &self,
        position: &Position,
        amount0_available: &BigUint,
        amount1_available: &BigUint,
    ) -> Result<(BigUint, BigUint), EncodingError> {
        let desired0 = &position.amount0;
        let desired1 = &position.amount1;
        match (*desired0 == BigUint::ZERO, *desired1 == BigUint::ZERO) {
            (true, true) => Err(EncodingError::InvalidPosition(
                "Position has no desired amount for either token".to_string(),
            )),
            (true, false) => Ok((BigUint::ZERO, amount1_available.clone())),
            (false, true) => Ok((amount0_available.clone(), BigUint::ZERO)),
            (false, false) => {
                // amount0_available / desired0 <= amount1_available / desired1
                if amount0_available * desired1 <= amount1_available * desired0 {
                    Ok((amount0_available.clone(), amount0_available * desired1 / desired0))
                } else {
                    Ok((amount1_available * desired0 / desired1, amount1_available.clone()))
                }
            }
        }
    }

    fn clone_box(&self) -> Box<dyn PositionMath> {
        Box::new(self.clone())
    }
}
