use std::io;

use thiserror::Error;

/// Represents the outer-level, user-facing errors of the swap router encoding package.
///
/// Every variant is a local validation failure: encoding is a pure computation, so none of them
/// can be fixed by retrying. Callers must correct their inputs and encode again.
/// Variants:
/// - `InvalidTradeSet`: The trade collection is empty or self-contradictory.
/// - `UnsupportedTradeType`: A route uses an unknown protocol or mixes protocol families.
/// - `InvalidRoute`: A hop sequence is empty or its tokens do not chain.
/// - `MixedRecipientConflict`: No single recipient resolution satisfies every trade's settlement.
/// - `InvalidPosition`: The liquidity position does not match the swapped tokens.
/// - `InvalidValidation`: Not exactly one of deadline / previous blockhash was supplied.
/// - `AmountOverflow`: An amount does not fit into the ABI word it is encoded into.
/// - `InvalidInput`: Any other malformed input parameter (addresses, permits, fees...).
/// - `FatalError`: There is problem with the application setup.
#[derive(Error, Debug, PartialEq)]
pub enum EncodingError {
    #[error("Invalid trade set: {0}")]
    InvalidTradeSet(String),
    #[error("Unsupported trade type: {0}")]
    UnsupportedTradeType(String),
    #[error("Invalid route: {0}")]
    InvalidRoute(String),
    #[error("Mixed recipient conflict: {0}")]
    MixedRecipientConflict(String),
    #[error("Invalid position: {0}")]
    InvalidPosition(String),
    #[error("Invalid validation: {0}")]
    InvalidValidation(String),
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Fatal error: {0}")]
    FatalError(String),
}

impl From<io::Error> for EncodingError {
    fn from(err: io::Error) -> Self {
        EncodingError::FatalError(err.to_string())
    }
}

impl From<serde_json::Error> for EncodingError {
    fn from(err: serde_json::Error) -> Self {
        EncodingError::FatalError(err.to_string())
    }
}
