use alloy::{primitives::Bytes as AlloyBytes, sol_types::SolCall};

use crate::encoding::{
    errors::EncodingError,
    evm::{
        abi::{IMulticallBlockhash, IMulticallDeadline},
        utils::{biguint_to_u256, bytes_to_b256},
    },
    models::{EncodedCall, Validation},
};

/// Bundles the calls into a single `multicall`, guarded by a deadline or a previous blockhash.
///
/// A single call is bundled as well: the router's swap methods carry no deadline of their own,
/// so the multicall is the only place the guard can be enforced.
pub fn encode_multicall(
    calls: &[EncodedCall],
    validation: &Validation,
) -> Result<Vec<u8>, EncodingError> {
    if calls.is_empty() {
        return Err(EncodingError::FatalError("No calls to bundle into a multicall".to_string()));
    }
    let data: Vec<AlloyBytes> = calls
        .iter()
        .map(|call| AlloyBytes::from(call.data.clone()))
        .collect();
    match validation {
        Validation::Deadline(deadline) => {
            Ok(IMulticallDeadline::multicallCall { deadline: biguint_to_u256(deadline)?, data }
                .abi_encode())
        }
        Validation::PreviousBlockhash(blockhash) => {
            // The variant can be built without going through `Validation::from_parts`.
            let previous_blockhash = bytes_to_b256(blockhash).map_err(|_| {
                EncodingError::InvalidValidation(format!(
                    "Previous blockhash must be 32 bytes long, got {}",
                    blockhash.len()
                ))
            })?;
            Ok(IMulticallBlockhash::multicallCall { previousBlockhash: previous_blockhash, data }
                .abi_encode())
        }
    }
}
