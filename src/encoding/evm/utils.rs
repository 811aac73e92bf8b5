use alloy::{
    primitives::{aliases::U24, Address, B256, U256},
    sol_types::SolCall,
};
use num_bigint::BigUint;
use tycho_common::Bytes;

use crate::encoding::{
    errors::EncodingError,
    evm::constants::{ADDRESS_THIS, MSG_SENDER},
    models::{EncodedCall, Hop, Recipient},
};

/// Safely converts a `Bytes` object to an `Address` object.
///
/// Checks the length of the `Bytes` before attempting to convert, and returns an `EncodingError`
/// if not 20 bytes long.
pub fn bytes_to_address(address: &Bytes) -> Result<Address, EncodingError> {
    if address.len() == 20 {
        Ok(Address::from_slice(address))
    } else {
        Err(EncodingError::InvalidInput(format!("Invalid address: {address}")))
    }
}

/// Converts a 32 byte `Bytes` object, e.g. a blockhash or a signature component, to a `B256`.
pub fn bytes_to_b256(value: &Bytes) -> Result<B256, EncodingError> {
    if value.len() == 32 {
        Ok(B256::from_slice(value))
    } else {
        Err(EncodingError::InvalidInput(format!("Expected 32 bytes, got {value}")))
    }
}

/// Converts a general `BigUint` to an EVM-specific `U256` value.
///
/// Fails with `AmountOverflow` instead of truncating if the value does not fit into 256 bits.
pub fn biguint_to_u256(value: &BigUint) -> Result<U256, EncodingError> {
    if value.bits() > 256 {
        return Err(EncodingError::AmountOverflow(format!("{value} does not fit into uint256")));
    }
    Ok(U256::from_be_slice(&value.to_bytes_be()))
}

/// Converts a pool fee in hundredths of a bip to a `U24`.
pub fn fee_to_u24(fee: u32) -> Result<U24, EncodingError> {
    if fee > 0xFF_FFFF {
        return Err(EncodingError::InvalidRoute(format!("Pool fee {fee} does not fit into uint24")));
    }
    Ok(U24::from(fee))
}

/// Resolves a recipient to the address passed to the router, using the router's sentinels for
/// the caller and the router itself.
pub fn recipient_to_address(recipient: &Recipient) -> Result<Address, EncodingError> {
    match recipient {
        Recipient::MsgSender => Ok(MSG_SENDER),
        Recipient::Router => Ok(ADDRESS_THIS),
        Recipient::Address(address) => bytes_to_address(address),
    }
}

/// Wraps a typed router call into an `EncodedCall`, keeping its signature for inspection.
pub fn encode_call<C: SolCall>(call: C) -> EncodedCall {
    EncodedCall { selector: C::SIGNATURE.to_string(), data: call.abi_encode() }
}

/// Checks that the hops are non-empty and that every hop starts where the previous one ended.
pub fn check_hops_chain(hops: &[Hop]) -> Result<(), EncodingError> {
    if hops.is_empty() {
        return Err(EncodingError::InvalidRoute("Route has no hops".to_string()));
    }
    for pair in hops.windows(2) {
        if pair[0].token_out != pair[1].token_in {
            return Err(EncodingError::InvalidRoute(format!(
                "Hop through {} ends in {} but the next hop starts with {}",
                pair[0].pool, pair[0].token_out, pair[1].token_in
            )));
        }
    }
    Ok(())
}

/// The token addresses along the hops, first input to final output.
pub fn hops_to_token_path(hops: &[Hop]) -> Result<Vec<Address>, EncodingError> {
    check_hops_chain(hops)?;
    let mut path = Vec::with_capacity(hops.len() + 1);
    path.push(bytes_to_address(&hops[0].token_in)?);
    for hop in hops {
        path.push(bytes_to_address(&hop.token_out)?);
    }
    Ok(path)
}

/// Encodes hops into the packed path of the concentrated-liquidity router methods:
/// `token (20 bytes) | fee (3 bytes) | token | fee | ... | token`.
///
/// Exact output swaps walk the path backwards, so the path is reversed for them.
pub fn encode_hops_to_path(hops: &[Hop], exact_output: bool) -> Result<Vec<u8>, EncodingError> {
    let tokens = hops_to_token_path(hops)?;
    let mut fees = Vec::with_capacity(hops.len());
    for hop in hops {
        let fee = hop.fee.ok_or_else(|| {
            EncodingError::InvalidRoute(format!("Missing fee tier for pool {}", hop.pool))
        })?;
        fees.push(fee_to_u24(fee)?);
    }

    let (tokens, fees): (Vec<Address>, Vec<U24>) = if exact_output {
        (tokens.into_iter().rev().collect(), fees.into_iter().rev().collect())
    } else {
        (tokens, fees)
    };

    let mut path = Vec::with_capacity(tokens.len() * 20 + fees.len() * 3);
    for (token, fee) in tokens.iter().zip(fees.iter()) {
        path.extend_from_slice(token.as_slice());
        path.extend_from_slice(&fee.to_be_bytes::<3>());
    }
    if let Some(last) = tokens.last() {
        path.extend_from_slice(last.as_slice());
    }
    Ok(path)
}
