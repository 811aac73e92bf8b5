use alloy::primitives::{Address, B256, U256};
use num_bigint::BigUint;
use tycho_common::Bytes;

use crate::encoding::{
    errors::EncodingError,
    evm::{
        abi::{IPaymentsExtended, IPaymentsToRecipient, IPaymentsToSender, ISelfPermit},
        utils::{biguint_to_u256, bytes_to_address, bytes_to_b256, encode_call},
    },
    models::{EncodedCall, FeeOptions, PermitOptions},
};

/// Encodes the permit granting the router an allowance of `token` on behalf of the caller.
pub fn encode_permit(token: &Bytes, permit: &PermitOptions) -> Result<EncodedCall, EncodingError> {
    let token = bytes_to_address(token)?;
    match permit {
        PermitOptions::Allowed { v, r, s, nonce, expiry, if_necessary } => {
            let (nonce, expiry) = (biguint_to_u256(nonce)?, biguint_to_u256(expiry)?);
            let (r, s) = (bytes_to_b256(r)?, bytes_to_b256(s)?);
            if *if_necessary {
                Ok(encode_call(ISelfPermit::selfPermitAllowedIfNecessaryCall {
                    token,
                    nonce,
                    expiry,
                    v: *v,
                    r,
                    s,
                }))
            } else {
                Ok(encode_call(ISelfPermit::selfPermitAllowedCall { token, nonce, expiry, v: *v, r, s }))
            }
        }
        PermitOptions::Standard { v, r, s, amount, deadline, if_necessary } => encode_standard_permit(
            token,
            biguint_to_u256(amount)?,
            biguint_to_u256(deadline)?,
            (*v, bytes_to_b256(r)?, bytes_to_b256(s)?),
            *if_necessary,
        ),
        PermitOptions::Signature { signature, amount, deadline, if_necessary } => {
            encode_standard_permit(
                token,
                biguint_to_u256(amount)?,
                biguint_to_u256(deadline)?,
                split_signature(signature)?,
                *if_necessary,
            )
        }
    }
}

fn encode_standard_permit(
    token: Address,
    value: U256,
    deadline: U256,
    (v, r, s): (u8, B256, B256),
    if_necessary: bool,
) -> Result<EncodedCall, EncodingError> {
    if if_necessary {
        Ok(encode_call(ISelfPermit::selfPermitIfNecessaryCall { token, value, deadline, v, r, s }))
    } else {
        Ok(encode_call(ISelfPermit::selfPermitCall { token, value, deadline, v, r, s }))
    }
}

/// Splits a 65 byte `r || s || v` signature. A recovery id of 0 or 1 is shifted to 27 or 28.
fn split_signature(signature: &Bytes) -> Result<(u8, B256, B256), EncodingError> {
    if signature.len() != 65 {
        return Err(EncodingError::InvalidInput(format!(
            "Permit signature must be 65 bytes long, got {}",
            signature.len()
        )));
    }
    let r = B256::from_slice(&signature[..32]);
    let s = B256::from_slice(&signature[32..64]);
    let v = match signature[64] {
        v @ (0 | 1) => v + 27,
        v @ (27 | 28) => v,
        v => {
            return Err(EncodingError::InvalidInput(format!("Invalid signature recovery id {v}")))
        }
    };
    Ok((v, r, s))
}

pub fn encode_wrap_eth(amount: &BigUint) -> Result<EncodedCall, EncodingError> {
    Ok(encode_call(IPaymentsExtended::wrapETHCall { value: biguint_to_u256(amount)? }))
}

pub fn encode_pull(token: &Bytes, amount: &BigUint) -> Result<EncodedCall, EncodingError> {
    Ok(encode_call(IPaymentsExtended::pullCall {
        token: bytes_to_address(token)?,
        value: biguint_to_u256(amount)?,
    }))
}

pub fn encode_refund_eth() -> EncodedCall {
    encode_call(IPaymentsExtended::refundETHCall {})
}

/// Unwraps the router's wrapped native balance and sends it out, requiring at least
/// `amount_minimum`.
///
/// Without a recipient the caller receives the funds. With a fee, `fee.fee_bips` of the balance
/// goes to the fee recipient first.
pub fn encode_unwrap_weth9(
    amount_minimum: &BigUint,
    recipient: Option<&Bytes>,
    fee: Option<&FeeOptions>,
) -> Result<EncodedCall, EncodingError> {
    let amount_minimum = biguint_to_u256(amount_minimum)?;
    let call = match (recipient, fee) {
        (Some(recipient), Some(fee)) => encode_call(IPaymentsToRecipient::unwrapWETH9WithFeeCall {
            amountMinimum: amount_minimum,
            recipient: bytes_to_address(recipient)?,
            feeBips: U256::from(fee.fee_bips()?),
            feeRecipient: bytes_to_address(&fee.recipient)?,
        }),
        (None, Some(fee)) => encode_call(IPaymentsToSender::unwrapWETH9WithFeeCall {
            amountMinimum: amount_minimum,
            feeBips: U256::from(fee.fee_bips()?),
            feeRecipient: bytes_to_address(&fee.recipient)?,
        }),
        (Some(recipient), None) => encode_call(IPaymentsToRecipient::unwrapWETH9Call {
            amountMinimum: amount_minimum,
            recipient: bytes_to_address(recipient)?,
        }),
        (None, None) => {
            encode_call(IPaymentsToSender::unwrapWETH9Call { amountMinimum: amount_minimum })
        }
    };
    Ok(call)
}

/// Sends the router's whole balance of `token` out, requiring at least `amount_minimum`.
///
/// Recipient and fee resolve the same way as for [`encode_unwrap_weth9`].
pub fn encode_sweep_token(
    token: &Bytes,
    amount_minimum: &BigUint,
    recipient: Option<&Bytes>,
    fee: Option<&FeeOptions>,
) -> Result<EncodedCall, EncodingError> {
    let token = bytes_to_address(token)?;
    let amount_minimum = biguint_to_u256(amount_minimum)?;
    let call = match (recipient, fee) {
        (Some(recipient), Some(fee)) => encode_call(IPaymentsToRecipient::sweepTokenWithFeeCall {
            token,
            amountMinimum: amount_minimum,
            recipient: bytes_to_address(recipient)?,
            feeBips: U256::from(fee.fee_bips()?),
            feeRecipient: bytes_to_address(&fee.recipient)?,
        }),
        (None, Some(fee)) => encode_call(IPaymentsToSender::sweepTokenWithFeeCall {
            token,
            amountMinimum: amount_minimum,
            feeBips: U256::from(fee.fee_bips()?),
            feeRecipient: bytes_to_address(&fee.recipient)?,
        }),
        (Some(recipient), None) => encode_call(IPaymentsToRecipient::sweepTokenCall {
            token,
            amountMinimum: amount_minimum,
            recipient: bytes_to_address(recipient)?,
        }),
        (None, None) => {
            encode_call(IPaymentsToSender::sweepTokenCall { token, amountMinimum: amount_minimum })
        }
    };
    Ok(call)
}
