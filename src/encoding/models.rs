use std::fmt;

use clap::ValueEnum;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tycho_common::Bytes;

use crate::encoding::{
    errors::EncodingError,
    serde_primitives::{biguint_string, biguint_string_option},
};

/// Upper bound of the fee the router is willing to skim from the output, in basis points.
pub const MAX_FEE_BIPS: u32 = 100;

const BIPS_DENOMINATOR: u32 = 10_000;

/// An exact ratio, used for slippage tolerances and fees.
///
/// Token amounts end up as transaction bytes, so every derived amount is computed with integer
/// arithmetic on this ratio and never through floating point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percent {
    #[serde(with = "biguint_string")]
    pub numerator: BigUint,
    #[serde(with = "biguint_string")]
    pub denominator: BigUint,
}

impl Percent {
    pub fn new(numerator: impl Into<BigUint>, denominator: impl Into<BigUint>) -> Self {
        Self { numerator: numerator.into(), denominator: denominator.into() }
    }

    pub fn from_bips(bips: u32) -> Self {
        Self::new(bips, BIPS_DENOMINATOR)
    }

    /// Checks that the ratio can be used as a slippage tolerance: the denominator is non-zero
    /// and the ratio is strictly below 100%.
    pub fn validate_slippage(&self) -> Result<(), EncodingError> {
        if self.denominator == BigUint::ZERO {
            return Err(EncodingError::InvalidInput(
                "Slippage tolerance denominator must not be zero".to_string(),
            ));
        }
        if self.numerator >= self.denominator {
            return Err(EncodingError::InvalidInput(format!(
                "Slippage tolerance must be below 100%, got {self}"
            )));
        }
        Ok(())
    }

    /// Worst acceptable output of an exact input swap: `floor(amount * (1 - self))`.
    pub fn minimum_amount_out(&self, amount: &BigUint) -> BigUint {
        if self.numerator >= self.denominator {
            return BigUint::ZERO;
        }
        amount * (&self.denominator - &self.numerator) / &self.denominator
    }

    /// Worst acceptable input of an exact output swap: `ceil(amount * (1 + self))`.
    pub fn maximum_amount_in(&self, amount: &BigUint) -> BigUint {
        if self.denominator == BigUint::ZERO {
            return amount.clone();
        }
        let scaled = amount * (&self.denominator + &self.numerator);
        (scaled + &self.denominator - 1u32) / &self.denominator
    }

    /// The ratio expressed in whole basis points, rounded down.
    pub fn to_bips(&self) -> Result<u32, EncodingError> {
        if self.denominator == BigUint::ZERO {
            return Err(EncodingError::InvalidInput("Percent denominator is zero".to_string()));
        }
        let bips = &self.numerator * BIPS_DENOMINATOR / &self.denominator;
        u32::try_from(&bips)
            .map_err(|_| EncodingError::InvalidInput(format!("Percent {self} is too large")))
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Direction of a trade: which side of the swap is fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeType {
    ExactInput,
    ExactOutput,
}

/// AMM family a route executes against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Constant-product pools (`x * y = k`), swapped through the router's V2 methods.
    ConstantProduct,
    /// Concentrated-liquidity pools with fee tiers, swapped through the router's V3 methods.
    ConcentratedLiquidity,
}

/// How the routes of a single trade are spread over the supported protocols.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TradeKind {
    ConstantProduct,
    ConcentratedLiquidity,
    /// Routes over both protocols, each route staying within one protocol.
    Mixed,
}

/// One pool traversal within a route.
///
/// # Fields
/// * `protocol_system`: Protocol of the pool, e.g. `uniswap_v2` or `uniswap_v3`.
/// * `pool`: Address of the pool.
/// * `fee`: Fee tier of the pool in hundredths of a bip. Required for concentrated liquidity.
/// * `token_in`: Token sold into the pool.
/// * `token_out`: Token bought from the pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub protocol_system: String,
    pub pool: Bytes,
    #[serde(default)]
    pub fee: Option<u32>,
    pub token_in: Bytes,
    pub token_out: Bytes,
}

impl Hop {
    pub fn new(
        protocol_system: &str,
        pool: Bytes,
        fee: Option<u32>,
        token_in: Bytes,
        token_out: Bytes,
    ) -> Self {
        Self { protocol_system: protocol_system.to_string(), pool, fee, token_in, token_out }
    }
}

/// An ordered path of hops together with the amounts flowing through it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub hops: Vec<Hop>,
    #[serde(with = "biguint_string")]
    pub input_amount: BigUint,
    #[serde(with = "biguint_string")]
    pub output_amount: BigUint,
}

impl Route {
    pub fn new(hops: Vec<Hop>, input_amount: BigUint, output_amount: BigUint) -> Self {
        Self { hops, input_amount, output_amount }
    }
}

/// An already computed trade, split over one or more routes.
///
/// `input_token` and `output_token` may be the chain's native token, while the hops always refer
/// to the wrapped native token. Trades are never modified by the encoder.
///
/// # Fields
/// * `trade_type`: Whether the input or the output amount is exact.
/// * `input_token`: Currency sold by the trade.
/// * `output_token`: Currency bought by the trade.
/// * `routes`: Routes the amounts are split over.
/// * `fee_on_transfer`: True if the output token may tax transfers. Selects the constant-product
///   swap variant that settles on balances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_type: TradeType,
    pub input_token: Bytes,
    pub output_token: Bytes,
    pub routes: Vec<Route>,
    #[serde(default)]
    pub fee_on_transfer: bool,
}

impl Trade {
    pub fn input_amount(&self) -> BigUint {
        self.routes
            .iter()
            .map(|route| &route.input_amount)
            .sum()
    }

    pub fn output_amount(&self) -> BigUint {
        self.routes
            .iter()
            .map(|route| &route.output_amount)
            .sum()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct ValidationParts {
    #[serde(with = "biguint_string_option", default, skip_serializing_if = "Option::is_none")]
    deadline: Option<BigUint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_blockhash: Option<Bytes>,
}

/// Guard the multicall is executed under: either an absolute expiry timestamp or the hash of the
/// block the transaction must directly follow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ValidationParts", into = "ValidationParts")]
pub enum Validation {
    Deadline(BigUint),
    PreviousBlockhash(Bytes),
}

impl Validation {
    /// Builds the guard from optional parts, requiring exactly one of them.
    pub fn from_parts(
        deadline: Option<BigUint>,
        previous_blockhash: Option<Bytes>,
    ) -> Result<Self, EncodingError> {
        match (deadline, previous_blockhash) {
            (Some(deadline), None) => Ok(Validation::Deadline(deadline)),
            (None, Some(blockhash)) => {
                if blockhash.len() != 32 {
                    return Err(EncodingError::InvalidValidation(format!(
                        "Previous blockhash must be 32 bytes long, got {}",
                        blockhash.len()
                    )));
                }
                Ok(Validation::PreviousBlockhash(blockhash))
            }
            (Some(_), Some(_)) => Err(EncodingError::InvalidValidation(
                "Only one of deadline and previous blockhash can be set".to_string(),
            )),
            (None, None) => Err(EncodingError::InvalidValidation(
                "Either a deadline or a previous blockhash must be set".to_string(),
            )),
        }
    }
}

impl TryFrom<ValidationParts> for Validation {
    type Error = EncodingError;

    fn try_from(parts: ValidationParts) -> Result<Self, Self::Error> {
        Validation::from_parts(parts.deadline, parts.previous_blockhash)
    }
}

impl From<Validation> for ValidationParts {
    fn from(validation: Validation) -> Self {
        match validation {
            Validation::Deadline(deadline) => {
                ValidationParts { deadline: Some(deadline), previous_blockhash: None }
            }
            Validation::PreviousBlockhash(blockhash) => {
                ValidationParts { deadline: None, previous_blockhash: Some(blockhash) }
            }
        }
    }
}

/// A fee skimmed from the output of the swaps before the remainder reaches the recipient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeOptions {
    pub fee: Percent,
    pub recipient: Bytes,
}

impl FeeOptions {
    pub fn new(fee: Percent, recipient: Bytes) -> Self {
        Self { fee, recipient }
    }

    /// The fee in basis points, as passed to the router's `...WithFee` methods.
    pub fn fee_bips(&self) -> Result<u32, EncodingError> {
        let bips = self.fee.to_bips()?;
        if bips == 0 || bips > MAX_FEE_BIPS {
            return Err(EncodingError::InvalidInput(format!(
                "Fee must be between 1 and {MAX_FEE_BIPS} bips, got {bips}"
            )));
        }
        Ok(bips)
    }

    /// Splits an output balance into `(fee, remainder)` the same way the router does.
    ///
    /// The fee is rounded down, so `fee + remainder == amount` always holds.
    pub fn split(&self, amount: &BigUint) -> Result<(BigUint, BigUint), EncodingError> {
        let fee_amount = amount * self.fee_bips()? / BIPS_DENOMINATOR;
        let remainder = amount - &fee_amount;
        Ok((fee_amount, remainder))
    }
}

/// Signature based allowance for the input token, so no separate approval transaction is needed.
///
/// The variant is selected by which fields are populated:
/// - `Allowed`: DAI-style permit with `nonce` and `expiry`.
/// - `Standard`: EIP-2612 permit with split `v`, `r`, `s`.
/// - `Signature`: EIP-2612 permit with the 65 byte `r || s || v` signature.
///
/// Setting `if_necessary` lets the router skip the permit if the allowance is already sufficient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermitOptions {
    Allowed {
        v: u8,
        r: Bytes,
        s: Bytes,
        #[serde(with = "biguint_string")]
        nonce: BigUint,
        #[serde(with = "biguint_string")]
        expiry: BigUint,
        #[serde(default)]
        if_necessary: bool,
    },
    Standard {
        v: u8,
        r: Bytes,
        s: Bytes,
        #[serde(with = "biguint_string")]
        amount: BigUint,
        #[serde(with = "biguint_string")]
        deadline: BigUint,
        #[serde(default)]
        if_necessary: bool,
    },
    Signature {
        signature: Bytes,
        #[serde(with = "biguint_string")]
        amount: BigUint,
        #[serde(with = "biguint_string")]
        deadline: BigUint,
        #[serde(default)]
        if_necessary: bool,
    },
}

/// Options for producing the arguments to send calls to the router.
///
/// # Fields
/// * `slippage_tolerance`: How much the execution price may move unfavorably.
/// * `recipient`: Receiver of the output. If omitted, the output goes to the transaction sender.
/// * `validation`: Deadline or previous blockhash the multicall is guarded with.
/// * `input_token_permit`: Optional permit for spending the input token.
/// * `fee`: Optional fee taken on the output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwapOptions {
    pub slippage_tolerance: Percent,
    #[serde(default)]
    pub recipient: Option<Bytes>,
    pub validation: Validation,
    #[serde(default)]
    pub input_token_permit: Option<PermitOptions>,
    #[serde(default)]
    pub fee: Option<FeeOptions>,
}

/// Receiver of a swap's output, as seen by the router.
///
/// `MsgSender` and `Router` are resolved by the router itself, which lets the output be held by
/// the router for unwrapping, fee skimming or sweeping before it reaches the final recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recipient {
    MsgSender,
    Router,
    Address(Bytes),
}

/// Represents necessary attributes for encoding a swap call.
///
/// # Fields
/// * `recipient`: Receiver of the swap's output.
/// * `trade_type`: Direction of the trade set.
/// * `slippage_tolerance`: Tolerance the per-call bounds are derived from.
/// * `aggregated_slippage_check`: If set, swaps carry no minimum output of their own. The minimum
///   is checked once on the total output by the settling sweep.
#[derive(Clone, Debug)]
pub struct EncodingContext {
    pub recipient: Recipient,
    pub trade_type: TradeType,
    pub slippage_tolerance: Percent,
    pub aggregated_slippage_check: bool,
}

/// A single router call: the human readable function signature and the full calldata,
/// selector included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedCall {
    pub selector: String,
    pub data: Vec<u8>,
}

/// The complete, ready-to-sign transaction payload.
///
/// # Fields
/// * `to`: Address of the router.
/// * `calldata`: Encoded multicall.
/// * `value`: Native token value to be sent with the transaction.
/// * `calls`: The calls bundled in the multicall, in execution order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodParameters {
    pub to: Bytes,
    pub calldata: Vec<u8>,
    pub value: BigUint,
    pub calls: Vec<EncodedCall>,
}

/// Pool a liquidity position is opened in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionPool {
    pub token0: Bytes,
    pub token1: Bytes,
    pub fee: u32,
}

/// A concentrated-liquidity position and the token amounts desired for minting it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub pool: PositionPool,
    pub tick_lower: i32,
    pub tick_upper: i32,
    #[serde(with = "biguint_string")]
    pub amount0: BigUint,
    #[serde(with = "biguint_string")]
    pub amount1: BigUint,
}

/// Whether the deposit opens a new position or adds to an existing one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddLiquidityOptions {
    Mint {
        recipient: Bytes,
    },
    Increase {
        #[serde(with = "biguint_string")]
        token_id: BigUint,
    },
}

/// How the router grants the position manager an allowance for a token.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalType {
    NotRequired = 0,
    Max = 1,
    MaxMinusOne = 2,
    ZeroThenMax = 3,
    ZeroThenMaxMinusOne = 4,
}
