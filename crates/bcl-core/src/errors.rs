//! Curve, codec and validator errors

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CurveParameters;

/// Which side of a transaction a pool cell was searched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Inputs,
    Outputs,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Inputs => f.write_str("inputs"),
            Side::Outputs => f.write_str("outputs"),
        }
    }
}

/// Every way a quote, decode or validation call can fail.
///
/// All variants are terminal for the call that produced them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("Malformed pool args: {0}")]
    MalformedArgs(String),

    #[error("Malformed pool state: {0}")]
    MalformedState(String),

    #[error("No pool cell found in {0}")]
    PoolCellNotFound(Side),

    #[error("{count} pool cells found in {side}, expected exactly one")]
    AmbiguousPoolCell { side: Side, count: usize },

    #[error("Immutable curve parameters changed: {before:?} -> {after:?}")]
    ImmutableParameterChanged {
        before: CurveParameters,
        after: CurveParameters,
    },

    #[error("Invalid pool cell data: {0}")]
    InvalidPoolCellData(String),

    #[error("Insufficient collateral for issuance: paid {paid} shannons, required {required}")]
    PriceExchangeNotMet { paid: i128, required: u64 },

    #[error("Redemption pays out {paid_out} shannons, entitled to {entitled}")]
    RedemptionExceedsEntitlement { paid_out: i128, entitled: u64 },

    #[error("Redemption of {amount} exceeds circulating supply {circulating}")]
    RedemptionExceedsCirculating { amount: f64, circulating: f64 },

    #[error("Purchase of {amount} exceeds remaining supply {remaining}")]
    PurchaseExceedsRemaining { amount: f64, remaining: f64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Collateral value {0} does not fit in 64-bit shannons")]
    CollateralOverflow(f64),
}

impl CurveError {
    /// Script exit code for this failure. `0` is reserved for accept.
    pub fn exit_code(&self) -> i8 {
        match self {
            CurveError::MalformedArgs(_) => 10,
            CurveError::MalformedState(_) => 11,
            CurveError::PoolCellNotFound(_) => 20,
            CurveError::AmbiguousPoolCell { .. } => 21,
            CurveError::ImmutableParameterChanged { .. } => 30,
            CurveError::InvalidPoolCellData(_) => 31,
            CurveError::PriceExchangeNotMet { .. } => 40,
            CurveError::RedemptionExceedsEntitlement { .. } => 41,
            CurveError::RedemptionExceedsCirculating { .. } => 50,
            CurveError::PurchaseExceedsRemaining { .. } => 51,
            CurveError::InvalidAmount(_) => 52,
            CurveError::CollateralOverflow(_) => 53,
        }
    }
}

/// Result type for curve operations
pub type CurveResult<T> = Result<T, CurveError>;
