// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BONDING CURVE LOCK (BCL) - CORE MODULE
//
// Logarithmic bonding-curve pricing shared by the off-chain estimator and the
// pool lock validator: quotes, budget inversion, the fixed-width pool cell
// layouts, and the state-transition check.
// Collateral is CKB, counted in u64 shannons (10^8 per CKB).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};

pub mod codec;
pub mod errors;
pub mod inverter;
pub mod pool_config;
pub mod price_curve;
pub mod validator;

pub use codec::{decode_parameters, decode_state, encode_state, HashType, PoolArgs};
pub use errors::{CurveError, CurveResult, Side};
pub use inverter::CurveInverter;
pub use pool_config::{validate_pool_name, PoolConfig};
pub use validator::{
    check_pool_transition, validate_transition, CellSnapshot, LockScript, PoolIdentityResolver,
    PoolTransition, Sha3IdentityResolver, Transition, Verdict,
};

/// 1 CKB = 100_000_000 shannons
pub const SHANNONS_PER_CKB: u64 = 100_000_000;

/// Bisection rounds for budget inversion (resolution: remaining / 2^50)
pub const BISECTION_ITERATIONS: u32 = 50;


/// Immutable per-pool curve parameters, fixed at pool creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveParameters {
    /// Steepness: marginal price is `k · ln(circulating)`
    pub k: u32,
    /// Maximum issuable token quantity
    pub total_supply: u128,
}

/// Mutable per-pool state: tokens not yet issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolState {
    remaining: u128,
}

impl PoolState {
    /// Validated constructor: `remaining` may not exceed the pool's supply.
    pub fn new(remaining: u128, params: &CurveParameters) -> CurveResult<Self> {
        if remaining > params.total_supply {
            return Err(CurveError::InvalidPoolCellData(format!(
                "remaining {} exceeds total supply {}",
                remaining, params.total_supply
            )));
        }
        Ok(Self { remaining })
    }

    /// Decode from a pool cell's 16-byte data.
    pub fn from_bytes(bytes: &[u8], params: &CurveParameters) -> CurveResult<Self> {
        Self::new(decode_state(bytes)?, params)
    }

    pub fn remaining(&self) -> u128 {
        self.remaining
    }

    /// Tokens issued so far
    pub fn circulating(&self, params: &CurveParameters) -> u128 {
        params.total_supply.saturating_sub(self.remaining)
    }

    pub fn to_bytes(&self) -> [u8; codec::STATE_LEN] {
        encode_state(self.remaining)
    }
}

/// Shannons a buyer must add to the pool for `amount` tokens (rounded up).
pub fn quote_purchase(
    amount: u128,
    state: &PoolState,
    params: &CurveParameters,
) -> CurveResult<u64> {
    let cost = price_curve::issuance_cost(amount, state.remaining, params)?;
    price_curve::charge_shannons(cost)
}

/// Shannons the pool may pay out for redeeming `amount` tokens (rounded down).
pub fn quote_redemption(
    amount: u128,
    state: &PoolState,
    params: &CurveParameters,
) -> CurveResult<u64> {
    let ret = price_curve::redemption_value(amount, state.remaining, params)?;
    price_curve::payout_shannons(ret)
}

/// Whole tokens purchasable with `budget` shannons.
///
/// The continuous solution only seeds the search: the answer is bisected on
/// whole tokens against the rounded-up quote, so `quote_purchase(result)`
/// fits the budget and `quote_purchase(result + 1)` does not (unless the
/// pool is sold out). Works past 2^53 tokens where `f64` cannot hold every
/// amount.
pub fn solve_purchase_amount(
    budget: u64,
    state: &PoolState,
    params: &CurveParameters,
) -> CurveResult<u128> {
    let fits = |amount: u128| -> CurveResult<bool> {
        match quote_purchase(amount, state, params) {
            Ok(quote) => Ok(quote <= budget),
            Err(CurveError::CollateralOverflow(_)) => Ok(false),
            Err(e) => Err(e),
        }
    };

    if fits(state.remaining)? {
        return Ok(state.remaining);
    }

    let approx = CurveInverter::default().solve_purchase_amount(
        budget as f64 / SHANNONS_PER_CKB as f64,
        state.remaining as f64,
        params.total_supply as f64,
        params.k as f64,
    )?;
    let hint = (approx.floor() as u128).min(state.remaining);

    // invariant: fits(low) && !fits(high)
    let (mut low, mut high) = if fits(hint)? {
        (hint, state.remaining)
    } else {
        (0, hint)
    };
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if fits(mid)? {
            low = mid;
        } else {
            high = mid;
        }
    }
    Ok(low)
}

/// Off-chain pool simulator: parameters plus current remaining supply.
///
/// Curve values use `f64`, so two platforms may disagree in the last bit;
/// the validator only ever compares them after rounding to whole shannons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondingCurve {
    pub params: CurveParameters,
    pub remaining: u128,
}

impl BondingCurve {
    /// New pool: nothing issued yet.
    pub fn new(params: CurveParameters) -> Self {
        BondingCurve {
            params,
            remaining: params.total_supply,
        }
    }

    pub fn from_state(params: CurveParameters, state: PoolState) -> Self {
        BondingCurve {
            params,
            remaining: state.remaining,
        }
    }

    fn state(&self) -> CurveResult<PoolState> {
        PoolState::new(self.remaining, &self.params)
    }

    pub fn circulating(&self) -> u128 {
        self.params.total_supply.saturating_sub(self.remaining)
    }

    /// Get percent of supply issued
    pub fn issued_percent(&self) -> f64 {
        if self.params.total_supply == 0 {
            return 0.0;
        }
        (self.circulating() as f64 / self.params.total_supply as f64) * 100.0
    }

    /// Marginal price of the next token, in CKB
    pub fn spot_price(&self) -> f64 {
        price_curve::marginal_price(self.circulating() as f64, self.params.k as f64)
    }

    pub fn quote_purchase(&self, amount: u128) -> CurveResult<u64> {
        quote_purchase(amount, &self.state()?, &self.params)
    }

    pub fn quote_redemption(&self, amount: u128) -> CurveResult<u64> {
        quote_redemption(amount, &self.state()?, &self.params)
    }

    pub fn solve_purchase_amount(&self, budget: u64) -> CurveResult<u128> {
        solve_purchase_amount(budget, &self.state()?, &self.params)
    }

    /// Issue `amount` tokens; returns the shannons charged.
    pub fn apply_purchase(&mut self, amount: u128) -> CurveResult<u64> {
        let charged = self.quote_purchase(amount)?;
        self.remaining -= amount;
        Ok(charged)
    }

    /// Redeem `amount` tokens; returns the shannons paid out.
    pub fn apply_redemption(&mut self, amount: u128) -> CurveResult<u64> {
        let paid = self.quote_redemption(amount)?;
        self.remaining += amount;
        Ok(paid)
    }

    /// Verify the simulator state is consistent (remaining within supply)
    pub fn is_valid(&self) -> bool {
        self.remaining <= self.params.total_supply
    }
}
