// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LOGARITHMIC PRICE CURVE
//
// Marginal price:   price(s) = k · ln(s)
// Purchase cost:    k · [s1·ln(s1) − s0·ln(s0) − Δ]
// Redemption:       k · [s0·ln(s0) − s1·ln(s1) + Δ]
//
// Neither bracket is evaluated as written: at large supply the two
// `s·ln(s)` terms agree in every significant bit and the difference is lost.
//
// Both the off-chain estimator and the validator call into this module, so
// any change here changes what the validator accepts.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::errors::{CurveError, CurveResult};
use crate::{CurveParameters, SHANNONS_PER_CKB};

/// `x · ln(x)`, with the removable singularity at zero filled in as `0`.
pub fn entropy(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    x * x.ln()
}

/// Marginal price at a given circulating supply, in CKB per token.
pub fn marginal_price(circulating: f64, k: f64) -> f64 {
    if circulating == 0.0 {
        return 0.0;
    }
    k * circulating.ln()
}

fn check_finite_non_negative(name: &str, value: f64) -> CurveResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CurveError::InvalidAmount(format!(
            "{} must be finite and non-negative, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_pool(remaining: f64, total_supply: f64, k: f64) -> CurveResult<()> {
    check_finite_non_negative("remaining", remaining)?;
    check_finite_non_negative("total_supply", total_supply)?;
    check_finite_non_negative("k", k)?;
    if remaining > total_supply {
        return Err(CurveError::InvalidPoolCellData(format!(
            "remaining {} exceeds total supply {}",
            remaining, total_supply
        )));
    }
    Ok(())
}

/// `∫ ln s ds` over `[s0, s1]`, the area under the curve for a purchase.
///
/// Written as `Δ·(ln s1 − 1) + s0·ln(1 + Δ/s0)` so that a small `Δ` on top
/// of a huge `s0` never vanishes in the subtraction of two large products.
fn purchase_area(amount: f64, s0: f64, s1: f64) -> f64 {
    if amount == 0.0 {
        return 0.0;
    }
    let mut area = amount * (s1.ln() - 1.0);
    if s0 > 0.0 {
        area += s0 * (amount / s0).ln_1p();
    }
    area
}

/// `s0·ln s0 − s1·ln s1 + Δ`, as `Δ·(ln s0 + 1) + s1·ln(1 + Δ/s1)`.
fn redemption_area(amount: f64, s0: f64, s1: f64) -> f64 {
    if amount == 0.0 {
        return 0.0;
    }
    let mut area = amount * (s0.ln() + 1.0);
    if s1 > 0.0 {
        area += s1 * (amount / s1).ln_1p();
    }
    area
}

/// Collateral (in CKB) required to buy `amount` tokens from the pool.
///
/// The result is clamped at zero: floating-point residue near `amount = 0`
/// must never surface as a negative cost.
pub fn purchase_cost(amount: f64, remaining: f64, total_supply: f64, k: f64) -> CurveResult<f64> {
    check_finite_non_negative("amount", amount)?;
    check_pool(remaining, total_supply, k)?;
    if amount > remaining {
        return Err(CurveError::PurchaseExceedsRemaining { amount, remaining });
    }

    let s0 = total_supply - remaining;
    let cost = k * purchase_area(amount, s0, s0 + amount);

    Ok(cost.max(0.0))
}

/// Collateral (in CKB) returned for redeeming `amount` tokens into the pool.
///
/// Redeeming more than is circulating is a caller bug and fails loudly.
pub fn redemption_return(
    amount: f64,
    remaining: f64,
    total_supply: f64,
    k: f64,
) -> CurveResult<f64> {
    check_finite_non_negative("amount", amount)?;
    check_pool(remaining, total_supply, k)?;

    let s0 = total_supply - remaining;
    if amount > s0 {
        return Err(CurveError::RedemptionExceedsCirculating {
            amount,
            circulating: s0,
        });
    }
    let ret = k * redemption_area(amount, s0, s0 - amount);

    Ok(ret.max(0.0))
}

fn check_supply(remaining: u128, params: &CurveParameters) -> CurveResult<u128> {
    params.total_supply.checked_sub(remaining).ok_or_else(|| {
        CurveError::InvalidPoolCellData(format!(
            "remaining {} exceeds total supply {}",
            remaining, params.total_supply
        ))
    })
}

/// Purchase cost for whole tokens. Circulating supply before and after is
/// computed in `u128` and only then converted, so large pools keep the
/// amount bought even when it is tiny next to the supply.
pub fn issuance_cost(amount: u128, remaining: u128, params: &CurveParameters) -> CurveResult<f64> {
    let s0 = check_supply(remaining, params)?;
    if amount > remaining {
        return Err(CurveError::PurchaseExceedsRemaining {
            amount: amount as f64,
            remaining: remaining as f64,
        });
    }
    let s1 = s0 + amount;
    let cost = params.k as f64 * purchase_area(amount as f64, s0 as f64, s1 as f64);
    Ok(cost.max(0.0))
}

/// Redemption return for whole tokens, exact-integer counterpart of
/// [`redemption_return`].
pub fn redemption_value(
    amount: u128,
    remaining: u128,
    params: &CurveParameters,
) -> CurveResult<f64> {
    let s0 = check_supply(remaining, params)?;
    if amount > s0 {
        return Err(CurveError::RedemptionExceedsCirculating {
            amount: amount as f64,
            circulating: s0 as f64,
        });
    }
    let s1 = s0 - amount;
    let ret = params.k as f64 * redemption_area(amount as f64, s0 as f64, s1 as f64);
    Ok(ret.max(0.0))
}

fn to_shannons(value: f64) -> CurveResult<u64> {
    if !value.is_finite() || value < 0.0 || value >= u64::MAX as f64 {
        return Err(CurveError::CollateralOverflow(value));
    }
    Ok(value as u64)
}

/// Round a CKB amount charged to a buyer up to whole shannons.
pub fn charge_shannons(cost: f64) -> CurveResult<u64> {
    to_shannons((cost * SHANNONS_PER_CKB as f64).ceil())
}

/// Round a CKB amount paid out of the pool down to whole shannons.
pub fn payout_shannons(ret: f64) -> CurveResult<u64> {
    to_shannons((ret * SHANNONS_PER_CKB as f64).floor())
}

/// `points` evenly spaced `(circulating, marginal_price)` samples over the
/// whole supply, for charting. Fewer than two points yields both endpoints.
pub fn curve_points(params: &CurveParameters, points: usize) -> Vec<(f64, f64)> {
    let points = points.max(2);
    let total = params.total_supply as f64;
    let k = params.k as f64;
    (0..points)
        .map(|i| {
            let s = total * i as f64 / (points - 1) as f64;
            (s, marginal_price(s, k))
        })
        .collect()
}
