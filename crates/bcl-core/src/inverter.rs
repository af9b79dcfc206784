//! Budget → token amount inversion of the purchase cost.
//!
//! Bisection runs a fixed number of rounds instead of stopping on an epsilon,
//! so the answer depends only on the inputs and never on how a platform
//! rounds intermediate comparisons.

use crate::errors::{CurveError, CurveResult};
use crate::price_curve::purchase_cost;
use crate::BISECTION_ITERATIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveInverter {
    pub iterations: u32,
}

impl Default for CurveInverter {
    fn default() -> Self {
        Self {
            iterations: BISECTION_ITERATIONS,
        }
    }
}

impl CurveInverter {
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Largest `amount` in `[0, remaining]` whose purchase cost fits `budget`
    /// (CKB), to within `remaining / 2^iterations`.
    ///
    /// Returns the lower bisection bound, so `purchase_cost(result) <= budget`
    /// always holds. Callers committing on-chain must round the result down.
    pub fn solve_purchase_amount(
        &self,
        budget: f64,
        remaining: f64,
        total_supply: f64,
        k: f64,
    ) -> CurveResult<f64> {
        if !budget.is_finite() || budget < 0.0 {
            return Err(CurveError::InvalidAmount(format!(
                "budget must be finite and non-negative, got {}",
                budget
            )));
        }

        // Validates the pool arguments as a side effect.
        if purchase_cost(remaining, remaining, total_supply, k)? <= budget {
            return Ok(remaining);
        }

        let mut low = 0.0_f64;
        let mut high = remaining;
        for _ in 0..self.iterations {
            let mid = (low + high) / 2.0;
            if purchase_cost(mid, remaining, total_supply, k)? > budget {
                high = mid;
            } else {
                low = mid;
            }
        }

        Ok(low)
    }
}
