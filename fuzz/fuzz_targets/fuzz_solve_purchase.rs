//! Fuzz target: budget inversion
//!
//! Verifies:
//! 1. solve_purchase_amount() never panics for any pool and budget
//! 2. The solved amount never exceeds the remaining supply
//! 3. The solved amount is always affordable at the rounded-up quote
//! 4. One more token is never affordable, whatever the supply's magnitude
//!
//! Run: cargo +nightly fuzz run fuzz_solve_purchase

#![no_main]
use arbitrary::Arbitrary;
use bcl_core::{quote_purchase, solve_purchase_amount, CurveParameters, PoolState};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzSolveInput {
    k: u32,
    total_supply: u128,
    remaining: u128,
    budget: u64,
}

fuzz_target!(|input: FuzzSolveInput| {
    let params = CurveParameters {
        k: input.k,
        total_supply: input.total_supply,
    };
    // Clamp remaining into the valid range to exercise the curve, not the guard
    let remaining = input.remaining.min(input.total_supply);
    let state = match PoolState::new(remaining, &params) {
        Ok(s) => s,
        Err(_) => return,
    };

    if let Ok(amount) = solve_purchase_amount(input.budget, &state, &params) {
        assert!(amount <= remaining);
        let cost = quote_purchase(amount, &state, &params).unwrap();
        assert!(cost <= input.budget, "solved {} costs {} > budget {}", amount, cost, input.budget);
        if amount < remaining {
            if let Ok(next) = quote_purchase(amount + 1, &state, &params) {
                assert!(next > input.budget, "{} tokens also fit the budget", amount + 1);
            }
        }
    }
});
