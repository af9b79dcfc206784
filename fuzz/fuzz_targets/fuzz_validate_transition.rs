//! Fuzz target: pool transition validation
//!
//! Verifies:
//! 1. check_pool_transition() never panics, whatever the payloads
//! 2. Changed curve parameters are never accepted
//! 3. An accepted issuance paid at least what the estimator quotes
//! 4. A transition JSON file never panics the full validator
//!
//! Run: cargo +nightly fuzz run fuzz_validate_transition

#![no_main]
use arbitrary::Arbitrary;
use bcl_core::{
    check_pool_transition, decode_parameters, validate_transition, PoolTransition,
    Sha3IdentityResolver, Transition, Verdict,
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzTransitionInput {
    args_before: Vec<u8>,
    args_after: Vec<u8>,
    state_before: Vec<u8>,
    state_after: Vec<u8>,
    collateral_before: u64,
    collateral_after: u64,
    json: Vec<u8>,
}

fuzz_target!(|input: FuzzTransitionInput| {
    let pool = PoolTransition {
        args_before: input.args_before,
        args_after: input.args_after,
        state_before: input.state_before,
        state_after: input.state_after,
        collateral_before: input.collateral_before,
        collateral_after: input.collateral_after,
    };

    if let Ok(verdict) = check_pool_transition(&pool) {
        let before = decode_parameters(&pool.args_before).unwrap();
        let after = decode_parameters(&pool.args_after).unwrap();
        assert_eq!(before, after, "accepted a parameter change");

        if let Verdict::Issuance { required, paid, .. } = verdict {
            assert!(paid >= required);
            assert_eq!(
                pool.collateral_after as i128 - pool.collateral_before as i128,
                paid as i128
            );
        }
        if let Verdict::Redemption { entitled, paid_out, .. } = verdict {
            assert!(paid_out <= entitled);
        }
    }

    if let Ok(tx) = serde_json::from_slice::<Transition>(&input.json) {
        let _ = validate_transition(&tx, &Sha3IdentityResolver);
    }
});
