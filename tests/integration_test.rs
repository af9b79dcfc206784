// ========================================
// INTEGRATION TESTS FOR BONDING CURVE LOCK (BCL)
// ========================================
//
// Test Scenarios:
// 1. Issuance priced at exactly the rounded-up cost
// 2. Redemption paid at exactly the rounded-down return
// 3. Curve parameter immutability
// 4. No-op transitions
// 5. Pool cell location & token type script checks
// 6. Estimator and validator agree over a trading session
//
// Usage:
//   cargo test --test integration_test -- --nocapture
//
// ========================================

use bcl_core::codec::encode_state;
use bcl_core::price_curve::{charge_shannons, payout_shannons, purchase_cost, redemption_return};
use bcl_core::{
    validate_transition, BondingCurve, CellSnapshot, CurveError, CurveParameters, HashType,
    LockScript, PoolArgs, Side, Sha3IdentityResolver, Transition, Verdict, SHANNONS_PER_CKB,
};

const UDT_TYPE_HASH: [u8; 32] = [0x5d; 32];
const POOL_BASE_CAPACITY: u64 = 500 * SHANNONS_PER_CKB;

// ========================================
// TEST 1: ISSUANCE THRESHOLD
// ========================================
#[test]
fn test_issuance_at_required_collateral() {
    println!("\n🧪 TEST 1: Issuance at the required collateral");
    println!("================================================\n");

    // k=1, totalSupply=255, remaining 255 -> 253
    let cost = purchase_cost(2.0, 255.0, 255.0, 1.0).unwrap();
    let required = charge_shannons(cost).unwrap();
    println!("purchaseCost(2) = {} CKB -> {} shannons", cost, required);

    let pool = Pool::new(1, 255);
    let tx = pool.transition(
        255,
        253,
        POOL_BASE_CAPACITY,
        POOL_BASE_CAPACITY + required,
    );
    let verdict = validate_transition(&tx, &Sha3IdentityResolver).unwrap();
    assert_eq!(
        verdict,
        Verdict::Issuance {
            amount: 2,
            required,
            paid: required
        }
    );
    println!("✅ Accepted with Δcollateral = required");

    // one unit less
    let tx = pool.transition(
        255,
        253,
        POOL_BASE_CAPACITY,
        POOL_BASE_CAPACITY + required - 1,
    );
    let err = validate_transition(&tx, &Sha3IdentityResolver).unwrap_err();
    assert!(
        matches!(err, CurveError::PriceExchangeNotMet { .. }),
        "unexpected {:?}",
        err
    );
    println!("✅ Rejected with Δcollateral = required - 1 ({})", err);
}

#[test]
fn test_issuance_deeper_on_the_curve() {
    // far enough along that the cost is well above zero
    let pool = Pool::new(1, 255);
    let cost = purchase_cost(2.0, 100.0, 255.0, 1.0).unwrap();
    let required = charge_shannons(cost).unwrap();
    assert!(required > 0);

    let ok = pool.transition(100, 98, POOL_BASE_CAPACITY, POOL_BASE_CAPACITY + required);
    assert!(validate_transition(&ok, &Sha3IdentityResolver).is_ok());

    let short = pool.transition(100, 98, POOL_BASE_CAPACITY, POOL_BASE_CAPACITY + required - 1);
    assert_eq!(
        validate_transition(&short, &Sha3IdentityResolver).unwrap_err(),
        CurveError::PriceExchangeNotMet {
            paid: required as i128 - 1,
            required
        }
    );

    // buying while draining the pool is rejected outright
    let drained = pool.transition(100, 98, POOL_BASE_CAPACITY, POOL_BASE_CAPACITY - 1);
    assert!(validate_transition(&drained, &Sha3IdentityResolver).is_err());
}

// ========================================
// TEST 2: REDEMPTION THRESHOLD
// ========================================
#[test]
fn test_redemption_at_entitlement() {
    println!("\n🧪 TEST 2: Redemption at the entitled return");
    println!("================================================\n");

    // k=1, totalSupply=255, remaining 250 -> 255
    let ret = redemption_return(5.0, 250.0, 255.0, 1.0).unwrap();
    let entitled = payout_shannons(ret).unwrap();
    println!("redemptionReturn(5) = {} CKB -> {} shannons", ret, entitled);
    assert!(entitled > 0);

    let pool = Pool::new(1, 255);
    let tx = pool.transition(
        250,
        255,
        POOL_BASE_CAPACITY,
        POOL_BASE_CAPACITY - entitled,
    );
    assert_eq!(
        validate_transition(&tx, &Sha3IdentityResolver).unwrap(),
        Verdict::Redemption {
            amount: 5,
            entitled,
            paid_out: entitled
        }
    );
    println!("✅ Accepted with payout = entitlement");

    let tx = pool.transition(
        250,
        255,
        POOL_BASE_CAPACITY,
        POOL_BASE_CAPACITY - entitled - 1,
    );
    assert_eq!(
        validate_transition(&tx, &Sha3IdentityResolver).unwrap_err(),
        CurveError::RedemptionExceedsEntitlement {
            paid_out: entitled as i128 + 1,
            entitled
        }
    );
    println!("✅ Rejected with payout = entitlement + 1");

    // paying out less than entitled is the user's loss, not the pool's
    let tx = pool.transition(250, 255, POOL_BASE_CAPACITY, POOL_BASE_CAPACITY - 1);
    assert!(validate_transition(&tx, &Sha3IdentityResolver).is_ok());
}

// ========================================
// TEST 3: PARAMETER IMMUTABILITY
// ========================================
#[test]
fn test_parameter_change_rejected() {
    println!("\n🧪 TEST 3: Curve parameter immutability");
    println!("================================================\n");

    let pool = Pool::new(1, 255);
    let steeper = Pool::new(2, 255);
    let bigger = Pool::new(1, 256);

    for (name, other) in [("k", &steeper), ("totalSupply", &bigger)] {
        let mut tx = pool.transition(255, 255, POOL_BASE_CAPACITY, POOL_BASE_CAPACITY);
        tx.outputs[0].lock.args = other.lock.args.clone();

        // changed args change the lock hash, so the pool cell disappears
        let err = validate_transition(&tx, &Sha3IdentityResolver).unwrap_err();
        assert_eq!(err, CurveError::PoolCellNotFound(Side::Outputs));
        println!("✅ Changed {} moves the cell out of the pool: {}", name, err);
    }

    // an identity resolver that ignores args still catches the change
    let mut tx = pool.transition(255, 255, POOL_BASE_CAPACITY, POOL_BASE_CAPACITY * 2);
    tx.outputs[0].lock.args = steeper.lock.args.clone();
    let err = validate_transition(&tx, &CodeHashResolver).unwrap_err();
    assert!(
        matches!(err, CurveError::ImmutableParameterChanged { .. }),
        "unexpected {:?}",
        err
    );
    println!("✅ Rejected: {}", err);
}

// ========================================
// TEST 4: NO-OP TRANSITIONS
// ========================================
#[test]
fn test_noop_accepted_for_any_collateral() {
    println!("\n🧪 TEST 4: No-op transitions");
    println!("================================================\n");

    let pool = Pool::new(1, 255);
    for after in [0, 1, POOL_BASE_CAPACITY, u64::MAX] {
        let tx = pool.transition(200, 200, POOL_BASE_CAPACITY, after);
        assert_eq!(
            validate_transition(&tx, &Sha3IdentityResolver).unwrap(),
            Verdict::Unchanged
        );
    }
    println!("✅ Remaining unchanged always accepted");
}

// ========================================
// TEST 5: CELL LOCATION & TYPE SCRIPT
// ========================================
#[test]
fn test_pool_cell_location() {
    let pool = Pool::new(1, 255);
    let user = CellSnapshot {
        lock: LockScript {
            code_hash: [0x99; 32],
            hash_type: 1,
            args: vec![0xaa; 20],
        },
        type_hash: Some(UDT_TYPE_HASH),
        data: encode_state(2).to_vec(),
        capacity: 142 * SHANNONS_PER_CKB,
    };

    // unrelated cells around the pool cell are ignored
    let mut tx = pool.transition(255, 255, POOL_BASE_CAPACITY, POOL_BASE_CAPACITY);
    tx.inputs.insert(0, user.clone());
    tx.outputs.push(user.clone());
    assert!(validate_transition(&tx, &Sha3IdentityResolver).is_ok());

    // two pool cells in the outputs
    let mut tx = pool.transition(255, 255, POOL_BASE_CAPACITY, POOL_BASE_CAPACITY);
    tx.outputs.push(pool.cell(255, 1));
    assert_eq!(
        validate_transition(&tx, &Sha3IdentityResolver).unwrap_err(),
        CurveError::AmbiguousPoolCell {
            side: Side::Outputs,
            count: 2
        }
    );

    // no pool cell in the inputs
    let mut tx = pool.transition(255, 255, POOL_BASE_CAPACITY, POOL_BASE_CAPACITY);
    tx.inputs = vec![user];
    assert_eq!(
        validate_transition(&tx, &Sha3IdentityResolver).unwrap_err(),
        CurveError::PoolCellNotFound(Side::Inputs)
    );
}

#[test]
fn test_pool_cell_type_script_required() {
    let pool = Pool::new(1, 255);

    let mut tx = pool.transition(255, 255, POOL_BASE_CAPACITY, POOL_BASE_CAPACITY);
    tx.outputs[0].type_hash = None;
    assert!(matches!(
        validate_transition(&tx, &Sha3IdentityResolver),
        Err(CurveError::InvalidPoolCellData(_))
    ));

    let mut tx = pool.transition(255, 255, POOL_BASE_CAPACITY, POOL_BASE_CAPACITY);
    tx.outputs[0].type_hash = Some([0x01; 32]);
    assert!(matches!(
        validate_transition(&tx, &Sha3IdentityResolver),
        Err(CurveError::InvalidPoolCellData(_))
    ));

    let mut tx = pool.transition(255, 255, POOL_BASE_CAPACITY, POOL_BASE_CAPACITY);
    tx.outputs[0].data = vec![0u8; 15];
    assert!(matches!(
        validate_transition(&tx, &Sha3IdentityResolver),
        Err(CurveError::MalformedState(_))
    ));
}

#[test]
fn test_transition_from_json() {
    let pool = Pool::new(1, 255);
    let required = charge_shannons(purchase_cost(2.0, 100.0, 255.0, 1.0).unwrap()).unwrap();
    let cell = |remaining: u128, capacity: u64| {
        serde_json::json!({
            "lock": {
                "code_hash": format!("0x{}", hex::encode(pool.lock.code_hash)),
                "hash_type": pool.lock.hash_type,
                "args": format!("0x{}", hex::encode(&pool.lock.args)),
            },
            "type_hash": format!("0x{}", hex::encode(UDT_TYPE_HASH)),
            "data": format!("0x{}", hex::encode(encode_state(remaining))),
            "capacity": capacity,
        })
    };
    let doc = serde_json::json!({
        "script": {
            "code_hash": format!("0x{}", hex::encode(pool.lock.code_hash)),
            "hash_type": pool.lock.hash_type,
            "args": format!("0x{}", hex::encode(&pool.lock.args)),
        },
        "inputs": [cell(100, POOL_BASE_CAPACITY)],
        "outputs": [cell(98, POOL_BASE_CAPACITY + required)],
    });

    let tx: Transition = serde_json::from_value(doc).unwrap();
    assert_eq!(tx, pool.transition(100, 98, POOL_BASE_CAPACITY, POOL_BASE_CAPACITY + required));
    assert!(matches!(
        validate_transition(&tx, &Sha3IdentityResolver),
        Ok(Verdict::Issuance { amount: 2, .. })
    ));
}

// ========================================
// TEST 6: ESTIMATOR / VALIDATOR AGREEMENT
// ========================================
#[test]
fn test_simulated_session_always_validates() {
    println!("\n🧪 TEST 6: Estimator and validator agree");
    println!("================================================\n");

    let pool = Pool::new(3, 1_000_000);
    let mut curve = BondingCurve::new(pool.params);
    // redemptions return more than the matching purchases charged, so the
    // pool needs a deep reserve to fund this session
    let mut capacity = 100_000_000 * SHANNONS_PER_CKB;

    let trades: [(bool, u128); 8] = [
        (true, 10_000),
        (true, 250_000),
        (false, 40_000),
        (true, 1),
        (false, 1),
        (true, 500_000),
        (false, 720_000),
        (true, 3),
    ];

    for (buy, amount) in trades {
        let before = curve.remaining;
        let before_capacity = capacity;
        if buy {
            let charged = curve.apply_purchase(amount).unwrap();
            capacity += charged;
        } else {
            let paid = curve.apply_redemption(amount).unwrap();
            capacity -= paid;
        }

        let tx = pool.transition(before, curve.remaining, before_capacity, capacity);
        let verdict = validate_transition(&tx, &Sha3IdentityResolver).unwrap();
        println!(
            "  {} {:>7} -> remaining {:>7}, {:?}",
            if buy { "buy " } else { "sell" },
            amount,
            curve.remaining,
            verdict
        );
        assert!(curve.is_valid());
    }

    // a budget solve is accepted when submitted at its quoted price
    let budget = 2_000 * SHANNONS_PER_CKB;
    let before = curve.remaining;
    let amount = curve.solve_purchase_amount(budget).unwrap();
    let charged = curve.apply_purchase(amount).unwrap();
    assert!(charged <= budget);
    let tx = pool.transition(before, curve.remaining, capacity, capacity + charged);
    assert!(validate_transition(&tx, &Sha3IdentityResolver).is_ok());
    println!("✅ {} tokens for a 2000 CKB budget validated", amount);
}

// ========================================
// HELPER STRUCTS
// ========================================

struct Pool {
    params: CurveParameters,
    lock: LockScript,
}

impl Pool {
    fn new(k: u32, total_supply: u128) -> Self {
        let params = CurveParameters { k, total_supply };
        let args = PoolArgs::new([0x4c; 32], HashType::Type, params);
        Pool {
            params,
            lock: LockScript {
                code_hash: [0x1b; 32],
                hash_type: HashType::Type as u8,
                args: args.encode().to_vec(),
            },
        }
    }

    fn cell(&self, remaining: u128, capacity: u64) -> CellSnapshot {
        CellSnapshot {
            lock: self.lock.clone(),
            type_hash: Some(UDT_TYPE_HASH),
            data: encode_state(remaining).to_vec(),
            capacity,
        }
    }

    fn transition(&self, before: u128, after: u128, cap_before: u64, cap_after: u64) -> Transition {
        Transition {
            script: self.lock.clone(),
            inputs: vec![self.cell(before, cap_before)],
            outputs: vec![self.cell(after, cap_after)],
        }
    }
}

/// Identifies pools by code hash alone, so a cell with edited args is still
/// located as the pool cell.
struct CodeHashResolver;

impl bcl_core::PoolIdentityResolver for CodeHashResolver {
    fn lock_hash(&self, lock: &LockScript) -> [u8; 32] {
        lock.code_hash
    }
}
