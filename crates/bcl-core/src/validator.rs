// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POOL STATE-TRANSITION VALIDATOR
//
// Accepts or rejects one proposed pool transition:
//   1. Locate exactly one pool cell in inputs and in outputs (by lock hash)
//   2. Curve parameters (k, total supply) identical on both sides
//   3. 0 <= remaining <= total supply on both sides
//   4. Remaining unchanged                  -> accept
//   5. Remaining decreased (issuance)       -> pool gains >= ceil(cost)
//   6. Remaining increased (redemption)     -> pool pays   <= floor(return)
//
// Pure decision function: no state survives a call.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::codec::{decode_state, PoolArgs};
use crate::errors::{CurveError, CurveResult, Side};
use crate::price_curve::{charge_shannons, issuance_cost, payout_shannons, redemption_value};

/// Serde adapter: byte vectors as `0x`-prefixed hex strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        crate::codec::decode_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter: 32-byte hashes as `0x`-prefixed hex strings.
pub mod hex_hash {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(hash)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(d)?;
        let bytes = crate::codec::decode_hex(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|v: Vec<u8>| serde::de::Error::custom(format!("expected 32 bytes, got {}", v.len())))
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(hash: &Option<[u8; 32]>, s: S) -> Result<S::Ok, S::Error> {
            match hash {
                Some(h) => super::serialize(h, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<[u8; 32]>, D::Error> {
            let s: Option<String> = Option::deserialize(d)?;
            match s {
                None => Ok(None),
                Some(s) => {
                    let bytes = crate::codec::decode_hex(&s).map_err(serde::de::Error::custom)?;
                    let hash: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
                        serde::de::Error::custom(format!("expected 32 bytes, got {}", v.len()))
                    })?;
                    Ok(Some(hash))
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockScript {
    #[serde(with = "hex_hash")]
    pub code_hash: [u8; 32],
    pub hash_type: u8,
    #[serde(with = "hex_bytes")]
    pub args: Vec<u8>,
}

/// Maps a lock script to the hash that identifies a pool on-chain.
pub trait PoolIdentityResolver {
    fn lock_hash(&self, lock: &LockScript) -> [u8; 32];
}

/// SHA3-256 over a domain tag, code hash, hash type and length-prefixed args.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha3IdentityResolver;

impl PoolIdentityResolver for Sha3IdentityResolver {
    fn lock_hash(&self, lock: &LockScript) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update(b"bcl-lock-script");
        hasher.update(lock.code_hash);
        hasher.update([lock.hash_type]);
        // length prefix keeps (hash_type, args) boundaries unambiguous
        hasher.update((lock.args.len() as u64).to_le_bytes());
        hasher.update(&lock.args);
        hasher.finalize().into()
    }
}

/// One cell as seen by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub lock: LockScript,
    #[serde(default, with = "hex_hash::option")]
    pub type_hash: Option<[u8; 32]>,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    /// Collateral held by the cell, in shannons.
    pub capacity: u64,
}

/// A proposed transaction, reduced to what the validator needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The lock script being executed (the pool's identity).
    pub script: LockScript,
    pub inputs: Vec<CellSnapshot>,
    pub outputs: Vec<CellSnapshot>,
}

/// The pool cell before and after, once located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTransition {
    #[serde(with = "hex_bytes")]
    pub args_before: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub args_after: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub state_before: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub state_after: Vec<u8>,
    pub collateral_before: u64,
    pub collateral_after: u64,
}

/// Why a transition was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Unchanged,
    Issuance {
        amount: u128,
        required: u64,
        paid: u64,
    },
    Redemption {
        amount: u128,
        entitled: u64,
        paid_out: u64,
    },
}

fn reject(err: CurveError) -> CurveError {
    warn!("rejecting pool transition: {}", err);
    err
}

fn locate<'a, R: PoolIdentityResolver + ?Sized>(
    resolver: &R,
    pool_hash: &[u8; 32],
    cells: &'a [CellSnapshot],
    side: Side,
) -> CurveResult<&'a CellSnapshot> {
    let mut matches = cells
        .iter()
        .filter(|cell| resolver.lock_hash(&cell.lock) == *pool_hash);
    let first = matches
        .next()
        .ok_or_else(|| reject(CurveError::PoolCellNotFound(side)))?;
    let extra = matches.count();
    if extra > 0 {
        return Err(reject(CurveError::AmbiguousPoolCell {
            side,
            count: extra + 1,
        }));
    }
    Ok(first)
}

/// Locate the pool cell on both sides of `transition` and validate the move.
pub fn validate_transition<R: PoolIdentityResolver + ?Sized>(
    transition: &Transition,
    resolver: &R,
) -> CurveResult<Verdict> {
    let pool_hash = resolver.lock_hash(&transition.script);
    debug!("pool lock hash 0x{}", hex::encode(pool_hash));

    let before = locate(resolver, &pool_hash, &transition.inputs, Side::Inputs)?;
    let after = locate(resolver, &pool_hash, &transition.outputs, Side::Outputs)?;

    match (before.type_hash, after.type_hash) {
        (Some(b), Some(a)) if b == a => {}
        (None, _) | (_, None) => {
            return Err(reject(CurveError::InvalidPoolCellData(
                "pool cell must carry a token type script".to_string(),
            )))
        }
        _ => {
            return Err(reject(CurveError::InvalidPoolCellData(
                "pool cell token type script changed".to_string(),
            )))
        }
    }

    check_pool_transition(&PoolTransition {
        args_before: before.lock.args.clone(),
        args_after: after.lock.args.clone(),
        state_before: before.data.clone(),
        state_after: after.data.clone(),
        collateral_before: before.capacity,
        collateral_after: after.capacity,
    })
}

/// Validate an already-located pool cell pair.
pub fn check_pool_transition(pool: &PoolTransition) -> CurveResult<Verdict> {
    let params_before = PoolArgs::decode(&pool.args_before).map_err(reject)?.params;
    let params_after = PoolArgs::decode(&pool.args_after).map_err(reject)?.params;
    debug!(
        "k={}, total_supply={}",
        params_before.k, params_before.total_supply
    );

    if params_before != params_after {
        return Err(reject(CurveError::ImmutableParameterChanged {
            before: params_before,
            after: params_after,
        }));
    }
    let params = params_before;

    let remaining_before = decode_state(&pool.state_before).map_err(reject)?;
    let remaining_after = decode_state(&pool.state_after).map_err(reject)?;
    debug!(
        "remaining before={}, after={}",
        remaining_before, remaining_after
    );

    if remaining_before > params.total_supply || remaining_after > params.total_supply {
        return Err(reject(CurveError::InvalidPoolCellData(format!(
            "remaining ({} -> {}) exceeds total supply {}",
            remaining_before, remaining_after, params.total_supply
        ))));
    }

    if remaining_before == remaining_after {
        debug!("remaining unchanged, skipping curve check");
        return Ok(Verdict::Unchanged);
    }

    let delta = pool.collateral_after as i128 - pool.collateral_before as i128;

    if remaining_after < remaining_before {
        let amount = remaining_before - remaining_after;
        let cost = issuance_cost(amount, remaining_before, &params).map_err(reject)?;
        // a price above what a cell can hold is unpayable, not malformed
        let required = match charge_shannons(cost) {
            Ok(required) => required,
            Err(CurveError::CollateralOverflow(_)) if cost > 0.0 => u64::MAX,
            Err(e) => return Err(reject(e)),
        };
        debug!(
            "issuance of {}: pool collateral delta {}, required {}",
            amount, delta, required
        );

        if delta < required as i128 || required == u64::MAX {
            return Err(reject(CurveError::PriceExchangeNotMet {
                paid: delta,
                required,
            }));
        }
        Ok(Verdict::Issuance {
            amount,
            required,
            paid: delta as u64,
        })
    } else {
        let amount = remaining_after - remaining_before;
        let ret = redemption_value(amount, remaining_before, &params).map_err(reject)?;
        // entitlement beyond u64 covers any payout a cell can make
        let entitled = match payout_shannons(ret) {
            Ok(entitled) => entitled,
            Err(CurveError::CollateralOverflow(_)) if ret > 0.0 => u64::MAX,
            Err(e) => return Err(reject(e)),
        };
        let paid_out = -delta;
        debug!(
            "redemption of {}: pool pays out {}, entitled {}",
            amount, paid_out, entitled
        );

        if paid_out > entitled as i128 {
            return Err(reject(CurveError::RedemptionExceedsEntitlement { paid_out, entitled }));
        }
        Ok(Verdict::Redemption {
            amount,
            entitled,
            paid_out: paid_out.max(0) as u64,
        })
    }
}
