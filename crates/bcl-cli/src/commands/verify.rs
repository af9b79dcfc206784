use crate::{print_error, print_success};
use bcl_core::{
    check_pool_transition, validate_transition, CurveResult, PoolTransition,
    Sha3IdentityResolver, Transition, Verdict,
};
use colored::*;
use serde::Deserialize;
use std::path::Path;

/// A transition file holds either a full transaction view or an
/// already-located pool cell pair.
#[derive(Deserialize)]
#[serde(untagged)]
enum TransitionFile {
    Full(Transition),
    Located(PoolTransition),
}

fn run(file: &TransitionFile) -> CurveResult<Verdict> {
    match file {
        TransitionFile::Full(t) => validate_transition(t, &Sha3IdentityResolver),
        TransitionFile::Located(p) => check_pool_transition(p),
    }
}

/// Returns the script exit code: 0 on accept.
pub fn handle(path: &Path) -> Result<i8, Box<dyn std::error::Error>> {
    let data = std::fs::read_to_string(path)?;
    let file: TransitionFile = serde_json::from_str(&data)
        .map_err(|e| format!("Invalid transition file {}: {}", path.display(), e))?;

    match run(&file) {
        Ok(verdict) => {
            print_success("Transition accepted");
            match verdict {
                Verdict::Unchanged => println!("  {}", "remaining unchanged".dimmed()),
                Verdict::Issuance {
                    amount,
                    required,
                    paid,
                } => {
                    println!("  {:<10} {} tokens", "Issued:", amount);
                    println!("  {:<10} {} shannons", "Required:", required);
                    println!("  {:<10} {} shannons", "Paid:", paid.to_string().green());
                }
                Verdict::Redemption {
                    amount,
                    entitled,
                    paid_out,
                } => {
                    println!("  {:<10} {} tokens", "Redeemed:", amount);
                    println!("  {:<10} {} shannons", "Entitled:", entitled);
                    println!(
                        "  {:<10} {} shannons",
                        "Paid out:",
                        paid_out.to_string().green()
                    );
                }
            }
            Ok(0)
        }
        Err(e) => {
            print_error(&format!("Transition rejected: {}", e));
            println!("  {:<10} {}", "Exit code:", e.exit_code().to_string().red());
            Ok(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcl_core::codec::encode_state;
    use bcl_core::{CellSnapshot, CurveParameters, HashType, LockScript, PoolArgs};
    use tempfile::TempDir;

    fn pool_lock() -> LockScript {
        let args = PoolArgs::new(
            [0x10; 32],
            HashType::Type,
            CurveParameters {
                k: 1,
                total_supply: 255,
            },
        );
        LockScript {
            code_hash: [0x20; 32],
            hash_type: 1,
            args: args.encode().to_vec(),
        }
    }

    fn cell(remaining: u128, capacity: u64) -> CellSnapshot {
        CellSnapshot {
            lock: pool_lock(),
            type_hash: Some([0x30; 32]),
            data: encode_state(remaining).to_vec(),
            capacity,
        }
    }

    fn write_json<T: serde::Serialize>(dir: &TempDir, value: &T) -> std::path::PathBuf {
        let path = dir.path().join("tx.json");
        std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_verify_full_transition() {
        let dir = TempDir::new().unwrap();
        let tx = Transition {
            script: pool_lock(),
            inputs: vec![cell(255, 1_000)],
            outputs: vec![cell(255, 1_000)],
        };
        assert_eq!(handle(&write_json(&dir, &tx)).unwrap(), 0);
    }

    #[test]
    fn test_verify_rejection_exit_code() {
        let dir = TempDir::new().unwrap();
        let tx = Transition {
            script: pool_lock(),
            inputs: vec![cell(255, 1_000)],
            outputs: vec![],
        };
        let code = handle(&write_json(&dir, &tx)).unwrap();
        assert_ne!(code, 0);
        assert_eq!(
            code,
            bcl_core::CurveError::PoolCellNotFound(bcl_core::Side::Outputs).exit_code()
        );
    }

    #[test]
    fn test_verify_located_pair() {
        let dir = TempDir::new().unwrap();
        let args = pool_lock().args;
        let pair = PoolTransition {
            args_before: args.clone(),
            args_after: args,
            state_before: encode_state(250).to_vec(),
            state_after: encode_state(255).to_vec(),
            collateral_before: 1_000_000_000_000,
            // pays out more than any 5-token redemption could be worth
            collateral_after: 0,
        };
        let code = handle(&write_json(&dir, &pair)).unwrap();
        assert_eq!(
            code,
            bcl_core::CurveError::RedemptionExceedsEntitlement {
                paid_out: 0,
                entitled: 0
            }
            .exit_code()
        );
    }

    #[test]
    fn test_verify_bad_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tx.json");
        std::fs::write(&path, "{\"not\": \"a transition\"}").unwrap();
        assert!(handle(&path).is_err());
        assert!(handle(&dir.path().join("missing.json")).is_err());
    }
}
