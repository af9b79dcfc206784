use bcl_core::{validate_pool_name, PoolConfig, PoolState, SHANNONS_PER_CKB};
use std::path::{Path, PathBuf};

/// Decimal places in one CKB (1 CKB = 10^8 shannons)
const CKB_DECIMALS: usize = 8;

pub fn pool_path(config_dir: &Path, name: &str) -> PathBuf {
    config_dir.join("pools").join(format!("{}.toml", name))
}

/// Shared profile loader: reads config_dir/pools/{name}.toml and validates it.
/// Used by both `pool` and `quote` commands.
pub fn load_pool(name: &str, config_dir: &Path) -> Result<PoolConfig, Box<dyn std::error::Error>> {
    validate_pool_name(name)?;
    let path = pool_path(config_dir, name);
    if !path.exists() {
        return Err(format!(
            "Pool profile '{}' not found at {} (create one with: bcl-cli pool init)",
            name,
            path.display()
        )
        .into());
    }

    let config = PoolConfig::load_from_file(&path)?;
    config.validate()?;
    log::debug!("loaded pool profile {} from {}", name, path.display());
    Ok(config)
}

/// Pool state for a profile; an omitted `remaining` means a fresh pool.
pub fn pool_state(
    config: &PoolConfig,
    remaining: Option<u128>,
) -> Result<PoolState, Box<dyn std::error::Error>> {
    let params = config.params();
    Ok(PoolState::new(
        remaining.unwrap_or(params.total_supply),
        &params,
    )?)
}

/// Parse a CKB amount ("12", "0.5", "3.00000001") into shannons, exactly.
pub fn parse_ckb(input: &str) -> Result<u64, String> {
    let s = input.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(format!("Invalid CKB amount '{}'", input));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Invalid CKB amount '{}'", input));
    }
    if frac.len() > CKB_DECIMALS {
        return Err(format!(
            "CKB amount '{}' has more than {} decimals",
            input, CKB_DECIMALS
        ));
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| format!("CKB amount '{}' is too large", input))?
    };
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = CKB_DECIMALS)
            .parse()
            .map_err(|_| format!("Invalid CKB amount '{}'", input))?
    };

    whole
        .checked_mul(SHANNONS_PER_CKB)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| format!("CKB amount '{}' is too large", input))
}

pub fn format_ckb(shannons: u64) -> String {
    format!(
        "{}.{:08}",
        shannons / SHANNONS_PER_CKB,
        shannons % SHANNONS_PER_CKB
    )
}
