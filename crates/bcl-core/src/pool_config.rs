use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::Path;

use crate::codec::{decode_hex, HashType, PoolArgs};
use crate::CurveParameters;

/// Serde adapter for u128 ↔ TOML: serialize as string, deserialize from string or integer.
/// TOML crate doesn't natively support u128, so we round-trip through strings.
mod u128_toml {
    use super::*;

    pub fn serialize<S: Serializer>(val: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        use serde::de::{self, Visitor};
        struct U128Visitor;

        impl<'de> Visitor<'de> for U128Visitor {
            type Value = u128;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a u128 as a string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
                Ok(v as u128)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
                if v >= 0 {
                    Ok(v as u128)
                } else {
                    Err(E::custom("negative value for u128"))
                }
            }
        }

        d.deserialize_any(U128Visitor)
    }
}

/// A pool profile: which curve script the pool lock points at, and the
/// curve parameters baked into its args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub name: String,
    /// 32-byte code hash of the curve script, hex
    pub code_hash: String,
    pub hash_type: HashType,
    pub k: u32,
    #[serde(with = "u128_toml")]
    pub total_supply: u128,
}

/// Profile names double as file names, so only `[A-Za-z0-9_-]` is allowed.
pub fn validate_pool_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".to_string());
    }
    if name
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
    {
        return Err(format!(
            "Invalid pool name '{}': use letters, digits, '-' or '_'",
            name
        ));
    }
    Ok(())
}

impl PoolConfig {
    /// Load pool config from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: PoolConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load pool config from environment variables
    pub fn load_from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let name = std::env::var("BCL_POOL_NAME").unwrap_or_else(|_| "default".to_string());

        let code_hash = std::env::var("BCL_CODE_HASH").map_err(|_| "BCL_CODE_HASH not set")?;

        let hash_type: HashType = std::env::var("BCL_HASH_TYPE")
            .unwrap_or_else(|_| "type".to_string())
            .parse()?;

        let k: u32 = std::env::var("BCL_K").map_err(|_| "BCL_K not set")?.parse()?;

        let total_supply: u128 = std::env::var("BCL_TOTAL_SUPPLY")
            .map_err(|_| "BCL_TOTAL_SUPPLY not set")?
            .parse()?;

        Ok(Self {
            name,
            code_hash,
            hash_type,
            k,
            total_supply,
        })
    }

    /// Save pool config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        validate_pool_name(&self.name)?;
        self.code_hash_bytes()?;

        if self.total_supply == 0 {
            return Err("total_supply must be > 0".to_string());
        }

        Ok(())
    }

    pub fn code_hash_bytes(&self) -> Result<[u8; 32], String> {
        let bytes = decode_hex(&self.code_hash)?;
        bytes
            .try_into()
            .map_err(|v: Vec<u8>| format!("code_hash must be 32 bytes, got {}", v.len()))
    }

    pub fn params(&self) -> CurveParameters {
        CurveParameters {
            k: self.k,
            total_supply: self.total_supply,
        }
    }

    /// The 55-byte pool args this profile encodes to
    pub fn to_args(&self) -> Result<PoolArgs, String> {
        self.validate()?;
        Ok(PoolArgs::new(
            self.code_hash_bytes()?,
            self.hash_type,
            self.params(),
        ))
    }
}
