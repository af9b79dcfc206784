//! Fixed-width pool args and pool state layouts.
//!
//! ```text
//! args (55 bytes, little-endian integers)
//!   [0..2)    reserved prefix, always 0x0000
//!   [2..34)   code hash of the curve script
//!   [34..35)  hash type tag
//!   [35..39)  k             u32
//!   [39..55)  total supply  u128
//!
//! state (16 bytes)
//!   [0..16)   remaining     u128
//! ```
//!
//! These layouts are what existing pool cells carry on-chain. Decoding never
//! pads, truncates or clamps: a payload of any other width is rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CurveError, CurveResult};
use crate::CurveParameters;

pub const ARGS_LEN: usize = 55;
pub const STATE_LEN: usize = 16;
pub const ARGS_PREFIX: [u8; 2] = [0x00, 0x00];

const CODE_HASH_START: usize = 2;
const HASH_TYPE_OFFSET: usize = 34;
const K_START: usize = 35;
const TOTAL_SUPPLY_START: usize = 39;

/// How the embedded code hash refers to the curve script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum HashType {
    Data = 0,
    Type = 1,
    Data1 = 2,
    Data2 = 4,
}

impl TryFrom<u8> for HashType {
    type Error = CurveError;

    fn try_from(tag: u8) -> CurveResult<Self> {
        match tag {
            0 => Ok(HashType::Data),
            1 => Ok(HashType::Type),
            2 => Ok(HashType::Data1),
            4 => Ok(HashType::Data2),
            other => Err(CurveError::MalformedArgs(format!(
                "unknown hash type tag {:#04x}",
                other
            ))),
        }
    }
}

impl std::str::FromStr for HashType {
    type Err = CurveError;

    fn from_str(s: &str) -> CurveResult<Self> {
        match s {
            "data" => Ok(HashType::Data),
            "type" => Ok(HashType::Type),
            "data1" => Ok(HashType::Data1),
            "data2" => Ok(HashType::Data2),
            other => Err(CurveError::MalformedArgs(format!(
                "unknown hash type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashType::Data => "data",
            HashType::Type => "type",
            HashType::Data1 => "data1",
            HashType::Data2 => "data2",
        };
        f.write_str(name)
    }
}

/// Decoded pool lock args: the curve script reference plus the immutable
/// curve parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolArgs {
    pub code_hash: [u8; 32],
    pub hash_type: HashType,
    pub params: CurveParameters,
}

impl PoolArgs {
    pub fn new(code_hash: [u8; 32], hash_type: HashType, params: CurveParameters) -> Self {
        Self {
            code_hash,
            hash_type,
            params,
        }
    }

    pub fn encode(&self) -> [u8; ARGS_LEN] {
        let mut out = [0u8; ARGS_LEN];
        out[..CODE_HASH_START].copy_from_slice(&ARGS_PREFIX);
        out[CODE_HASH_START..HASH_TYPE_OFFSET].copy_from_slice(&self.code_hash);
        out[HASH_TYPE_OFFSET] = self.hash_type as u8;
        out[K_START..TOTAL_SUPPLY_START].copy_from_slice(&self.params.k.to_le_bytes());
        out[TOTAL_SUPPLY_START..].copy_from_slice(&self.params.total_supply.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> CurveResult<Self> {
        if bytes.len() != ARGS_LEN {
            return Err(CurveError::MalformedArgs(format!(
                "expected {} bytes, got {}",
                ARGS_LEN,
                bytes.len()
            )));
        }
        if bytes[..CODE_HASH_START] != ARGS_PREFIX {
            return Err(CurveError::MalformedArgs(format!(
                "reserved prefix must be 0x0000, got 0x{}",
                hex::encode(&bytes[..CODE_HASH_START])
            )));
        }

        let mut code_hash = [0u8; 32];
        code_hash.copy_from_slice(&bytes[CODE_HASH_START..HASH_TYPE_OFFSET]);
        let hash_type = HashType::try_from(bytes[HASH_TYPE_OFFSET])?;

        let mut k = [0u8; 4];
        k.copy_from_slice(&bytes[K_START..TOTAL_SUPPLY_START]);
        let mut total_supply = [0u8; 16];
        total_supply.copy_from_slice(&bytes[TOTAL_SUPPLY_START..]);

        Ok(Self {
            code_hash,
            hash_type,
            params: CurveParameters {
                k: u32::from_le_bytes(k),
                total_supply: u128::from_le_bytes(total_supply),
            },
        })
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.encode()))
    }

    pub fn from_hex(s: &str) -> CurveResult<Self> {
        let bytes = decode_hex(s).map_err(CurveError::MalformedArgs)?;
        Self::decode(&bytes)
    }

    /// State payload a freshly created pool cell carries: nothing issued yet.
    pub fn genesis_state(&self) -> [u8; STATE_LEN] {
        encode_state(self.params.total_supply)
    }
}

/// Parse the curve parameters out of full 55-byte pool args.
pub fn decode_parameters(bytes: &[u8]) -> CurveResult<CurveParameters> {
    PoolArgs::decode(bytes).map(|args| args.params)
}

pub fn encode_state(remaining: u128) -> [u8; STATE_LEN] {
    remaining.to_le_bytes()
}

/// Parse the remaining supply out of a pool cell's 16-byte data.
pub fn decode_state(bytes: &[u8]) -> CurveResult<u128> {
    let raw: [u8; STATE_LEN] = bytes.try_into().map_err(|_| {
        CurveError::MalformedState(format!(
            "expected {} bytes, got {}",
            STATE_LEN,
            bytes.len()
        ))
    })?;
    Ok(u128::from_le_bytes(raw))
}

/// Hex with or without a `0x` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    let trimmed = s.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(body).map_err(|e| format!("invalid hex: {}", e))
}
