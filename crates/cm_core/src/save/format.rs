use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use super::error::SaveError;
use super::SAVE_VERSION;
use crate::config::SimConfig;
use crate::season::SeasonState;

const CHECKSUM_LEN: usize = 32;

/// A saved season: the configuration it runs under and its full state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SeasonSave {
    /// Save format version
    pub version: u32,

    /// Save timestamp (unix milliseconds)
    pub saved_at: u64,

    pub config: SimConfig,

    pub state: SeasonState,
}

impl SeasonSave {
    pub fn new(config: SimConfig, state: SeasonState) -> Self {
        Self { version: SAVE_VERSION, saved_at: current_timestamp(), config, state }
    }
}

/// MessagePack, then LZ4 with the size prepended, then a SHA-256 trailer over
/// the compressed bytes.
pub fn serialize_and_compress(save: &SeasonSave) -> Result<Vec<u8>, SaveError> {
    let msgpack = to_vec_named(save)?;
    let compressed = compress_prepend_size(&msgpack);

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);
    Ok(result)
}

pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<SeasonSave, SaveError> {
    // size header + checksum
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(SaveError::Corrupted);
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    let mut hasher = Sha256::new();
    hasher.update(payload);
    if hasher.finalize()[..] != *checksum_bytes {
        return Err(SaveError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| SaveError::Decompression)?;
    let save: SeasonSave = from_slice(&msgpack)?;

    if save.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
    }
    Ok(save)
}

pub fn current_timestamp() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}
