//! Content fingerprints for code cells.
//! - `HashMethod`: closed set of hashing strategies
//! - `CodeHasher`: shared, configurable `text -> CodeId` function

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::error::{DebugError, Result};

/// Seed used by kernels that do not advertise one.
pub const DEFAULT_HASH_SEED: u32 = 3_339_675_911;

const MURMUR2_M: u32 = 0x5bd1_e995;

/// Fingerprint of a code unit, rendered the way the kernel reports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeId(SmolStr);

impl CodeId {
    #[must_use]
    pub fn new(value: impl Into<SmolStr>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CodeId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for CodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Supported hashing strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashMethod {
    /// 32-bit MurmurHash2 over the UTF-8 bytes of the code.
    Murmur2,
    /// CRC-32 (IEEE) with the seed as initial state.
    Crc32,
}

impl HashMethod {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            HashMethod::Murmur2 => "Murmur2",
            HashMethod::Crc32 => "Crc32",
        }
    }

    fn digest(self, code: &str, seed: u32) -> u32 {
        match self {
            HashMethod::Murmur2 => murmur2(code.as_bytes(), seed),
            HashMethod::Crc32 => {
                let mut hasher = crc32fast::Hasher::new_with_initial(seed);
                hasher.update(code.as_bytes());
                hasher.finalize()
            }
        }
    }
}

impl fmt::Display for HashMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashMethod {
    type Err = DebugError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "murmur2" => Ok(HashMethod::Murmur2),
            "crc32" => Ok(HashMethod::Crc32),
            _ => Err(DebugError::UnsupportedHashMethod(value.into())),
        }
    }
}

/// A hash method bound to a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashConfig {
    pub method: HashMethod,
    pub seed: u32,
}

impl HashConfig {
    /// Parse a method name and bind it to `seed`.
    pub fn parse(method: &str, seed: u32) -> Result<Self> {
        Ok(Self {
            method: method.parse()?,
            seed,
        })
    }

    #[must_use]
    pub fn hash(&self, code: &str) -> CodeId {
        CodeId::new(self.method.digest(code, self.seed).to_string())
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            method: HashMethod::Murmur2,
            seed: DEFAULT_HASH_SEED,
        }
    }
}

/// Shared fingerprint function.
///
/// Clones share one configuration, so the breakpoint store and the debug
/// session always agree on how code is hashed.
#[derive(Debug, Clone, Default)]
pub struct CodeHasher {
    config: Rc<Cell<Option<HashConfig>>>,
}

impl CodeHasher {
    /// Create an unconfigured hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hasher already bound to `config`.
    #[must_use]
    pub fn with_config(config: HashConfig) -> Self {
        let hasher = Self::new();
        hasher.config.set(Some(config));
        hasher
    }

    /// Select a strategy by name and bind its seed.
    pub fn configure(&self, method: &str, seed: u32) -> Result<HashConfig> {
        let config = HashConfig::parse(method, seed)?;
        self.set_config(config);
        Ok(config)
    }

    pub fn set_config(&self, config: HashConfig) {
        match self.config.get() {
            Some(previous) if previous != config => warn!(
                from = %previous.method,
                from_seed = previous.seed,
                to = %config.method,
                to_seed = config.seed,
                "hash parameters changed; existing breakpoint buckets are now stale"
            ),
            Some(_) => {}
            None => debug!(method = %config.method, seed = config.seed, "hash configured"),
        }
        self.config.set(Some(config));
    }

    #[must_use]
    pub fn config(&self) -> Option<HashConfig> {
        self.config.get()
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.get().is_some()
    }

    /// Fingerprint `code` with the configured strategy.
    pub fn hash(&self, code: &str) -> Result<CodeId> {
        self.config
            .get()
            .map(|config| config.hash(code))
            .ok_or(DebugError::NotConfigured)
    }
}

fn murmur2(bytes: &[u8], seed: u32) -> u32 {
    // Length is folded in modulo 2^32 like the reference implementation.
    #[allow(clippy::cast_possible_truncation)]
    let mut h = seed ^ (bytes.len() as u32);
    let mut chunks = bytes.chunks_exact(4);
    for chunk in &mut chunks {
        let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        k = k.wrapping_mul(MURMUR2_M);
        k ^= k >> 24;
        k = k.wrapping_mul(MURMUR2_M);
        h = h.wrapping_mul(MURMUR2_M);
        h ^= k;
    }
    let tail = chunks.remainder();
    if tail.len() == 3 {
        h ^= u32::from(tail[2]) << 16;
    }
    if tail.len() >= 2 {
        h ^= u32::from(tail[1]) << 8;
    }
    if let Some(first) = tail.first() {
        h ^= u32::from(*first);
        h = h.wrapping_mul(MURMUR2_M);
    }
    h ^= h >> 13;
    h = h.wrapping_mul(MURMUR2_M);
    h ^= h >> 15;
    h
}
