//! Debugger front-end configuration loaded from `cell-debug.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::Result;
use crate::hash::{CodeHasher, HashConfig, HashMethod, DEFAULT_HASH_SEED};

pub(crate) const CONFIG_FILES: &[&str] = &["cell-debug.toml", ".cell-debug.toml"];

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggerConfig {
    /// Config file path (if found).
    pub config_path: Option<PathBuf>,
    /// Hash method name as written; validated by [`DebuggerConfig::hash_config`].
    pub hash_method: String,
    pub hash_seed: u32,
    /// Where breakpoint snapshots are exported to and restored from.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            hash_method: HashMethod::Murmur2.name().to_string(),
            hash_seed: DEFAULT_HASH_SEED,
            snapshot_path: None,
        }
    }
}

impl DebuggerConfig {
    /// Load configuration from the first config file under `root`.
    #[must_use]
    pub fn load(root: &Path) -> Self {
        let Some(path) = find_config_file(root) else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::from_contents(root, Some(path), &contents),
            Err(err) => {
                warn!("Failed to read cell-debug config at {}: {err}", path.display());
                Self {
                    config_path: Some(path),
                    ..Self::default()
                }
            }
        }
    }

    /// Parse `contents`; a malformed file yields the defaults.
    #[must_use]
    pub fn from_contents(root: &Path, config_path: Option<PathBuf>, contents: &str) -> Self {
        match Self::parse(root, contents) {
            Ok(mut config) => {
                config.config_path = config_path;
                config
            }
            Err(err) => {
                match &config_path {
                    Some(path) => warn!(
                        "Failed to parse cell-debug config at {}: {err}",
                        path.display()
                    ),
                    None => warn!("Failed to parse cell-debug config: {err}"),
                }
                Self {
                    config_path,
                    ..Self::default()
                }
            }
        }
    }

    /// Strict parse: syntax errors are returned instead of defaulted.
    pub fn parse(root: &Path, contents: &str) -> Result<Self> {
        let parsed: ConfigFile = toml::from_str(contents)?;
        let defaults = Self::default();
        Ok(Self {
            config_path: None,
            hash_method: parsed.hash.method.unwrap_or(defaults.hash_method),
            hash_seed: parsed.hash.seed.unwrap_or(defaults.hash_seed),
            snapshot_path: parsed
                .snapshot
                .path
                .map(|entry| resolve_path(root, &entry)),
        })
    }

    /// Validated hash parameters.
    pub fn hash_config(&self) -> Result<HashConfig> {
        HashConfig::parse(&self.hash_method, self.hash_seed)
    }

    /// Hasher configured from this file; fails on an unknown method.
    pub fn build_hasher(&self) -> Result<CodeHasher> {
        Ok(CodeHasher::with_config(self.hash_config()?))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    hash: HashSection,
    #[serde(default)]
    snapshot: SnapshotSection,
}

#[derive(Debug, Default, Deserialize)]
struct HashSection {
    method: Option<String>,
    seed: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct SnapshotSection {
    path: Option<String>,
}

pub(crate) fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

fn resolve_path(root: &Path, entry: &str) -> PathBuf {
    let path = PathBuf::from(entry);
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::DebugError;

    static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

    fn temp_root(label: &str) -> PathBuf {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let mut dir = std::env::temp_dir();
        dir.push(format!("cell-debug-{label}-{}-{id}", std::process::id()));
        let _ = std::fs::create_dir_all(&dir);
        dir
    }

    #[test]
    fn parses_hash_and_snapshot_sections() {
        let root = Path::new("/work");
        let config = DebuggerConfig::parse(
            root,
            "[hash]\nmethod = \"Crc32\"\nseed = 7\n\n[snapshot]\npath = \"breakpoints.json\"\n",
        )
        .unwrap();
        assert_eq!(config.hash_method, "Crc32");
        assert_eq!(config.hash_seed, 7);
        assert_eq!(config.snapshot_path, Some(root.join("breakpoints.json")));
        assert_eq!(config.hash_config().unwrap().method, HashMethod::Crc32);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = DebuggerConfig::parse(Path::new("."), "").unwrap();
        assert_eq!(config, DebuggerConfig::default());
        assert_eq!(config.hash_config().unwrap(), HashConfig::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let config = DebuggerConfig::from_contents(Path::new("."), None, "[hash\nseed = ");
        assert_eq!(config, DebuggerConfig::default());
        assert!(DebuggerConfig::parse(Path::new("."), "[hash\n").is_err());
    }

    #[test]
    fn unsupported_method_surfaces_when_building_the_hasher() {
        let config = DebuggerConfig::parse(Path::new("."), "[hash]\nmethod = \"md5\"\n").unwrap();
        assert!(matches!(
            config.build_hasher(),
            Err(DebugError::UnsupportedHashMethod(_))
        ));
    }

    #[test]
    fn unreadable_config_keeps_its_path_and_defaults() {
        let root = temp_root("unreadable");
        let path = root.join("cell-debug.toml");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let config = DebuggerConfig::load(&root);
        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.hash_seed, DEFAULT_HASH_SEED);
        assert_eq!(config.hash_method, "Murmur2");
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn load_finds_config_file_in_root() {
        let root = temp_root("load");
        std::fs::write(root.join(".cell-debug.toml"), "[hash]\nseed = 0\n").unwrap();
        let config = DebuggerConfig::load(&root);
        assert_eq!(config.hash_seed, 0);
        assert_eq!(config.config_path, Some(root.join(".cell-debug.toml")));

        let hasher = config.build_hasher().unwrap();
        assert_eq!(hasher.hash("print(1)").unwrap(), "3626970123");
        let _ = std::fs::remove_dir_all(&root);
    }
}
