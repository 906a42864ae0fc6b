//! Breakpoint export/restore as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::hash::HashConfig;
use crate::store::{BreakpointMap, BreakpointStore, SessionKind};

const SNAPSHOT_VERSION: u32 = 1;

/// Exported breakpoint state of one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointSnapshot {
    pub version: u32,
    /// Hash parameters the fingerprints were computed with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<HashConfig>,
    #[serde(default)]
    pub context: SessionKind,
    #[serde(default)]
    pub breakpoints: BreakpointMap,
}

impl BreakpointSnapshot {
    #[must_use]
    pub fn capture(store: &BreakpointStore) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            hash: store.hasher().config(),
            context: store.context(),
            breakpoints: store.breakpoints(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(text)?;
        if snapshot.version != SNAPSHOT_VERSION {
            warn!(version = snapshot.version, "unexpected breakpoint snapshot version");
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        debug!(
            path = %path.display(),
            buckets = self.breakpoints.len(),
            "saved breakpoint snapshot"
        );
        Ok(())
    }

    /// Restore into `store`, adopting the snapshot's hash parameters.
    ///
    /// The context tag is informational; the mapping replaces whichever
    /// context is active.
    pub fn apply(self, store: &BreakpointStore) {
        if let Some(config) = self.hash {
            store.hasher().set_config(config);
        }
        if self.context != store.context() {
            debug!(
                snapshot = ?self.context,
                active = ?store.context(),
                "restoring snapshot into another context"
            );
        }
        store.restore(self.breakpoints);
    }
}
