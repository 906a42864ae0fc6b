//! Content-addressed breakpoint storage.
//! - buckets keyed by code fingerprint, insertion order preserved
//! - bulk / single / restored notification channels
//! - notebook and console contexts swapped through restore

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::hash::{CodeHasher, CodeId, HashConfig};
use crate::signal::Signal;
use crate::types::BreakpointRecord;

/// Fingerprint -> breakpoints set against that content.
pub type BreakpointMap = IndexMap<CodeId, Vec<BreakpointRecord>>;

/// Payload of the restored channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restored;

/// Breakpoint sets that never share content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    #[default]
    Notebook,
    Console,
}

/// Outcome of [`BreakpointStore::set_breakpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointUpdate {
    /// An existing slot was replaced; single-change listeners were notified.
    Replaced,
    /// The line was new to its bucket; bulk listeners were notified.
    Appended,
}

/// Breakpoints of one debug session, addressed by code content.
///
/// All methods take `&self`: listeners are invoked after internal borrows are
/// released, so they may read the store while handling a notification.
#[derive(Debug)]
pub struct BreakpointStore {
    hasher: CodeHasher,
    buckets: RefCell<BreakpointMap>,
    context: Cell<SessionKind>,
    stashed: RefCell<HashMap<SessionKind, BreakpointMap>>,
    changed: Signal<Vec<BreakpointRecord>>,
    breakpoint_changed: Signal<BreakpointRecord>,
    restored: Signal<Restored>,
}

impl BreakpointStore {
    #[must_use]
    pub fn new(hasher: CodeHasher) -> Self {
        Self {
            hasher,
            buckets: RefCell::new(BreakpointMap::new()),
            context: Cell::new(SessionKind::default()),
            stashed: RefCell::new(HashMap::new()),
            changed: Signal::new(),
            breakpoint_changed: Signal::new(),
            restored: Signal::new(),
        }
    }

    /// Select the fingerprint strategy for this session.
    pub fn set_hash_parameters(&self, method: &str, seed: u32) -> Result<HashConfig> {
        self.hasher.configure(method, seed)
    }

    #[must_use]
    pub fn hasher(&self) -> &CodeHasher {
        &self.hasher
    }

    pub fn hash(&self, code: &str) -> Result<CodeId> {
        self.hasher.hash(code)
    }

    /// Bulk channel: carries the full record list of one bucket.
    #[must_use]
    pub fn changed(&self) -> &Signal<Vec<BreakpointRecord>> {
        &self.changed
    }

    /// Single channel: carries one updated record.
    #[must_use]
    pub fn breakpoint_changed(&self) -> &Signal<BreakpointRecord> {
        &self.breakpoint_changed
    }

    #[must_use]
    pub fn restored(&self) -> &Signal<Restored> {
        &self.restored
    }

    /// Snapshot of the whole mapping.
    #[must_use]
    pub fn breakpoints(&self) -> BreakpointMap {
        self.buckets.borrow().clone()
    }

    #[must_use]
    pub fn bucket(&self, code_id: &CodeId) -> Option<Vec<BreakpointRecord>> {
        self.buckets.borrow().get(code_id).cloned()
    }

    /// Replace the breakpoints set against `code`.
    pub fn set_breakpoints(&self, code: &str, records: Vec<BreakpointRecord>) -> Result<CodeId> {
        let code_id = self.hasher.hash(code)?;
        self.replace_bucket(code_id.clone(), records);
        Ok(code_id)
    }

    /// Replace the bucket for an already computed fingerprint.
    ///
    /// Every record is re-keyed to `code_id`, whatever source it carried.
    pub fn replace_bucket(&self, code_id: CodeId, mut records: Vec<BreakpointRecord>) {
        debug!(code_id = %code_id, count = records.len(), "replace breakpoint bucket");
        stamp_source(&code_id, &mut records);
        self.buckets.borrow_mut().insert(code_id, records.clone());
        self.changed.emit(&records);
    }

    /// Breakpoints set against `code`; empty when none were set.
    pub fn get_breakpoints(&self, code: &str) -> Result<Vec<BreakpointRecord>> {
        let code_id = self.hasher.hash(code)?;
        Ok(self.bucket(&code_id).unwrap_or_default())
    }

    /// Submit a new snapshot of one breakpoint.
    ///
    /// The record is matched only within its own bucket. A line not yet in
    /// the bucket is appended and reported on the bulk channel.
    pub fn set_breakpoint(&self, record: BreakpointRecord) -> BreakpointUpdate {
        let appended = {
            let mut buckets = self.buckets.borrow_mut();
            let bucket = buckets.entry(record.source.clone()).or_default();
            if let Some(slot) = bucket.iter_mut().find(|existing| existing.same_slot(&record)) {
                *slot = record.clone();
                None
            } else {
                bucket.push(record.clone());
                Some(bucket.clone())
            }
        };
        match appended {
            None => {
                debug!(
                    code_id = %record.source,
                    line = record.line,
                    active = record.active,
                    "breakpoint updated"
                );
                self.breakpoint_changed.emit(&record);
                BreakpointUpdate::Replaced
            }
            Some(bucket) => {
                debug!(code_id = %record.source, line = record.line, "breakpoint appended");
                self.changed.emit(&bucket);
                BreakpointUpdate::Appended
            }
        }
    }

    /// Toggle the first breakpoint at `line` of bucket `code_id`, in place.
    ///
    /// Returns `None` when no such breakpoint exists.
    pub fn set_active(
        &self,
        code_id: &CodeId,
        line: u32,
        active: bool,
    ) -> Option<BreakpointRecord> {
        let updated = {
            let mut buckets = self.buckets.borrow_mut();
            let slot = buckets
                .get_mut(code_id)?
                .iter_mut()
                .find(|record| record.line == line)?;
            slot.active = active;
            slot.clone()
        };
        debug!(code_id = %code_id, line, active, "breakpoint toggled");
        self.breakpoint_changed.emit(&updated);
        Some(updated)
    }

    /// Set `active` on every record of the mapping, duplicates included.
    ///
    /// Each record is rewritten in place and reported on the single channel.
    pub fn set_all_active(&self, active: bool) -> Vec<BreakpointRecord> {
        let updated: Vec<BreakpointRecord> = {
            let mut buckets = self.buckets.borrow_mut();
            let mut updated = Vec::new();
            for record in buckets.values_mut().flatten() {
                record.active = active;
                updated.push(record.clone());
            }
            updated
        };
        debug!(active, count = updated.len(), "set all breakpoints");
        for record in &updated {
            self.breakpoint_changed.emit(record);
        }
        updated
    }

    /// Replace the whole mapping and notify restored listeners once.
    pub fn restore(&self, mut mapping: BreakpointMap) {
        debug!(buckets = mapping.len(), "restore breakpoints");
        for (code_id, records) in &mut mapping {
            stamp_source(code_id, records);
        }
        *self.buckets.borrow_mut() = mapping;
        self.restored.emit(&Restored);
    }

    pub fn clear(&self) {
        self.restore(BreakpointMap::new());
    }

    #[must_use]
    pub fn context(&self) -> SessionKind {
        self.context.get()
    }

    /// Swap in the breakpoint set of another context.
    ///
    /// Returns false when `kind` is already active.
    pub fn switch_context(&self, kind: SessionKind) -> bool {
        let previous = self.context.get();
        if previous == kind {
            return false;
        }
        let current = self.buckets.take();
        let next = {
            let mut stashed = self.stashed.borrow_mut();
            stashed.insert(previous, current);
            stashed.remove(&kind).unwrap_or_default()
        };
        self.context.set(kind);
        debug!(from = ?previous, to = ?kind, "switch breakpoint context");
        self.restore(next);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.borrow().values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn stamp_source(code_id: &CodeId, records: &mut [BreakpointRecord]) {
    for record in records.iter_mut().filter(|record| record.source != *code_id) {
        debug!(from = %record.source, to = %code_id, "re-keying breakpoint to its bucket");
        record.source = code_id.clone();
    }
}
