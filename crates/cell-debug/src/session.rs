//! Debug session seam consumed by the frame reconciler.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::callstack::CallstackModel;
use crate::error::Result;
use crate::hash::{CodeHasher, CodeId};
use crate::signal::Signal;
use crate::store::BreakpointStore;
use crate::types::{BreakpointRecord, Frame};

/// Narrow interface of a debug session.
pub trait DebugService {
    /// Path identifying the kernel session being debugged.
    fn session_path(&self) -> Option<String>;

    /// Fires whenever the session swaps its debugger model.
    fn model_changed(&self) -> Signal<()>;

    /// Frame selection channel of the current model, if any.
    fn current_frame_changed(&self) -> Option<Signal<Option<Frame>>>;

    /// Fingerprint `code` exactly as the breakpoint store does.
    fn code_id(&self, code: &str) -> Result<CodeId>;

    /// Push breakpoints to the back-end; an empty list removes all of them.
    fn update_breakpoints(&self, records: Vec<BreakpointRecord>);
}

/// In-process debugger model: breakpoints, call stack and session identity.
#[derive(Debug)]
pub struct DebuggerModel {
    session_path: RefCell<Option<String>>,
    hasher: CodeHasher,
    breakpoints: Rc<BreakpointStore>,
    callstack: RefCell<Rc<CallstackModel>>,
    model_changed: Signal<()>,
}

impl DebuggerModel {
    /// Build a model sharing the store's hasher.
    #[must_use]
    pub fn new(session_path: Option<String>, breakpoints: Rc<BreakpointStore>) -> Self {
        Self {
            session_path: RefCell::new(session_path),
            hasher: breakpoints.hasher().clone(),
            breakpoints,
            callstack: RefCell::new(Rc::new(CallstackModel::new())),
            model_changed: Signal::new(),
        }
    }

    #[must_use]
    pub fn breakpoints(&self) -> &Rc<BreakpointStore> {
        &self.breakpoints
    }

    #[must_use]
    pub fn callstack(&self) -> Rc<CallstackModel> {
        self.callstack.borrow().clone()
    }

    pub fn set_session_path(&self, path: Option<String>) {
        debug!(path = ?path, "debug session path");
        *self.session_path.borrow_mut() = path;
    }

    /// Start over with a fresh call stack (new kernel, restarted session).
    pub fn reset_callstack(&self) -> Rc<CallstackModel> {
        let callstack = Rc::new(CallstackModel::new());
        *self.callstack.borrow_mut() = Rc::clone(&callstack);
        info!("debugger model changed");
        self.model_changed.emit(&());
        callstack
    }
}

impl DebugService for DebuggerModel {
    fn session_path(&self) -> Option<String> {
        self.session_path.borrow().clone()
    }

    fn model_changed(&self) -> Signal<()> {
        self.model_changed.clone()
    }

    fn current_frame_changed(&self) -> Option<Signal<Option<Frame>>> {
        Some(self.callstack.borrow().current_frame_changed())
    }

    fn code_id(&self, code: &str) -> Result<CodeId> {
        self.hasher.hash(code)
    }

    /// Records are grouped by fingerprint and replace their buckets; an empty
    /// list clears every bucket of the active context.
    fn update_breakpoints(&self, records: Vec<BreakpointRecord>) {
        if records.is_empty() {
            debug!("remove all breakpoints");
            self.breakpoints.clear();
            return;
        }
        let mut grouped: IndexMap<CodeId, Vec<BreakpointRecord>> = IndexMap::new();
        for record in records {
            grouped.entry(record.source.clone()).or_default().push(record);
        }
        for (code_id, bucket) in grouped {
            self.breakpoints.replace_bucket(code_id, bucket);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn model() -> DebuggerModel {
        let store = Rc::new(BreakpointStore::new(CodeHasher::new()));
        store.set_hash_parameters("Murmur2", 0).unwrap();
        DebuggerModel::new(Some("notebook.ipynb".into()), store)
    }

    #[test]
    fn code_ids_agree_with_store() {
        let model = model();
        assert_eq!(
            model.code_id("x=1").unwrap(),
            model.breakpoints().hash("x=1").unwrap()
        );
    }

    #[test]
    fn update_breakpoints_groups_by_fingerprint() {
        let model = model();
        let a = model.code_id("a").unwrap();
        let b = model.code_id("b").unwrap();
        model.update_breakpoints(vec![
            BreakpointRecord::new(a.clone(), "a", 1),
            BreakpointRecord::new(b.clone(), "b", 1),
            BreakpointRecord::new(a.clone(), "a", 2),
        ]);
        assert_eq!(model.breakpoints().bucket(&a).unwrap().len(), 2);
        assert_eq!(model.breakpoints().bucket(&b).unwrap().len(), 1);

        model.update_breakpoints(Vec::new());
        assert!(model.breakpoints().is_empty());
    }

    #[test]
    fn reset_callstack_notifies_model_listeners() {
        let model = model();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        model.model_changed().subscribe(move |_| counter.set(counter.get() + 1));
        let before = model.callstack();
        let after = model.reset_callstack();
        assert!(!Rc::ptr_eq(&before, &after));
        assert_eq!(fired.get(), 1);
    }
}
