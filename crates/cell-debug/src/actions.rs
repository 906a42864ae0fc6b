//! Bulk breakpoint actions behind the breakpoint panel toolbar.

use std::cell::Cell;
use std::rc::Rc;

use tracing::info;

use crate::session::DebugService;
use crate::store::BreakpointStore;

/// Activate/deactivate all and remove all.
pub struct BreakpointActions {
    store: Rc<BreakpointStore>,
    service: Rc<dyn DebugService>,
    all_active: Cell<bool>,
}

impl BreakpointActions {
    #[must_use]
    pub fn new(store: Rc<BreakpointStore>, service: Rc<dyn DebugService>) -> Self {
        Self {
            store,
            service,
            all_active: Cell::new(true),
        }
    }

    #[must_use]
    pub fn all_active(&self) -> bool {
        self.all_active.get()
    }

    /// Tooltip for the toggle button in its current state.
    #[must_use]
    pub fn toggle_label(&self) -> &'static str {
        if self.all_active.get() {
            "Deactivate Breakpoints"
        } else {
            "Activate Breakpoints"
        }
    }

    /// Flip every breakpoint; returns the new state.
    pub fn toggle_all(&self) -> bool {
        let active = !self.all_active.get();
        self.all_active.set(active);
        let touched = self.store.set_all_active(active).len();
        info!(active, touched, "toggled all breakpoints");
        active
    }

    pub fn remove_all(&self) {
        info!("removing all breakpoints");
        self.service.update_breakpoints(Vec::new());
    }
}
