//! Current-frame highlighting across notebooks, consoles and file editors.
//! - listens to the session's frame channel (re-attached on model change)
//! - clears stale execution-line markers before matching
//! - matches documents by content fingerprint, defers the highlight draw

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::scheduler::Scheduler;
use crate::session::DebugService;
use crate::signal::Subscription;
use crate::tracker::{CodeEditor, ConsolePanel, DocumentTracker, FileEditorPanel, NotebookPanel};
use crate::types::Frame;


/// Document collections the host chose to expose.
#[derive(Default, Clone)]
pub struct TrackerSet {
    pub notebooks: Option<Rc<dyn DocumentTracker<dyn NotebookPanel>>>,
    pub consoles: Option<Rc<dyn DocumentTracker<dyn ConsolePanel>>>,
    pub editors: Option<Rc<dyn DocumentTracker<dyn FileEditorPanel>>>,
}

impl TrackerSet {
    #[must_use]
    pub fn with_notebooks(mut self, tracker: Rc<dyn DocumentTracker<dyn NotebookPanel>>) -> Self {
        self.notebooks = Some(tracker);
        self
    }

    #[must_use]
    pub fn with_consoles(mut self, tracker: Rc<dyn DocumentTracker<dyn ConsolePanel>>) -> Self {
        self.consoles = Some(tracker);
        self
    }

    #[must_use]
    pub fn with_editors(mut self, tracker: Rc<dyn DocumentTracker<dyn FileEditorPanel>>) -> Self {
        self.editors = Some(tracker);
        self
    }
}

impl fmt::Debug for TrackerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerSet")
            .field("notebooks", &self.notebooks.is_some())
            .field("consoles", &self.consoles.is_some())
            .field("editors", &self.editors.is_some())
            .finish()
    }
}

/// Counters for one reconciliation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Editors whose highlight was cleared.
    pub cleared: usize,
    /// Editors whose content matched the frame; a highlight was scheduled.
    pub matched: usize,
    /// Panels of this session without an editable surface.
    pub skipped: usize,
}

/// Keeps the execution-line marker in sync with the current frame.
pub struct FrameReconciler {
    inner: Rc<Inner>,
}

struct Inner {
    service: Rc<dyn DebugService>,
    trackers: TrackerSet,
    scheduler: Rc<dyn Scheduler>,
    current: RefCell<Option<Frame>>,
    generation: Cell<u64>,
    disposed: Cell<bool>,
    model_subscription: RefCell<Option<Subscription>>,
    frame_subscription: RefCell<Option<Subscription>>,
}

impl FrameReconciler {
    /// Attach to `service` and start following its current frame.
    #[must_use]
    pub fn new(
        service: Rc<dyn DebugService>,
        trackers: TrackerSet,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        let inner = Rc::new(Inner {
            service,
            trackers,
            scheduler,
            current: RefCell::new(None),
            generation: Cell::new(0),
            disposed: Cell::new(false),
            model_subscription: RefCell::new(None),
            frame_subscription: RefCell::new(None),
        });
        let weak = Rc::downgrade(&inner);
        let model_subscription = inner.service.model_changed().subscribe_scoped(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.attach_frame_channel();
            }
        });
        *inner.model_subscription.borrow_mut() = Some(model_subscription);
        inner.attach_frame_channel();
        debug!(trackers = ?inner.trackers, "frame reconciler attached");
        Self { inner }
    }

    /// Run a reconciliation pass for `frame` (`None` once execution resumes).
    pub fn on_current_frame_changed(&self, frame: Option<&Frame>) -> ReconcileReport {
        self.inner.reconcile(frame)
    }

    #[must_use]
    pub fn current_frame(&self) -> Option<Frame> {
        self.inner.current.borrow().clone()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Release every subscription; pending highlights are dropped.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let model = self.inner.model_subscription.borrow_mut().take();
        let frame = self.inner.frame_subscription.borrow_mut().take();
        drop(model);
        drop(frame);
        debug!("frame reconciler disposed");
    }
}

impl fmt::Debug for FrameReconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameReconciler")
            .field("trackers", &self.inner.trackers)
            .field("generation", &self.inner.generation.get())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

impl Inner {
    fn attach_frame_channel(self: &Rc<Self>) {
        if self.disposed.get() {
            return;
        }
        let subscription = self.service.current_frame_changed().map(|signal| {
            let weak: Weak<Inner> = Rc::downgrade(self);
            signal.subscribe_scoped(move |frame: &Option<Frame>| {
                if let Some(inner) = weak.upgrade() {
                    inner.reconcile(frame.as_ref());
                }
            })
        });
        if subscription.is_none() {
            debug!("debug session has no call stack model yet");
        }
        let previous = self.frame_subscription.replace(subscription);
        drop(previous);
    }

    fn reconcile(self: &Rc<Self>, frame: Option<&Frame>) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if self.disposed.get() {
            return report;
        }
        *self.current.borrow_mut() = frame.cloned();
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);

        let Some(session_path) = self.service.session_path() else {
            debug!("no debug session; nothing to reconcile");
            return report;
        };
        let pass = Pass {
            inner: self,
            session_path: &session_path,
            frame,
            generation,
        };
        pass.notebooks(&mut report);
        pass.consoles(&mut report);
        pass.editors(&mut report);
        debug!(
            frame = ?frame.map(|frame| (&frame.source.path, frame.line)),
            cleared = report.cleared,
            matched = report.matched,
            skipped = report.skipped,
            "reconciled current frame"
        );
        report
    }
}

/// One walk over every collection for a single frame transition.
struct Pass<'a> {
    inner: &'a Rc<Inner>,
    session_path: &'a str,
    frame: Option<&'a Frame>,
    generation: u64,
}

impl Pass<'_> {
    fn notebooks(&self, report: &mut ReconcileReport) {
        let Some(tracker) = &self.inner.trackers.notebooks else {
            return;
        };
        for panel in tracker.widgets() {
            if panel.session_path() != self.session_path {
                continue;
            }
            let cells = panel.cells();
            for cell in &cells {
                cell.clear_highlight();
                report.cleared += 1;
            }
            let Some(frame) = self.frame else {
                continue;
            };
            for (index, cell) in cells.iter().enumerate() {
                if !self.matches(cell.as_ref(), frame) {
                    continue;
                }
                panel.set_active_cell_index(index);
                self.schedule_highlight(Rc::clone(cell), frame.line);
                report.matched += 1;
            }
        }
    }

    fn consoles(&self, report: &mut ReconcileReport) {
        let Some(tracker) = &self.inner.trackers.consoles else {
            return;
        };
        for panel in tracker.widgets() {
            if panel.session_path() != self.session_path {
                continue;
            }
            let Some(editor) = panel.prompt_editor() else {
                report.skipped += 1;
                continue;
            };
            self.visit_editor(editor, report);
        }
    }

    fn editors(&self, report: &mut ReconcileReport) {
        let Some(tracker) = &self.inner.trackers.editors else {
            return;
        };
        for panel in tracker.widgets() {
            if panel.context_path() != self.session_path {
                continue;
            }
            let Some(editor) = panel.editor() else {
                report.skipped += 1;
                continue;
            };
            self.visit_editor(editor, report);
        }
    }

    fn visit_editor(&self, editor: Rc<dyn CodeEditor>, report: &mut ReconcileReport) {
        editor.clear_highlight();
        report.cleared += 1;
        let Some(frame) = self.frame else {
            return;
        };
        if !self.matches(editor.as_ref(), frame) {
            return;
        }
        self.schedule_highlight(editor, frame.line);
        report.matched += 1;
    }

    fn matches(&self, editor: &dyn CodeEditor, frame: &Frame) -> bool {
        match self.inner.service.code_id(&editor.text()) {
            Ok(code_id) => frame.is_in(&code_id),
            Err(err) => {
                debug!(%err, "cannot fingerprint document; treating as no match");
                false
            }
        }
    }

    fn schedule_highlight(&self, editor: Rc<dyn CodeEditor>, line: u32) {
        let weak = Rc::downgrade(self.inner);
        let generation = self.generation;
        self.inner
            .scheduler
            .request_animation_frame(Box::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if inner.disposed.get() || inner.generation.get() != generation {
                    debug!(generation, line, "dropping superseded highlight");
                    return;
                }
                editor.show_current_line(line);
            }));
    }
}
