//! Host-provided document collections.
//! - `CodeEditor`: the highlight surface of one code unit
//! - notebook / console / file editor panels
//! - `DocumentTracker`: enumerates live panels of one kind

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Editor of one code unit (cell, console prompt, file buffer).
pub trait CodeEditor {
    /// Current text of the editor model.
    fn text(&self) -> String;

    /// Remove the execution-line marker, if any.
    fn clear_highlight(&self);

    /// Mark `line` (1-based) as the current execution line and scroll to it.
    fn show_current_line(&self, line: u32);
}

pub trait NotebookPanel {
    fn session_path(&self) -> String;

    /// Cell editors in notebook order.
    fn cells(&self) -> Vec<Rc<dyn CodeEditor>>;

    fn set_active_cell_index(&self, index: usize);
}

pub trait ConsolePanel {
    fn session_path(&self) -> String;

    /// Editor of the prompt cell; `None` before the console has a prompt.
    fn prompt_editor(&self) -> Option<Rc<dyn CodeEditor>>;
}

pub trait FileEditorPanel {
    /// Path of the document context the editor was opened for.
    fn context_path(&self) -> String;

    fn editor(&self) -> Option<Rc<dyn CodeEditor>>;
}

/// Live panels of one kind.
pub trait DocumentTracker<P: ?Sized> {
    fn widgets(&self) -> Vec<Rc<P>>;
}

/// Simple tracker for hosts that register panels as they open.
pub struct WidgetTracker<P: ?Sized> {
    widgets: RefCell<Vec<Rc<P>>>,
}

impl<P: ?Sized> WidgetTracker<P> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            widgets: RefCell::new(Vec::new()),
        }
    }

    pub fn add(&self, widget: Rc<P>) {
        self.widgets.borrow_mut().push(widget);
    }

    /// Returns false when `widget` was not tracked.
    pub fn remove(&self, widget: &Rc<P>) -> bool {
        let mut widgets = self.widgets.borrow_mut();
        let before = widgets.len();
        widgets.retain(|tracked| !Rc::ptr_eq(tracked, widget));
        widgets.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.borrow().is_empty()
    }
}

impl<P: ?Sized> Default for WidgetTracker<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized> DocumentTracker<P> for WidgetTracker<P> {
    fn widgets(&self) -> Vec<Rc<P>> {
        self.widgets.borrow().clone()
    }
}

impl<P: ?Sized> fmt::Debug for WidgetTracker<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetTracker")
            .field("widgets", &self.len())
            .finish()
    }
}
