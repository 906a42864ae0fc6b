//! Content-addressed breakpoints and current-frame highlighting for
//! notebook cells, console prompts and editor buffers.

mod actions;
mod callstack;
mod config;
mod error;
mod hash;
mod listing;
mod reconciler;
mod scheduler;
mod session;
mod signal;
mod snapshot;
mod store;
mod tracker;
mod types;

pub use actions::BreakpointActions;
pub use callstack::CallstackModel;
pub use config::DebuggerConfig;
pub use error::{DebugError, Result};
pub use hash::{CodeHasher, CodeId, HashConfig, HashMethod, DEFAULT_HASH_SEED};
pub use listing::{
    render as render_rows, rows as breakpoint_rows, BreakpointListView, BreakpointRow, BucketRows,
};
pub use reconciler::{FrameReconciler, ReconcileReport, TrackerSet};
pub use scheduler::{AnimationFrameQueue, FrameTask, Immediate, Scheduler};
pub use session::{DebugService, DebuggerModel};
pub use signal::{Signal, Subscription, SubscriptionId};
pub use snapshot::BreakpointSnapshot;
pub use store::{BreakpointMap, BreakpointStore, BreakpointUpdate, Restored, SessionKind};
pub use tracker::{
    CodeEditor, ConsolePanel, DocumentTracker, FileEditorPanel, NotebookPanel, WidgetTracker,
};
pub use types::{BreakpointRecord, Frame, FrameSource};
