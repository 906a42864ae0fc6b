//! Breakpoint panel rows, kept in sync with the store.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::{Rc, Weak};

use crate::hash::CodeId;
use crate::signal::Subscription;
use crate::store::{BreakpointMap, BreakpointStore, Restored};
use crate::types::BreakpointRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointRow {
    pub line: u32,
    pub active: bool,
    pub label: String,
}

impl From<&BreakpointRecord> for BreakpointRow {
    fn from(record: &BreakpointRecord) -> Self {
        Self {
            line: record.line,
            active: record.active,
            label: format!("{} : {}", record.name, record.line),
        }
    }
}

/// Rows of one bucket, sorted by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketRows {
    pub code_id: CodeId,
    pub rows: Vec<BreakpointRow>,
}

/// Buckets in store order, rows sorted by line.
#[must_use]
pub fn rows(mapping: &BreakpointMap) -> Vec<BucketRows> {
    mapping
        .iter()
        .map(|(code_id, records)| {
            let mut rows: Vec<BreakpointRow> = records.iter().map(BreakpointRow::from).collect();
            rows.sort_by_key(|row| row.line);
            BucketRows {
                code_id: code_id.clone(),
                rows,
            }
        })
        .collect()
}

/// Plain-text rendering, one bucket header per fingerprint.
#[must_use]
pub fn render(buckets: &[BucketRows]) -> String {
    let mut out = String::new();
    for bucket in buckets {
        let _ = writeln!(out, "{}", bucket.code_id);
        for row in &bucket.rows {
            let mark = if row.active { 'x' } else { ' ' };
            let _ = writeln!(out, "  [{mark}] {}", row.label);
        }
    }
    out
}

/// Live view over a store: re-reads the full mapping on every notification.
pub struct BreakpointListView {
    rows: Rc<RefCell<Vec<BucketRows>>>,
    _subscriptions: Vec<Subscription>,
}

impl BreakpointListView {
    #[must_use]
    pub fn new(store: &Rc<BreakpointStore>) -> Self {
        let rows = Rc::new(RefCell::new(self::rows(&store.breakpoints())));
        let subscriptions = vec![
            store
                .changed()
                .subscribe_scoped(refresh_handler::<Vec<BreakpointRecord>>(
                    Rc::downgrade(store),
                    Rc::clone(&rows),
                )),
            store
                .restored()
                .subscribe_scoped(refresh_handler::<Restored>(
                    Rc::downgrade(store),
                    Rc::clone(&rows),
                )),
            store
                .breakpoint_changed()
                .subscribe_scoped(refresh_handler::<BreakpointRecord>(
                    Rc::downgrade(store),
                    Rc::clone(&rows),
                )),
        ];
        Self {
            rows,
            _subscriptions: subscriptions,
        }
    }

    #[must_use]
    pub fn rows(&self) -> Vec<BucketRows> {
        self.rows.borrow().clone()
    }

    #[must_use]
    pub fn render(&self) -> String {
        render(&self.rows.borrow())
    }
}

fn refresh_handler<T>(
    store: Weak<BreakpointStore>,
    rows: Rc<RefCell<Vec<BucketRows>>>,
) -> impl Fn(&T) + 'static {
    move |_: &T| {
        if let Some(store) = store.upgrade() {
            *rows.borrow_mut() = self::rows(&store.breakpoints());
        }
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;
    use crate::hash::CodeHasher;

    #[test]
    fn view_tracks_store_changes() {
        let store = Rc::new(BreakpointStore::new(CodeHasher::new()));
        store.set_hash_parameters("Murmur2", 0).unwrap();
        let view = BreakpointListView::new(&store);

        let code = "x=1\ny=2\nz=3\n";
        let code_id = store.hash(code).unwrap();
        store
            .set_breakpoints(
                code,
                vec![
                    BreakpointRecord::new(code_id.clone(), "Cell [2]", 3),
                    BreakpointRecord::new(code_id.clone(), "Cell [2]", 1),
                ],
            )
            .unwrap();
        store.set_active(&code_id, 3, false);
        let prompt_id = store.hash("print(1)").unwrap();
        store.set_breakpoint(BreakpointRecord::new(prompt_id, "Console", 1));

        expect![[r#"
            2858329524
              [x] Cell [2] : 1
              [ ] Cell [2] : 3
            3626970123
              [x] Console : 1
        "#]]
        .assert_eq(&view.render());

        store.clear();
        assert!(view.rows().is_empty());
    }
}
