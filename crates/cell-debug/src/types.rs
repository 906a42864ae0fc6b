//! Breakpoint and frame value types shared with the debug back-end.

use serde::{Deserialize, Serialize};

use crate::hash::CodeId;

/// Breakpoint as shown to the user, keyed by the fingerprint of its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointRecord {
    /// Back-end assigned id, when the back-end reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Fingerprint of the code the breakpoint was set against.
    pub source: CodeId,
    /// Display name of the source (cell label, console name, file name).
    #[serde(default)]
    pub name: String,
    /// 1-based line within the code unit.
    pub line: u32,
    pub active: bool,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BreakpointRecord {
    /// Active, unverified breakpoint at `line`.
    #[must_use]
    pub fn new(source: CodeId, name: impl Into<String>, line: u32) -> Self {
        Self {
            id: None,
            source,
            name: name.into(),
            line,
            active: true,
            verified: false,
            message: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Copy of this record with `active` replaced.
    #[must_use]
    pub fn with_active(&self, active: bool) -> Self {
        Self {
            active,
            ..self.clone()
        }
    }

    /// Whether `other` denotes the same breakpoint slot within one bucket.
    ///
    /// Lines must match; ids only disambiguate when both sides carry one.
    #[must_use]
    pub fn same_slot(&self, other: &BreakpointRecord) -> bool {
        if self.line != other.line {
            return false;
        }
        match (self.id, other.id) {
            (Some(left), Some(right)) => left == right,
            _ => true,
        }
    }
}

/// Source reference carried by a stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSource {
    /// Fingerprint of the executing code (or a plain path for real files).
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One entry of a paused call stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: u32,
    pub name: String,
    pub source: FrameSource,
    pub line: u32,
    pub column: u32,
}

impl Frame {
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, path: impl Into<String>, line: u32) -> Self {
        Self {
            id,
            name: name.into(),
            source: FrameSource {
                path: path.into(),
                name: None,
            },
            line,
            column: 1,
        }
    }

    /// Whether this frame executes code with fingerprint `code_id`.
    #[must_use]
    pub fn is_in(&self, code_id: &CodeId) -> bool {
        code_id == self.source.path.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_use_camel_case_fields() {
        let record = BreakpointRecord::new(CodeId::new("42"), "Cell [1]", 3).with_id(7);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "source": "42",
                "name": "Cell [1]",
                "line": 3,
                "active": true,
                "verified": false
            })
        );
    }

    #[test]
    fn slot_identity_prefers_ids_when_both_present() {
        let base = BreakpointRecord::new(CodeId::new("1"), "", 4);
        assert!(base.same_slot(&base.clone().with_id(9)));
        assert!(base.clone().with_id(1).same_slot(&base.clone().with_id(1)));
        assert!(!base.clone().with_id(1).same_slot(&base.clone().with_id(2)));
        assert!(!base.same_slot(&BreakpointRecord::new(CodeId::new("1"), "", 5)));
    }

    #[test]
    fn frames_match_by_source_path() {
        let frame = Frame::new(1, "<module>", "2878563358", 1);
        assert!(frame.is_in(&CodeId::new("2878563358")));
        assert!(!frame.is_in(&CodeId::new("3871821825")));
    }
}
