//! Per-field draft state.
//!
//! A binding keeps the value the user is typing separately from the record.
//! The committed value is always read from the live record and the last-saved
//! value from the baseline record, so a binding only owns its draft.

use serde_json::Value;

use crate::field::{CommitMode, FieldKind};
use crate::record::{FieldPath, Record};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldBinding {
    path: FieldPath,
    kind: FieldKind,
    draft: Value,
}

impl FieldBinding {
    /// Create a binding whose draft starts at the record's current value.
    pub fn new(path: FieldPath, kind: FieldKind, record: &Record) -> Self {
        let draft = kind.normalize(record.get_value(&path).as_ref());
        Self { path, kind, draft }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn commit_mode(&self) -> CommitMode {
        self.kind.commit_mode()
    }

    pub fn draft(&self) -> &Value {
        &self.draft
    }

    pub fn set_draft(&mut self, value: Value) {
        self.draft = self.kind.normalize(Some(&value));
    }

    /// The normalised value currently stored in `record`.
    pub fn value_in(&self, record: &Record) -> Value {
        self.kind.normalize(record.get_value(&self.path).as_ref())
    }

    /// Draft differs from the last-saved value. Stays set across commits
    /// until a save round-trip replaces the baseline.
    pub fn is_modified(&self, baseline: &Record) -> bool {
        self.draft != self.value_in(baseline)
    }

    /// Draft has not been written into the record yet.
    pub fn has_pending_draft(&self, record: &Record) -> bool {
        self.draft != self.value_in(record)
    }

    /// Discard the draft and re-read it from `record`.
    pub fn reset(&mut self, record: &Record) {
        self.draft = self.value_in(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Record {
        Record::from_json(json!({ "travel": { "hotel": { "name": "Grand" } } }))
    }

    fn binding(raw: &str, kind: FieldKind) -> FieldBinding {
        FieldBinding::new(FieldPath::parse(raw).unwrap(), kind, &record())
    }

    #[test]
    fn draft_starts_at_committed_value() {
        let b = binding("travel.hotel.name", FieldKind::Text);
        assert_eq!(b.draft(), &json!("Grand"));
        assert!(!b.is_modified(&record()));
    }

    #[test]
    fn missing_value_starts_empty() {
        assert_eq!(binding("travel.hotel.phone", FieldKind::Text).draft(), &json!(""));
        assert_eq!(binding("av.recording", FieldKind::Checkbox).draft(), &json!(false));
    }

    #[test]
    fn typing_marks_modified_and_pending() {
        let mut b = binding("travel.hotel.name", FieldKind::Text);
        b.set_draft(json!("Plaza"));
        assert!(b.is_modified(&record()));
        assert!(b.has_pending_draft(&record()));
    }

    #[test]
    fn typing_back_to_saved_value_clears_modified() {
        let mut b = binding("travel.hotel.name", FieldKind::Text);
        b.set_draft(json!("Plaza"));
        b.set_draft(json!("Grand"));
        assert!(!b.is_modified(&record()));
    }

    #[test]
    fn null_draft_normalises_to_empty() {
        let mut b = binding("travel.hotel.name", FieldKind::Text);
        b.set_draft(Value::Null);
        assert_eq!(b.draft(), &json!(""));
    }

    #[test]
    fn reset_rereads_record() {
        let mut b = binding("travel.hotel.name", FieldKind::Text);
        b.set_draft(json!("Plaza"));
        b.reset(&record());
        assert_eq!(b.draft(), &json!("Grand"));
    }
}
