//! Structured record editor.
//!
//! Ties a validated [`EditorLayout`] to a live record, the baseline record
//! (the record as last fetched from the API), one draft per field, and
//! per-section save state.
//!
//! Data flow: `input` updates a draft; text-like fields are written into the
//! record on `commit` (blur), atomic fields immediately. Dirty flags compare
//! the record against the baseline. Saving is split into `begin_save`,
//! which snapshots one section's committed values, and `complete_save` /
//! `fail_save`, so saves of different sections may be in flight at once.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::binding::FieldBinding;
use crate::completion::{self, CompletionSchema, CompletionScore};
use crate::dirty;
use crate::error::CoreError;
use crate::field::{validate_value, CommitMode, EditorLayout, FieldKind, LayoutField};
use crate::record::{FieldPath, Record};

// ---------------------------------------------------------------------------
// Section payload
// ---------------------------------------------------------------------------

/// One field's committed value, as submitted in a section save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadEntry {
    pub path: FieldPath,
    pub value: Value,
}

/// Snapshot of one section's committed values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionPayload {
    pub section_id: String,
    pub entries: Vec<PayloadEntry>,
}

impl SectionPayload {
    /// The entries as a partial record, e.g. `{"travel":{"hotel":{...}}}`.
    pub fn to_nested(&self) -> Value {
        self.entries
            .iter()
            .fold(Record::new(), |record, entry| {
                record.set(&entry.path, entry.value.clone())
            })
            .to_json()
    }

    /// The entries as `[{"path": ..., "value": ...}]`.
    pub fn to_entries(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "path": entry.path.as_str(),
                        "value": entry.value,
                    })
                })
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Editor {
    layout: EditorLayout,
    record: Record,
    baseline: Record,
    bindings: Vec<FieldBinding>,
    saving: HashSet<String>,
    section_errors: HashMap<String, String>,
    field_errors: HashMap<String, String>,
}

impl Editor {
    pub fn new(layout: EditorLayout, record: Record) -> Self {
        let bindings = bind_all(&layout, &record);
        Self {
            layout,
            baseline: record.clone(),
            record,
            bindings,
            saving: HashSet::new(),
            section_errors: HashMap::new(),
            field_errors: HashMap::new(),
        }
    }

    pub fn layout(&self) -> &EditorLayout {
        &self.layout
    }

    /// The live record, including committed but unsaved edits.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// The record as last fetched.
    pub fn baseline(&self) -> &Record {
        &self.baseline
    }

    // ---- field binding ----

    fn binding_index(&self, path: &str) -> Result<usize, CoreError> {
        self.layout
            .field_index(path)
            .ok_or_else(|| CoreError::UnknownField(path.to_string()))
    }

    fn field_at(&self, index: usize) -> &LayoutField {
        &self.layout.fields()[index]
    }

    pub fn draft(&self, path: &str) -> Result<&Value, CoreError> {
        let index = self.binding_index(path)?;
        Ok(self.bindings[index].draft())
    }

    /// The normalised value currently committed into the record.
    pub fn committed_value(&self, path: &str) -> Result<Value, CoreError> {
        let index = self.binding_index(path)?;
        Ok(self.bindings[index].value_in(&self.record))
    }

    /// Apply user input to a field.
    ///
    /// Text-like fields only update the draft; atomic fields (checkbox,
    /// select, date, time) are committed in the same call. Returns whether
    /// the record changed.
    pub fn input(&mut self, path: &str, value: Value) -> Result<bool, CoreError> {
        let index = self.binding_index(path)?;
        self.bindings[index].set_draft(value);
        self.refresh_validation(index);

        match self.bindings[index].commit_mode() {
            CommitMode::Immediate => {
                let draft = self.bindings[index].draft().clone();
                self.commit_at(index, draft)
            }
            CommitMode::OnBlur => Ok(false),
        }
    }

    /// Commit a field's draft into the record (blur). Returns whether the
    /// record changed.
    pub fn commit(&mut self, path: &str) -> Result<bool, CoreError> {
        let index = self.binding_index(path)?;
        let draft = self.bindings[index].draft().clone();
        self.commit_at(index, draft)
    }

    /// Write `value` into the record at `path`.
    ///
    /// Committing a value equal to the currently committed one leaves the
    /// record untouched, so repeated commits never flip a dirty flag.
    pub fn on_commit(&mut self, path: &str, value: Value) -> Result<bool, CoreError> {
        let index = self.binding_index(path)?;
        self.bindings[index].set_draft(value);
        self.refresh_validation(index);
        let draft = self.bindings[index].draft().clone();
        self.commit_at(index, draft)
    }

    fn commit_at(&mut self, index: usize, value: Value) -> Result<bool, CoreError> {
        let binding = &self.bindings[index];
        if binding.value_in(&self.record) == value {
            return Ok(false);
        }
        self.record = self.record.set(binding.path(), value);
        Ok(true)
    }

    fn refresh_validation(&mut self, index: usize) {
        let field = self.field_at(index);
        let key = field.descriptor.path.clone();
        match validate_value(&field.descriptor, self.bindings[index].draft()) {
            Ok(()) => {
                self.field_errors.remove(&key);
            }
            Err(message) => {
                self.field_errors.insert(key, message);
            }
        }
    }

    /// Draft differs from the last-saved value.
    pub fn is_field_modified(&self, path: &str) -> Result<bool, CoreError> {
        let index = self.binding_index(path)?;
        Ok(self.bindings[index].is_modified(&self.baseline))
    }

    /// Store an uploaded image path into an `ImagePath` field.
    pub fn set_image(&mut self, path: &str, uploaded_path: &str) -> Result<bool, CoreError> {
        let index = self.binding_index(path)?;
        if self.field_at(index).descriptor.kind != FieldKind::ImagePath {
            return Err(CoreError::Validation(format!(
                "Field '{path}' is not an image field"
            )));
        }
        let changed = self.on_commit(path, Value::String(uploaded_path.to_string()))?;
        self.field_errors.remove(path);
        Ok(changed)
    }

    // ---- per-field errors ----

    pub fn set_field_error(&mut self, path: &str, message: impl Into<String>) {
        self.field_errors.insert(path.to_string(), message.into());
    }

    pub fn clear_field_error(&mut self, path: &str) {
        self.field_errors.remove(path);
    }

    pub fn field_error(&self, path: &str) -> Option<&str> {
        self.field_errors.get(path).map(String::as_str)
    }

    // ---- dirty tracking ----

    fn section_index(&self, section_id: &str) -> Result<usize, CoreError> {
        self.layout
            .section_index(section_id)
            .ok_or_else(|| CoreError::UnknownSection(section_id.to_string()))
    }

    /// Any field in the section has a committed value differing from its
    /// last-saved value.
    pub fn is_section_dirty(&self, section_id: &str) -> Result<bool, CoreError> {
        let section = self.section_index(section_id)?;
        Ok(dirty::is_section_dirty(
            &self.layout,
            section,
            &self.record,
            &self.baseline,
        ))
    }

    /// Paths of the dirty fields in a section.
    pub fn dirty_fields(&self, section_id: &str) -> Result<Vec<&str>, CoreError> {
        let section = self.section_index(section_id)?;
        Ok(
            dirty::dirty_fields(&self.layout, section, &self.record, &self.baseline)
                .into_iter()
                .map(|field| field.path.as_str())
                .collect(),
        )
    }

    pub fn dirty_sections(&self) -> Vec<&str> {
        dirty::dirty_sections(&self.layout, &self.record, &self.baseline)
    }

    pub fn has_any_dirty_sections(&self) -> bool {
        !self.dirty_sections().is_empty()
    }

    /// Some draft has not been committed yet (e.g. focus is still in a
    /// text field).
    pub fn has_unsaved_drafts(&self) -> bool {
        self.bindings
            .iter()
            .any(|binding| binding.has_pending_draft(&self.record))
    }

    // ---- scoped saves ----

    /// Snapshot a section's committed values for submission.
    ///
    /// Fails with [`CoreError::Conflict`] while a save of the same section
    /// is outstanding.
    pub fn begin_save(&mut self, section_id: &str) -> Result<SectionPayload, CoreError> {
        let section = self.section_index(section_id)?;
        if self.saving.contains(section_id) {
            return Err(CoreError::Conflict(format!(
                "Section '{section_id}' is already being saved"
            )));
        }

        let entries = self
            .layout
            .section_field_indices(section)
            .map(|index| PayloadEntry {
                path: self.bindings[index].path().clone(),
                value: self.bindings[index].value_in(&self.record),
            })
            .collect();

        self.saving.insert(section_id.to_string());
        self.section_errors.remove(section_id);

        Ok(SectionPayload {
            section_id: section_id.to_string(),
            entries,
        })
    }

    pub fn is_saving(&self, section_id: &str) -> bool {
        self.saving.contains(section_id)
    }

    /// Apply the authoritative record fetched after a successful save.
    ///
    /// Replaces record and baseline wholesale, which clears every dirty
    /// flag on the page, not only the saved section's.
    pub fn complete_save(&mut self, section_id: &str, fresh: Record) {
        self.saving.remove(section_id);
        self.section_errors.remove(section_id);
        self.reload(fresh);
    }

    /// Record a failed save. Record and drafts are left as they were.
    pub fn fail_save(&mut self, section_id: &str, message: impl Into<String>) {
        self.saving.remove(section_id);
        self.section_errors
            .insert(section_id.to_string(), message.into());
    }

    pub fn section_error(&self, section_id: &str) -> Option<&str> {
        self.section_errors.get(section_id).map(String::as_str)
    }

    /// Replace all local state with a freshly fetched record.
    pub fn reload(&mut self, record: Record) {
        self.bindings = bind_all(&self.layout, &record);
        self.baseline = record.clone();
        self.record = record;
        self.field_errors.clear();
    }

    // ---- completion ----

    pub fn completion(&self, schema: &CompletionSchema) -> CompletionScore {
        completion::score(&self.record, schema)
    }
}

fn bind_all(layout: &EditorLayout, record: &Record) -> Vec<FieldBinding> {
    layout
        .fields()
        .iter()
        .map(|field| FieldBinding::new(field.path.clone(), field.descriptor.kind.clone(), record))
        .collect()
}
