//! Field descriptors, sections, and editor layouts.
//!
//! Descriptors are enumerated statically by each page (project details,
//! website content) rather than derived from the record. A [`Section`] is the
//! unit of saving; every descriptor belongs to exactly one section, which
//! [`EditorLayout::new`] enforces.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::record::FieldPath;

/// Storage format for `Date` fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage format for `Time` fields.
pub const TIME_FORMAT: &str = "%H:%M";

// ---------------------------------------------------------------------------
// Field kinds
// ---------------------------------------------------------------------------

/// The editable control bound to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FieldKind {
    Text,
    MultilineText,
    Select { options: Vec<String> },
    Checkbox,
    Date,
    Time,
    ImagePath,
}

/// When a draft value is written back into the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Keystrokes stay in the draft until the control loses focus.
    OnBlur,
    /// Every change is committed as it happens.
    Immediate,
}

impl FieldKind {
    pub fn commit_mode(&self) -> CommitMode {
        match self {
            Self::Text | Self::MultilineText | Self::ImagePath => CommitMode::OnBlur,
            Self::Select { .. } | Self::Checkbox | Self::Date | Self::Time => {
                CommitMode::Immediate
            }
        }
    }

    /// The value an unset field displays as.
    pub fn empty_value(&self) -> Value {
        match self {
            Self::Checkbox => Value::Bool(false),
            _ => Value::String(String::new()),
        }
    }

    /// Normalise a stored value for comparison: absent and `null` become
    /// [`empty_value`](Self::empty_value).
    pub fn normalize(&self, value: Option<&Value>) -> Value {
        match value {
            None | Some(Value::Null) => self.empty_value(),
            Some(value) => value.clone(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::MultilineText => "multiline_text",
            Self::Select { .. } => "select",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Time => "time",
            Self::ImagePath => "image_path",
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptors and sections
// ---------------------------------------------------------------------------

/// One editable field: where it lives in the record and how it is edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Dot-separated record path. Validated by [`EditorLayout::new`].
    pub path: String,
    pub label: String,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(path: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            kind,
        }
    }

    pub fn text(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(path, label, FieldKind::Text)
    }

    pub fn multiline(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(path, label, FieldKind::MultilineText)
    }

    pub fn select(path: impl Into<String>, label: impl Into<String>, options: &[&str]) -> Self {
        Self::new(
            path,
            label,
            FieldKind::Select {
                options: options.iter().map(|o| (*o).to_string()).collect(),
            },
        )
    }

    pub fn checkbox(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(path, label, FieldKind::Checkbox)
    }

    pub fn date(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(path, label, FieldKind::Date)
    }

    pub fn time(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(path, label, FieldKind::Time)
    }

    pub fn image(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(path, label, FieldKind::ImagePath)
    }
}

/// A group of fields sharing one save action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub fields: Vec<FieldDescriptor>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            fields,
        }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// A field resolved within a validated layout.
#[derive(Debug, Clone)]
pub struct LayoutField {
    pub path: FieldPath,
    pub section: usize,
    pub descriptor: FieldDescriptor,
}

/// The validated set of sections a page edits.
#[derive(Debug, Clone)]
pub struct EditorLayout {
    sections: Vec<Section>,
    fields: Vec<LayoutField>,
    by_path: HashMap<String, usize>,
    by_section: HashMap<String, usize>,
}

impl EditorLayout {
    /// Validate and index a list of sections.
    ///
    /// Fails when a section id repeats, a path is malformed, or a path
    /// appears more than once across all sections.
    pub fn new(sections: Vec<Section>) -> Result<Self, CoreError> {
        let mut fields = Vec::new();
        let mut by_path = HashMap::new();
        let mut by_section = HashMap::new();

        for (index, section) in sections.iter().enumerate() {
            if by_section.insert(section.id.clone(), index).is_some() {
                return Err(CoreError::Validation(format!(
                    "Duplicate section id '{}'",
                    section.id
                )));
            }
            for descriptor in &section.fields {
                let path = FieldPath::parse(&descriptor.path)?;
                if by_path.insert(descriptor.path.clone(), fields.len()).is_some() {
                    return Err(CoreError::Validation(format!(
                        "Field '{}' belongs to more than one section",
                        descriptor.path
                    )));
                }
                fields.push(LayoutField {
                    path,
                    section: index,
                    descriptor: descriptor.clone(),
                });
            }
        }

        Ok(Self {
            sections,
            fields,
            by_path,
            by_section,
        })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.by_section.get(id).map(|&index| &self.sections[index])
    }

    /// Every field in declaration order.
    pub fn fields(&self) -> &[LayoutField] {
        &self.fields
    }

    pub fn field(&self, path: &str) -> Option<&LayoutField> {
        self.by_path.get(path).map(|&index| &self.fields[index])
    }

    pub(crate) fn field_index(&self, path: &str) -> Option<usize> {
        self.by_path.get(path).copied()
    }

    pub(crate) fn section_index(&self, id: &str) -> Option<usize> {
        self.by_section.get(id).copied()
    }

    /// Indices into [`fields`](Self::fields) belonging to a section.
    pub(crate) fn section_field_indices(&self, section: usize) -> impl Iterator<Item = usize> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(move |(_, field)| field.section == section)
            .map(|(index, _)| index)
    }

    /// The id of the section owning `path`.
    pub fn section_of(&self, path: &str) -> Option<&str> {
        self.field(path)
            .map(|field| self.sections[field.section].id.as_str())
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.id.as_str())
    }

    /// Distinct top-level record keys touched by this layout.
    pub fn root_keys(&self) -> HashSet<&str> {
        self.fields
            .iter()
            .filter_map(|field| field.path.segments().next())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Validation (advisory)
// ---------------------------------------------------------------------------

/// Check a value against its field kind.
///
/// Empty values (`null`, `""`) always pass so a field can be cleared. The
/// editor surfaces failures as per-field messages; they never block input.
pub fn validate_value(descriptor: &FieldDescriptor, value: &Value) -> Result<(), String> {
    if value.is_null() || value.as_str().is_some_and(str::is_empty) {
        return Ok(());
    }

    match &descriptor.kind {
        FieldKind::Checkbox => {
            if !value.is_boolean() {
                return Err(format!("Field '{}' must be true or false", descriptor.label));
            }
        }
        FieldKind::Select { options } => {
            let Some(s) = value.as_str() else {
                return Err(format!("Field '{}' must be a string", descriptor.label));
            };
            if !options.is_empty() && !options.iter().any(|o| o == s) {
                return Err(format!(
                    "Invalid value '{}' for field '{}'. Allowed: {}",
                    s,
                    descriptor.label,
                    options.join(", ")
                ));
            }
        }
        FieldKind::Date => {
            let parsed = value
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok());
            if parsed.is_none() {
                return Err(format!(
                    "Field '{}' must be a date (YYYY-MM-DD)",
                    descriptor.label
                ));
            }
        }
        FieldKind::Time => {
            let parsed = value
                .as_str()
                .and_then(|s| NaiveTime::parse_from_str(s, TIME_FORMAT).ok());
            if parsed.is_none() {
                return Err(format!("Field '{}' must be a time (HH:MM)", descriptor.label));
            }
        }
        FieldKind::Text | FieldKind::MultilineText | FieldKind::ImagePath => {
            if !value.is_string() {
                return Err(format!("Field '{}' must be text", descriptor.label));
            }
        }
    }

    Ok(())
}
