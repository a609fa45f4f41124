//! Section-level dirty tracking.
//!
//! A field is dirty when its committed value differs from its last-saved
//! value. Comparison is always against the saved value, so editing a field
//! and then editing it back leaves it clean.

use crate::field::{EditorLayout, LayoutField};
use crate::record::Record;

/// Whether one field's committed value differs from its saved value.
pub fn is_field_dirty(field: &LayoutField, record: &Record, baseline: &Record) -> bool {
    let kind = &field.descriptor.kind;
    kind.normalize(record.get_value(&field.path).as_ref())
        != kind.normalize(baseline.get_value(&field.path).as_ref())
}

/// Dirty fields of one section, in declaration order.
pub fn dirty_fields<'a>(
    layout: &'a EditorLayout,
    section: usize,
    record: &Record,
    baseline: &Record,
) -> Vec<&'a LayoutField> {
    if record.ptr_eq(baseline) {
        return Vec::new();
    }
    layout
        .section_field_indices(section)
        .map(|index| &layout.fields()[index])
        .filter(|field| is_field_dirty(field, record, baseline))
        .collect()
}

pub fn is_section_dirty(
    layout: &EditorLayout,
    section: usize,
    record: &Record,
    baseline: &Record,
) -> bool {
    if record.ptr_eq(baseline) {
        return false;
    }
    layout
        .section_field_indices(section)
        .any(|index| is_field_dirty(&layout.fields()[index], record, baseline))
}

/// Ids of dirty sections in layout order.
pub fn dirty_sections<'a>(
    layout: &'a EditorLayout,
    record: &Record,
    baseline: &Record,
) -> Vec<&'a str> {
    layout
        .sections()
        .iter()
        .enumerate()
        .filter(|(index, _)| is_section_dirty(layout, *index, record, baseline))
        .map(|(_, section)| section.id.as_str())
        .collect()
}
