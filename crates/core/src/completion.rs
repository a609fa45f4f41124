//! Completion scoring for partially filled records.
//!
//! A [`CompletionSchema`] lists the paths a record is expected to carry,
//! some of them critical. It is independent of the editable fields: a page
//! may score paths it does not edit, and edit paths it does not score.
//!
//! Scoring never fails. Malformed schema paths and paths running through a
//! non-map value count as missing, so legacy-shaped records still score.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{Node, Record};

/// One expected path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEntry {
    pub path: String,
    #[serde(default)]
    pub critical: bool,
}

impl CompletionEntry {
    pub fn critical(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            critical: true,
        }
    }

    pub fn optional(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            critical: false,
        }
    }
}

/// Ordered list of expected paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionSchema {
    pub entries: Vec<CompletionEntry>,
}

impl CompletionSchema {
    pub fn new(entries: Vec<CompletionEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn critical_paths(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|entry| entry.critical)
            .map(|entry| entry.path.as_str())
    }
}

/// Result of scoring a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionScore {
    /// Rounded percentage of schema paths present, `0..=100`.
    pub percentage: u8,
    /// Critical paths that are missing, in schema order.
    pub missing_critical: Vec<String>,
    pub filled: usize,
    pub total: usize,
}

impl CompletionScore {
    /// The first `n` missing critical paths, for compact display.
    pub fn first_missing(&self, n: usize) -> &[String] {
        &self.missing_critical[..n.min(self.missing_critical.len())]
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.filled == self.total
    }
}

/// Whether a resolved node counts as present.
///
/// Absent, `null`, `""` and `[]` are missing; everything else, including
/// `false`, `0` and a map, is present.
pub fn is_present(node: Option<&Node>) -> bool {
    match node {
        None => false,
        Some(Node::Branch(_)) => true,
        Some(Node::Leaf(value)) => match value {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        },
    }
}

/// Compute a rounded percentage. Returns 0 when `total` is 0.
pub fn compute_percentage(total: usize, filled: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (filled as f64 / total as f64 * 100.0).round() as u8;
    pct.min(100)
}

/// Score `record` against `schema`.
pub fn score(record: &Record, schema: &CompletionSchema) -> CompletionScore {
    let mut filled = 0usize;
    let mut missing_critical = Vec::new();

    for entry in &schema.entries {
        if is_present(record.lookup(&entry.path)) {
            filled += 1;
        } else if entry.critical {
            missing_critical.push(entry.path.clone());
        }
    }

    CompletionScore {
        percentage: compute_percentage(schema.len(), filled),
        missing_critical,
        filled,
        total: schema.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldPath;
    use serde_json::json;

    fn schema() -> CompletionSchema {
        CompletionSchema::new(vec![
            CompletionEntry::critical("a.b"),
            CompletionEntry::optional("c"),
        ])
    }

    #[test]
    fn empty_record_scores_zero_with_critical_missing() {
        let result = score(&Record::new(), &schema());
        assert_eq!(result.percentage, 0);
        assert_eq!(result.missing_critical, vec!["a.b".to_string()]);
    }

    #[test]
    fn full_record_scores_hundred() {
        let record = Record::from_json(json!({ "a": { "b": "x" }, "c": "y" }));
        let result = score(&record, &schema());
        assert_eq!(result.percentage, 100);
        assert!(result.missing_critical.is_empty());
        assert!(result.is_complete());
    }

    #[test]
    fn empty_values_count_as_missing() {
        let record = Record::from_json(json!({ "a": { "b": "" }, "c": [] }));
        let result = score(&record, &schema());
        assert_eq!(result.filled, 0);

        let record = Record::from_json(json!({ "a": { "b": null }, "c": false }));
        let result = score(&record, &schema());
        assert_eq!(result.filled, 1);
        assert_eq!(result.missing_critical, vec!["a.b".to_string()]);
    }

    #[test]
    fn traversal_through_leaf_counts_as_missing() {
        let record = Record::from_json(json!({ "a": "legacy string", "c": "y" }));
        let result = score(&record, &schema());
        assert_eq!(result.percentage, 50);
        assert_eq!(result.missing_critical, vec!["a.b".to_string()]);
    }

    #[test]
    fn malformed_schema_path_counts_as_missing() {
        let schema = CompletionSchema::new(vec![
            CompletionEntry::critical("a..b"),
            CompletionEntry::critical(""),
            CompletionEntry::optional("c"),
        ]);
        let record = Record::from_json(json!({ "c": "y" }));
        let result = score(&record, &schema);
        assert_eq!(result.percentage, 33);
        assert_eq!(result.missing_critical, vec!["a..b".to_string(), String::new()]);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(compute_percentage(3, 2), 67);
        assert_eq!(compute_percentage(8, 1), 13);
        assert_eq!(compute_percentage(0, 0), 0);
    }

    #[test]
    fn adding_critical_value_increases_score() {
        let schema = CompletionSchema::new(vec![
            CompletionEntry::critical("event.title"),
            CompletionEntry::critical("event.date"),
            CompletionEntry::optional("notes"),
        ]);
        let before = Record::new();
        let after = before.set(&FieldPath::parse("event.date").unwrap(), json!("2026-05-01"));

        let s1 = score(&before, &schema);
        let s2 = score(&after, &schema);
        assert!(s2.percentage > s1.percentage);
        assert!(s1.missing_critical.contains(&"event.date".to_string()));
        assert!(!s2.missing_critical.contains(&"event.date".to_string()));
    }

    #[test]
    fn missing_critical_follows_schema_order() {
        let schema = CompletionSchema::new(vec![
            CompletionEntry::critical("z"),
            CompletionEntry::critical("a"),
            CompletionEntry::optional("m"),
            CompletionEntry::critical("k"),
        ]);
        let records = [
            Record::new(),
            Record::from_json(json!({ "a": "x" })),
            Record::from_json(json!({ "m": "x", "k": "" })),
        ];
        for record in &records {
            let missing = score(record, &schema).missing_critical;
            let expected: Vec<String> = schema
                .critical_paths()
                .filter(|p| missing.iter().any(|m| m == p))
                .map(String::from)
                .collect();
            assert_eq!(missing, expected);
        }
    }

    #[test]
    fn first_missing_truncates() {
        let schema = CompletionSchema::new(vec![
            CompletionEntry::critical("a"),
            CompletionEntry::critical("b"),
            CompletionEntry::critical("c"),
        ]);
        let result = score(&Record::new(), &schema);
        assert_eq!(result.first_missing(2), &["a".to_string(), "b".to_string()]);
        assert_eq!(result.first_missing(10).len(), 3);
    }
}
