//! Path-addressed record store.
//!
//! A [`Record`] is an untyped tree of string-keyed maps with scalar leaves
//! (string, number, boolean, list). It is addressed from the outside only by
//! dot-separated [`FieldPath`]s such as `travel.hotel.check_in_date`.
//!
//! Updates are non-destructive: [`Record::set`] allocates new maps only along
//! the spine of the path and shares every other subtree with the original, so
//! keeping the last-saved copy of a record next to the live one is cheap.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

type Branch = Arc<BTreeMap<String, Node>>;

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// A path string that cannot address anything (empty, or with an empty segment).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed path '{path}': {reason}")]
pub struct MalformedPathError {
    pub path: String,
    pub reason: &'static str,
}

/// A validated, dot-separated address into a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
}

impl FieldPath {
    /// Parse a dot-separated path.
    ///
    /// Fails when the string is empty or any segment is empty (`"a..b"`,
    /// `".a"`, `"a."`).
    pub fn parse(raw: &str) -> Result<Self, MalformedPathError> {
        if raw.is_empty() {
            return Err(MalformedPathError {
                path: raw.to_string(),
                reason: "path is empty",
            });
        }
        if raw.split(PATH_SEPARATOR).any(str::is_empty) {
            return Err(MalformedPathError {
                path: raw.to_string(),
                reason: "path contains an empty segment",
            });
        }
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split(PATH_SEPARATOR)
    }

    /// Number of segments in the path.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Append a segment, yielding a deeper path.
    pub fn child(&self, segment: &str) -> Result<Self, MalformedPathError> {
        Self::parse(&format!("{}{PATH_SEPARATOR}{segment}", self.raw))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for FieldPath {
    type Err = MalformedPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = MalformedPathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.raw
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// One node of a record tree.
///
/// A `Leaf` never holds a JSON object; objects are always converted into
/// `Branch` nodes by [`Node::from_json`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Value),
    Branch(Branch),
}

impl Node {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Branch(Arc::new(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            )),
            other => Self::Leaf(other),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Leaf(value) => value.clone(),
            Self::Branch(map) => Value::Object(
                map.iter()
                    .map(|(key, node)| (key.clone(), node.to_json()))
                    .collect(),
            ),
        }
    }

    pub fn as_leaf(&self) -> Option<&Value> {
        match self {
            Self::Leaf(value) => Some(value),
            Self::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Self::Leaf(_) => None,
            Self::Branch(map) => Some(map),
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// An immutable, structurally shared record tree.
///
/// Cloning a record is O(1); it only bumps the root reference count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    root: Branch,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from JSON. A non-object root yields an empty record.
    pub fn from_json(value: Value) -> Self {
        match Node::from_json(value) {
            Node::Branch(root) => Self { root },
            Node::Leaf(_) => Self::default(),
        }
    }

    pub fn to_json(&self) -> Value {
        Node::Branch(Arc::clone(&self.root)).to_json()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Whether both records share the same root allocation, i.e. neither
    /// has been written since one was cloned from the other.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// Resolve a path. Missing segments and traversal through a leaf both
    /// yield `None`; nothing is ever created.
    pub fn get(&self, path: &FieldPath) -> Option<&Node> {
        let mut segments = path.segments();
        let mut node = self.root.get(segments.next()?)?;
        for segment in segments {
            node = match node {
                Node::Branch(map) => map.get(segment)?,
                Node::Leaf(_) => return None,
            };
        }
        Some(node)
    }

    /// Resolve a raw path string; malformed paths resolve to `None`.
    pub fn lookup(&self, raw: &str) -> Option<&Node> {
        FieldPath::parse(raw).ok().and_then(|path| self.get(&path))
    }

    /// Resolve a path and materialise it as JSON.
    pub fn get_value(&self, path: &FieldPath) -> Option<Value> {
        self.get(path).map(Node::to_json)
    }

    /// Resolve a path to a leaf value. Branches yield `None`.
    pub fn leaf(&self, path: &FieldPath) -> Option<&Value> {
        self.get(path).and_then(Node::as_leaf)
    }

    /// Return a copy of this record with `value` stored at `path`.
    ///
    /// Missing intermediate maps are created. A leaf standing where an
    /// intermediate map is needed is replaced by a map.
    pub fn set(&self, path: &FieldPath, value: Value) -> Self {
        let segments: Vec<&str> = path.segments().collect();
        Self {
            root: set_in(&self.root, &segments, Node::from_json(value)),
        }
    }

    /// Return a copy of this record without the node at `path`. Removing a
    /// missing path returns a record sharing this one's root.
    pub fn remove(&self, path: &FieldPath) -> Self {
        let segments: Vec<&str> = path.segments().collect();
        match remove_in(&self.root, &segments) {
            Some(root) => Self { root },
            None => self.clone(),
        }
    }

    /// Whether the branch at `path` is the very same allocation in both
    /// records. Leaves and missing paths never share.
    pub fn shares_branch(&self, other: &Self, path: &FieldPath) -> bool {
        match (self.get(path), other.get(path)) {
            (Some(Node::Branch(a)), Some(Node::Branch(b))) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Every addressable leaf path, depth first with keys in sorted order.
    ///
    /// Keys that cannot be expressed as a path segment (empty, or containing
    /// the separator) are skipped.
    pub fn leaf_paths(&self) -> Vec<FieldPath> {
        let mut out = Vec::new();
        collect_leaf_paths(&self.root, None, &mut out);
        out
    }
}

fn set_in(map: &Branch, segments: &[&str], value: Node) -> Branch {
    let Some((head, rest)) = segments.split_first() else {
        return Arc::clone(map);
    };

    let child = if rest.is_empty() {
        value
    } else {
        let existing = match map.get(*head) {
            Some(Node::Branch(branch)) => Arc::clone(branch),
            _ => Branch::default(),
        };
        Node::Branch(set_in(&existing, rest, value))
    };

    let mut next = (**map).clone();
    next.insert((*head).to_string(), child);
    Arc::new(next)
}

fn remove_in(map: &Branch, segments: &[&str]) -> Option<Branch> {
    let (head, rest) = segments.split_first()?;

    let replacement = if rest.is_empty() {
        if !map.contains_key(*head) {
            return None;
        }
        None
    } else {
        let Some(Node::Branch(child)) = map.get(*head) else {
            return None;
        };
        Some(Node::Branch(remove_in(child, rest)?))
    };

    let mut next = (**map).clone();
    match replacement {
        Some(node) => {
            next.insert((*head).to_string(), node);
        }
        None => {
            next.remove(*head);
        }
    }
    Some(Arc::new(next))
}

fn collect_leaf_paths(
    map: &BTreeMap<String, Node>,
    prefix: Option<&FieldPath>,
    out: &mut Vec<FieldPath>,
) {
    for (key, node) in map {
        let path = match prefix {
            Some(prefix) => prefix.child(key),
            None => FieldPath::parse(key),
        };
        let Ok(path) = path else {
            continue;
        };
        match node {
            Node::Leaf(_) => out.push(path),
            Node::Branch(child) => collect_leaf_paths(child, Some(&path), out),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn path(raw: &str) -> FieldPath {
        FieldPath::parse(raw).unwrap()
    }

    fn sample() -> Record {
        Record::from_json(json!({
            "event": { "title": "Keynote", "date": "2026-03-01" },
            "travel": {
                "hotel": { "name": "Grand", "check_in_date": "2026-02-28" },
                "flights": { "outbound": "UA 100" }
            },
            "notes": "bring clicker"
        }))
    }

    #[test]
    fn parse_rejects_empty_path() {
        let err = FieldPath::parse("").unwrap_err();
        assert_eq!(err.reason, "path is empty");
    }

    #[test]
    fn parse_rejects_empty_segments() {
        for raw in ["a..b", ".a", "a.", "."] {
            assert_matches!(FieldPath::parse(raw), Err(MalformedPathError { .. }), "{raw}");
        }
    }

    #[test]
    fn parse_accepts_single_and_nested_segments() {
        assert_eq!(path("notes").depth(), 1);
        assert_eq!(path("travel.hotel.check_in_date").depth(), 3);
        assert_eq!(path("a.b").child("c").unwrap().as_str(), "a.b.c");
    }

    #[test]
    fn get_missing_path_is_none_and_creates_nothing() {
        let record = sample();
        assert!(record.get(&path("travel.car.company")).is_none());
        assert!(record.get(&path("venue")).is_none());
        assert_eq!(record, sample());
    }

    #[test]
    fn get_through_leaf_is_none() {
        let record = sample();
        assert!(record.get(&path("notes.extra")).is_none());
    }

    #[test]
    fn lookup_malformed_is_none() {
        assert!(sample().lookup("travel..hotel").is_none());
        assert_eq!(
            sample().lookup("event.title").and_then(Node::as_leaf),
            Some(&json!("Keynote"))
        );
    }

    #[test]
    fn set_then_get_returns_value() {
        let record = sample();
        let cases = [
            ("notes", json!("new notes")),
            ("travel.hotel.name", json!("Plaza")),
            ("travel.car.company", json!("Hertz")),
            ("av.slides", json!(true)),
            ("event.tags", json!(["ai", "keynote"])),
            ("budget", json!(12500)),
        ];
        for (raw, value) in cases {
            let updated = record.set(&path(raw), value.clone());
            assert_eq!(updated.get_value(&path(raw)), Some(value), "{raw}");
        }
    }

    #[test]
    fn set_does_not_modify_original() {
        let record = sample();
        let _ = record.set(&path("travel.hotel.name"), json!("Plaza"));
        assert_eq!(record.leaf(&path("travel.hotel.name")), Some(&json!("Grand")));
    }

    #[test]
    fn set_shares_untouched_subtrees() {
        let record = sample();
        let updated = record.set(&path("travel.hotel.name"), json!("Plaza"));

        assert!(record.shares_branch(&updated, &path("event")));
        assert!(record.shares_branch(&updated, &path("travel.flights")));
        assert!(!record.shares_branch(&updated, &path("travel")));
        assert!(!record.shares_branch(&updated, &path("travel.hotel")));
        assert_eq!(
            updated.leaf(&path("travel.hotel.check_in_date")),
            Some(&json!("2026-02-28"))
        );
        assert_eq!(updated.leaf(&path("notes")), Some(&json!("bring clicker")));
    }

    #[test]
    fn set_replaces_leaf_intermediate_with_map() {
        let record = sample().set(&path("notes.internal"), json!("x"));
        assert_eq!(record.leaf(&path("notes.internal")), Some(&json!("x")));
    }

    #[test]
    fn set_object_value_becomes_branch() {
        let record = Record::new().set(&path("venue"), json!({ "name": "Hall A" }));
        assert_eq!(record.leaf(&path("venue.name")), Some(&json!("Hall A")));
    }

    #[test]
    fn remove_drops_leaf_and_keeps_siblings() {
        let record = sample();
        let updated = record.remove(&path("travel.hotel.name"));
        assert!(updated.get(&path("travel.hotel.name")).is_none());
        assert!(updated.get(&path("travel.hotel.check_in_date")).is_some());
        assert!(record.get(&path("travel.hotel.name")).is_some());
    }

    #[test]
    fn remove_missing_path_shares_root() {
        let record = sample();
        assert!(record.remove(&path("nope.nothing")).ptr_eq(&record));
    }

    #[test]
    fn non_object_json_root_is_empty_record() {
        assert!(Record::from_json(json!([1, 2])).is_empty());
        assert!(Record::from_json(json!(null)).is_empty());
    }

    #[test]
    fn leaf_paths_are_sorted_depth_first() {
        let paths: Vec<String> = sample()
            .leaf_paths()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            paths,
            vec![
                "event.date",
                "event.title",
                "notes",
                "travel.flights.outbound",
                "travel.hotel.check_in_date",
                "travel.hotel.name",
            ]
        );
    }

    #[test]
    fn record_serializes_as_plain_json() {
        let value = json!({ "a": { "b": 1 }, "c": "y" });
        let record: Record = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }
}
