//! Issue projection: dotted-path field lookup and flat record views.
//!
//! An [`Issue`] wraps the `"fields"` mapping of one raw search-result issue.
//! Field values are dynamically shaped, so they stay as [`serde_json::Value`]
//! and are only reduced to [`RecordValue`] scalars at the edge:
//!
//! - [`Issue::get`] walks a dotted path (`"status.name"`) and never fails on a
//!   missing step; it yields `None` instead.
//! - [`Issue::to_record`] flattens the top-level fields into a [`Record`],
//!   preferring a nested `name`, then a nested `id`, and otherwise rendering
//!   non-string values as compact JSON text.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use tracing::trace;

use crate::{IssueKey, TrackerError};

/// Timestamp layout the tracker uses for date-time fields
/// (e.g. `2019-05-08T10:41:23.000+0000`).
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

// ---------------------------------------------------------------------------
// Record values
// ---------------------------------------------------------------------------

/// A scalar cell in a flattened [`Record`].
///
/// Composite field values never appear here directly; they are rendered to
/// their compact JSON text and stored as [`RecordValue::Text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    /// JSON `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer or floating-point number.
    Number(Number),
    /// A string, or the JSON text of a mapping or sequence.
    Text(String),
}

impl RecordValue {
    /// Reduces a field value to a scalar, rendering mappings and sequences
    /// as compact JSON text.
    pub fn from_field(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }

    fn json_text(value: &Value) -> Self {
        Self::Text(value.to_string())
    }
}

impl std::fmt::Display for RecordValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for RecordValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A flat, single-level view of an issue suitable for tabular output.
///
/// Keys keep the order of the issue's fields. Serialises as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, RecordValue)>,
}

impl Record {
    /// Sets `key` to `value`, replacing an existing entry in place.
    ///
    /// A flattened `<field>.name` key can coincide with a literal field of
    /// the same name; the later field wins and keeps the earlier position.
    pub fn insert(&mut self, key: impl Into<String>, value: RecordValue) {
        let key = key.into();
        match self.entries.iter().position(|(k, _)| *k == key) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// One issue from a search result, reduced to its `"fields"` mapping.
///
/// Immutable after construction. The raw payload's top-level `key` and `id`
/// are kept as metadata but are not part of the field view.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    key: Option<IssueKey>,
    id: Option<String>,
    fields: Map<String, Value>,
}

impl Issue {
    /// Builds an issue from a raw search-result payload.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::MissingFields`] if the payload has no `"fields"` entry.
    /// - [`TrackerError::MalformedFields`] if `"fields"` is not a mapping.
    pub fn from_raw(raw: Value) -> Result<Self, TrackerError> {
        let Value::Object(mut raw) = raw else {
            return Err(TrackerError::MissingFields);
        };

        let fields = match raw.remove("fields") {
            None => return Err(TrackerError::MissingFields),
            Some(Value::Object(fields)) => fields,
            Some(other) => {
                return Err(TrackerError::MalformedFields {
                    found: json_kind(&other),
                })
            }
        };

        let key = raw
            .get("key")
            .and_then(Value::as_str)
            .and_then(IssueKey::new);
        let id = match raw.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Ok(Self { key, id, fields })
    }

    /// The issue key (e.g. `ABC-123`), if the payload carried one.
    pub fn key(&self) -> Option<&IssueKey> {
        self.key.as_ref()
    }

    /// The tracker's internal issue id, if the payload carried one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The underlying field mapping.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Resolves a dotted path to the raw field value without any conversion.
    ///
    /// Each segment indexes a mapping by key; a segment made of digits also
    /// indexes a sequence by position. Returns `None` as soon as a step is
    /// missing or lands on a scalar.
    pub fn get_raw(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            }?;
        }
        Some(current)
    }

    /// Resolves a dotted path (e.g. `"status.name"`) to a scalar value.
    ///
    /// Missing steps and JSON `null` both yield `None`. Mappings and
    /// sequences are returned as their compact JSON text.
    pub fn get(&self, path: &str) -> Option<RecordValue> {
        match self.get_raw(path) {
            None | Some(Value::Null) => {
                trace!(path, "field path resolved to nothing");
                None
            }
            Some(value) => Some(RecordValue::from_field(value)),
        }
    }

    /// Resolves a dotted path and parses it as a timestamp.
    ///
    /// Accepts the tracker's own layout ([`DEFAULT_TIMESTAMP_FORMAT`]) and
    /// RFC 3339. Anything that is not parseable text yields `None`.
    pub fn timestamp(&self, path: &str) -> Option<DateTime<Utc>> {
        let text = self.get_raw(path)?.as_str()?;
        DateTime::parse_from_str(text, DEFAULT_TIMESTAMP_FORMAT)
            .or_else(|_| DateTime::parse_from_rfc3339(text))
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Resolves a dotted path as a signed integer.
    ///
    /// Floating-point numbers are truncated toward zero; strings must hold
    /// a plain integer. Anything else yields `None`.
    pub fn long(&self, path: &str) -> Option<i64> {
        match self.get_raw(path)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Resolves a dotted path as a floating-point number. Numeric strings
    /// are parsed; anything else yields `None`.
    pub fn double(&self, path: &str) -> Option<f64> {
        match self.get_raw(path)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Resolves a dotted path as a boolean. The strings `"true"` and
    /// `"false"` are accepted in any case; anything else yields `None`.
    pub fn boolean(&self, path: &str) -> Option<bool> {
        match self.get_raw(path)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Resolves a dotted path to a mapping or sequence. Scalars and `null`
    /// yield `None`.
    pub fn json(&self, path: &str) -> Option<&Value> {
        self.get_raw(path)
            .filter(|value| value.is_object() || value.is_array())
    }

    /// Resolves a dotted path as display text.
    ///
    /// Scalars give their plain text, sequences join their items with `","`
    /// (composite items as JSON text), and mappings give their JSON text.
    /// `null` yields `None`.
    pub fn text(&self, path: &str) -> Option<String> {
        match self.get_raw(path)? {
            Value::Null => None,
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(plain_text)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            other => Some(plain_text(other)),
        }
    }

    /// Flattens the top-level fields into a [`Record`], one entry per field.
    ///
    /// Per field, in order:
    ///
    /// 1. a string is kept under its own key;
    /// 2. a mapping with a `name` entry becomes `<key>.name`;
    /// 3. a mapping with an `id` entry becomes `<key>.id`;
    /// 4. anything else is stored under its own key as compact JSON text
    ///    (`null` becomes the text `null`).
    pub fn to_record(&self) -> Record {
        let mut record = Record::default();
        for (key, value) in &self.fields {
            match value {
                Value::String(s) => record.insert(key.as_str(), RecordValue::Text(s.clone())),
                Value::Object(map) if map.contains_key("name") => record.insert(
                    format!("{key}.name"),
                    RecordValue::from_field(&map["name"]),
                ),
                Value::Object(map) if map.contains_key("id") => record.insert(
                    format!("{key}.id"),
                    RecordValue::from_field(&map["id"]),
                ),
                other => record.insert(key.as_str(), RecordValue::json_text(other)),
            }
        }
        record
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn sample() -> Issue {
        Issue::from_raw(json!({
            "id": "10042",
            "key": "ABC-7",
            "fields": {
                "summary": "Login page times out",
                "issuetype": {"name": "Bug", "id": "1"},
                "project": {"id": "10000", "key": "ABC"},
                "customfield_100": {"foo": "bar"},
                "labels": ["auth", "web"],
                "votes": 3,
                "flagged": false,
                "assignee": null,
                "components": [{"name": "frontend"}, {"name": "backend"}],
                "created": "2019-05-08T10:41:23.000+0900"
            }
        }))
        .unwrap()
    }

    #[test]
    fn construction_requires_fields_entry() {
        let err = Issue::from_raw(json!({"key": "ABC-1"})).unwrap_err();
        assert!(matches!(err, TrackerError::MissingFields));

        let err = Issue::from_raw(json!("not an issue")).unwrap_err();
        assert!(matches!(err, TrackerError::MissingFields));
    }

    #[test]
    fn construction_rejects_non_mapping_fields() {
        let err = Issue::from_raw(json!({"fields": [1, 2]})).unwrap_err();
        assert!(matches!(err, TrackerError::MalformedFields { found: "array" }));
    }

    #[test]
    fn empty_fields_mapping_is_valid() {
        let issue = Issue::from_raw(json!({"fields": {}})).unwrap();
        assert!(issue.to_record().is_empty());
        assert!(issue.key().is_none());
    }

    #[test]
    fn metadata_is_kept_outside_the_field_view() {
        let issue = sample();
        assert_eq!(issue.key().map(IssueKey::as_str), Some("ABC-7"));
        assert_eq!(issue.id(), Some("10042"));
        assert!(issue.get("key").is_none());
    }

    #[test]
    fn get_walks_nested_mappings() {
        let issue = sample();
        assert_eq!(issue.get("issuetype.name"), Some(RecordValue::from("Bug")));
        assert_eq!(issue.get("project.key"), Some(RecordValue::from("ABC")));
        assert_eq!(issue.get("votes"), Some(RecordValue::Number(Number::from(3u64))));
        assert_eq!(issue.get("flagged"), Some(RecordValue::Bool(false)));
    }

    #[test]
    fn get_short_circuits_on_missing_steps() {
        let issue = sample();
        assert_eq!(issue.get("nonexistent"), None);
        assert_eq!(issue.get("nonexistent.deeper.still"), None);
        assert_eq!(issue.get("assignee.displayName"), None);
        assert_eq!(issue.get("summary.length"), None);
        assert_eq!(issue.get("assignee"), None);
    }

    #[test]
    fn get_renders_composites_as_json_text() {
        let issue = sample();
        assert_eq!(issue.get("labels"), Some(RecordValue::from(r#"["auth","web"]"#)));
        assert_eq!(
            issue.get("customfield_100"),
            Some(RecordValue::from(r#"{"foo":"bar"}"#))
        );
    }

    #[test]
    fn get_indexes_sequences_by_position() {
        let issue = sample();
        assert_eq!(issue.get("components.1.name"), Some(RecordValue::from("backend")));
        assert_eq!(issue.get("components.9.name"), None);
        assert_eq!(issue.get("components.first"), None);
    }

    #[test]
    fn to_record_emits_one_entry_per_field() {
        let issue = sample();
        let record = issue.to_record();
        assert_eq!(record.len(), issue.fields().len());
    }

    #[test]
    fn to_record_prefers_name_over_id() {
        let record = sample().to_record();
        assert_eq!(record.get("issuetype.name"), Some(&RecordValue::from("Bug")));
        assert!(!record.contains_key("issuetype.id"));
        assert!(!record.contains_key("issuetype"));
    }

    #[test]
    fn to_record_falls_back_to_id() {
        let record = sample().to_record();
        assert_eq!(record.get("project.id"), Some(&RecordValue::from("10000")));
    }

    #[test]
    fn to_record_serialises_other_values_as_json_text() {
        let record = sample().to_record();
        assert_eq!(record.get("summary"), Some(&RecordValue::from("Login page times out")));
        assert_eq!(record.get("customfield_100"), Some(&RecordValue::from(r#"{"foo":"bar"}"#)));
        assert_eq!(record.get("labels"), Some(&RecordValue::from(r#"["auth","web"]"#)));
        assert_eq!(record.get("votes"), Some(&RecordValue::from("3")));
        assert_eq!(record.get("flagged"), Some(&RecordValue::from("false")));
        assert_eq!(record.get("assignee"), Some(&RecordValue::from("null")));
    }

    #[test]
    fn to_record_keeps_field_order() {
        let record = sample().to_record();
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(
            keys,
            vec![
                "summary",
                "issuetype.name",
                "project.id",
                "customfield_100",
                "labels",
                "votes",
                "flagged",
                "assignee",
                "components",
                "created",
            ]
        );
    }

    #[test]
    fn records_serialise_as_flat_json_objects() {
        let issue = Issue::from_raw(json!({
            "fields": {"summary": "x", "status": {"name": "Open"}, "points": 2.5}
        }))
        .unwrap();
        let encoded = serde_json::to_string(&issue.to_record()).unwrap();
        assert_eq!(encoded, r#"{"summary":"x","status.name":"Open","points":"2.5"}"#);
    }

    #[test]
    fn name_values_that_are_null_stay_null() {
        let issue = Issue::from_raw(json!({"fields": {"resolution": {"name": null}}})).unwrap();
        let record = issue.to_record();
        assert_eq!(record.get("resolution.name"), Some(&RecordValue::Null));
    }

    #[test]
    fn timestamps_parse_tracker_layout_and_rfc3339() {
        let issue = Issue::from_raw(json!({
            "fields": {
                "created": "2019-05-08T10:41:23.000+0900",
                "updated": "2019-05-08T01:41:23Z",
                "summary": "not a date",
                "votes": 1
            }
        }))
        .unwrap();
        let expected = Utc.with_ymd_and_hms(2019, 5, 8, 1, 41, 23).unwrap();
        assert_eq!(issue.timestamp("created"), Some(expected));
        assert_eq!(issue.timestamp("updated"), Some(expected));
        assert_eq!(issue.timestamp("summary"), None);
        assert_eq!(issue.timestamp("votes"), None);
        assert_eq!(issue.timestamp("missing"), None);
    }

    #[test]
    fn colliding_flattened_keys_collapse_into_one_entry() {
        let issue = Issue::from_raw(json!({
            "fields": {"status": {"name": "a"}, "status.name": "b", "summary": "s"}
        }))
        .unwrap();
        let record = issue.to_record();
        assert_eq!(issue.fields().len(), 3);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("status.name"), Some(&RecordValue::from("b")));
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["status.name", "summary"]);
    }

    fn typed() -> Issue {
        Issue::from_raw(json!({
            "fields": {
                "votes": 3,
                "points": 2.75,
                "estimate": "42",
                "ratio": "0.5",
                "flagged": true,
                "blocked": "FALSE",
                "summary": "not a number",
                "labels": ["auth", "web"],
                "components": [{"name": "frontend"}, 7],
                "status": {"name": "Open"},
                "assignee": null
            }
        }))
        .unwrap()
    }

    #[test]
    fn long_accepts_numbers_and_integer_text() {
        let issue = typed();
        assert_eq!(issue.long("votes"), Some(3));
        assert_eq!(issue.long("points"), Some(2));
        assert_eq!(issue.long("estimate"), Some(42));
        assert_eq!(issue.long("ratio"), None);
        assert_eq!(issue.long("flagged"), None);
        assert_eq!(issue.long("status"), None);
        assert_eq!(issue.long("assignee"), None);
        assert_eq!(issue.long("missing"), None);
    }

    #[test]
    fn double_accepts_numbers_and_numeric_text() {
        let issue = typed();
        assert_eq!(issue.double("points"), Some(2.75));
        assert_eq!(issue.double("votes"), Some(3.0));
        assert_eq!(issue.double("ratio"), Some(0.5));
        assert_eq!(issue.double("summary"), None);
        assert_eq!(issue.double("labels"), None);
    }

    #[test]
    fn boolean_accepts_booleans_and_boolean_text() {
        let issue = typed();
        assert_eq!(issue.boolean("flagged"), Some(true));
        assert_eq!(issue.boolean("blocked"), Some(false));
        assert_eq!(issue.boolean("summary"), None);
        assert_eq!(issue.boolean("votes"), None);
        assert_eq!(issue.boolean("assignee"), None);
    }

    #[test]
    fn json_keeps_only_composites() {
        let issue = typed();
        assert_eq!(issue.json("status"), Some(&json!({"name": "Open"})));
        assert_eq!(issue.json("labels"), Some(&json!(["auth", "web"])));
        assert_eq!(issue.json("summary"), None);
        assert_eq!(issue.json("votes"), None);
        assert_eq!(issue.json("assignee"), None);
    }

    #[test]
    fn text_joins_sequence_items_with_commas() {
        let issue = typed();
        assert_eq!(issue.text("labels").as_deref(), Some("auth,web"));
        assert_eq!(
            issue.text("components").as_deref(),
            Some(r#"{"name":"frontend"},7"#)
        );
        assert_eq!(issue.text("summary").as_deref(), Some("not a number"));
        assert_eq!(issue.text("votes").as_deref(), Some("3"));
        assert_eq!(issue.text("status").as_deref(), Some(r#"{"name":"Open"}"#));
        assert_eq!(issue.text("assignee"), None);
        assert_eq!(issue.text("missing"), None);
    }
}
