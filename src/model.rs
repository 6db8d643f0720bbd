//! Core data types for the remote read pipeline.
//!
//! A [`Row`] is the unit a store hands back for a query: one sample plus the
//! labels of the series it belongs to. Rows are validated when they are built
//! from a store's native records, so the pipeline never has to second-guess
//! field types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Reserved field carrying the sample value.
pub const VALUE_FIELD: &str = "value";

/// Reserved field carrying the sample timestamp.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// One flat record returned by a store for a matching data point.
///
/// Every field other than `value` and `timestamp` is a label. Labels are kept
/// ordered by name.
///
/// # Example
///
/// ```ignore
/// let row = Row::new(1.0, "2024-01-01T00:00:00Z")
///     .with_label("__name__", "up")
///     .with_label("host", "a");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Sample value.
    pub value: f64,
    /// RFC 3339 timestamp of the sample.
    pub timestamp: String,
    /// Label name to label value.
    #[serde(flatten)]
    pub labels: BTreeMap<String, String>,
}

impl Row {
    pub fn new(value: f64, timestamp: impl Into<String>) -> Self {
        Self {
            value,
            timestamp: timestamp.into(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }

    /// Returns the value of a label, if present.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }

    /// Build a row from a loosely typed document.
    ///
    /// `value` must be a number, `timestamp` a string, and every other field a
    /// string label value. Anything else is rejected with [`Error::InvalidRow`].
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self> {
        let mut value = None;
        let mut timestamp = None;
        let mut labels = BTreeMap::new();

        for (name, field) in fields {
            match name.as_str() {
                VALUE_FIELD => {
                    let v = field.as_f64().ok_or_else(|| {
                        Error::InvalidRow(format!("field `value` must be a number, got {}", field))
                    })?;
                    value = Some(v);
                }
                TIMESTAMP_FIELD => match field {
                    Value::String(ts) => timestamp = Some(ts),
                    other => {
                        return Err(Error::InvalidRow(format!(
                            "field `timestamp` must be a string, got {}",
                            other
                        )));
                    }
                },
                _ => match field {
                    Value::String(label_value) => {
                        labels.insert(name, label_value);
                    }
                    other => {
                        return Err(Error::InvalidRow(format!(
                            "label `{}` must be a string, got {}",
                            name, other
                        )));
                    }
                },
            }
        }

        let value = value.ok_or_else(|| Error::InvalidRow("missing field `value`".into()))?;
        let timestamp =
            timestamp.ok_or_else(|| Error::InvalidRow("missing field `timestamp`".into()))?;

        Ok(Self {
            value,
            timestamp,
            labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn should_build_row_from_well_typed_fields() {
        // given
        let doc = fields(json!({
            "__name__": "up",
            "host": "a",
            "value": 1.0,
            "timestamp": "2024-01-01T00:00:00Z"
        }));

        // when
        let row = Row::from_fields(doc).unwrap();

        // then
        assert_eq!(row.value, 1.0);
        assert_eq!(row.timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(row.label("host"), Some("a"));
        assert_eq!(row.label("__name__"), Some("up"));
        assert_eq!(row.labels.len(), 2);
    }

    #[test]
    fn should_accept_integer_values() {
        // given
        let doc = fields(json!({"value": 3, "timestamp": "2024-01-01T00:00:00Z"}));

        // when
        let row = Row::from_fields(doc).unwrap();

        // then
        assert_eq!(row.value, 3.0);
        assert!(row.labels.is_empty());
    }

    #[test]
    fn should_reject_non_numeric_value() {
        // given
        let doc = fields(json!({"value": "1.0", "timestamp": "2024-01-01T00:00:00Z"}));

        // when
        let result = Row::from_fields(doc);

        // then
        assert!(matches!(result, Err(Error::InvalidRow(msg)) if msg.contains("`value`")));
    }

    #[test]
    fn should_reject_non_string_label() {
        // given
        let doc = fields(json!({
            "value": 1.0,
            "timestamp": "2024-01-01T00:00:00Z",
            "port": 8080
        }));

        // when
        let result = Row::from_fields(doc);

        // then
        assert!(matches!(result, Err(Error::InvalidRow(msg)) if msg.contains("`port`")));
    }

    #[test]
    fn should_reject_missing_timestamp() {
        // given
        let doc = fields(json!({"value": 1.0, "host": "a"}));

        // when
        let result = Row::from_fields(doc);

        // then
        assert_eq!(
            result,
            Err(Error::InvalidRow("missing field `timestamp`".into()))
        );
    }

    #[test]
    fn should_deserialize_row_with_flattened_labels() {
        // given
        let yaml = r#"
value: 2.5
timestamp: "2024-01-01T00:01:00Z"
host: b
job: node
"#;

        // when
        let row: Row = serde_yaml::from_str(yaml).unwrap();

        // then
        assert_eq!(row.value, 2.5);
        assert_eq!(row.label("host"), Some("b"));
        assert_eq!(row.label("job"), Some("node"));
        assert!(row.label("value").is_none());
    }
}
