//! Grouping of store rows into remote read time series.
//!
//! Rows sharing a series key are collapsed into one [`TimeSeries`]; their
//! samples are appended in the order the rows arrived. See [`SeriesIdentity`]
//! for how the key is derived.

use std::collections::HashMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Row;
use crate::proto::{Label, Sample, TimeSeries};

/// How rows are assigned to series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesIdentity {
    /// Key on the sorted label values only. Rows whose label names differ but
    /// whose values are the same collapse into one series.
    #[default]
    LabelValues,
    /// Key on the sorted `name=value` pairs.
    LabelPairs,
}

/// What to do with a row whose timestamp is not RFC 3339.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// Fail the whole request with [`Error::InvalidTimestamp`].
    #[default]
    Strict,
    /// Keep the sample at epoch 0 and log a warning.
    Lenient,
}

/// Options controlling [`group_rows`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupingOptions {
    pub identity: SeriesIdentity,
    pub timestamp_policy: TimestampPolicy,
}

/// Identity of the series a row belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeriesKey {
    /// Sorted label values joined by `,`.
    Values(String),
    /// Label pairs in name order. Kept structured so no separator can be
    /// forged by a label value.
    Pairs(Vec<(String, String)>),
}

/// Compute the series key of a row.
pub fn series_key(row: &Row, identity: SeriesIdentity) -> SeriesKey {
    match identity {
        SeriesIdentity::LabelValues => {
            let mut values: Vec<&str> = row.labels.values().map(String::as_str).collect();
            values.sort_unstable();
            SeriesKey::Values(values.join(","))
        }
        SeriesIdentity::LabelPairs => SeriesKey::Pairs(
            row.labels
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        ),
    }
}

/// Parse an RFC 3339 timestamp into milliseconds since the Unix epoch.
pub fn parse_timestamp_millis(timestamp: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.timestamp_millis())
        .map_err(|e| Error::InvalidTimestamp {
            timestamp: timestamp.to_string(),
            reason: e.to_string(),
        })
}

fn sample_timestamp(row: &Row, policy: TimestampPolicy) -> Result<i64> {
    match (parse_timestamp_millis(&row.timestamp), policy) {
        (Ok(millis), _) => Ok(millis),
        (Err(err), TimestampPolicy::Strict) => Err(err),
        (Err(err), TimestampPolicy::Lenient) => {
            tracing::warn!("{}, using epoch", err);
            Ok(0)
        }
    }
}

/// Group rows into time series.
///
/// The label set of a series is taken from the first row that creates it.
/// Series are returned in first-seen order, but callers must not depend on
/// it. Zero rows yield zero series.
pub fn group_rows(rows: Vec<Row>, options: GroupingOptions) -> Result<Vec<TimeSeries>> {
    let mut index: HashMap<SeriesKey, usize> = HashMap::new();
    let mut series: Vec<TimeSeries> = Vec::new();

    for row in rows {
        let timestamp = sample_timestamp(&row, options.timestamp_policy)?;
        let key = series_key(&row, options.identity);

        let slot = *index.entry(key).or_insert_with(|| {
            series.push(TimeSeries {
                labels: row
                    .labels
                    .iter()
                    .map(|(name, value)| Label::new(name.as_str(), value.as_str()))
                    .collect(),
                samples: Vec::new(),
            });
            series.len() - 1
        });

        series[slot].samples.push(Sample {
            value: row.value,
            timestamp,
        });
    }

    Ok(series)
}
