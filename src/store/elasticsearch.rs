use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{ElasticsearchStoreConfig, SeriesStore};
use crate::error::{Error, Result};
use crate::model::{Row, TIMESTAMP_FIELD};
use crate::proto::{MatchType, Query};

/// A store that runs queries as Elasticsearch searches.
///
/// Each document's `_source` is one row: a numeric `value`, a timestamp
/// string and string labels. The configured timestamp field is renamed to
/// `timestamp` before the document is validated.
pub struct ElasticsearchStore {
    client: reqwest::Client,
    config: ElasticsearchStoreConfig,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    total: Option<TotalHits>,
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct TotalHits {
    value: u64,
}

impl Hits {
    /// True when the cluster matched more documents than it returned.
    fn is_truncated(&self) -> bool {
        self.total
            .as_ref()
            .is_some_and(|total| total.value > self.hits.len() as u64)
    }
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Map<String, Value>,
}

impl ElasticsearchStore {
    pub fn new(config: ElasticsearchStoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::InvalidInput(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn search_url(&self) -> String {
        format!(
            "{}/{}/_search",
            self.config.url.trim_end_matches('/'),
            self.config.index
        )
    }

    /// Translate a remote read query into a search body.
    pub(crate) fn search_body(&self, query: &Query) -> Value {
        let mut filter = vec![json!({
            "range": {
                self.config.timestamp_field.as_str(): {
                    "gte": query.start_timestamp_ms,
                    "lte": query.end_timestamp_ms,
                    "format": "epoch_millis"
                }
            }
        })];
        let mut must_not = Vec::new();

        for matcher in &query.matchers {
            let name = matcher.name.as_str();
            let value = matcher.value.as_str();
            match matcher.r#type() {
                // An empty value selects documents without the label.
                MatchType::Eq if value.is_empty() => {
                    must_not.push(json!({"exists": {"field": name}}))
                }
                MatchType::Neq if value.is_empty() => {
                    filter.push(json!({"exists": {"field": name}}))
                }
                MatchType::Eq => filter.push(json!({"term": {name: value}})),
                MatchType::Neq => must_not.push(json!({"term": {name: value}})),
                MatchType::Re => filter.push(json!({"regexp": {name: value}})),
                MatchType::Nre => must_not.push(json!({"regexp": {name: value}})),
            }
        }

        json!({
            "size": self.config.max_hits,
            "query": {
                "bool": {
                    "filter": filter,
                    "must_not": must_not
                }
            },
            "sort": [{ self.config.timestamp_field.as_str(): "asc" }]
        })
    }

    fn to_row(&self, mut source: Map<String, Value>) -> Result<Row> {
        if self.config.timestamp_field != TIMESTAMP_FIELD
            && let Some(ts) = source.remove(&self.config.timestamp_field)
        {
            source.insert(TIMESTAMP_FIELD.to_string(), ts);
        }
        Row::from_fields(source)
    }
}

#[async_trait]
impl SeriesStore for ElasticsearchStore {
    #[tracing::instrument(level = "debug", skip_all, fields(index = %self.config.index))]
    async fn read(&self, query: &Query) -> Result<Vec<Row>> {
        let response = self
            .client
            .post(self.search_url())
            .json(&self.search_body(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "search returned {}: {}",
                status, body
            )));
        }

        let search: SearchResponse = response.json().await?;
        tracing::debug!("Search returned {} hits", search.hits.hits.len());
        if search.hits.is_truncated() {
            tracing::warn!(
                "Search matched more documents than max_hits ({}), result is truncated",
                self.config.max_hits
            );
        }

        search
            .hits
            .hits
            .into_iter()
            .map(|hit| self.to_row(hit.source))
            .collect()
    }
}
