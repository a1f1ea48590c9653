//! Sanity HTTP query API client.
//!
//! `GET https://{project}.api.sanity.io/v{version}/data/query/{dataset}`
//! with the GROQ text in `query`, each parameter as `$name=<json>` and the
//! perspective in `perspective`. Published reads go through
//! `apicdn.sanity.io` when the CDN is enabled; draft reads never do, and
//! require a read token.

use super::{ContentStore, Perspective, Query, StoreError};
use crate::config::StoreConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Best-effort message from an error response body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error.description.or(b.error.message))
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Clone)]
pub struct SanityStore {
    client: Client,
    project_id: String,
    dataset: String,
    api_version: String,
    use_cdn: bool,
    token: Option<String>,
}

impl SanityStore {
    pub fn new(config: &StoreConfig, token: Option<String>) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            project_id: config.project_id.trim().to_string(),
            dataset: config.dataset.trim().to_string(),
            api_version: config.api_version.trim().trim_start_matches('v').to_string(),
            use_cdn: config.use_cdn,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn endpoint(&self, perspective: Perspective) -> String {
        let host = if self.use_cdn && perspective == Perspective::Published {
            "apicdn"
        } else {
            "api"
        };
        format!(
            "https://{}.{}.sanity.io/v{}/data/query/{}",
            self.project_id, host, self.api_version, self.dataset
        )
    }

    fn query_pairs(
        query: &Query<'_>,
        perspective: Perspective,
    ) -> Result<Vec<(String, String)>, StoreError> {
        let mut pairs = vec![
            ("query".to_string(), query.groq.to_string()),
            ("perspective".to_string(), perspective.as_str().to_string()),
        ];
        for (name, value) in query.params {
            pairs.push((format!("${name}"), serde_json::to_string(value)?));
        }
        Ok(pairs)
    }
}

#[async_trait]
impl ContentStore for SanityStore {
    async fn fetch(
        &self,
        query: &Query<'_>,
        perspective: Perspective,
    ) -> Result<serde_json::Value, StoreError> {
        if perspective == Perspective::Drafts && self.token.is_none() {
            return Err(StoreError::MissingToken);
        }

        let started = Instant::now();
        let mut request = self
            .client
            .get(self.endpoint(perspective))
            .query(&Self::query_pairs(query, perspective)?);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body: QueryResponse = response.json().await?;
        debug!(
            doc_type = query.doc_type,
            perspective = perspective.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sanity query"
        );
        Ok(body.result)
    }

    fn describe(&self) -> String {
        format!("sanity {}/{}", self.project_id, self.dataset)
    }
}
