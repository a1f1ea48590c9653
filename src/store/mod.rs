//! Content store access.
//!
//! Every read goes through [`ContentStore::fetch`] with a [`Query`]
//! descriptor. A query carries the GROQ text sent to Sanity together with a
//! structural description of the same request (document type, singleton or
//! list, ordering, parameter bindings) so that [`FixtureStore`] can answer it
//! from a local JSON file without a GROQ engine.
//!
//! ```text
//! queries::fetch_all ──► ContentStore::fetch(&Query, Perspective)
//!                          ├── SanityStore   (HTTP query API)
//!                          └── FixtureStore  (JSON document array)
//! ```
//!
//! Stores return raw JSON; [`queries`] turns it into typed records and
//! normalizes "nothing there" to `None` or an empty list.

pub mod fixture;
pub mod queries;
pub mod sanity;

pub use fixture::FixtureStore;
pub use sanity::SanityStore;

use crate::config::SiteConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("draft content requires SANITY_API_READ_TOKEN")]
    MissingToken,
}

/// Which document set a read sees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    #[default]
    Published,
    /// Published documents with unpublished drafts layered on top.
    Drafts,
}

impl Perspective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Perspective::Published => "published",
            Perspective::Drafts => "drafts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    None,
    /// `order(startDate desc)`
    StartDateDesc,
    /// `order(order asc)`
    OrderAsc,
}

/// A read-only query.
///
/// Each `(name, value)` in `params` binds `$name` in the GROQ text and, for
/// the fixture store, requires the document field `name` to equal `value`.
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    pub doc_type: &'a str,
    pub groq: &'a str,
    /// `[0]` slice: the result is one document or `null`.
    pub singleton: bool,
    pub order: Order,
    pub params: &'a [(&'a str, &'a str)],
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Run `query` and return the raw `result` value.
    async fn fetch(
        &self,
        query: &Query<'_>,
        perspective: Perspective,
    ) -> Result<serde_json::Value, StoreError>;

    /// Human-readable source, for logs and CLI output.
    fn describe(&self) -> String;
}

/// Build the store the config asks for.
///
/// A configured fixture wins over a Sanity project; its path is relative to
/// `config_dir`.
pub fn open_store(
    config: &SiteConfig,
    config_dir: &Path,
    token: Option<String>,
) -> Result<Arc<dyn ContentStore>, StoreError> {
    match config.fixture_path(config_dir) {
        Some(path) => Ok(Arc::new(FixtureStore::load(&path)?)),
        None => Ok(Arc::new(SanityStore::new(&config.store, token)?)),
    }
}
