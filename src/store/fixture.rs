//! Local JSON content store.
//!
//! A fixture is a JSON array of documents already in projected shape (asset
//! references as `{ "asset": { "url": … } }`). Documents whose `_id` starts
//! with `drafts.` are unpublished edits: hidden from published reads, and
//! layered over the document they shadow under the drafts perspective.

use super::{ContentStore, Order, Perspective, Query, StoreError};
use crate::dates::cmp_start_desc;
use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

const DRAFT_PREFIX: &str = "drafts.";

fn id_of(doc: &Value) -> &str {
    doc.get("_id").and_then(Value::as_str).unwrap_or("")
}

fn str_field<'a>(doc: &'a Value, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str)
}

#[derive(Debug, Clone)]
pub struct FixtureStore {
    source: Option<PathBuf>,
    documents: Vec<Value>,
}

impl FixtureStore {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(path)?;
        let documents: Vec<Value> = serde_json::from_str(&text)?;
        Ok(Self {
            source: Some(path.to_path_buf()),
            documents,
        })
    }

    pub fn from_documents(documents: Vec<Value>) -> Self {
        Self {
            source: None,
            documents,
        }
    }

    /// Documents visible under `perspective`, drafts already applied.
    fn visible(&self, perspective: Perspective) -> Vec<Value> {
        let (drafts, published): (Vec<&Value>, Vec<&Value>) = self
            .documents
            .iter()
            .partition(|doc| id_of(doc).starts_with(DRAFT_PREFIX));
        let mut out: Vec<Value> = published.into_iter().cloned().collect();

        if perspective == Perspective::Drafts {
            for draft in drafts {
                let base = id_of(draft).trim_start_matches(DRAFT_PREFIX).to_string();
                let mut doc = draft.clone();
                doc["_id"] = Value::String(base.clone());
                match out.iter().position(|d| id_of(d) == base) {
                    Some(pos) => out[pos] = doc,
                    None => out.push(doc),
                }
            }
        }
        out
    }

    fn matches(doc: &Value, query: &Query<'_>) -> bool {
        str_field(doc, "_type") == Some(query.doc_type)
            && query
                .params
                .iter()
                .all(|(name, value)| str_field(doc, name) == Some(*value))
    }
}

fn sort(docs: &mut [Value], order: Order) {
    match order {
        Order::None => {}
        Order::StartDateDesc => docs.sort_by(|a, b| {
            cmp_start_desc(str_field(a, "startDate"), str_field(b, "startDate"))
        }),
        Order::OrderAsc => docs.sort_by(|a, b| {
            let key = |d: &Value| d.get("order").and_then(Value::as_f64).unwrap_or(f64::MAX);
            key(a).total_cmp(&key(b))
        }),
    }
}

#[async_trait]
impl ContentStore for FixtureStore {
    async fn fetch(&self, query: &Query<'_>, perspective: Perspective) -> Result<Value, StoreError> {
        let mut docs: Vec<Value> = self
            .visible(perspective)
            .into_iter()
            .filter(|doc| Self::matches(doc, query))
            .collect();
        sort(&mut docs, query.order);

        if query.singleton {
            Ok(docs.into_iter().next().unwrap_or(Value::Null))
        } else {
            Ok(Value::Array(docs))
        }
    }

    fn describe(&self) -> String {
        match &self.source {
            Some(path) => format!("fixture {}", path.display()),
            None => "fixture (in memory)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn query(doc_type: &'static str, singleton: bool, order: Order) -> Query<'static> {
        Query {
            doc_type,
            groq: "",
            singleton,
            order,
            params: &[],
        }
    }

    fn store() -> FixtureStore {
        FixtureStore::from_documents(vec![
            json!({ "_id": "w1", "_type": "workExperience", "company": "Old", "startDate": "2018-01-01" }),
            json!({ "_id": "w2", "_type": "workExperience", "company": "New", "startDate": "2022-01-01" }),
            json!({ "_id": "w3", "_type": "workExperience", "company": "Undated" }),
            json!({ "_id": "drafts.w1", "_type": "workExperience", "company": "Old (edited)", "startDate": "2018-01-01" }),
            json!({ "_id": "drafts.w9", "_type": "workExperience", "company": "Unpublished", "startDate": "2024-01-01" }),
            json!({ "_id": "a", "_type": "author", "name": "Ada" }),
        ])
    }

    fn companies(value: &Value) -> Vec<&str> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["company"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn published_hides_drafts_and_sorts() {
        let result = store()
            .fetch(&query("workExperience", false, Order::StartDateDesc), Perspective::Published)
            .await
            .unwrap();
        assert_eq!(companies(&result), vec!["New", "Old", "Undated"]);
    }

    #[tokio::test]
    async fn drafts_overlay_published() {
        let result = store()
            .fetch(&query("workExperience", false, Order::StartDateDesc), Perspective::Drafts)
            .await
            .unwrap();
        assert_eq!(
            companies(&result),
            vec!["Unpublished", "New", "Old (edited)", "Undated"]
        );
        // Overlaid drafts answer under the published id
        assert!(result.as_array().unwrap().iter().all(|d| !id_of(d).starts_with("drafts.")));
    }

    #[tokio::test]
    async fn singleton_returns_first_or_null() {
        let s = store();
        let author = s
            .fetch(&query("author", true, Order::None), Perspective::Published)
            .await
            .unwrap();
        assert_eq!(author["name"], "Ada");

        let missing = s
            .fetch(&query("education", true, Order::None), Perspective::Published)
            .await
            .unwrap();
        assert!(missing.is_null());
    }

    #[tokio::test]
    async fn params_filter_documents() {
        let s = FixtureStore::from_documents(vec![
            json!({ "_id": "s1", "_type": "sanity.previewUrlSecret", "secret": "abc" }),
            json!({ "_id": "s2", "_type": "sanity.previewUrlSecret", "secret": "xyz" }),
        ]);
        let q = Query {
            doc_type: "sanity.previewUrlSecret",
            groq: "",
            singleton: true,
            order: Order::None,
            params: &[("secret", "xyz")],
        };
        let doc = s.fetch(&q, Perspective::Drafts).await.unwrap();
        assert_eq!(doc["_id"], "s2");
    }

    #[tokio::test]
    async fn order_asc_puts_missing_last() {
        let s = FixtureStore::from_documents(vec![
            json!({ "_id": "a", "_type": "skill", "name": "A" }),
            json!({ "_id": "b", "_type": "skill", "name": "B", "order": 2 }),
            json!({ "_id": "c", "_type": "skill", "name": "C", "order": 1 }),
        ]);
        let result = s
            .fetch(&query("skill", false, Order::OrderAsc), Perspective::Published)
            .await
            .unwrap();
        let names: Vec<&str> = result
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn load_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("content.json");
        fs::write(&path, r#"[{"_id":"a","_type":"author"}]"#).unwrap();
        let s = FixtureStore::load(&path).unwrap();
        assert!(s.describe().contains("content.json"));
    }

    #[test]
    fn load_rejects_non_array() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("content.json");
        fs::write(&path, r#"{"_id":"a"}"#).unwrap();
        assert!(matches!(FixtureStore::load(&path), Err(StoreError::Json(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = FixtureStore::load(Path::new("/nonexistent/content.json"));
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
