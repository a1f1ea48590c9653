//! The five entity reads and the joined snapshot.
//!
//! Each function issues exactly one read. A `null` result is "nothing
//! there", never an error: the author becomes `None` and lists become empty.
//! Lists with a start date are re-sorted after fetching (stable, newest
//! first, undated last) so ordering holds whichever store answered.

use super::{ContentStore, Order, Perspective, Query, StoreError};
use crate::dates::sort_by_start_desc;
use crate::types::{Author, Education, Project, Skill, Snapshot, WorkExperience};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::info;

pub const AUTHOR_QUERY: Query<'static> = Query {
    doc_type: "author",
    singleton: true,
    order: Order::None,
    params: &[],
    groq: r#"*[_type == "author"][0] {
  _id,
  name,
  initials,
  avatar { asset-> { url } },
  description,
  summary,
  location,
  resume { asset-> { url } },
  skills,
  social { github, linkedin, twitter, youtube, email }
}"#,
};

pub const WORK_QUERY: Query<'static> = Query {
    doc_type: "workExperience",
    singleton: false,
    order: Order::StartDateDesc,
    params: &[],
    groq: r#"*[_type == "workExperience"] | order(startDate desc) {
  _id,
  company,
  title,
  logo { asset-> { url } },
  location,
  startDate,
  endDate,
  description,
  url,
  achievements[] { name, icon { asset-> { url } } },
  "skills": skills[]-> { name }
}"#,
};

pub const EDUCATION_QUERY: Query<'static> = Query {
    doc_type: "education",
    singleton: false,
    order: Order::StartDateDesc,
    params: &[],
    groq: r#"*[_type == "education"] | order(startDate desc) {
  _id,
  school,
  degree,
  logo { asset-> { url } },
  startDate,
  endDate,
  url
}"#,
};

pub const PROJECTS_QUERY: Query<'static> = Query {
    doc_type: "project",
    singleton: false,
    order: Order::StartDateDesc,
    params: &[],
    groq: r#"*[_type == "project"] | order(startDate desc) {
  _id,
  title,
  description,
  startDate,
  endDate,
  technologies,
  image { asset-> { url } },
  video,
  role,
  responsibilities,
  outcome,
  teamSize,
  projectType,
  status,
  client,
  links[] { title, url, type }
}"#,
};

pub const SKILLS_QUERY: Query<'static> = Query {
    doc_type: "skill",
    singleton: false,
    order: Order::OrderAsc,
    params: &[],
    groq: r#"*[_type == "skill"] | order(order asc) {
  _id,
  name,
  icon { asset-> { url } },
  category,
  order
}"#,
};

async fn fetch_list<T: DeserializeOwned>(
    store: &dyn ContentStore,
    query: &Query<'_>,
    perspective: Perspective,
) -> Result<Vec<T>, StoreError> {
    let value = store.fetch(query, perspective).await?;
    Ok(serde_json::from_value::<Option<Vec<T>>>(value)?.unwrap_or_default())
}

pub async fn get_author_data(
    store: &dyn ContentStore,
    perspective: Perspective,
) -> Result<Option<Author>, StoreError> {
    let value = store.fetch(&AUTHOR_QUERY, perspective).await?;
    Ok(serde_json::from_value(value)?)
}

pub async fn get_work_experience(
    store: &dyn ContentStore,
    perspective: Perspective,
) -> Result<Vec<WorkExperience>, StoreError> {
    let mut work: Vec<WorkExperience> = fetch_list(store, &WORK_QUERY, perspective).await?;
    sort_by_start_desc(&mut work, |w| w.start_date.as_deref());
    Ok(work)
}

pub async fn get_education(
    store: &dyn ContentStore,
    perspective: Perspective,
) -> Result<Vec<Education>, StoreError> {
    let mut education: Vec<Education> = fetch_list(store, &EDUCATION_QUERY, perspective).await?;
    sort_by_start_desc(&mut education, |e| e.start_date.as_deref());
    Ok(education)
}

pub async fn get_projects(
    store: &dyn ContentStore,
    perspective: Perspective,
) -> Result<Vec<Project>, StoreError> {
    let mut projects: Vec<Project> = fetch_list(store, &PROJECTS_QUERY, perspective).await?;
    sort_by_start_desc(&mut projects, |p| p.start_date.as_deref());
    Ok(projects)
}

/// Skills keep the store's order; the layout sorts within each category.
pub async fn get_skills(
    store: &dyn ContentStore,
    perspective: Perspective,
) -> Result<Vec<Skill>, StoreError> {
    fetch_list(store, &SKILLS_QUERY, perspective).await
}

/// All five reads, concurrently. Any failure fails the snapshot.
pub async fn fetch_all(
    store: &dyn ContentStore,
    perspective: Perspective,
) -> Result<Snapshot, StoreError> {
    let started = Instant::now();
    let (author, work, education, projects, skills) = tokio::try_join!(
        get_author_data(store, perspective),
        get_work_experience(store, perspective),
        get_education(store, perspective),
        get_projects(store, perspective),
        get_skills(store, perspective),
    )?;
    info!(
        source = %store.describe(),
        perspective = perspective.as_str(),
        work = work.len(),
        education = education.len(),
        projects = projects.len(),
        skills = skills.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "fetched content"
    );
    Ok(Snapshot {
        perspective,
        author,
        work,
        education,
        projects,
        skills,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FixtureStore;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    /// Answers every query with the same value.
    struct Constant(Value);

    #[async_trait]
    impl ContentStore for Constant {
        async fn fetch(&self, _: &Query<'_>, _: Perspective) -> Result<Value, StoreError> {
            Ok(self.0.clone())
        }
        fn describe(&self) -> String {
            "constant".into()
        }
    }

    struct Failing;

    #[async_trait]
    impl ContentStore for Failing {
        async fn fetch(&self, query: &Query<'_>, _: Perspective) -> Result<Value, StoreError> {
            if query.doc_type == "education" {
                Err(StoreError::Api {
                    status: 500,
                    message: "boom".into(),
                })
            } else {
                Ok(Value::Null)
            }
        }
        fn describe(&self) -> String {
            "failing".into()
        }
    }

    #[tokio::test]
    async fn null_results_normalize_to_empty() {
        let store = Constant(Value::Null);
        let snapshot = fetch_all(&store, Perspective::Published).await.unwrap();
        assert!(snapshot.author.is_none());
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn work_is_resorted_newest_first_and_stable() {
        // Store answers out of order; ties must keep store order
        let store = Constant(json!([
            { "_id": "a", "startDate": "2019-01-01" },
            { "_id": "b", "startDate": "2023-01-01" },
            { "_id": "c" },
            { "_id": "d", "startDate": "2019-01-01" },
        ]));
        let work = get_work_experience(&store, Perspective::Published).await.unwrap();
        let ids: Vec<&str> = work.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "d", "c"]);
    }

    #[tokio::test]
    async fn education_sorted_descending() {
        let store = Constant(json!([
            { "_id": "bsc", "startDate": "2012-09-01" },
            { "_id": "msc", "startDate": "2016-09-01" },
        ]));
        let education = get_education(&store, Perspective::Published).await.unwrap();
        assert_eq!(education[0].id, "msc");
    }

    #[tokio::test]
    async fn one_failure_fails_the_snapshot() {
        let result = fetch_all(&Failing, Perspective::Published).await;
        assert!(matches!(result, Err(StoreError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn fixture_snapshot_has_every_entity() {
        let store = FixtureStore::from_documents(vec![
            json!({ "_id": "author", "_type": "author", "name": "Ada Lovelace" }),
            json!({ "_id": "w", "_type": "workExperience", "company": "Acme", "endDate": null }),
            json!({ "_id": "e", "_type": "education", "school": "Uni" }),
            json!({ "_id": "p", "_type": "project", "title": "Engine" }),
            json!({ "_id": "s", "_type": "skill", "name": "Rust", "category": "programming" }),
        ]);
        let snapshot = fetch_all(&store, Perspective::Published).await.unwrap();
        assert_eq!(snapshot.author.unwrap().name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(snapshot.work.len(), 1);
        assert!(snapshot.work[0].end_date.is_none());
        assert_eq!(snapshot.education.len(), 1);
        assert_eq!(snapshot.projects.len(), 1);
        assert_eq!(snapshot.skills.len(), 1);
    }

    #[test]
    fn groq_text_names_the_document_type() {
        for query in [
            AUTHOR_QUERY,
            WORK_QUERY,
            EDUCATION_QUERY,
            PROJECTS_QUERY,
            SKILLS_QUERY,
        ] {
            assert!(query.groq.contains(&format!("_type == \"{}\"", query.doc_type)));
        }
    }
}
