//! Shared test utilities.
//!
//! Sample records for component and page tests, the same content as raw
//! store documents for fixture-store tests, and a loader for the checked-in
//! `fixtures/content.json`.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let config = SiteConfig::default();
//! let ctx = test_context(&config, false);
//! let html = components::hero(&sample_author(), &ctx).into_string();
//! assert!(html.contains("Hi, I'm Ada"));
//! ```

use chrono::NaiveDate;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::generate::RenderContext;
use crate::rich_text::{Block, Span, TextBlock};
use crate::store::FixtureStore;
use crate::types::{
    AssetRef, Author, Education, LinkKind, Project, ProjectLink, Skill, SkillCategory, Snapshot,
    Social, WorkExperience,
};

// =========================================================================
// Context
// =========================================================================

/// Fixed "today" so duration labels don't drift.
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

pub fn test_context(config: &SiteConfig, draft: bool) -> RenderContext<'_> {
    RenderContext {
        today: test_today(),
        ..RenderContext::new(config, draft)
    }
}

// =========================================================================
// Records
// =========================================================================

pub fn text_block(text: &str) -> Block {
    Block::Text(TextBlock {
        children: vec![Span {
            text: Some(text.into()),
            marks: vec![],
        }],
        ..Default::default()
    })
}

fn cdn(path: &str) -> AssetRef {
    AssetRef::from_url(&format!("https://cdn.sanity.io/images/test/{path}"))
}

pub fn sample_author() -> Author {
    Author {
        id: "author".into(),
        name: Some("Ada Lovelace".into()),
        initials: None,
        avatar: Some(cdn("avatar.png")),
        description: vec![text_block("Engineer and writer.")],
        summary: vec![text_block("I build analytical engines.")],
        location: Some("London".into()),
        resume: None,
        skills: vec!["Rust".into(), "Python".into()],
        social: Social {
            github: Some("https://github.com/ada".into()),
            linkedin: Some("https://linkedin.com/in/ada".into()),
            twitter: Some("https://twitter.com/ada".into()),
            youtube: None,
            email: Some("ada@example.com".into()),
        },
    }
}

pub fn sample_work(company: &str, start: &str) -> WorkExperience {
    WorkExperience {
        id: company.to_lowercase(),
        company: Some(company.into()),
        title: Some("Engineer".into()),
        start_date: Some(start.into()),
        end_date: Some("2023-06-30".into()),
        description: vec![text_block(&format!("Worked at {company}."))],
        skills: vec!["Rust".into()],
        ..Default::default()
    }
}

pub fn sample_education(school: &str, start: &str) -> Education {
    Education {
        id: school.to_lowercase(),
        school: Some(school.into()),
        degree: Some("BSc Mathematics".into()),
        start_date: Some(start.into()),
        end_date: Some("2015-06-30".into()),
        ..Default::default()
    }
}

pub fn sample_project(title: &str) -> Project {
    Project {
        id: title.to_lowercase(),
        title: Some(title.into()),
        description: vec![text_block(&format!("{title} does things."))],
        start_date: Some("2023-01-10".into()),
        technologies: vec!["Rust".into(), "maud".into()],
        image: Some(cdn(&format!("{}.png", title.to_lowercase()))),
        links: vec![ProjectLink {
            title: None,
            url: Some(format!("https://github.com/ada/{}", title.to_lowercase())),
            kind: LinkKind::Source,
        }],
        ..Default::default()
    }
}

pub fn sample_skill(name: &str, category: SkillCategory) -> Skill {
    Skill {
        id: name.to_lowercase(),
        name: name.into(),
        icon: None,
        category,
        order: None,
    }
}

pub fn sample_snapshot() -> Snapshot {
    Snapshot {
        author: Some(sample_author()),
        work: vec![
            sample_work("Acme", "2021-02-01"),
            sample_work("Globex", "2018-09-01"),
        ],
        education: vec![sample_education("Uni", "2012-09-01")],
        projects: vec![sample_project("Engine"), sample_project("Loom")],
        skills: vec![
            sample_skill("Rust", SkillCategory::Programming),
            sample_skill("Python", SkillCategory::Programming),
            sample_skill("PyTorch", SkillCategory::Ml),
        ],
        ..Default::default()
    }
}

// =========================================================================
// Store documents
// =========================================================================

/// Projected store documents equivalent to a small site.
pub fn sample_documents() -> Vec<Value> {
    vec![
        json!({
            "_id": "author",
            "_type": "author",
            "name": "Ada Lovelace",
            "description": [{ "_type": "block", "children": [{ "_type": "span", "text": "Engineer." }] }],
            "summary": null,
            "skills": null,
            "social": { "github": "https://github.com/ada" },
        }),
        json!({ "_id": "w1", "_type": "workExperience", "company": "Acme", "startDate": "2021-02-01", "endDate": null }),
        json!({ "_id": "e1", "_type": "education", "school": "Uni", "startDate": "2012-09-01" }),
        json!({ "_id": "p1", "_type": "project", "title": "Engine", "video": "https://cdn.sanity.io/files/test/engine.mp4" }),
        json!({ "_id": "s1", "_type": "skill", "name": "Rust", "category": "programming", "order": 1 }),
    ]
}

pub fn sample_store() -> FixtureStore {
    FixtureStore::from_documents(sample_documents())
}

/// `fixtures/content.json` at the crate root.
pub fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content.json")
}

pub fn fixture_store() -> FixtureStore {
    FixtureStore::load(&fixture_path()).unwrap()
}

// =========================================================================
// Lookup helpers
// =========================================================================

/// Find a project by title. Panics with the available titles if missing.
pub fn find_project<'a>(snapshot: &'a Snapshot, title: &str) -> &'a Project {
    snapshot
        .projects
        .iter()
        .find(|p| p.title() == title)
        .unwrap_or_else(|| {
            let titles: Vec<&str> = snapshot.projects.iter().map(Project::title).collect();
            panic!("project '{title}' not found. Available: {titles:?}")
        })
}
