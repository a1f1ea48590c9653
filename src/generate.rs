//! Page rendering and the fetch / generate stages.
//!
//! ```text
//! 1. Fetch     content store → .folio-temp/snapshot.json
//! 2. Generate  snapshot      → dist/
//! ```
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html        # The portfolio page
//! ├── style.css         # Color variables + base styles
//! ├── folio.js          # Reveal animations, dialogs, progress bars
//! └── videos/           # Everything under `assets_dir`, copied as-is
//!     └── galaxy.mp4
//! ```
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors injected from config)
//! - `static/folio.js`: In-view reveals, project dialogs, scroll progress
//!
//! Both are linked with a `?v=` content hash so a rebuild with changed
//! styles busts browser caches while unchanged files stay cached.
//!
//! ## Rendering
//!
//! [`render_page`] is a pure function of the snapshot, a [`RenderContext`]
//! and a random source. The same snapshot, config, layout seed and
//! [`RenderContext::today`] produce byte-identical HTML; `today` defaults to
//! the current UTC date, so open-ended durations move with the calendar.
//! Sections whose collection is empty are left
//! out; without an author only the page shell renders.

use crate::cache::{asset_version, fingerprint};
use crate::components;
use crate::config::{self, SiteConfig};
use crate::layout::layout_rng;
use crate::metadata::PageMeta;
use crate::store::{ContentStore, Perspective, StoreError};
use crate::store::queries::fetch_all;
use crate::types::Snapshot;
use chrono::{NaiveDate, Utc};
use maud::{DOCTYPE, Markup, html};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const SNAPSHOT_FILE: &str = "snapshot.json";

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/folio.js");

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Content store error: {0}")]
    Store(#[from] StoreError),
    #[error("{} holds draft content; generate it with --drafts", .0.display())]
    DraftSnapshot(PathBuf),
}

impl From<walkdir::Error> for GenerateError {
    fn from(e: walkdir::Error) -> Self {
        GenerateError::Io(e.into())
    }
}

/// Per-render settings. Draft mode lives here and nowhere else.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub draft: bool,
    /// Reference date for open-ended durations.
    pub today: NaiveDate,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &'a SiteConfig, draft: bool) -> Self {
        Self {
            config,
            draft,
            today: Utc::now().date_naive(),
        }
    }

    pub fn perspective(&self) -> Perspective {
        if self.draft {
            Perspective::Drafts
        } else {
            Perspective::Published
        }
    }

    /// An image or file URL, if its host is allowed.
    pub fn asset<'u>(&self, url: Option<&'u str>) -> Option<&'u str> {
        url.filter(|u| self.config.images.allows(u))
    }

    /// Video URLs are not host-restricted but must be `https` or site-relative.
    pub fn video<'u>(&self, url: Option<&'u str>) -> Option<&'u str> {
        url.filter(|u| u.starts_with("https://") || (u.starts_with('/') && !u.starts_with("//")))
    }
}

/// Stylesheet and script contents with their cache-busting versions.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    pub css: String,
    pub js: &'static str,
    pub css_version: String,
    pub js_version: String,
}

impl StaticAssets {
    pub fn new(config: &SiteConfig) -> Self {
        let color_css = config::generate_color_css(&config.colors);
        let css = format!("{}\n\n{}", color_css, CSS_STATIC);
        Self {
            css_version: asset_version(css.as_bytes()),
            js_version: asset_version(JS.as_bytes()),
            css,
            js: JS,
        }
    }
}

/// Counts shown after a fetch or check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSummary {
    pub author: Option<String>,
    pub work: usize,
    pub education: usize,
    pub projects: usize,
    pub skills: usize,
}

impl ContentSummary {
    pub fn of(snapshot: &Snapshot) -> Self {
        Self {
            author: snapshot
                .author
                .as_ref()
                .map(|a| a.name.clone().unwrap_or_default()),
            work: snapshot.work.len(),
            education: snapshot.education.len(),
            projects: snapshot.projects.len(),
            skills: snapshot.skills.len(),
        }
    }
}

#[derive(Debug)]
pub struct FetchReport {
    pub snapshot_path: PathBuf,
    pub source: String,
    pub fingerprint: String,
    pub summary: ContentSummary,
}

#[derive(Debug)]
pub struct GenerateReport {
    pub output_dir: PathBuf,
    pub files: Vec<String>,
    pub assets_copied: usize,
    /// Rendered from a drafts snapshot, with the draft banner.
    pub drafts: bool,
    pub summary: ContentSummary,
}

// ============================================================================
// Stages
// ============================================================================

/// Fetch every collection and write the snapshot to `temp_dir`.
pub async fn fetch(
    store: &dyn ContentStore,
    perspective: Perspective,
    temp_dir: &Path,
) -> Result<FetchReport, GenerateError> {
    let snapshot = fetch_all(store, perspective).await?;
    fs::create_dir_all(temp_dir)?;
    let snapshot_path = temp_dir.join(SNAPSHOT_FILE);
    fs::write(&snapshot_path, serde_json::to_string_pretty(&snapshot)?)?;
    Ok(FetchReport {
        snapshot_path,
        source: store.describe(),
        fingerprint: fingerprint(&snapshot)?,
        summary: ContentSummary::of(&snapshot),
    })
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, GenerateError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Render the snapshot into `output_dir` and copy static assets alongside.
///
/// `assets_dir` is resolved against `config_dir`; a missing directory is
/// skipped. A snapshot fetched with the drafts perspective is refused unless
/// `allow_drafts` is set, and then renders in draft mode.
pub fn generate(
    snapshot_path: &Path,
    config: &SiteConfig,
    config_dir: &Path,
    output_dir: &Path,
    allow_drafts: bool,
) -> Result<GenerateReport, GenerateError> {
    let snapshot = load_snapshot(snapshot_path)?;
    let drafts = snapshot.perspective == Perspective::Drafts;
    if drafts && !allow_drafts {
        return Err(GenerateError::DraftSnapshot(snapshot_path.to_path_buf()));
    }
    let assets = StaticAssets::new(config);
    let ctx = RenderContext::new(config, drafts);

    fs::create_dir_all(output_dir)?;

    let assets_src = config_dir.join(&config.assets_dir);
    let assets_copied = if assets_src.is_dir() {
        copy_dir_recursive(&assets_src, output_dir)?
    } else {
        0
    };

    let page = render_page(&snapshot, &ctx, &assets, &mut layout_rng(config.skills.layout_seed));
    fs::write(output_dir.join("index.html"), page.into_string())?;
    fs::write(output_dir.join("style.css"), &assets.css)?;
    fs::write(output_dir.join("folio.js"), assets.js)?;

    Ok(GenerateReport {
        output_dir: output_dir.to_path_buf(),
        files: vec![
            "index.html".to_string(),
            "style.css".to_string(),
            "folio.js".to_string(),
        ],
        assets_copied,
        drafts,
        summary: ContentSummary::of(&snapshot),
    })
}

/// Copy a directory tree, returning the number of files copied.
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<usize, GenerateError> {
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// ============================================================================
// Page
// ============================================================================

/// The whole document.
pub fn render_page(
    snapshot: &Snapshot,
    ctx: &RenderContext<'_>,
    assets: &StaticAssets,
    rng: &mut impl Rng,
) -> Markup {
    let meta = PageMeta::for_author(snapshot.author.as_ref(), &ctx.config.site);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                (meta.render())
                link rel="stylesheet" href={ "/style.css?v=" (assets.css_version) };
                script src={ "/folio.js?v=" (assets.js_version) } defer {}
            }
            body.draft-mode[ctx.draft] {
                @if ctx.config.site.background_video {
                    (components::background_video())
                }
                (render_body(snapshot, ctx, rng))
                @if ctx.draft {
                    (components::draft_banner())
                }
            }
        }
    }
}

/// Main content. Empty without an author.
pub fn render_body(snapshot: &Snapshot, ctx: &RenderContext<'_>, rng: &mut impl Rng) -> Markup {
    let Some(author) = &snapshot.author else {
        return html! { main #top {} };
    };
    let has_skills = !snapshot.skills.is_empty() || !author.skills.is_empty();
    html! {
        main #top {
            (components::hero(author, ctx))
            @if !author.summary.is_empty() {
                (components::about(author, ctx))
            }
            @if !snapshot.work.is_empty() {
                (components::work_timeline(&snapshot.work, ctx))
            }
            @if !snapshot.education.is_empty() {
                (components::education_section(&snapshot.education, ctx))
            }
            @if has_skills {
                (components::skills_section(&snapshot.skills, &author.skills, ctx, rng))
            }
            @if !snapshot.projects.is_empty() {
                (components::projects_section(&snapshot.projects, ctx))
            }
            (components::contact(author))
        }
        (components::footer(ctx.config.site.source_url.as_deref()))
        (components::navbar(author))
    }
}
