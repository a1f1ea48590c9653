//! Content records shared by the fetch and generate stages.
//!
//! Every entity comes from the content store as projected JSON. GROQ
//! projections emit `null` for fields a document never set, so list-valued
//! fields go through [`null_as_default`] and always arrive as a `Vec`, and
//! scalar fields are plain `Option`s.
//!
//! Asset references keep the projected `{ "asset": { "url": … } }` shape so a
//! snapshot written by `folio fetch` reads back unchanged; use the `url()`
//! accessors instead of walking the nesting by hand.

use crate::rich_text::{Block, safe_href};
use crate::store::Perspective;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Deserialize `null` (or a missing field, together with `#[serde(default)]`)
/// as the type's default value.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Skill labels on a work item are either plain strings or dereferenced
/// `{ name }` records. Anything else (unresolved references, nulls) is dropped.
fn skill_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::String(name) => Some(name),
            serde_json::Value::Object(map) => map
                .get("name")
                .and_then(|n| n.as_str())
                .map(str::to_string),
            _ => None,
        })
        .filter(|name| !name.trim().is_empty())
        .collect())
}

/// A projected asset reference: `{ "asset": { "url": "https://…" } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(default)]
    pub asset: Option<Asset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub url: Option<String>,
}

impl AssetRef {
    pub fn from_url(url: &str) -> Self {
        Self {
            asset: Some(Asset {
                url: Some(url.to_string()),
            }),
        }
    }

    /// The resolved URL, if the store returned a non-empty one.
    pub fn url(&self) -> Option<&str> {
        self.asset
            .as_ref()
            .and_then(|a| a.url.as_deref())
            .filter(|u| !u.trim().is_empty())
    }
}

fn asset_url(asset: &Option<AssetRef>) -> Option<&str> {
    asset.as_ref().and_then(AssetRef::url)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// Author
// ============================================================================

/// The site owner. At most one per site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub initials: Option<String>,
    #[serde(default)]
    pub avatar: Option<AssetRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: Vec<Block>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: Vec<Block>,
    #[serde(default)]
    pub location: Option<String>,
    /// Downloadable resume file.
    #[serde(default)]
    pub resume: Option<AssetRef>,
    /// Free-form skill names, used when no `skill` documents exist.
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub social: Social,
}

impl Author {
    pub fn avatar_url(&self) -> Option<&str> {
        asset_url(&self.avatar)
    }

    pub fn resume_url(&self) -> Option<&str> {
        asset_url(&self.resume)
    }

    /// First word of the name, for the greeting.
    pub fn first_name(&self) -> &str {
        self.name
            .as_deref()
            .and_then(|n| n.split_whitespace().next())
            .unwrap_or("")
    }

    /// Explicit initials, or the first letter of each name part.
    pub fn display_initials(&self) -> String {
        if let Some(initials) = non_empty(&self.initials) {
            return initials.to_string();
        }
        self.name
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Social {
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Social {
    pub fn github(&self) -> Option<&str> {
        non_empty(&self.github).and_then(safe_href)
    }

    pub fn linkedin(&self) -> Option<&str> {
        non_empty(&self.linkedin).and_then(safe_href)
    }

    pub fn twitter(&self) -> Option<&str> {
        non_empty(&self.twitter).and_then(safe_href)
    }

    pub fn youtube(&self) -> Option<&str> {
        non_empty(&self.youtube).and_then(safe_href)
    }

    pub fn email(&self) -> Option<&str> {
        non_empty(&self.email)
    }
}

// ============================================================================
// Work experience & education
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub logo: Option<AssetRef>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    /// `None` means the position is current.
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: Vec<Block>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub achievements: Vec<Achievement>,
    #[serde(default, deserialize_with = "skill_labels")]
    pub skills: Vec<String>,
}

impl WorkExperience {
    pub fn logo_url(&self) -> Option<&str> {
        asset_url(&self.logo)
    }

    pub fn company(&self) -> &str {
        self.company.as_deref().unwrap_or("")
    }
}

/// A highlighted accomplishment shown as a badge on a work card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<AssetRef>,
}

impl Achievement {
    pub fn icon_url(&self) -> Option<&str> {
        asset_url(&self.icon)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub logo: Option<AssetRef>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Education {
    pub fn logo_url(&self) -> Option<&str> {
        asset_url(&self.logo)
    }

    pub fn school(&self) -> &str {
        self.school.as_deref().unwrap_or("")
    }
}

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: Vec<Block>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub image: Option<AssetRef>,
    /// Video URL; preferred over `image` as cover media.
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub team_size: Option<u32>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<ProjectLink>,
}

impl Project {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn image_url(&self) -> Option<&str> {
        asset_url(&self.image)
    }

    pub fn video_url(&self) -> Option<&str> {
        non_empty(&self.video)
    }

    pub fn role(&self) -> Option<&str> {
        non_empty(&self.role)
    }

    pub fn outcome(&self) -> Option<&str> {
        non_empty(&self.outcome)
    }

    pub fn status(&self) -> Option<&str> {
        non_empty(&self.status)
    }

    pub fn project_type(&self) -> Option<&str> {
        non_empty(&self.project_type)
    }

    pub fn client(&self) -> Option<&str> {
        non_empty(&self.client)
    }

    /// Links that actually point somewhere.
    pub fn usable_links(&self) -> impl Iterator<Item = &ProjectLink> {
        self.links.iter().filter(|l| l.url().is_some())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectLink {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: LinkKind,
}

impl ProjectLink {
    /// The target, if it is a link a browser can safely follow.
    pub fn url(&self) -> Option<&str> {
        non_empty(&self.url).and_then(safe_href)
    }

    /// Explicit title, or the kind's fallback label.
    pub fn label(&self) -> &str {
        non_empty(&self.title).unwrap_or(self.kind.fallback_label())
    }
}

/// What a project link points at. Decides the badge icon and fallback label.
///
/// The store holds free-form strings; matching is case-insensitive, `code`
/// is an alias for `source`, and anything unrecognised is `Default`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum LinkKind {
    Source,
    Website,
    Demo,
    Docs,
    #[default]
    Default,
}

impl LinkKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "source" | "code" | "github" => LinkKind::Source,
            "website" | "site" => LinkKind::Website,
            "demo" => LinkKind::Demo,
            "docs" | "documentation" => LinkKind::Docs,
            _ => LinkKind::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Source => "source",
            LinkKind::Website => "website",
            LinkKind::Demo => "demo",
            LinkKind::Docs => "docs",
            LinkKind::Default => "default",
        }
    }

    pub fn fallback_label(&self) -> &'static str {
        match self {
            LinkKind::Source => "GitHub",
            LinkKind::Website => "Website",
            LinkKind::Demo => "Demo",
            LinkKind::Docs => "Docs",
            LinkKind::Default => "Visit",
        }
    }
}

impl From<Option<String>> for LinkKind {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map(LinkKind::parse).unwrap_or_default()
    }
}

impl From<LinkKind> for String {
    fn from(kind: LinkKind) -> Self {
        kind.as_str().to_string()
    }
}

// ============================================================================
// Skills
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Image asset. Skills without one render their initial instead.
    #[serde(default)]
    pub icon: Option<AssetRef>,
    #[serde(default)]
    pub category: SkillCategory,
    #[serde(default)]
    pub order: Option<f64>,
}

impl Skill {
    pub fn icon(&self) -> Option<&str> {
        asset_url(&self.icon)
    }
}

/// Fixed skill categories, in display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum SkillCategory {
    Programming,
    Ml,
    DataEngineering,
    Visualization,
    Deployment,
    #[default]
    Other,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 6] = [
        SkillCategory::Programming,
        SkillCategory::Ml,
        SkillCategory::DataEngineering,
        SkillCategory::Visualization,
        SkillCategory::Deployment,
        SkillCategory::Other,
    ];

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "programming" => SkillCategory::Programming,
            "ml" => SkillCategory::Ml,
            "data_engineering" => SkillCategory::DataEngineering,
            "visualization" => SkillCategory::Visualization,
            "deployment" => SkillCategory::Deployment,
            _ => SkillCategory::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Programming => "programming",
            SkillCategory::Ml => "ml",
            SkillCategory::DataEngineering => "data_engineering",
            SkillCategory::Visualization => "visualization",
            SkillCategory::Deployment => "deployment",
            SkillCategory::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkillCategory::Programming => "Programming",
            SkillCategory::Ml => "Machine Learning",
            SkillCategory::DataEngineering => "Data Engineering",
            SkillCategory::Visualization => "Visualization / BI",
            SkillCategory::Deployment => "Deployment / MLOps",
            SkillCategory::Other => "Other",
        }
    }
}

impl From<Option<String>> for SkillCategory {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map(SkillCategory::parse).unwrap_or_default()
    }
}

impl From<SkillCategory> for String {
    fn from(category: SkillCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Everything one page render needs, joined from the five entity queries.
///
/// Written to `snapshot.json` by the fetch stage and read by generate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Which document set the content came from.
    #[serde(default)]
    pub perspective: Perspective,
    pub author: Option<Author>,
    #[serde(default)]
    pub work: Vec<WorkExperience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.work.is_empty()
            && self.education.is_empty()
            && self.projects.is_empty()
            && self.skills.is_empty()
    }
}
