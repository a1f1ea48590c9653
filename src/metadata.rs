//! Document head metadata.
//!
//! The page title, description and social-card tags come from the author
//! record. Each field is resolved independently; the first non-empty source
//! wins:
//!
//! - **Title**: author name → `"Portfolio"`
//! - **Description**: plain text of the author description → `"Personal portfolio website"`
//! - **URL**: `site.base_url` → omitted
//!
//! Without an author the page still gets a title and description so crawlers
//! and link previews see something sensible.

use crate::config::SiteMeta;
use crate::rich_text::plain_text;
use crate::types::Author;
use maud::{Markup, html};

pub const DEFAULT_TITLE: &str = "Portfolio";
pub const DEFAULT_DESCRIPTION: &str = "Personal portfolio website";
pub const LOCALE: &str = "en_US";

/// Resolve a field from sources in priority order.
///
/// Returns the first non-None, non-empty (after trimming) value.
///
/// ```text
/// title:       resolve(&[author.name, Some("Portfolio")])
/// description: resolve(&[plain_text(author.description), Some("Personal portfolio website")])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    /// Present only when an author exists.
    pub site_name: Option<String>,
}

impl PageMeta {
    pub fn for_author(author: Option<&Author>, site: &SiteMeta) -> Self {
        let name = author.and_then(|a| a.name.as_deref());
        let description = author.map(|a| plain_text(&a.description));
        Self {
            title: resolve(&[name, Some(DEFAULT_TITLE)]).unwrap_or_default(),
            description: resolve(&[description.as_deref(), Some(DEFAULT_DESCRIPTION)])
                .unwrap_or_default(),
            url: resolve(&[site.base_url.as_deref()]),
            site_name: author.and(resolve(&[name])),
        }
    }

    /// `<title>` plus description, OpenGraph, twitter and robots tags.
    pub fn render(&self) -> Markup {
        html! {
            title { (self.title) }
            meta name="description" content=(self.description);
            meta property="og:title" content=(self.title);
            meta property="og:description" content=(self.description);
            @if let Some(url) = &self.url {
                meta property="og:url" content=(url);
                link rel="canonical" href=(url);
            }
            @if let Some(site_name) = &self.site_name {
                meta property="og:site_name" content=(site_name);
            }
            meta property="og:locale" content=(LOCALE);
            meta property="og:type" content="website";
            meta name="twitter:card" content="summary_large_image";
            meta name="twitter:title" content=(self.title);
            meta name="robots" content="index, follow";
            meta name="googlebot" content="index, follow, max-video-preview:-1, max-image-preview:large, max-snippet:-1";
        }
    }
}
