//! # Folio
//!
//! A personal portfolio page driven by a headless CMS. The author, work
//! history, education, projects and skills live in a Sanity dataset; folio
//! reads them through fixed read-only GROQ queries and renders one HTML page.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Fetch     Sanity   →  snapshot.json   (CMS → structured data)
//! 2. Generate  snapshot →  dist/           (final HTML site)
//! ```
//!
//! The snapshot is human-readable JSON: inspect it to see exactly what the
//! page will be built from, or commit a copy as a fixture. `folio serve`
//! runs both stages per request instead, with a weekly revalidation cache
//! and a cookie-gated draft mode for previewing unpublished edits.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Content store trait, Sanity HTTP client, local JSON fixture store, entity queries |
//! | [`types`] | Entity records (`Author`, `WorkExperience`, `Education`, `Project`, `Skill`) and the `Snapshot` |
//! | [`rich_text`] | Portable Text → plain text and HTML |
//! | [`dates`] | Period and duration labels, start-date ordering |
//! | [`layout`] | Randomized positions for the floating skill planets |
//! | [`components`] | Page sections as maud components |
//! | [`metadata`] | Title, description, OpenGraph and twitter tags |
//! | [`generate`] | Page assembly and the fetch / generate stages |
//! | [`preview`] | Preview-secret validation and the draft-mode cookie |
//! | [`cache`] | Content hashes and the serve-mode page cache |
//! | [`server`] | axum router for live serving |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Empty Is Not an Error
//!
//! A section with no documents is simply left out; a missing author renders
//! an empty page shell. Only transport and API failures are errors, and one
//! failed read fails the whole snapshot rather than rendering half a page.
//!
//! ## Draft Mode Is a Value
//!
//! Whether a request sees drafts is decided once from its cookie and carried
//! in [`generate::RenderContext`]. Nothing global flips; the published cache
//! is never touched by a draft request.
//!
//! ## Decoration Is Separate From Content
//!
//! Planet positions, starfields and reveal delays come from [`layout`] and
//! `static/folio.js`. They never change what the page says. A fixed
//! `skills.layout_seed` makes the layout reproducible; open-ended durations
//! ("2 yrs 4 mos") still follow [`generate::RenderContext::today`], so two
//! builds match byte for byte only on the same day.

pub mod cache;
pub mod components;
pub mod config;
pub mod dates;
pub mod generate;
pub mod layout;
pub mod metadata;
pub mod output;
pub mod preview;
pub mod rich_text;
pub mod server;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
