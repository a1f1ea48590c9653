//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; the user file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! `config.toml` in the working directory, or any path passed with
//! `--config`. A missing file means "stock defaults", which is only useful
//! together with a fixture because a Sanity project id has no default.
//!
//! ## Configuration Options
//!
//! ```toml
//! assets_dir = "public"          # Copied into dist/ and served at /
//!
//! [store]
//! project_id = "abc123"          # Sanity project (required unless `fixture`)
//! dataset = "production"
//! api_version = "2024-10-01"
//! use_cdn = true                 # apicdn.sanity.io for published reads
//! fixture = "fixtures/content.json"  # Read documents from disk instead
//!
//! [site]
//! base_url = "https://example.com"   # Canonical/OpenGraph URL
//! source_url = "https://github.com/you/portfolio"
//! background_video = true        # /videos/galaxy.mp4 behind the page
//!
//! [images]
//! allowed_hosts = ["cdn.sanity.io"]
//!
//! [skills]
//! layout_seed = 42               # Reproducible skill layout (omit for random)
//!
//! [revalidate]
//! interval_secs = 604800         # Serve-mode page cache lifetime
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [colors.light]
//! background = "#ffffff"
//! # ...
//! ```
//!
//! ## Secrets
//!
//! Tokens never live in the config file. `SANITY_API_READ_TOKEN` and
//! `FOLIO_SESSION_KEY` are read from the environment (a `.env` file is
//! honoured by the binary).
//!
//! Unknown keys are rejected to catch typos early.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory of static files (videos, favicons) copied into the output.
    pub assets_dir: String,
    pub store: StoreConfig,
    pub site: SiteMeta,
    pub images: ImagesConfig,
    pub skills: SkillsConfig,
    pub revalidate: RevalidateConfig,
    pub server: ServerConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            assets_dir: "public".to_string(),
            store: StoreConfig::default(),
            site: SiteMeta::default(),
            images: ImagesConfig::default(),
            skills: SkillsConfig::default(),
            revalidate: RevalidateConfig::default(),
            server: ServerConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.fixture.is_none() && self.store.project_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store.project_id is required unless store.fixture is set".into(),
            ));
        }
        if self.store.dataset.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store.dataset must not be empty".into(),
            ));
        }
        if self.revalidate.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "revalidate.interval_secs must be greater than zero".into(),
            ));
        }
        if self.images.allowed_hosts.is_empty() {
            return Err(ConfigError::Validation(
                "images.allowed_hosts must not be empty".into(),
            ));
        }
        if let Some(base) = &self.site.base_url {
            Url::parse(base).map_err(|e| {
                ConfigError::Validation(format!("site.base_url {base:?} is not a URL: {e}"))
            })?;
        }
        Ok(())
    }

    /// Fixture path resolved against the directory holding the config file.
    pub fn fixture_path(&self, config_dir: &Path) -> Option<PathBuf> {
        self.store.fixture.as_ref().map(|f| config_dir.join(f))
    }
}

/// Where content comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    /// Use the CDN host for published reads. Draft reads always hit the API.
    pub use_cdn: bool,
    /// JSON array of documents to serve instead of a live project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2024-10-01".to_string(),
            use_cdn: true,
            fixture: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub background_video: bool,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            base_url: None,
            source_url: None,
            background_video: true,
        }
    }
}

/// Hosts asset URLs may point to. Anything else is dropped at render time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    pub allowed_hosts: Vec<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: vec!["cdn.sanity.io".to_string()],
        }
    }
}

impl ImagesConfig {
    /// `https` URLs on an allowed host, or site-relative paths.
    pub fn allows(&self, url: &str) -> bool {
        if url.starts_with('/') && !url.starts_with("//") {
            return true;
        }
        match Url::parse(url) {
            Ok(parsed) => {
                parsed.scheme() == "https"
                    && parsed
                        .host_str()
                        .is_some_and(|host| self.allowed_hosts.iter().any(|h| h == host))
            }
            Err(_) => false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkillsConfig {
    /// Seed for the decorative skill layout. `None` reshuffles every render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevalidateConfig {
    pub interval_secs: u64,
}

impl Default for RevalidateConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60 * 60 * 24 * 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text: dates, locations, captions.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#0a0a0a".to_string(),
            text_muted: "#71717a".to_string(),
            border: "#e4e4e7".to_string(),
            link: "#18181b".to_string(),
            link_hover: "#000000".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#09090b".to_string(),
            text: "#fafafa".to_string(),
            text_muted: "#a1a1aa".to_string(),
            border: "#27272a".to_string(),
            link: "#e4e4e7".to_string(),
            link_hover: "#ffffff".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
///
/// Parsed from [`stock_config_toml`] so the documented file and the loader
/// can never disagree.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::from_str(stock_config_toml())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` when it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load and validate the config file at `path` over stock defaults.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional except a content source: set either
# store.project_id or store.fixture. Values shown below are the defaults.
# Unknown keys will cause an error.
#
# Secrets are read from the environment, never from this file:
#   SANITY_API_READ_TOKEN  read token, required for draft previews
#   FOLIO_SESSION_KEY      signs the draft-mode cookie (random if unset)

# Directory of static files copied into dist/ and served at the site root.
assets_dir = "public"

# ---------------------------------------------------------------------------
# Content store
# ---------------------------------------------------------------------------
[store]
# Sanity project id.
project_id = ""
dataset = "production"
api_version = "2024-10-01"

# Read published content through apicdn.sanity.io.
use_cdn = true

# Serve documents from a local JSON array instead of a live project.
# fixture = "fixtures/content.json"

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Canonical URL used in OpenGraph tags.
# base_url = "https://example.com"

# "Source" link in the footer.
# source_url = "https://github.com/you/portfolio"

# Fixed background video at /videos/galaxy.mp4 (from assets_dir).
background_video = true

# ---------------------------------------------------------------------------
# Images
# ---------------------------------------------------------------------------
[images]
# https hosts asset URLs may point to. Site-relative paths are always allowed.
allowed_hosts = ["cdn.sanity.io"]

# ---------------------------------------------------------------------------
# Skills
# ---------------------------------------------------------------------------
[skills]
# Fix the decorative skill layout. Omit for a fresh arrangement every render.
# layout_seed = 42

# ---------------------------------------------------------------------------
# Revalidation (serve mode)
# ---------------------------------------------------------------------------
[revalidate]
# Seconds a rendered published page is reused before content is re-fetched.
interval_secs = 604800

# ---------------------------------------------------------------------------
# Preview server
# ---------------------------------------------------------------------------
[server]
host = "127.0.0.1"
port = 3000

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#0a0a0a"
text_muted = "#71717a"    # Dates, locations, captions
border = "#e4e4e7"
link = "#18181b"
link_hover = "#000000"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#09090b"
text = "#fafafa"
text_muted = "#a1a1aa"
border = "#27272a"
link = "#e4e4e7"
link_hover = "#ffffff"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-link-hover: {dark_link_hover};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(tmp: &TempDir, body: &str) -> PathBuf {
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn stock_file_matches_struct_defaults() {
        let from_file: SiteConfig = stock_defaults_value().unwrap().try_into().unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(from_file.assets_dir, defaults.assets_dir);
        assert_eq!(from_file.store.dataset, defaults.store.dataset);
        assert_eq!(from_file.store.api_version, defaults.store.api_version);
        assert_eq!(from_file.store.use_cdn, defaults.store.use_cdn);
        assert_eq!(from_file.images.allowed_hosts, defaults.images.allowed_hosts);
        assert_eq!(
            from_file.revalidate.interval_secs,
            defaults.revalidate.interval_secs
        );
        assert_eq!(from_file.server.port, defaults.server.port);
        assert_eq!(from_file.colors.light.text, defaults.colors.light.text);
        assert_eq!(from_file.colors.dark.border, defaults.colors.dark.border);
        assert!(from_file.skills.layout_seed.is_none());
    }

    #[test]
    fn default_revalidate_is_one_week() {
        assert_eq!(RevalidateConfig::default().interval_secs, 604_800);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[colors.light]
background = "#fafafa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.colors.light.background, "#fafafa");
        // Default values preserved
        assert_eq!(config.colors.light.text, "#0a0a0a");
        assert_eq!(config.store.dataset, "production");
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[store]\nprojet_id = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn merge_keeps_base_keys() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_without_file_needs_a_source() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(&tmp.path().join(DEFAULT_CONFIG_FILE));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r##"
[store]
project_id = "abc123"

[skills]
layout_seed = 9

[server]
port = 8080
"##,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.store.project_id, "abc123");
        assert_eq!(config.skills.layout_seed, Some(9));
        assert_eq!(config.server.addr(), "127.0.0.1:8080");
        // Unspecified values should be defaults
        assert_eq!(config.store.dataset, "production");
        assert!(config.store.use_cdn);
    }

    #[test]
    fn load_config_fixture_only() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[store]\nfixture = \"content.json\"\n");
        let config = load_config(&path).unwrap();
        assert_eq!(
            config.fixture_path(tmp.path()),
            Some(tmp.path().join("content.json"))
        );
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "this is not valid toml [[[");
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn zero_interval_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            "[store]\nproject_id = \"p\"\n[revalidate]\ninterval_secs = 0\n",
        );
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn empty_allowed_hosts_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            "[store]\nproject_id = \"p\"\n[images]\nallowed_hosts = []\n",
        );
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn bad_base_url_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            "[store]\nproject_id = \"p\"\n[site]\nbase_url = \"not a url\"\n",
        );
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("site.base_url"));
    }

    // =========================================================================
    // Image host allow-list
    // =========================================================================

    #[test]
    fn allow_list_accepts_https_on_listed_host() {
        let images = ImagesConfig::default();
        assert!(images.allows("https://cdn.sanity.io/images/p/d/a.png"));
        assert!(images.allows("/videos/galaxy.mp4"));
    }

    #[test]
    fn allow_list_rejects_other_hosts_and_schemes() {
        let images = ImagesConfig::default();
        assert!(!images.allows("http://cdn.sanity.io/images/a.png"));
        assert!(!images.allows("https://evil.example.com/a.png"));
        assert!(!images.allows("//evil.example.com/a.png"));
        assert!(!images.allows("javascript:alert(1)"));
        assert!(!images.allows("🦀"));
    }

    // =========================================================================
    // CSS generation tests
    // =========================================================================

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }
}
