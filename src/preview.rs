//! Draft-mode preview: secret validation and the session cookie.
//!
//! The CMS studio opens `/api/draft?sanity-preview-secret=…&sanity-preview-pathname=…`.
//! The secret is a `sanity.previewUrlSecret` document the studio wrote just
//! beforehand; it is accepted when it exists and was updated within
//! [`PREVIEW_SECRET_TTL`]. Acceptance sets a cookie whose value is derived
//! from the server's session key, so a cookie is only honoured by the
//! process (or fleet sharing `FOLIO_SESSION_KEY`) that issued it.

use crate::store::{ContentStore, Order, Perspective, Query, StoreError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{info, warn};

pub const PREVIEW_SECRET_TTL: Duration = Duration::from_secs(60 * 60);
pub const DRAFT_COOKIE: &str = "folio_draft";

const SECRET_DOC_TYPE: &str = "sanity.previewUrlSecret";
const SECRET_GROQ: &str =
    r#"*[_type == "sanity.previewUrlSecret" && secret == $secret][0] { _id, _updatedAt }"#;

#[derive(Debug, Deserialize)]
struct SecretDoc {
    #[serde(rename = "_updatedAt", default)]
    updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewDecision {
    Granted { redirect_to: String },
    Denied,
}

/// Redirect target for a granted preview. Only site-relative paths are
/// followed; anything else (absolute or protocol-relative URLs, missing
/// values) goes to `/`.
pub fn safe_redirect(pathname: Option<&str>) -> String {
    match pathname.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

fn is_fresh(updated_at: Option<&str>, now: DateTime<Utc>) -> bool {
    let Some(updated) = updated_at.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok()) else {
        return false;
    };
    let age = now.signed_duration_since(updated.with_timezone(&Utc));
    age.num_seconds() <= PREVIEW_SECRET_TTL.as_secs() as i64
}

/// Check a preview secret against the store.
///
/// An empty or unknown secret is denied, as is a known secret older than
/// the TTL. A store without a read token cannot look secrets up, which also
/// denies. Other store failures are errors.
pub async fn validate_preview_url(
    store: &dyn ContentStore,
    secret: Option<&str>,
    pathname: Option<&str>,
    now: DateTime<Utc>,
) -> Result<PreviewDecision, StoreError> {
    let Some(secret) = secret.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(PreviewDecision::Denied);
    };

    let params = [("secret", secret)];
    let query = Query {
        doc_type: SECRET_DOC_TYPE,
        groq: SECRET_GROQ,
        singleton: true,
        order: Order::None,
        params: &params,
    };
    let value = match store.fetch(&query, Perspective::Drafts).await {
        Ok(value) => value,
        Err(StoreError::MissingToken) => {
            warn!("preview requested but no read token is configured");
            return Ok(PreviewDecision::Denied);
        }
        Err(e) => return Err(e),
    };

    let doc: Option<SecretDoc> = serde_json::from_value(value)?;
    match doc {
        Some(doc) if is_fresh(doc.updated_at.as_deref(), now) => {
            let redirect_to = safe_redirect(pathname);
            info!(redirect_to = %redirect_to, "draft mode enabled");
            Ok(PreviewDecision::Granted { redirect_to })
        }
        Some(_) => {
            info!("preview secret expired");
            Ok(PreviewDecision::Denied)
        }
        None => Ok(PreviewDecision::Denied),
    }
}

/// Issues and recognises the draft-mode cookie.
#[derive(Debug, Clone)]
pub struct DraftSession {
    token: String,
}

impl DraftSession {
    pub fn new(key: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"folio-draft:");
        hasher.update(key);
        Self {
            token: format!("{:x}", hasher.finalize()),
        }
    }

    /// Session from `FOLIO_SESSION_KEY`, or a random key for this process.
    pub fn from_key(key: Option<&str>) -> Self {
        match key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => Self::new(key.as_bytes()),
            None => Self::new(&rand::random::<[u8; 32]>()),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether a `Cookie` header carries this session's draft token.
    pub fn is_enabled(&self, cookie_header: Option<&str>) -> bool {
        cookie_header.is_some_and(|header| {
            header
                .split(';')
                .filter_map(|pair| pair.trim().split_once('='))
                .any(|(name, value)| name == DRAFT_COOKIE && value == self.token)
        })
    }

    pub fn enable_cookie(&self) -> String {
        format!(
            "{DRAFT_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.token
        )
    }

    pub fn disable_cookie() -> String {
        format!("{DRAFT_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FixtureStore;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn store() -> FixtureStore {
        FixtureStore::from_documents(vec![
            json!({ "_id": "fresh", "_type": "sanity.previewUrlSecret", "secret": "s3cret", "_updatedAt": "2024-05-01T11:30:00Z" }),
            json!({ "_id": "stale", "_type": "sanity.previewUrlSecret", "secret": "old", "_updatedAt": "2024-05-01T10:00:00Z" }),
        ])
    }

    #[tokio::test]
    async fn fresh_secret_grants_with_pathname() {
        let decision = validate_preview_url(&store(), Some("s3cret"), Some("/projects"), now())
            .await
            .unwrap();
        assert_eq!(
            decision,
            PreviewDecision::Granted {
                redirect_to: "/projects".into()
            }
        );
    }

    #[tokio::test]
    async fn missing_pathname_redirects_home() {
        let decision = validate_preview_url(&store(), Some("s3cret"), None, now())
            .await
            .unwrap();
        assert_eq!(
            decision,
            PreviewDecision::Granted {
                redirect_to: "/".into()
            }
        );
    }

    #[tokio::test]
    async fn unknown_stale_or_empty_secret_is_denied() {
        for secret in [Some("nope"), Some("old"), Some(""), None] {
            let decision = validate_preview_url(&store(), secret, Some("/"), now())
                .await
                .unwrap();
            assert_eq!(decision, PreviewDecision::Denied, "secret {secret:?}");
        }
    }

    #[test]
    fn redirect_only_follows_site_paths() {
        assert_eq!(safe_redirect(Some("/about")), "/about");
        assert_eq!(safe_redirect(Some("https://evil.example")), "/");
        assert_eq!(safe_redirect(Some("//evil.example")), "/");
        assert_eq!(safe_redirect(Some("/\\evil.example")), "/");
        assert_eq!(safe_redirect(Some("/a\r\nSet-Cookie: x")), "/");
        assert_eq!(safe_redirect(None), "/");
    }

    #[test]
    fn session_token_is_stable_per_key() {
        let a = DraftSession::from_key(Some("key"));
        let b = DraftSession::from_key(Some("key"));
        let c = DraftSession::from_key(Some("other"));
        assert_eq!(a.token(), b.token());
        assert_ne!(a.token(), c.token());
        assert_eq!(a.token().len(), 64);
    }

    #[test]
    fn random_sessions_differ() {
        assert_ne!(
            DraftSession::from_key(None).token(),
            DraftSession::from_key(None).token()
        );
    }

    #[test]
    fn cookie_recognised_only_with_matching_token() {
        let session = DraftSession::from_key(Some("key"));
        let header = format!("theme=dark; {DRAFT_COOKIE}={}", session.token());
        assert!(session.is_enabled(Some(&header)));
        assert!(!session.is_enabled(Some("folio_draft=forged")));
        assert!(!session.is_enabled(None));

        let other = DraftSession::from_key(Some("other"));
        assert!(!other.is_enabled(Some(&header)));
    }

    #[test]
    fn cookies_are_http_only() {
        let session = DraftSession::from_key(Some("key"));
        assert!(session.enable_cookie().contains("HttpOnly"));
        assert!(DraftSession::disable_cookie().contains("Max-Age=0"));
    }
}
