//! Secret-safe policy
//!
//! Two leak vectors are handled before an entry becomes durable:
//! credential-manager apps (blocked outright by name substring) and
//! token-like payloads (admitted, but only as temporary entries that the
//! expiry sweep removes after a short TTL).

use chrono::{DateTime, Duration, Utc};

use crate::config::SecretSafeConfig;

fn is_base64url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Three non-empty base64url segments, the first being an encoded JSON
/// object header (`{"` encodes to `eyJ`)
fn is_jwt_shaped(text: &str) -> bool {
    let segments: Vec<&str> = text.split('.').collect();
    segments.len() == 3
        && segments[0].starts_with("eyJ")
        && segments
            .iter()
            .all(|s| !s.is_empty() && s.chars().all(is_base64url_char))
}

/// Whether an entry is kept indefinitely or only until `expires_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    Permanent,
    Temporary { expires_at: DateTime<Utc> },
}

impl Retention {
    pub fn is_temporary(&self) -> bool {
        matches!(self, Retention::Temporary { .. })
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Retention::Permanent => None,
            Retention::Temporary { expires_at } => Some(*expires_at),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }
}

/// Admission and temporariness policy
#[derive(Debug, Clone)]
pub struct SecretSafeFilter {
    enabled: bool,
    /// Lowercase app-name substrings
    blocklist: Vec<String>,
    token_ttl: Duration,
    min_token_len: usize,
}

impl SecretSafeFilter {
    pub fn new(config: &SecretSafeConfig) -> Self {
        let mut filter = SecretSafeFilter {
            enabled: config.enabled,
            blocklist: Vec::new(),
            token_ttl: config.token_ttl(),
            min_token_len: config.min_token_len.max(1),
        };
        filter.set_blocklist(&config.blocklist_apps);
        filter
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn blocklist(&self) -> &[String] {
        &self.blocklist
    }

    /// Replace the blocklist. Entries are trimmed and lowercased; empty
    /// entries are dropped since they would match every app.
    pub fn set_blocklist<S: AsRef<str>>(&mut self, entries: &[S]) {
        let mut blocklist: Vec<String> = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry = entry.as_ref().trim().to_lowercase();
            if !entry.is_empty() && !blocklist.contains(&entry) {
                blocklist.push(entry);
            }
        }
        self.blocklist = blocklist;
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// True iff secret-safe mode is on and `app` contains a blocklisted
    /// substring (case-insensitive)
    pub fn is_blocked_app(&self, app: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let lower = app.to_lowercase();
        self.blocklist.iter().any(|b| lower.contains(b.as_str()))
    }

    /// JWT-shaped text, or a single bare base64url token of at least the
    /// configured length. Surrounding whitespace disqualifies a bare token.
    pub fn looks_like_token(&self, content: &str) -> bool {
        if is_jwt_shaped(content.trim()) {
            return true;
        }
        content.chars().count() >= self.min_token_len && content.chars().all(is_base64url_char)
    }

    /// Retention for content admitted at `now`
    pub fn classify(&self, content: &str, now: DateTime<Utc>) -> Retention {
        if self.enabled && self.looks_like_token(content) {
            Retention::Temporary {
                expires_at: now + self.token_ttl,
            }
        } else {
            Retention::Permanent
        }
    }
}

impl Default for SecretSafeFilter {
    fn default() -> Self {
        Self::new(&SecretSafeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JWT: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.abc.def";

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_blocklist_is_case_insensitive_substring() {
        let filter = SecretSafeFilter::default();
        assert!(filter.is_blocked_app("1Password 8"));
        assert!(filter.is_blocked_app("Bitwarden"));
        assert!(!filter.is_blocked_app("Notes"));
    }

    #[test]
    fn test_blocklist_ignored_when_disabled() {
        let mut filter = SecretSafeFilter::default();
        filter.set_enabled(false);
        assert!(!filter.is_blocked_app("1Password 8"));
    }

    #[test]
    fn test_set_blocklist_normalizes_entries() {
        let mut filter = SecretSafeFilter::default();
        filter.set_blocklist(&["  KeePassXC ", "", "keepassxc"]);
        assert_eq!(filter.blocklist(), &["keepassxc".to_string()]);
        assert!(filter.is_blocked_app("KeePassXC"));
        assert!(!filter.is_blocked_app("1Password"), "old list replaced");
    }

    #[test]
    fn test_jwt_detection() {
        let filter = SecretSafeFilter::default();
        assert!(filter.looks_like_token(JWT));
        assert!(filter.looks_like_token(&format!("  {}\n", JWT)));
        assert!(!filter.looks_like_token("www.example.com"));
        assert!(!filter.looks_like_token("eyJ.only-two"));
    }

    #[test]
    fn test_bare_token_detection() {
        let filter = SecretSafeFilter::default();
        let token = "a".repeat(39) + "_";
        assert!(filter.looks_like_token(&token));
        assert!(!filter.looks_like_token(&"a".repeat(39)), "too short");
        assert!(!filter.looks_like_token(&format!(" {}", token)), "surrounding whitespace");
        assert!(!filter.looks_like_token(&format!("{}!", token)), "outside alphabet");
        assert!(!filter.looks_like_token("just some words"));
    }

    #[test]
    fn test_classify_marks_tokens_temporary() {
        let filter = SecretSafeFilter::default();
        let retention = filter.classify(JWT, t0());
        assert_eq!(
            retention,
            Retention::Temporary {
                expires_at: t0() + Duration::seconds(30)
            }
        );
        assert!(retention.is_temporary());
        assert!(!retention.is_expired_at(t0()));
        assert!(retention.is_expired_at(t0() + Duration::seconds(30)));

        assert_eq!(filter.classify("hello", t0()), Retention::Permanent);
        assert_eq!(Retention::Permanent.expires_at(), None);
    }

    #[test]
    fn test_classify_permanent_when_disabled() {
        let mut filter = SecretSafeFilter::default();
        filter.set_enabled(false);
        assert_eq!(filter.classify(JWT, t0()), Retention::Permanent);
    }
}
