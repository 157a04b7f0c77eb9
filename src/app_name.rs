//! Application name normalization
//!
//! Focus probes report the same application under many spellings
//! ("Google Chrome", "Chrome Helper", "Code - Insiders", ...). History,
//! dedupe and the per-app views all key on the canonical display name
//! produced here.

/// Sentinel used when no probe produced a usable name
pub const UNKNOWN_APP: &str = "Unknown App";

/// Ordered (lowercase substring, canonical name) rules; first match wins.
///
/// `xcode` precedes the bare `code` rule so Apple's IDE keeps its name.
pub const NORMALIZE_RULES: &[(&str, &str)] = &[
    ("visual studio code", "Visual Studio Code"),
    ("xcode", "Xcode"),
    ("code -", "Visual Studio Code"),
    ("code", "Visual Studio Code"),
    ("pycharm", "PyCharm"),
    ("brave", "Brave Browser"),
    ("chrome", "Chrome"),
    ("safari", "Safari"),
    ("firefox", "Firefox"),
    ("discord", "Discord"),
    ("notion", "Notion"),
    ("outlook", "Microsoft Outlook"),
    ("whatsapp", "WhatsApp"),
    ("slack", "Slack"),
    ("teams", "Microsoft Teams"),
];

/// Map a raw application name to its canonical display name.
///
/// Unmatched names are returned trimmed. Empty input stays empty, which
/// callers treat as "unknown".
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_lowercase();
    NORMALIZE_RULES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// `normalize` for optional probe output
pub fn normalize_opt(raw: Option<&str>) -> Option<String> {
    raw.map(normalize).filter(|n| !n.is_empty())
}

/// True for empty names and the unknown sentinel
pub fn is_unknown(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNKNOWN_APP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_rule_wins() {
        assert_eq!(normalize("Visual Studio Code - Insiders"), "Visual Studio Code");
        assert_eq!(normalize("Code - main.rs"), "Visual Studio Code");
        assert_eq!(normalize("Google Chrome"), "Chrome");
        assert_eq!(normalize("Brave Browser Beta"), "Brave Browser");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(normalize("SLACK"), "Slack");
        assert_eq!(normalize("microsoft teams (work or school)"), "Microsoft Teams");
    }

    #[test]
    fn test_xcode_keeps_its_name() {
        assert_eq!(normalize("Xcode"), "Xcode");
    }

    #[test]
    fn test_unmatched_passes_through_trimmed() {
        assert_eq!(normalize("  Python 3.11 "), "Python 3.11");
        assert_eq!(normalize("Terminal"), "Terminal");
    }

    #[test]
    fn test_empty_input_stays_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize_opt(None), None);
        assert_eq!(normalize_opt(Some("  ")), None);
        assert_eq!(normalize_opt(Some("safari")), Some("Safari".to_string()));
    }

    #[test]
    fn test_is_unknown() {
        assert!(is_unknown(""));
        assert!(is_unknown("unknown app"));
        assert!(is_unknown(UNKNOWN_APP));
        assert!(!is_unknown("Notes"));
    }
}
