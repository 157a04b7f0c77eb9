//! Attribution scoring
//!
//! Pure functions over a [`FocusConfig`]: identical inputs always produce
//! identical scores.

use chrono::{DateTime, Utc};

use crate::config::{CategoryWeights, FocusConfig};

/// Coarse application category used for weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCategory {
    Browser,
    Ide,
    Communication,
    Other,
}

fn contains_any(lower: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| !k.is_empty() && lower.contains(k.as_str()))
}

/// Classify an app name. Browser keywords are checked first, then IDEs,
/// then communication apps.
pub fn categorize(name: &str, config: &FocusConfig) -> AppCategory {
    let lower = name.to_lowercase();
    if contains_any(&lower, &config.browser_keywords) {
        AppCategory::Browser
    } else if contains_any(&lower, &config.ide_keywords) {
        AppCategory::Ide
    } else if contains_any(&lower, &config.communication_keywords) {
        AppCategory::Communication
    } else {
        AppCategory::Other
    }
}

pub fn is_ide(name: &str, config: &FocusConfig) -> bool {
    categorize(name, config) == AppCategory::Ide
}

pub fn category_weight(category: AppCategory, weights: &CategoryWeights) -> f64 {
    match category {
        AppCategory::Browser => weights.browser,
        AppCategory::Ide => weights.ide,
        AppCategory::Communication => weights.communication,
        AppCategory::Other => weights.other,
    }
}

/// Absolute difference between two instants in fractional seconds
pub fn seconds_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    ((a - b).num_microseconds().unwrap_or(i64::MAX) as f64 / 1_000_000.0).abs()
}

/// `1 / (1 + |Δt|)` with Δt in seconds
pub fn recency_score(event: DateTime<Utc>, observed: DateTime<Utc>) -> f64 {
    1.0 / (1.0 + seconds_between(event, observed))
}

/// Score of a focus candidate inside the margin window
pub fn window_score(
    event: DateTime<Utc>,
    observed: DateTime<Utc>,
    app: &str,
    config: &FocusConfig,
) -> f64 {
    recency_score(event, observed) + category_weight(categorize(app, config), &config.weights)
}

/// Aggregated sightings of one app inside a lookback window
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyCandidate {
    pub app: String,
    pub count: usize,
    pub last_seen: DateTime<Utc>,
}

/// Frequency+recency score used when nothing better is known.
///
/// IDEs receive `ide_bonus` (plus `code_bonus` for code-like content) only
/// when the caller allows it.
pub fn frequency_score(
    candidate: &FrequencyCandidate,
    total: usize,
    event: DateTime<Utc>,
    code_like: bool,
    allow_ide: bool,
    config: &FocusConfig,
) -> f64 {
    let recency = recency_score(event, candidate.last_seen);
    let share = candidate.count as f64 / total.max(1) as f64;
    let mut score = recency * config.recency_mix + share * config.frequency_mix;
    if allow_ide && is_ide(&candidate.app, config) {
        score += config.ide_bonus;
        if code_like {
            score += config.code_bonus;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_categorize() {
        let config = FocusConfig::default();
        assert_eq!(categorize("Chrome", &config), AppCategory::Browser);
        assert_eq!(categorize("Visual Studio Code", &config), AppCategory::Ide);
        assert_eq!(categorize("PyCharm", &config), AppCategory::Ide);
        assert_eq!(categorize("Slack", &config), AppCategory::Communication);
        assert_eq!(categorize("Notes", &config), AppCategory::Other);
    }

    #[test]
    fn test_category_weight_ordering() {
        let w = CategoryWeights::default();
        assert!(category_weight(AppCategory::Browser, &w) > category_weight(AppCategory::Ide, &w));
        assert!(category_weight(AppCategory::Ide, &w) > category_weight(AppCategory::Other, &w));
        assert!(
            category_weight(AppCategory::Other, &w)
                > category_weight(AppCategory::Communication, &w)
        );
    }

    #[test]
    fn test_recency_score() {
        assert_eq!(recency_score(t0(), t0()), 1.0);
        let one_sec = recency_score(t0(), t0() - Duration::seconds(1));
        assert!((one_sec - 0.5).abs() < 1e-9);
        // symmetric in time
        assert_eq!(
            recency_score(t0(), t0() + Duration::milliseconds(250)),
            recency_score(t0(), t0() - Duration::milliseconds(250))
        );
    }

    #[test]
    fn test_window_score_is_deterministic() {
        let config = FocusConfig::default();
        let observed = t0() - Duration::milliseconds(100);
        let a = window_score(t0(), observed, "Chrome", &config);
        let b = window_score(t0(), observed, "Chrome", &config);
        assert_eq!(a, b);
        assert!(a > window_score(t0(), observed, "Slack", &config));
    }

    #[test]
    fn test_frequency_score_ide_bonus_requires_permission() {
        let config = FocusConfig::default();
        let candidate = FrequencyCandidate {
            app: "PyCharm".to_string(),
            count: 1,
            last_seen: t0(),
        };
        let without = frequency_score(&candidate, 2, t0(), true, false, &config);
        let with = frequency_score(&candidate, 2, t0(), true, true, &config);
        let expected_bonus = config.ide_bonus + config.code_bonus;
        assert!((with - without - expected_bonus).abs() < 1e-9);
    }
}
