//! Configuration type definitions
//!
//! This module contains all the struct definitions for configuration.
//! Every section deserializes with defaults for missing fields, so a partial
//! settings file is always valid.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use super::defaults::*;
use crate::boards::RuleSpec;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn millis(ms: u64) -> chrono::Duration {
    chrono::Duration::milliseconds(ms.min(i64::MAX as u64) as i64)
}

// ============================================
// FOCUS CONFIG
// ============================================

/// Weight added to the recency score of a focus candidate by app category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryWeights {
    pub browser: f64,
    pub ide: f64,
    pub other: f64,
    pub communication: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        CategoryWeights {
            browser: DEFAULT_WEIGHT_BROWSER,
            ide: DEFAULT_WEIGHT_IDE,
            other: DEFAULT_WEIGHT_OTHER,
            communication: DEFAULT_WEIGHT_COMMUNICATION,
        }
    }
}

/// Maps a content language hint to the IDE most likely to have produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageIde {
    /// Language hint, e.g. "python"
    pub hint: String,
    /// Canonical IDE display name, e.g. "PyCharm"
    pub canonical: String,
    /// Lowercase substrings of IDE names preferred for this language
    pub preferred: Vec<String>,
}

/// Attribution tuning: margins, windows, weights and keyword tables.
///
/// Scoring is a pure function of this struct and the focus history; the
/// process environment is never consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FocusConfig {
    /// Maximum number of focus transitions retained (oldest evicted first)
    pub history_capacity: usize,
    /// How far before a clipboard event focus candidates are considered
    pub pre_margin_ms: u64,
    /// How far after a clipboard event focus candidates are considered
    pub post_margin_ms: u64,
    /// Window for the content-type aware lookup
    pub lookback_ms: u64,
    /// Wider window used when a language hint names a specific IDE
    pub freq_lookback_ms: u64,
    /// Sampling interval of the focus poller
    pub poll_interval_ms: u64,
    pub weights: CategoryWeights,
    pub recency_mix: f64,
    pub frequency_mix: f64,
    pub ide_bonus: f64,
    pub code_bonus: f64,
    /// Lowercase substrings identifying this tool
    pub self_names: Vec<String>,
    /// Lowercase names of system owners that are never attributed
    pub ignored_owners: Vec<String>,
    pub browser_keywords: Vec<String>,
    pub ide_keywords: Vec<String>,
    pub communication_keywords: Vec<String>,
    pub language_ides: Vec<LanguageIde>,
}

impl Default for FocusConfig {
    fn default() -> Self {
        FocusConfig {
            history_capacity: DEFAULT_FOCUS_HISTORY_CAPACITY,
            pre_margin_ms: DEFAULT_PRE_MARGIN_MS,
            post_margin_ms: DEFAULT_POST_MARGIN_MS,
            lookback_ms: DEFAULT_LOOKBACK_MS,
            freq_lookback_ms: DEFAULT_FREQ_LOOKBACK_MS,
            poll_interval_ms: DEFAULT_FOCUS_POLL_INTERVAL_MS,
            weights: CategoryWeights::default(),
            recency_mix: DEFAULT_RECENCY_MIX,
            frequency_mix: DEFAULT_FREQUENCY_MIX,
            ide_bonus: DEFAULT_IDE_BONUS,
            code_bonus: DEFAULT_CODE_BONUS,
            self_names: strings(DEFAULT_SELF_NAMES),
            ignored_owners: strings(DEFAULT_IGNORED_OWNERS),
            browser_keywords: strings(DEFAULT_BROWSER_KEYWORDS),
            ide_keywords: strings(DEFAULT_IDE_KEYWORDS),
            communication_keywords: strings(DEFAULT_COMMUNICATION_KEYWORDS),
            language_ides: DEFAULT_LANGUAGE_IDES
                .iter()
                .map(|(hint, canonical, preferred)| LanguageIde {
                    hint: hint.to_string(),
                    canonical: canonical.to_string(),
                    preferred: strings(preferred),
                })
                .collect(),
        }
    }
}

impl FocusConfig {
    pub fn pre_margin(&self) -> chrono::Duration {
        millis(self.pre_margin_ms)
    }

    pub fn post_margin(&self) -> chrono::Duration {
        millis(self.post_margin_ms)
    }

    pub fn lookback(&self) -> chrono::Duration {
        millis(self.lookback_ms)
    }

    pub fn freq_lookback(&self) -> chrono::Duration {
        millis(self.freq_lookback_ms)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Look up the IDE table entry for a language hint (case-insensitive)
    pub fn language_ide(&self, hint: &str) -> Option<&LanguageIde> {
        let hint = hint.trim().to_lowercase();
        self.language_ides.iter().find(|l| l.hint == hint)
    }
}

// ============================================
// DEDUPE CONFIG
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DedupeConfig {
    /// Capacity of the global recent-hash LRU
    pub lru_size: usize,
    /// Same-app repeated copies inside this window are duplicates
    pub per_app_window_secs: u64,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        DedupeConfig {
            lru_size: DEFAULT_DEDUPE_LRU_SIZE,
            per_app_window_secs: DEFAULT_DEDUPE_PER_APP_WINDOW_SECS,
        }
    }
}

impl DedupeConfig {
    pub fn per_app_window(&self) -> chrono::Duration {
        millis(self.per_app_window_secs.saturating_mul(1000))
    }
}

// ============================================
// SECRET-SAFE CONFIG
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecretSafeConfig {
    pub enabled: bool,
    /// Case-insensitive app name substrings that are never captured
    pub blocklist_apps: Vec<String>,
    /// Lifetime of token-like entries
    pub token_ttl_secs: u64,
    /// Minimum length of a bare base64url token
    pub min_token_len: usize,
}

impl Default for SecretSafeConfig {
    fn default() -> Self {
        SecretSafeConfig {
            enabled: DEFAULT_SECRET_SAFE_ENABLED,
            blocklist_apps: strings(DEFAULT_BLOCKLIST_APPS),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
        }
    }
}

impl SecretSafeConfig {
    pub fn token_ttl(&self) -> chrono::Duration {
        millis(self.token_ttl_secs.saturating_mul(1000))
    }
}

// ============================================
// HISTORY CONFIG
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryConfig {
    /// Oldest unpinned entries beyond this bound are evicted
    pub max_items: usize,
    /// Wake-up interval of the expiry sweep
    pub sweep_interval_ms: u64,
    /// Per-app capture toggles (missing apps are captured)
    pub per_app_capture: HashMap<String, bool>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            max_items: DEFAULT_MAX_HISTORY_ITEMS,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            per_app_capture: HashMap::new(),
        }
    }
}

impl HistoryConfig {
    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.sweep_interval_ms.max(1))
    }
}

// ============================================
// CAPTURE CONFIG
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureConfig {
    pub enabled: bool,
    /// Capture pause after the tool itself writes to the clipboard
    pub pause_after_set_ms: u64,
    /// Events arriving this soon after a captured event are ignored
    pub burst_ignore_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            enabled: DEFAULT_CAPTURE_ENABLED,
            pause_after_set_ms: DEFAULT_PAUSE_AFTER_SET_MS,
            burst_ignore_ms: DEFAULT_BURST_IGNORE_MS,
        }
    }
}

// ============================================
// PERSISTENCE CONFIG
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistenceConfig {
    pub enabled: bool,
    /// Database path; the platform data dir is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        PersistenceConfig {
            enabled: DEFAULT_PERSISTENCE_ENABLED,
            path: None,
        }
    }
}

// ============================================
// MAIN CONFIG
// ============================================

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub version: u32,
    pub focus: FocusConfig,
    pub dedupe: DedupeConfig,
    pub secret_safe: SecretSafeConfig,
    pub history: HistoryConfig,
    pub capture: CaptureConfig,
    pub persistence: PersistenceConfig,
    /// Replaces the default board rule table when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_rules: Option<Vec<RuleSpec>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: CONFIG_VERSION,
            focus: FocusConfig::default(),
            dedupe: DedupeConfig::default(),
            secret_safe: SecretSafeConfig::default(),
            history: HistoryConfig::default(),
            capture: CaptureConfig::default(),
            persistence: PersistenceConfig::default(),
            board_rules: None,
        }
    }
}
