//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Config schema version written by this build
pub const CONFIG_VERSION: u32 = 1;

/// Focus history
pub const DEFAULT_FOCUS_HISTORY_CAPACITY: usize = 80;
pub const DEFAULT_PRE_MARGIN_MS: u64 = 500;
pub const DEFAULT_POST_MARGIN_MS: u64 = 50;
pub const DEFAULT_LOOKBACK_MS: u64 = 2500;
pub const DEFAULT_FREQ_LOOKBACK_MS: u64 = 5000;
pub const DEFAULT_FOCUS_POLL_INTERVAL_MS: u64 = 150;

/// Category weights added to the recency score in the margin window
pub const DEFAULT_WEIGHT_BROWSER: f64 = 0.6;
pub const DEFAULT_WEIGHT_IDE: f64 = 0.4;
pub const DEFAULT_WEIGHT_OTHER: f64 = 0.2;
pub const DEFAULT_WEIGHT_COMMUNICATION: f64 = 0.1;

/// Frequency+recency fallback scoring
pub const DEFAULT_RECENCY_MIX: f64 = 0.7;
pub const DEFAULT_FREQUENCY_MIX: f64 = 0.3;
pub const DEFAULT_IDE_BONUS: f64 = 0.15;
pub const DEFAULT_CODE_BONUS: f64 = 0.6;

/// Names that identify this tool; focus events for them are never recorded
pub const DEFAULT_SELF_NAMES: &[&str] = &["copypaste"];

/// System shell / window-manager owners (matched by exact lowercase name)
pub const DEFAULT_IGNORED_OWNERS: &[&str] = &[
    "window server",
    "windowserver",
    "displaylink",
    "display link",
    "control center",
    "controlcenter",
    "dock",
    "fontd",
    "kernel_task",
    "loginwindow",
    "systemuiserver",
    "spotlight",
];

pub const DEFAULT_BROWSER_KEYWORDS: &[&str] = &["brave", "chrome", "safari", "firefox", "edge", "opera"];

pub const DEFAULT_IDE_KEYWORDS: &[&str] = &[
    "pycharm",
    "intellij",
    "webstorm",
    "goland",
    "clion",
    "rider",
    "vscode",
    "visual studio code",
    "sublime",
    "atom",
    "xcode",
];

pub const DEFAULT_COMMUNICATION_KEYWORDS: &[&str] =
    &["discord", "slack", "teams", "whatsapp", "notion", "outlook"];

/// (language hint, canonical IDE, preferred IDE substrings)
pub const DEFAULT_LANGUAGE_IDES: &[(&str, &str, &[&str])] = &[
    ("python", "PyCharm", &["pycharm", "intellij"]),
    ("javascript", "Visual Studio Code", &["vscode", "visual studio code", "webstorm"]),
    ("js", "Visual Studio Code", &["vscode", "visual studio code", "webstorm"]),
];

/// Dedupe
pub const DEFAULT_DEDUPE_LRU_SIZE: usize = 200;
pub const DEFAULT_DEDUPE_PER_APP_WINDOW_SECS: u64 = 30;

/// Secret-safe mode
pub const DEFAULT_SECRET_SAFE_ENABLED: bool = true;
pub const DEFAULT_BLOCKLIST_APPS: &[&str] =
    &["1password", "bitwarden", "lastpass", "authenticator", "keychain"];
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 30;
pub const DEFAULT_MIN_TOKEN_LEN: usize = 40;

/// History store
pub const DEFAULT_MAX_HISTORY_ITEMS: usize = 500;
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1000;

/// Capture gate
pub const DEFAULT_CAPTURE_ENABLED: bool = true;
pub const DEFAULT_PAUSE_AFTER_SET_MS: u64 = 500;
pub const DEFAULT_BURST_IGNORE_MS: u64 = 100;

/// Persistence
pub const DEFAULT_PERSISTENCE_ENABLED: bool = false;

/// Directory name under the platform config/data dirs
pub const APP_DIR_NAME: &str = "copypaste";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const DATABASE_FILE_NAME: &str = "history.sqlite";
