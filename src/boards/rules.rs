//! Board rule tables
//!
//! A rule is a conjunction of predicates plus the board it assigns. Rules
//! exist in two forms: [`RuleSpec`] is the portable serde form found in
//! settings files and exports, [`Rule`] is the compiled form the router
//! evaluates. Compiling never fails; a pattern that does not compile yields
//! a predicate that never matches.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Board;

// ============================================
// PORTABLE FORM
// ============================================

/// Kind of a rule predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateKind {
    /// App name contains any of the values (case-insensitive)
    AppContains,
    /// App name matches the pattern (case-insensitive)
    AppRegex,
    /// Content contains any of the values
    ContentContains,
    /// Content matches the pattern
    ContentRegex,
    /// Content starts with any of the values
    ContentPrefix,
    /// Unconditional match
    Always,
}

/// Predicate argument: one string, a list of strings, or a flag (`always`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredicateValue {
    One(String),
    Many(Vec<String>),
    Flag(bool),
}

impl PredicateValue {
    fn strings(&self) -> Vec<String> {
        match self {
            PredicateValue::One(s) => vec![s.clone()],
            PredicateValue::Many(v) => v.clone(),
            PredicateValue::Flag(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateSpec {
    #[serde(rename = "type")]
    pub kind: PredicateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<PredicateValue>,
}

impl PredicateSpec {
    pub fn new(kind: PredicateKind, value: impl Into<String>) -> Self {
        PredicateSpec {
            kind,
            value: Some(PredicateValue::One(value.into())),
        }
    }

    pub fn any_of(kind: PredicateKind, values: &[&str]) -> Self {
        PredicateSpec {
            kind,
            value: Some(PredicateValue::Many(
                values.iter().map(|v| v.to_string()).collect(),
            )),
        }
    }

    pub fn always() -> Self {
        PredicateSpec {
            kind: PredicateKind::Always,
            value: Some(PredicateValue::Flag(true)),
        }
    }
}

/// Portable rule: all predicates must hold for `board` to be assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub predicates: Vec<PredicateSpec>,
    pub board: Board,
}

// ============================================
// COMPILED FORM
// ============================================

/// A compiled regex, or the source of one that failed to compile
#[derive(Debug, Clone)]
pub enum Pattern {
    Compiled(Regex),
    Invalid(String),
}

impl Pattern {
    fn compile(source: &str, case_insensitive: bool) -> Self {
        match RegexBuilder::new(source)
            .case_insensitive(case_insensitive)
            .build()
        {
            Ok(re) => Pattern::Compiled(re),
            Err(e) => {
                warn!(pattern = source, error = %e, "Invalid board rule pattern, rule will never match");
                Pattern::Invalid(source.to_string())
            }
        }
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            Pattern::Compiled(re) => re.is_match(text),
            Pattern::Invalid(_) => false,
        }
    }

    fn source(&self) -> &str {
        match self {
            Pattern::Compiled(re) => re.as_str(),
            Pattern::Invalid(s) => s,
        }
    }
}

/// A single compiled test over `(app, content)`.
///
/// `app` is passed lowercased and `content` trimmed.
#[derive(Debug, Clone)]
pub enum Predicate {
    AppContains(Vec<String>),
    AppRegex(Pattern),
    ContentContains(Vec<String>),
    ContentRegex(Pattern),
    ContentPrefix(Vec<String>),
    Always,
}

impl Predicate {
    pub fn compile(spec: &PredicateSpec) -> Self {
        let values = spec
            .value
            .as_ref()
            .map(PredicateValue::strings)
            .unwrap_or_default();
        let first = values.first().cloned().unwrap_or_default();
        match spec.kind {
            PredicateKind::AppContains => {
                Predicate::AppContains(values.iter().map(|v| v.to_lowercase()).collect())
            }
            PredicateKind::AppRegex => Predicate::AppRegex(Pattern::compile(&first, true)),
            PredicateKind::ContentContains => Predicate::ContentContains(values),
            PredicateKind::ContentRegex => Predicate::ContentRegex(Pattern::compile(&first, false)),
            PredicateKind::ContentPrefix => Predicate::ContentPrefix(values),
            PredicateKind::Always => Predicate::Always,
        }
    }

    pub fn matches(&self, app: &str, content: &str) -> bool {
        match self {
            Predicate::AppContains(needles) => needles.iter().any(|n| app.contains(n.as_str())),
            Predicate::AppRegex(p) => p.is_match(app),
            Predicate::ContentContains(needles) => {
                needles.iter().any(|n| content.contains(n.as_str()))
            }
            Predicate::ContentRegex(p) => p.is_match(content),
            Predicate::ContentPrefix(prefixes) => {
                prefixes.iter().any(|p| content.starts_with(p.as_str()))
            }
            Predicate::Always => true,
        }
    }

    fn values_spec(kind: PredicateKind, values: &[String]) -> PredicateSpec {
        let value = if values.len() == 1 {
            PredicateValue::One(values[0].clone())
        } else {
            PredicateValue::Many(values.to_vec())
        };
        PredicateSpec {
            kind,
            value: Some(value),
        }
    }

    pub fn to_spec(&self) -> PredicateSpec {
        match self {
            Predicate::AppContains(v) => Self::values_spec(PredicateKind::AppContains, v),
            Predicate::AppRegex(p) => PredicateSpec::new(PredicateKind::AppRegex, p.source()),
            Predicate::ContentContains(v) => Self::values_spec(PredicateKind::ContentContains, v),
            Predicate::ContentRegex(p) => {
                PredicateSpec::new(PredicateKind::ContentRegex, p.source())
            }
            Predicate::ContentPrefix(v) => Self::values_spec(PredicateKind::ContentPrefix, v),
            Predicate::Always => PredicateSpec::always(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub predicates: Vec<Predicate>,
    pub board: Board,
}

impl Rule {
    pub fn compile(spec: &RuleSpec) -> Self {
        Rule {
            predicates: spec.predicates.iter().map(Predicate::compile).collect(),
            board: spec.board,
        }
    }

    /// All predicates hold. A rule without predicates never matches.
    pub fn matches(&self, app: &str, content: &str) -> bool {
        !self.predicates.is_empty() && self.predicates.iter().all(|p| p.matches(app, content))
    }

    pub fn to_spec(&self) -> RuleSpec {
        RuleSpec {
            predicates: self.predicates.iter().map(Predicate::to_spec).collect(),
            board: self.board,
        }
    }
}

// ============================================
// DEFAULT TABLE
// ============================================

const BROWSER_APPS: &[&str] = &["chrome", "safari", "firefox", "edge", "brave"];
const TERMINAL_APPS: &[&str] = &["terminal", "iterm", "kitty", "alacritty", "wezterm"];
const EDITOR_APPS: &[&str] = &["vscode", "visual studio code", "code", "sublime", "atom"];

const LINK_PATTERN: &str = r"(?i)https?://|^www\.|^[\w-]+(\.[\w-]+)+(/|$)";
const TERMINAL_COMMAND_PATTERN: &str = r"^\$|--|^sudo |^[a-zA-Z0-9_\-]+ .*";
const EDITOR_CODE_PATTERN: &str = r"[{};]|\b(def|class|import)\b";
const COMMAND_PATTERN: &str = r"^\$|--";
const CODE_PATTERN: &str = r"[{};]";

/// The built-in rule table, ending with the `notes` catch-all
pub fn default_rule_specs() -> Vec<RuleSpec> {
    vec![
        RuleSpec {
            predicates: vec![
                PredicateSpec::any_of(PredicateKind::AppContains, BROWSER_APPS),
                PredicateSpec::new(PredicateKind::ContentRegex, LINK_PATTERN),
            ],
            board: Board::Links,
        },
        RuleSpec {
            predicates: vec![
                PredicateSpec::any_of(PredicateKind::AppContains, TERMINAL_APPS),
                PredicateSpec::new(PredicateKind::ContentRegex, TERMINAL_COMMAND_PATTERN),
            ],
            board: Board::Commands,
        },
        RuleSpec {
            predicates: vec![
                PredicateSpec::any_of(PredicateKind::AppContains, EDITOR_APPS),
                PredicateSpec::new(PredicateKind::ContentRegex, EDITOR_CODE_PATTERN),
            ],
            board: Board::Code,
        },
        RuleSpec {
            predicates: vec![PredicateSpec::new(PredicateKind::ContentRegex, LINK_PATTERN)],
            board: Board::Links,
        },
        RuleSpec {
            predicates: vec![PredicateSpec::new(PredicateKind::ContentRegex, COMMAND_PATTERN)],
            board: Board::Commands,
        },
        RuleSpec {
            predicates: vec![PredicateSpec::new(PredicateKind::ContentRegex, CODE_PATTERN)],
            board: Board::Code,
        },
        RuleSpec {
            predicates: vec![PredicateSpec::always()],
            board: Board::Notes,
        },
    ]
}
