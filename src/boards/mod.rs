//! Board routing
//!
//! Assigns each clipboard entry to one of a closed set of boards by walking
//! an ordered rule table; the first rule whose predicates all hold wins.
//! The table can be replaced at runtime and exported back to its portable
//! [`RuleSpec`] form.

mod rules;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CopyPasteError;

pub use rules::{
    default_rule_specs, Pattern, Predicate, PredicateKind, PredicateSpec, PredicateValue, Rule,
    RuleSpec,
};

/// Content category of a clipboard entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Board {
    #[serde(alias = "LINKS")]
    Links,
    #[serde(alias = "CODE")]
    Code,
    #[serde(alias = "COMMANDS")]
    Commands,
    #[serde(alias = "NOTES")]
    Notes,
    #[serde(alias = "OTHER")]
    Other,
}

impl Board {
    pub const ALL: [Board; 5] = [
        Board::Links,
        Board::Code,
        Board::Commands,
        Board::Notes,
        Board::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Board::Links => "links",
            Board::Code => "code",
            Board::Commands => "commands",
            Board::Notes => "notes",
            Board::Other => "other",
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Board {
    type Err = CopyPasteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Board::ALL
            .into_iter()
            .find(|b| b.as_str() == lower)
            .ok_or_else(|| CopyPasteError::UnknownBoard(s.to_string()))
    }
}

/// Ordered, replaceable rule table
#[derive(Debug, Clone)]
pub struct BoardRouter {
    rules: Vec<Rule>,
}

impl Default for BoardRouter {
    fn default() -> Self {
        Self::new(&default_rule_specs())
    }
}

impl BoardRouter {
    pub fn new(specs: &[RuleSpec]) -> Self {
        BoardRouter {
            rules: specs.iter().map(Rule::compile).collect(),
        }
    }

    /// Router for an optional configured table, falling back to the defaults
    pub fn from_config(specs: Option<&[RuleSpec]>) -> Self {
        match specs {
            Some(specs) if !specs.is_empty() => Self::new(specs),
            _ => Self::default(),
        }
    }

    /// Board for `(app, content)`.
    ///
    /// When no rule matches (only possible with a custom table lacking a
    /// catch-all) the entry lands on `notes`.
    pub fn route(&self, app: &str, content: &str) -> Board {
        let app = app.to_lowercase();
        let content = content.trim();
        self.rules
            .iter()
            .position(|r| r.matches(&app, content))
            .map(|i| {
                debug!(rule_index = i, board = %self.rules[i].board, "Board rule matched");
                self.rules[i].board
            })
            .unwrap_or(Board::Notes)
    }

    /// Replace the whole rule table
    pub fn set_rules(&mut self, specs: &[RuleSpec]) {
        self.rules = specs.iter().map(Rule::compile).collect();
        info!(rule_count = self.rules.len(), "Board rules replaced");
    }

    /// Export the active table in portable form
    pub fn rules_as_spec(&self) -> Vec<RuleSpec> {
        self.rules.iter().map(Rule::to_spec).collect()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

#[cfg(test)]
#[path = "boards_tests.rs"]
mod tests;
