//! Rule domain model.
//!
//! A rule is a reusable instruction document shared through the platform.
//! Rules are created through the platform's web UI; this bridge only reads
//! them and rewrites their content body.

use serde::{Deserialize, Serialize};

/// A shared rule document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Opaque identifier, unique among rules.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Short description of what the rule is for.
    #[serde(default)]
    pub description: String,
    /// File-pattern scope. `None` means the rule applies to all files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub globs: Option<String>,
    /// Free-text body of the rule.
    #[serde(default)]
    pub content: String,
    /// Whether the rule is visible only to its creator.
    #[serde(default)]
    pub private: bool,
}

impl Rule {
    /// Return a copy of this rule with its content body replaced wholesale.
    ///
    /// Content updates are full-replace by contract: the caller supplies the
    /// complete desired body, never a diff. All other fields are preserved.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }
}

/// One page of rules from a list endpoint.
///
/// The coordinator treats a single page as "all" for the owned-rules use
/// case and does not paginate further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePage {
    /// Rules on this page.
    pub items: Vec<Rule>,
    /// Total number of rules across all pages.
    pub total: u64,
    /// 1-based page number.
    pub page: u64,
    /// Whether another page follows this one.
    pub has_next: bool,
}
