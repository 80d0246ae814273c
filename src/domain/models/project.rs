//! Project domain model.
//!
//! A project groups an ordered list of rule references. Each reference
//! either embeds the full rule document (the remote store populated the
//! relation) or carries just the rule's id.

use serde::{Deserialize, Serialize};

use super::rule::Rule;

/// A rule reference inside a project: either the populated rule document
/// or a bare id pointing at one.
///
/// Modeled as a tagged variant so the coordinator's cascade logic branches
/// exhaustively instead of inspecting JSON shapes at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSlot {
    /// The remote store embedded the full rule document.
    Embedded(Rule),
    /// Only the rule's id; the document must be fetched separately.
    Reference(String),
}

impl RuleSlot {
    /// The referenced rule's id, regardless of whether it is embedded.
    pub fn rule_id(&self) -> &str {
        match self {
            Self::Embedded(rule) => &rule.id,
            Self::Reference(id) => id,
        }
    }
}

/// An entry in a project's ordered rule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRef {
    /// The rule, embedded or by id.
    pub rule: RuleSlot,
    /// Optional display-name override for this rule within this project.
    /// The underlying rule keeps its own title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl RuleRef {
    /// The display name for this entry: a non-empty alias wins over the
    /// embedded rule's title. Returns `None` when the rule is a bare
    /// reference and no alias is set.
    pub fn display_name(&self) -> Option<&str> {
        match &self.alias {
            Some(alias) if !alias.is_empty() => Some(alias),
            _ => match &self.rule {
                RuleSlot::Embedded(rule) => Some(&rule.title),
                RuleSlot::Reference(_) => None,
            },
        }
    }
}

/// A project: an ordered collection of rules shared as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Opaque identifier, unique among projects.
    pub id: String,
    /// Short description of the project.
    #[serde(default)]
    pub description: String,
    /// Ordered rule references.
    #[serde(default)]
    pub rules: Vec<RuleRef>,
}
