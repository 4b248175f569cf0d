//! Recommendation model - pattern issues, actions and findings.

use serde::{Deserialize, Serialize};

/// Grade of a pattern issue. Separate scale from cost severity bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueLevel {
    /// Can hang or time out the evaluator
    Critical,
    /// Expensive on most inputs
    High,
    /// Expensive on long inputs
    Medium,
    /// Minor cost
    Low,
    /// Hint only
    Info,
}

impl IssueLevel {
    /// Upper-case label.
    pub fn label(self) -> &'static str {
        match self {
            IssueLevel::Critical => "CRITICAL",
            IssueLevel::High => "HIGH",
            IssueLevel::Medium => "MEDIUM",
            IssueLevel::Low => "LOW",
            IssueLevel::Info => "INFO",
        }
    }
}

impl std::fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An anti-performance idiom found in a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Grade
    pub level: IssueLevel,
    /// What was found and what to do about it
    pub message: String,
}

impl Issue {
    /// Create a new issue.
    pub fn new(level: IssueLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Finding text for this issue, tagged with its level.
    pub fn as_finding(&self) -> String {
        format!("[Pattern/{}] {}", self.level, self.message)
    }
}

/// What to do with a measured entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Turn it off until fixed
    Disable,
    /// Replace with a cheaper formulation
    Rewrite,
    /// Check whether it is still needed as is
    Review,
    /// Tune in place
    Optimize,
    /// Tune a shared building block (correlation rules only)
    OptimizeBuildingBlock,
    /// No change needed
    Monitor,
}

impl Action {
    /// Upper-case label.
    pub fn label(self) -> &'static str {
        match self {
            Action::Disable => "DISABLE",
            Action::Rewrite => "REWRITE",
            Action::Review => "REVIEW",
            Action::Optimize => "OPTIMIZE",
            Action::OptimizeBuildingBlock => "OPTIMIZE_BUILDING_BLOCK",
            Action::Monitor => "MONITOR",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowest-urgency priority, paired with [`Action::Monitor`].
pub const DEFAULT_PRIORITY: u8 = 4;

/// The verdict for one record.
///
/// `priority` 1 is most urgent. `findings` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Chosen action
    pub action: Action,
    /// Urgency, 1 = most urgent
    pub priority: u8,
    /// Ordered, human readable findings
    pub findings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_finding_is_tagged() {
        let issue = Issue::new(IssueLevel::High, "too many lazy quantifiers");
        assert_eq!(issue.as_finding(), "[Pattern/HIGH] too many lazy quantifiers");
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(Action::OptimizeBuildingBlock.to_string(), "OPTIMIZE_BUILDING_BLOCK");
        assert_eq!(Action::Monitor.label(), "MONITOR");
    }

    #[test]
    fn test_issue_levels_are_ordered() {
        assert!(IssueLevel::Critical < IssueLevel::High);
        assert!(IssueLevel::Low < IssueLevel::Info);
    }
}
