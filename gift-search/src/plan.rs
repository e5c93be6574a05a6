//! Subscription plans and the result volume each one grants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result cap for the Essential plan.
pub const ESSENTIAL_MAX_RESULTS: usize = 15;
/// Keyword fan-out width for the Essential plan.
pub const ESSENTIAL_KEYWORD_LIMIT: usize = 3;
/// Result cap for the Supreme plan.
pub const SUPREME_MAX_RESULTS: usize = 50;
/// Keyword fan-out width for the Supreme plan.
pub const SUPREME_KEYWORD_LIMIT: usize = 5;

/// Subscription tier gating result volume and search breadth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// Entry tier.
    #[default]
    Essential,
    /// Higher tier: more results, wider keyword fan-out.
    #[serde(rename = "supremo", alias = "supreme")]
    Supreme,
}

impl Plan {
    /// Parses a plan tag from a questionnaire. Unknown or missing tags
    /// fall back to [`Plan::Essential`].
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_lowercase()).as_deref() {
            Some("supremo") | Some("supreme") => Self::Supreme,
            _ => Self::Essential,
        }
    }

    /// Returns the tag used on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Essential => "essential",
            Self::Supreme => "supremo",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Result cap and keyword prefix length for one plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimits {
    /// Maximum number of ranked items returned.
    pub max_results: usize,
    /// Number of leading keywords fanned out to providers.
    pub keyword_limit: usize,
}

/// Per-plan limits. Defaults come from the named constants above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanLimits {
    pub essential: TierLimits,
    pub supreme: TierLimits,
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            essential: TierLimits {
                max_results: ESSENTIAL_MAX_RESULTS,
                keyword_limit: ESSENTIAL_KEYWORD_LIMIT,
            },
            supreme: TierLimits {
                max_results: SUPREME_MAX_RESULTS,
                keyword_limit: SUPREME_KEYWORD_LIMIT,
            },
        }
    }
}

impl PlanLimits {
    /// Returns the limits that apply to `plan`.
    pub fn for_plan(&self, plan: Plan) -> TierLimits {
        match plan {
            Plan::Essential => self.essential,
            Plan::Supreme => self.supreme,
        }
    }
}
