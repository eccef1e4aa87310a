use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered readmission risk bands derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub const LOW_MAX: i64 = 6;
    pub const MEDIUM_MAX: i64 = 12;

    pub const fn ordered() -> [Self; 3] {
        [Self::Low, Self::Medium, Self::High]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Total over all integers: anything at or below 6 is Low, 13 and up is High.
    pub const fn from_score(score: i64) -> Self {
        if score <= Self::LOW_MAX {
            Self::Low
        } else if score <= Self::MEDIUM_MAX {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn categorize_vci_risk(score: i64) -> RiskCategory {
    RiskCategory::from_score(score)
}
