//! Composite readmission index (length of stay, acuity, comorbidity, emergency
//! visits) and the risk bands derived from it.

mod domain;
mod risk;
mod rules;

pub use domain::{is_missing_value, NormalizedRecord, PatientRecord, VciFactor, MISSING_SENTINEL};
pub use risk::{categorize_vci_risk, RiskCategory};

use crate::analytics::dataset::{Column, DatasetError, Table};
use domain::RecordColumns;
use serde::{Deserialize, Serialize};

/// Upper bound of the composite score (7 + 3 + 5 + 5).
pub const MAX_VCI_SCORE: u8 = 20;

pub const SCORE_COLUMN: &str = "vci_score";
pub const CATEGORY_COLUMN: &str = "vci_risk_category";

/// Stateless scorer; identical records always yield identical outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct VciEngine;

impl VciEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, record: &PatientRecord) -> VciOutcome {
        let (components, score) = rules::score_record(&record.normalize());

        VciOutcome {
            score,
            category: RiskCategory::from_score(i64::from(score)),
            components,
        }
    }

    pub fn score_table(&self, table: &Table) -> Vec<VciOutcome> {
        let columns = RecordColumns::resolve(table);
        let outcomes: Vec<VciOutcome> = (0..table.row_count())
            .map(|row| self.score(&columns.record(row)))
            .collect();

        tracing::debug!(records = outcomes.len(), "scored encounter table");
        outcomes
    }

    /// Appends `vci_score` and `vci_risk_category` columns to `table`,
    /// overwriting them when the table was scored before.
    pub fn annotate_table(&self, table: Table) -> Result<Table, DatasetError> {
        let outcomes = self.score_table(&table);
        let scores = Column::integers(
            SCORE_COLUMN,
            outcomes.iter().map(|outcome| Some(i64::from(outcome.score))),
        );
        let categories = Column::texts(
            CATEGORY_COLUMN,
            outcomes.iter().map(|outcome| Some(outcome.category.label())),
        );

        table
            .with_column_replaced(scores)?
            .with_column_replaced(categories)
    }

    pub fn risk_distribution(&self, outcomes: &[VciOutcome]) -> Vec<RiskShare> {
        let total = outcomes.len();
        RiskCategory::ordered()
            .into_iter()
            .map(|category| {
                let count = outcomes
                    .iter()
                    .filter(|outcome| outcome.category == category)
                    .count();
                let percentage = if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64 * 100.0
                };
                RiskShare {
                    category,
                    label: category.label(),
                    count,
                    percentage,
                }
            })
            .collect()
    }
}

pub fn calculate_vci_score(record: &PatientRecord) -> u8 {
    VciEngine.score(record).score
}

/// Discrete contribution to a score, kept for transparent audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: VciFactor,
    pub points: u8,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VciOutcome {
    pub score: u8,
    pub category: RiskCategory,
    pub components: Vec<ScoreComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskShare {
    pub category: RiskCategory,
    pub label: &'static str,
    pub count: usize,
    pub percentage: f64,
}
