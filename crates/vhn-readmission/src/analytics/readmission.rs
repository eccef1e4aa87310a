//! Aggregations behind the readmission charts: outcome counts per category,
//! early-readmission rates and numeric correlations. Rendering is left to the
//! consumer; these only shape the numbers and labels.

use crate::analytics::dataset::{Column, DatasetError, Table, Value};
use serde::Serialize;

pub const READMITTED_COLUMN: &str = "readmitted";
/// Outcome label for a readmission within 30 days.
pub const EARLY_READMISSION: &str = "<30";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeCount {
    pub outcome: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub total: usize,
    pub outcomes: Vec<OutcomeCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadmissionBreakdown {
    pub category_column: String,
    pub labels: ChartLabels,
    /// Outcome labels in first-seen order.
    pub outcomes: Vec<String>,
    /// Most frequent category first; ties keep first appearance.
    pub categories: Vec<CategoryBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRate {
    pub category: String,
    pub total: usize,
    pub early_readmissions: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadmissionRates {
    pub category_column: String,
    pub labels: ChartLabels,
    /// Highest rate first; ties keep first appearance.
    pub rates: Vec<CategoryRate>,
    /// Unweighted mean of the category rates.
    pub average_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `None` where a pair has fewer than two complete rows or zero variance.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, left: &str, right: &str) -> Option<f64> {
        let row = self.columns.iter().position(|column| column == left)?;
        let col = self.columns.iter().position(|column| column == right)?;
        self.values[row][col]
    }
}

/// `admission_type_id` -> `Admission Type Id`.
pub fn axis_label(column: &str) -> String {
    column
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn readmission_breakdown(
    table: &Table,
    category_column: &str,
) -> Result<ReadmissionBreakdown, DatasetError> {
    let categories = table.require_column(category_column)?;
    let readmitted = table.require_column(READMITTED_COLUMN)?;

    let mut outcomes: Vec<String> = Vec::new();
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();

    for (category, outcome) in labelled_pairs(categories, readmitted) {
        let outcome_index = match outcomes.iter().position(|known| *known == outcome) {
            Some(index) => index,
            None => {
                outcomes.push(outcome);
                for (_, counts) in groups.iter_mut() {
                    counts.push(0);
                }
                outcomes.len() - 1
            }
        };

        let group_index = match groups.iter().position(|(known, _)| *known == category) {
            Some(index) => index,
            None => {
                groups.push((category, vec![0; outcomes.len()]));
                groups.len() - 1
            }
        };
        groups[group_index].1[outcome_index] += 1;
    }

    let mut categories: Vec<CategoryBreakdown> = groups
        .into_iter()
        .map(|(category, counts)| CategoryBreakdown {
            total: counts.iter().sum(),
            outcomes: outcomes
                .iter()
                .zip(counts)
                .map(|(outcome, count)| OutcomeCount {
                    outcome: outcome.clone(),
                    count,
                })
                .collect(),
            category,
        })
        .collect();
    categories.sort_by(|a, b| b.total.cmp(&a.total));

    Ok(ReadmissionBreakdown {
        category_column: category_column.to_string(),
        labels: ChartLabels {
            title: format!("Readmission by {category_column}"),
            x_label: axis_label(category_column),
            y_label: "Count".to_string(),
        },
        outcomes,
        categories,
    })
}

pub fn readmission_rates(
    table: &Table,
    category_column: &str,
) -> Result<ReadmissionRates, DatasetError> {
    let categories = table.require_column(category_column)?;
    let readmitted = table.require_column(READMITTED_COLUMN)?;

    let mut groups: Vec<CategoryRate> = Vec::new();
    for (category, outcome) in categories.values().iter().zip(readmitted.values()) {
        let Some(category) = category.as_text() else {
            continue;
        };
        let early = matches!(outcome, Value::Text(label) if label == EARLY_READMISSION);

        let group = match groups.iter().position(|group| group.category == category) {
            Some(index) => &mut groups[index],
            None => {
                groups.push(CategoryRate {
                    category,
                    total: 0,
                    early_readmissions: 0,
                    rate: 0.0,
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        group.total += 1;
        if early {
            group.early_readmissions += 1;
        }
    }

    for group in groups.iter_mut() {
        group.rate = group.early_readmissions as f64 * 100.0 / group.total as f64;
    }
    groups.sort_by(|a, b| b.rate.total_cmp(&a.rate));

    let average_rate = if groups.is_empty() {
        0.0
    } else {
        groups.iter().map(|group| group.rate).sum::<f64>() / groups.len() as f64
    };

    Ok(ReadmissionRates {
        category_column: category_column.to_string(),
        labels: ChartLabels {
            title: format!("30-Day Readmission Rate by {category_column}"),
            x_label: axis_label(category_column),
            y_label: "Readmission Rate (%)".to_string(),
        },
        rates: groups,
        average_rate,
    })
}

/// Pearson correlation over `columns`, or every numeric column when `None`.
pub fn correlation_matrix(
    table: &Table,
    columns: Option<&[&str]>,
) -> Result<CorrelationMatrix, DatasetError> {
    let selected: Vec<&Column> = match columns {
        Some(names) => names
            .iter()
            .map(|name| {
                let column = table.require_column(name)?;
                if column.dtype().is_numeric() {
                    Ok(column)
                } else {
                    Err(DatasetError::NotNumeric(name.to_string()))
                }
            })
            .collect::<Result<_, _>>()?,
        None => table
            .columns()
            .iter()
            .filter(|column| column.dtype().is_numeric())
            .collect(),
    };

    let values = selected
        .iter()
        .enumerate()
        .map(|(row, left)| {
            selected
                .iter()
                .enumerate()
                .map(|(col, right)| {
                    let r = pearson(left, right);
                    if row == col {
                        r.map(|_| 1.0)
                    } else {
                        r
                    }
                })
                .collect()
        })
        .collect();

    Ok(CorrelationMatrix {
        columns: selected
            .iter()
            .map(|column| column.name().to_string())
            .collect(),
        values,
    })
}

fn labelled_pairs<'a>(
    categories: &'a Column,
    outcomes: &'a Column,
) -> impl Iterator<Item = (String, String)> + 'a {
    categories
        .values()
        .iter()
        .zip(outcomes.values())
        .filter_map(|(category, outcome)| Some((category.as_text()?, outcome.as_text()?)))
}

fn pearson(left: &Column, right: &Column) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = left
        .values()
        .iter()
        .zip(right.values())
        .filter_map(|(x, y)| Some((x.as_f64()?, y.as_f64()?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encounters() -> Table {
        Table::new(vec![
            Column::integers(
                "admission_type_id",
                [Some(1), Some(1), Some(3), Some(1), Some(3), None],
            ),
            Column::integers(
                "time_in_hospital",
                [Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)],
            ),
            Column::integers(
                "num_medications",
                [Some(2), Some(4), Some(6), Some(8), Some(10), Some(12)],
            ),
            Column::texts(
                "readmitted",
                [
                    Some("<30"),
                    Some("NO"),
                    Some("<30"),
                    Some(">30"),
                    Some("<30"),
                    Some("NO"),
                ],
            ),
        ])
        .expect("table")
    }

    #[test]
    fn axis_label_title_cases_words() {
        assert_eq!(axis_label("admission_type_id"), "Admission Type Id");
        assert_eq!(axis_label("num_lab_procedures"), "Num Lab Procedures");
    }

    #[test]
    fn breakdown_orders_categories_by_frequency() {
        let breakdown = readmission_breakdown(&encounters(), "admission_type_id").expect("ok");

        assert_eq!(breakdown.outcomes, vec!["<30", "NO", ">30"]);
        assert_eq!(breakdown.categories.len(), 2);
        assert_eq!(breakdown.categories[0].category, "1");
        assert_eq!(breakdown.categories[0].total, 3);
        let counts: Vec<usize> = breakdown.categories[0]
            .outcomes
            .iter()
            .map(|outcome| outcome.count)
            .collect();
        assert_eq!(counts, vec![1, 1, 1]);
        assert_eq!(breakdown.labels.x_label, "Admission Type Id");
    }

    #[test]
    fn rates_sort_descending_with_mean() {
        let rates = readmission_rates(&encounters(), "admission_type_id").expect("ok");

        assert_eq!(rates.rates[0].category, "3");
        assert_eq!(rates.rates[0].rate, 100.0);
        assert_eq!(rates.rates[1].early_readmissions, 1);
        assert!((rates.rates[1].rate - 100.0 / 3.0).abs() < 1e-9);
        assert!((rates.average_rate - (100.0 + 100.0 / 3.0) / 2.0).abs() < 1e-9);
        assert_eq!(rates.labels.y_label, "Readmission Rate (%)");
    }

    #[test]
    fn unknown_category_column_is_an_error() {
        let error = readmission_rates(&encounters(), "payer_code").expect_err("unknown column");
        assert!(matches!(error, DatasetError::UnknownColumn(name) if name == "payer_code"));
    }

    #[test]
    fn correlation_covers_numeric_columns_only() {
        let matrix = correlation_matrix(&encounters(), None).expect("ok");

        assert_eq!(
            matrix.columns,
            vec!["admission_type_id", "time_in_hospital", "num_medications"]
        );
        let r = matrix
            .get("time_in_hospital", "num_medications")
            .expect("defined");
        assert!((r - 1.0).abs() < 1e-12);
        assert_eq!(matrix.get("num_medications", "num_medications"), Some(1.0));
    }

    #[test]
    fn correlation_rejects_text_columns_when_named() {
        let error = correlation_matrix(&encounters(), Some(&["time_in_hospital", "readmitted"]))
            .expect_err("text column rejected");
        assert!(matches!(error, DatasetError::NotNumeric(name) if name == "readmitted"));
    }
}
