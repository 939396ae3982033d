//! Descriptive statistics over a table.
//!
//! - [`overview`]: shape plus per-column dtype, missing and distinct counts
//! - [`describe`]: count, mean, std, min, quartiles and max of every numeric column
//! - [`correlate`]: pairwise Pearson correlation between numeric columns
//!
//! Missing values are skipped column by column (pairwise for correlation).
//! Statistics that cannot be computed are `None` rather than NaN.

use crate::column::{Column, ColumnType, ColumnValue, DType};
use crate::error::Result;
use crate::table::{unique_column_name, Table};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Row labels of a [`Description`], in output order.
pub const DESCRIBE_STATISTICS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (N−1). Needs at least two values.
pub(crate) fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}

/// Linearly interpolated percentile of already sorted values, `q` in `[0, 1]`.
pub(crate) fn percentile_linear(sorted: &[f64], q: f64) -> Option<f64> {
    match sorted.len() {
        0 => None,
        1 => Some(sorted[0]),
        len => {
            let pos = q.clamp(0.0, 1.0) * (len - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            if lower == upper {
                Some(sorted[lower])
            } else {
                let frac = pos - lower as f64;
                Some(sorted[lower] * (1.0 - frac) + sorted[upper] * frac)
            }
        }
    }
}

// ============================================================================
// Overview
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOverview {
    pub name: String,
    pub column_type: ColumnType,
    pub dtype: DType,
    pub missing: usize,
    pub unique: usize,
}

/// Shape of a table and a one-line profile of each column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub rows: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnOverview>,
}

impl Overview {
    pub fn column(&self, name: &str) -> Option<&ColumnOverview> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub fn overview(table: &Table) -> Overview {
    let columns = table
        .iter_columns()
        .map(|column| ColumnOverview {
            name: column.name().to_string(),
            column_type: column.column_type(),
            dtype: column.dtype(),
            missing: column.missing_count(),
            unique: column.unique_count(),
        })
        .collect();

    Overview {
        rows: table.row_count(),
        column_count: table.column_count(),
        columns,
    }
}

// ============================================================================
// Describe
// ============================================================================

/// Output of [`describe`]: `values[statistic][column]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub statistics: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl Description {
    pub fn get(&self, statistic: &str, column: &str) -> Option<f64> {
        let row = self.statistics.iter().position(|s| s == statistic)?;
        let col = self.columns.iter().position(|c| c == column)?;
        self.values[row][col]
    }

    /// One row per statistic, first column `"statistic"` (suffixed if a
    /// described column already has that name).
    pub fn to_table(&self) -> Result<Table> {
        let taken: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        let mut labels = Column::new(unique_column_name("statistic", &taken), ColumnType::String);
        for stat in &self.statistics {
            labels.append(ColumnValue::from(stat.as_str()))?;
        }
        let mut columns = vec![labels];
        for (c, name) in self.columns.iter().enumerate() {
            let values = self.values.iter().map(|row| ColumnValue::from(row[c]));
            columns.push(Column::from_values(name.as_str(), ColumnType::Float64, values)?);
        }
        Table::from_columns("describe", columns)
    }
}

fn describe_column(column: &Column) -> [Option<f64>; 8] {
    let mut nums = column.numeric_values();
    nums.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    [
        Some(nums.len() as f64),
        mean(&nums),
        sample_variance(&nums).map(f64::sqrt),
        nums.first().copied(),
        percentile_linear(&nums, 0.25),
        percentile_linear(&nums, 0.50),
        percentile_linear(&nums, 0.75),
        nums.last().copied(),
    ]
}

/// Summary statistics of every numeric column. Non-numeric columns are skipped.
pub fn describe(table: &Table) -> Description {
    let numeric: Vec<&Column> = table
        .iter_columns()
        .filter(|c| c.dtype().is_numeric())
        .collect();
    let per_column: Vec<[Option<f64>; 8]> = numeric.iter().map(|c| describe_column(c)).collect();

    let values = (0..DESCRIBE_STATISTICS.len())
        .map(|stat| per_column.iter().map(|stats| stats[stat]).collect())
        .collect();

    Description {
        statistics: DESCRIBE_STATISTICS.iter().map(|s| s.to_string()).collect(),
        columns: numeric.iter().map(|c| c.name().to_string()).collect(),
        values,
    }
}

// ============================================================================
// Correlation
// ============================================================================

/// Symmetric matrix of Pearson coefficients between numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Square table, first column `"column"` (suffixed if taken) naming each row.
    pub fn to_table(&self) -> Result<Table> {
        let taken: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        let mut labels = Column::new(unique_column_name("column", &taken), ColumnType::String);
        for name in &self.columns {
            labels.append(ColumnValue::from(name.as_str()))?;
        }
        let mut columns = vec![labels];
        for (j, name) in self.columns.iter().enumerate() {
            let values = self.values.iter().map(|row| ColumnValue::from(row[j]));
            columns.push(Column::from_values(name.as_str(), ColumnType::Float64, values)?);
        }
        Table::from_columns("correlation", columns)
    }
}

/// Pearson coefficient over the rows where both columns have a value.
///
/// `None` with fewer than two complete pairs or when either side is constant.
fn pearson(x: &Column, y: &Column) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = (0..x.len())
        .filter_map(|row| Some((x.get_f64(row)?, y.get_f64(row)?)))
        .unzip();
    if xs.len() < 2 || is_constant(&xs) || is_constant(&ys) {
        return None;
    }

    let mean_x = mean(&xs)?;
    let mean_y = mean(&ys)?;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (a, b) in xs.iter().zip(&ys) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Compared exactly: the deviations of a constant like 0.1 from its
/// computed mean are rounding noise, not variance.
fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

pub fn correlate(table: &Table) -> CorrelationMatrix {
    let numeric: Vec<&Column> = table
        .iter_columns()
        .filter(|c| c.dtype().is_numeric())
        .collect();
    let n = numeric.len();

    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        // exact 1.0 on the diagonal whenever the column has spread
        values[i][i] = pearson(numeric[i], numeric[i]).map(|_| 1.0);
        for j in (i + 1)..n {
            let r = pearson(numeric[i], numeric[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: numeric.iter().map(|c| c.name().to_string()).collect(),
        values,
    }
}
