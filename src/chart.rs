//! Declarative chart specifications.
//!
//! [`build`] turns a table plus a [`ChartRequest`] into a [`ChartSpec`]: the
//! kind, title, axis labels, the windowed x/y series and a few per-kind
//! rendering hints. Nothing here draws anything; a front end renders the spec.
//!
//! The series are taken from raw rows. A pie over a column with repeated
//! labels gets one slice per row; aggregate first with
//! [`crate::groupby::aggregate`] to get one slice per label.

use crate::column::ColumnValue;
use crate::error::{LensError, Result};
use crate::table::Table;
use crate::view::{self, RowWindow, SortSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Sequential "deep" palette used for pie slices, light to dark.
pub const DEEP_PALETTE: [&str; 12] = [
    "rgb(253, 253, 204)",
    "rgb(206, 236, 179)",
    "rgb(156, 219, 165)",
    "rgb(111, 201, 163)",
    "rgb(86, 177, 163)",
    "rgb(76, 153, 160)",
    "rgb(68, 130, 155)",
    "rgb(62, 108, 150)",
    "rgb(62, 82, 143)",
    "rgb(64, 60, 115)",
    "rgb(54, 43, 77)",
    "rgb(39, 26, 44)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Histogram,
    Pie,
}

impl ChartKind {
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
            ChartKind::Histogram => "histogram",
            ChartKind::Pie => "pie",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bar" => Ok(ChartKind::Bar),
            "line" => Ok(ChartKind::Line),
            "scatter" => Ok(ChartKind::Scatter),
            "histogram" => Ok(ChartKind::Histogram),
            "pie" => Ok(ChartKind::Pie),
            _ => Err(LensError::ChartKind(s.to_string())),
        }
    }
}

/// What to plot. `kind` is free text so that an unknown kind surfaces as a
/// [`LensError::ChartKind`] from [`build`] rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub kind: String,
    pub x: String,
    pub y: String,
    #[serde(default)]
    pub x_label: Option<String>,
    #[serde(default)]
    pub y_label: Option<String>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub window: RowWindow,
}

impl ChartRequest {
    pub fn new(kind: impl Into<String>, x: impl Into<String>, y: impl Into<String>) -> Self {
        ChartRequest {
            kind: kind.into(),
            x: x.into(),
            y: y.into(),
            x_label: None,
            y_label: None,
            sort: None,
            window: RowWindow::default(),
        }
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = Some(x_label.into());
        self.y_label = Some(y_label.into());
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_window(mut self, window: RowWindow) -> Self {
        self.window = window;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    Inside,
    Outside,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    /// Slice size; `None` when the y value is missing or not numeric.
    pub value: Option<f64>,
    pub color: String,
}

/// Per-kind rendering hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartHints {
    /// Bars are annotated with their y value, placed outside the bar.
    Bar {
        text: Vec<String>,
        text_position: TextPosition,
    },
    Line,
    /// Both marker color and marker size encode the y field.
    Scatter {
        color_field: String,
        size_field: String,
    },
    /// x is binned; y supplies the per-bin value. Both axes linear.
    Histogram { log_x: bool, log_y: bool },
    Pie { slices: Vec<PieSlice> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_column: String,
    pub y_column: String,
    pub x_label: String,
    pub y_label: String,
    /// Number of rows actually plotted.
    pub window: usize,
    pub sort: Option<SortSpec>,
    pub x: Vec<ColumnValue>,
    pub y: Vec<ColumnValue>,
    pub hints: ChartHints,
}

impl ChartSpec {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

fn pie_slices(x: &[ColumnValue], y: &[ColumnValue]) -> Vec<PieSlice> {
    let mut palette_slots: HashMap<String, usize> = HashMap::new();
    x.iter()
        .zip(y)
        .map(|(label, value)| {
            let label = label.label();
            let next = palette_slots.len();
            let slot = *palette_slots.entry(label.clone()).or_insert(next);
            PieSlice {
                label,
                value: value.to_f64(),
                color: DEEP_PALETTE[slot % DEEP_PALETTE.len()].to_string(),
            }
        })
        .collect()
}

/// Build a chart spec: validate, sort, keep the leading window, extract series.
pub fn build(table: &Table, request: &ChartRequest) -> Result<ChartSpec> {
    let kind: ChartKind = request.kind.parse()?;
    table.column(&request.x)?;
    table.column(&request.y)?;

    let windowed = view::sort(table, request.sort.as_ref())?.head(request.window.requested());
    let x = windowed.column(&request.x)?.values().to_vec();
    let y = windowed.column(&request.y)?.values().to_vec();

    let x_label = request.x_label.clone().unwrap_or_else(|| request.x.clone());
    let y_label = request.y_label.clone().unwrap_or_else(|| request.y.clone());

    let hints = match kind {
        ChartKind::Bar => ChartHints::Bar {
            text: y.iter().map(ColumnValue::label).collect(),
            text_position: TextPosition::Outside,
        },
        ChartKind::Line => ChartHints::Line,
        ChartKind::Scatter => ChartHints::Scatter {
            color_field: request.y.clone(),
            size_field: request.y.clone(),
        },
        ChartKind::Histogram => ChartHints::Histogram {
            log_x: false,
            log_y: false,
        },
        ChartKind::Pie => ChartHints::Pie {
            slices: pie_slices(&x, &y),
        },
    };

    Ok(ChartSpec {
        kind,
        title: format!("{} by {}", x_label, y_label),
        x_column: request.x.clone(),
        y_column: request.y.clone(),
        x_label,
        y_label,
        window: windowed.row_count(),
        sort: request.sort.clone(),
        x,
        y,
        hints,
    })
}
