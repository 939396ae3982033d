/// Request and response types for an exploration session
use crate::chart::{ChartRequest, ChartSpec};
use crate::column::ColumnValue;
use crate::groupby::GroupSelection;
use crate::summary::{CorrelationMatrix, Description, Overview};
use crate::view::{ColumnSelection, RowWindow, SortSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Parameters of a sorted, projected row preview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewParams {
    pub columns: ColumnSelection,
    pub sort: Option<SortSpec>,
    pub window: RowWindow,
}

/// Parameters of a group-by request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupParams {
    /// Column to group by
    pub key: String,
    /// Function names such as `"sum"` or `"mean"`
    #[serde(default)]
    pub aggregates: Vec<String>,
    #[serde(default)]
    pub columns: ColumnSelection,
    /// A concrete group to show instead of the overview
    #[serde(default)]
    pub group: GroupSelection,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// With a concrete `group`, aggregate its rows (one row per function)
    /// instead of listing them
    #[serde(default)]
    pub aggregate_selected: bool,
}

fn default_top_n() -> usize {
    crate::view::MIN_WINDOW
}

/// Messages sent from a client to the explorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Shape and per-column profile
    Overview,

    /// Leading rows after projection and sort
    Preview(PreviewParams),

    /// Group overview or one group's rows
    Group(GroupParams),

    /// Aggregate the whole table, one row per function
    Aggregate {
        #[serde(default)]
        columns: ColumnSelection,
        aggregates: Vec<String>,
    },

    /// Numeric summary statistics
    Describe,

    /// Pairwise correlation matrix
    Correlate,

    /// Chart specification
    Chart(ChartRequest),
}

/// Messages sent from the explorer back to the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Response {
    Overview(Overview),

    /// Row-major table data
    TableData {
        table_name: String,
        columns: Vec<String>,
        rows: Vec<Vec<JsonValue>>,
    },

    Description(Description),

    Correlation(CorrelationMatrix),

    Chart(ChartSpec),

    /// Error occurred
    Error { message: String },
}

impl Response {
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }
}

impl GroupParams {
    pub fn new(key: impl Into<String>) -> Self {
        GroupParams {
            key: key.into(),
            aggregates: Vec::new(),
            columns: ColumnSelection::all(),
            group: GroupSelection::Overview,
            top_n: default_top_n(),
            aggregate_selected: false,
        }
    }

    pub fn with_group(mut self, key: impl Into<ColumnValue>) -> Self {
        self.group = GroupSelection::Group(key.into());
        self
    }
}
