//! Request dispatch for one loaded table.
//!
//! An [`Explorer`] owns a [`Table`] and answers [`Request`]s against it. Each
//! request is computed from scratch; a failing request is reported as
//! [`Response::Error`] and leaves the explorer usable.

use crate::chart;
use crate::error::Result;
use crate::groupby::{self, AggregateSpec, GroupSelection};
use crate::messages::{GroupParams, PreviewParams, Request, Response};
use crate::summary;
use crate::table::Table;
use crate::view;
use log::{debug, warn};

pub struct Explorer {
    table: Table,
}

impl Explorer {
    pub fn new(table: Table) -> Self {
        Explorer { table }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Answer one request. Errors become [`Response::Error`].
    pub fn handle(&self, request: &Request) -> Response {
        debug!("Handling {:?} on table '{}'", request, self.table.name());
        match self.dispatch(request) {
            Ok(response) => response,
            Err(e) => {
                warn!("Request on table '{}' failed: {}", self.table.name(), e);
                Response::error(e.to_string())
            }
        }
    }

    /// Decode a JSON request, answer it and encode the response.
    pub fn handle_json(&self, text: &str) -> String {
        let response = match serde_json::from_str::<Request>(text) {
            Ok(request) => self.handle(&request),
            Err(e) => {
                warn!("Invalid request: {}", e);
                Response::error(format!("Invalid message format: {}", e))
            }
        };
        match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to encode response: {}", e);
                r#"{"type":"Error","message":"Failed to encode response"}"#.to_string()
            }
        }
    }

    fn dispatch(&self, request: &Request) -> Result<Response> {
        match request {
            Request::Overview => Ok(Response::Overview(summary::overview(&self.table))),

            Request::Preview(params) => self.preview(params),

            Request::Group(params) => self.group(params),

            Request::Aggregate { columns, aggregates } => {
                let spec = AggregateSpec::parse(aggregates)?;
                let frame = groupby::aggregate_frame(&self.table, columns, &spec)?;
                Ok(table_data(&frame))
            }

            Request::Describe => Ok(Response::Description(summary::describe(&self.table))),

            Request::Correlate => Ok(Response::Correlation(summary::correlate(&self.table))),

            Request::Chart(chart_request) => {
                Ok(Response::Chart(chart::build(&self.table, chart_request)?))
            }
        }
    }

    fn preview(&self, params: &PreviewParams) -> Result<Response> {
        let view = view::project_and_window(
            &self.table,
            &params.columns,
            params.sort.as_ref(),
            params.window,
        )?;
        Ok(table_data(&view))
    }

    fn group(&self, params: &GroupParams) -> Result<Response> {
        let spec = AggregateSpec::parse(&params.aggregates)?;
        let grouped = groupby::group_by(&self.table, &params.key)?;
        debug!(
            "Grouped '{}' by '{}' into {} groups",
            self.table.name(),
            params.key,
            grouped.group_count()
        );
        let result = match &params.group {
            GroupSelection::Group(key) if params.aggregate_selected => {
                groupby::aggregate_group(&grouped, key, &params.columns, &spec)?
            }
            selection => {
                groupby::select_group(&grouped, selection, &params.columns, &spec, params.top_n)?
            }
        };
        Ok(table_data(&result))
    }
}

fn table_data(table: &Table) -> Response {
    let (columns, rows) = table.to_records();
    Response::TableData {
        table_name: table.name().to_string(),
        columns,
        rows,
    }
}
