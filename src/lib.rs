/// TableLens - In-Memory Tabular Exploration Engine
///
/// Load a dataset once, then slice it, group and aggregate it, summarize it
/// and describe charts over it. Every operation is a pure function of an
/// immutable `Table` and returns a new value.

pub mod error;
pub mod column;
pub mod table;
pub mod view;
pub mod groupby;
pub mod summary;
pub mod chart;
pub mod messages;
pub mod session;

pub use error::{LensError, Result};
pub use column::{Column, ColumnType, ColumnValue, DType};
pub use table::{Schema, Table};
pub use view::{project_and_window, sort, ColumnSelection, RowWindow, SortOrder, SortSpec, MIN_WINDOW};
pub use groupby::{
    aggregate, aggregate_frame, aggregate_group, group_by, select_group, top_n_groups, AggregateFunction,
    AggregateSpec, Group, GroupSelection, GroupedTable,
};
pub use summary::{correlate, describe, overview, ColumnOverview, CorrelationMatrix, Description, Overview};
pub use chart::{ChartHints, ChartKind, ChartRequest, ChartSpec, PieSlice, TextPosition};
pub use messages::{GroupParams, PreviewParams, Request, Response};
pub use session::Explorer;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_complete_workflow() {
        let csv = "product,region,quantity,price\n\
                   Widget,north,10,9.99\n\
                   Gadget,south,5,19.99\n\
                   Doohickey,north,15,4.99\n\
                   Gizmo,east,,24.50\n\
                   Widget,south,8,9.99\n\
                   Sprocket,west,20,1.25\n";
        let table = Table::from_csv("sales", csv).unwrap();
        assert_eq!(table.row_count(), 6);
        assert_eq!(table.dtype("quantity").unwrap(), DType::Numeric);
        assert_eq!(table.dtype("product").unwrap(), DType::Text);

        // Top sellers by quantity, product names only
        let top = project_and_window(
            &table,
            &ColumnSelection::new(["product"]),
            Some(&SortSpec::descending("quantity")),
            RowWindow::new(5),
        )
        .unwrap();
        assert_eq!(top.row_count(), 5);
        assert_eq!(top.get_value(0, "product").unwrap().as_string(), Some("Sprocket"));
        assert_eq!(top.get_value(1, "product").unwrap().as_string(), Some("Doohickey"));

        // Quantity per region
        let grouped = group_by(&table, "region").unwrap();
        assert_eq!(grouped.group_count(), 4);
        let totals = aggregate(
            &grouped,
            &ColumnSelection::new(["quantity"]),
            &AggregateSpec::new([AggregateFunction::Sum, AggregateFunction::Mean]),
        )
        .unwrap();
        assert_eq!(totals.columns(), vec!["region", "quantity_sum", "quantity_mean"]);
        assert_eq!(totals.get_value(0, "quantity_sum").unwrap(), ColumnValue::Int64(25));
        assert_eq!(totals.get_value(1, "quantity_mean").unwrap(), ColumnValue::Float64(6.5));
        assert!(totals.get_value(2, "quantity_sum").unwrap().is_null());

        // Statistics
        let desc = describe(&table);
        assert_eq!(desc.columns, vec!["quantity", "price"]);
        assert_eq!(desc.get("count", "quantity"), Some(5.0));
        let corr = correlate(&table);
        assert_eq!(corr.get("price", "price"), Some(1.0));

        // Pie of the aggregated totals: one slice per region
        let request = ChartRequest::new("pie", "region", "quantity_sum");
        let spec = chart::build(&totals, &request).unwrap();
        assert_eq!(spec.title, "region by quantity_sum");
        match spec.hints {
            ChartHints::Pie { slices } => {
                let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();
                assert_eq!(labels, vec!["north", "south", "east", "west"]);
                assert_eq!(slices[1].value, Some(13.0));
            }
            other => panic!("unexpected hints {:?}", other),
        }
    }

    #[test]
    fn test_explorer_round_trip() {
        let table = Table::from_json(
            "people",
            r#"[{"name":"Ann","age":31},{"name":"Bo","age":27},{"name":"Cy"}]"#,
        )
        .unwrap();
        let explorer = Explorer::new(table);
        let out: serde_json::Value =
            serde_json::from_str(&explorer.handle_json(r#"{"type":"Describe"}"#)).unwrap();
        assert_eq!(out["type"], "Description");
        assert_eq!(out["columns"], serde_json::json!(["age"]));
        assert_eq!(out["values"][0][0], serde_json::json!(2.0));
    }
}
