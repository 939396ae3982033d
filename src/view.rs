//! TableLens View Implementation
//!
//! Views are read-only derived tables: a column projection, a stable
//! single-column sort and a leading row window. The pipeline order is fixed
//! as **select columns → sort → truncate**, so the window always keeps the
//! leading rows of the *sorted* data.

use crate::column::ColumnValue;
use crate::error::Result;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Lower bound for row windows and top-N group windows.
pub const MIN_WINDOW: usize = 5;

/// Sort order specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order (smallest first)
    #[default]
    Ascending,
    /// Descending order (largest first)
    Descending,
}

/// Single-column sort. Missing values always sort last, whatever the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column name to sort by
    pub column: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortSpec {
    pub fn ascending(column: impl Into<String>) -> Self {
        SortSpec::new(column, SortOrder::Ascending)
    }

    pub fn descending(column: impl Into<String>) -> Self {
        SortSpec::new(column, SortOrder::Descending)
    }

    pub fn new(column: impl Into<String>, order: SortOrder) -> Self {
        SortSpec {
            column: column.into(),
            order,
        }
    }
}

/// Ordered, de-duplicated list of column names. Empty means "all columns".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ColumnSelection(Vec<String>);

impl ColumnSelection {
    pub fn all() -> Self {
        ColumnSelection(Vec::new())
    }

    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selected: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !selected.contains(&name) {
                selected.push(name);
            }
        }
        ColumnSelection(selected)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for ColumnSelection {
    fn from(names: Vec<String>) -> Self {
        ColumnSelection::new(names)
    }
}

impl From<ColumnSelection> for Vec<String> {
    fn from(selection: ColumnSelection) -> Self {
        selection.0
    }
}

/// Requested number of leading rows to keep.
///
/// The request is clamped against the actual row count `n` when resolved:
/// `k` ends up in `[min(MIN_WINDOW, n), n]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowWindow(usize);

impl RowWindow {
    pub fn new(k: usize) -> Self {
        RowWindow(k)
    }

    /// A window that keeps every row.
    pub fn all() -> Self {
        RowWindow(usize::MAX)
    }

    pub fn requested(self) -> usize {
        self.0
    }

    pub fn resolve(self, n: usize) -> usize {
        self.0.clamp(MIN_WINDOW.min(n), n)
    }
}

impl Default for RowWindow {
    fn default() -> Self {
        RowWindow(MIN_WINDOW)
    }
}

/// Row permutation that sorts `table` by `spec`.
///
/// The sort is stable: rows with equal keys keep their original relative
/// order. `None` yields the identity permutation.
pub fn sorted_indices(table: &Table, spec: Option<&SortSpec>) -> Result<Vec<usize>> {
    let mut indices: Vec<usize> = (0..table.row_count()).collect();
    let spec = match spec {
        Some(spec) => spec,
        None => return Ok(indices),
    };

    let values = table.column(&spec.column)?.values();
    indices.sort_by(|&a, &b| compare_values(&values[a], &values[b], spec.order));
    Ok(indices)
}

/// Compare two column values for a sort. Nulls go last in both directions.
fn compare_values(val_a: &ColumnValue, val_b: &ColumnValue, order: SortOrder) -> Ordering {
    match (val_a.is_null(), val_b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let base_cmp = val_a.natural_cmp(val_b);
            match order {
                SortOrder::Ascending => base_cmp,
                SortOrder::Descending => base_cmp.reverse(),
            }
        }
    }
}

/// Stable sort of the whole table. Without a spec the table is returned as is.
pub fn sort(table: &Table, spec: Option<&SortSpec>) -> Result<Table> {
    if spec.is_none() {
        return Ok(table.clone());
    }
    let order = sorted_indices(table, spec)?;
    Ok(table.take(&order))
}

/// Project, sort, then keep the leading window of rows.
///
/// The sort column is looked up in the source table, so a table may be sorted
/// by a column that the selection leaves out.
pub fn project_and_window(
    table: &Table,
    selection: &ColumnSelection,
    spec: Option<&SortSpec>,
    window: RowWindow,
) -> Result<Table> {
    let projected = table.select(selection)?;
    let sorted = match spec {
        Some(_) => projected.take(&sorted_indices(table, spec)?),
        None => projected,
    };
    Ok(sorted.head(window.requested()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use crate::error::LensError;
    use crate::table::Schema;

    fn students() -> Table {
        let schema = Schema::new(vec![
            ("name".to_string(), ColumnType::String),
            ("score".to_string(), ColumnType::Int32),
        ]);
        Table::from_rows(
            "students",
            schema,
            vec![
                vec![ColumnValue::from("Bob"), ColumnValue::Int32(85)],
                vec![ColumnValue::from("Alice"), ColumnValue::Int32(92)],
                vec![ColumnValue::from("Eve"), ColumnValue::Null],
                vec![ColumnValue::from("Carol"), ColumnValue::Int32(85)],
                vec![ColumnValue::from("Dan"), ColumnValue::Int32(70)],
                vec![ColumnValue::from("Frank"), ColumnValue::Int32(99)],
                vec![ColumnValue::from("Gina"), ColumnValue::Int32(60)],
            ],
        )
        .unwrap()
    }

    fn names(table: &Table) -> Vec<String> {
        table
            .column("name")
            .unwrap()
            .iter()
            .map(|v| v.as_string().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_sort_descending_nulls_last() {
        let sorted = sort(&students(), Some(&SortSpec::descending("score"))).unwrap();
        assert_eq!(
            names(&sorted),
            vec!["Frank", "Alice", "Bob", "Carol", "Dan", "Gina", "Eve"]
        );
    }

    #[test]
    fn test_sort_ascending_is_stable() {
        let sorted = sort(&students(), Some(&SortSpec::ascending("score"))).unwrap();
        // Bob precedes Carol in the source, both 85
        assert_eq!(
            names(&sorted),
            vec!["Gina", "Dan", "Bob", "Carol", "Alice", "Frank", "Eve"]
        );
    }

    #[test]
    fn test_sort_text_lexicographic() {
        let sorted = sort(&students(), Some(&SortSpec::ascending("name"))).unwrap();
        assert_eq!(names(&sorted)[0], "Alice");
        assert_eq!(names(&sorted)[6], "Gina");
    }

    #[test]
    fn test_sort_none_is_noop() {
        let table = students();
        assert_eq!(sort(&table, None).unwrap(), table);
    }

    #[test]
    fn test_sort_unknown_column() {
        let err = sort(&students(), Some(&SortSpec::ascending("grade"))).unwrap_err();
        assert!(matches!(err, LensError::Schema(c) if c == "grade"));
    }

    #[test]
    fn test_window_resolve() {
        assert_eq!(RowWindow::new(2).resolve(10), 5);
        assert_eq!(RowWindow::new(7).resolve(10), 7);
        assert_eq!(RowWindow::new(70).resolve(10), 10);
        assert_eq!(RowWindow::new(2).resolve(3), 3);
        assert_eq!(RowWindow::new(0).resolve(0), 0);
        assert_eq!(RowWindow::all().resolve(12), 12);
    }

    #[test]
    fn test_project_and_window_sorts_before_truncating() {
        let table = students();
        let out = project_and_window(
            &table,
            &ColumnSelection::new(["name"]),
            Some(&SortSpec::descending("score")),
            RowWindow::new(5),
        )
        .unwrap();

        // The top scorer is the last source row; truncating first would lose it.
        assert_eq!(out.columns(), vec!["name"]);
        assert_eq!(names(&out), vec!["Frank", "Alice", "Bob", "Carol", "Dan"]);
    }

    #[test]
    fn test_project_and_window_without_sort() {
        let out = project_and_window(
            &students(),
            &ColumnSelection::all(),
            None,
            RowWindow::new(6),
        )
        .unwrap();
        assert_eq!(out.row_count(), 6);
        assert_eq!(out.columns(), vec!["name", "score"]);
        assert_eq!(names(&out)[0], "Bob");
    }

    #[test]
    fn test_selection_dedupes() {
        let selection = ColumnSelection::new(["a", "b", "a"]);
        assert_eq!(selection.names(), &["a".to_string(), "b".to_string()]);
        let parsed: ColumnSelection = serde_json::from_str(r#"["x","x","y"]"#).unwrap();
        assert_eq!(parsed.names().len(), 2);
    }
}
