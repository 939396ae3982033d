//! Group-by and aggregation.
//!
//! [`group_by`] partitions a table's rows by the distinct values of one key
//! column. Groups are kept in first-occurrence order of their key in the
//! source table, and rows whose key is missing form a group of their own.
//!
//! Aggregation never fails because of a column's type: a numeric-only
//! function applied to text or booleans, or to a column with no values in a
//! group, produces a null cell.

use crate::column::{Column, ColumnType, ColumnValue, DType, ValueKey};
use crate::error::{LensError, Result};
use crate::summary::{mean, percentile_linear, sample_variance};
use crate::table::{unique_column_name, Table};
use crate::view::{ColumnSelection, RowWindow};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Supported aggregation functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Count,
    Sum,
    Mean,
    Median,
    Min,
    Max,
    Std,
    Var,
}

impl AggregateFunction {
    pub const ALL: [AggregateFunction; 8] = [
        AggregateFunction::Count,
        AggregateFunction::Sum,
        AggregateFunction::Mean,
        AggregateFunction::Median,
        AggregateFunction::Min,
        AggregateFunction::Max,
        AggregateFunction::Std,
        AggregateFunction::Var,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Mean => "mean",
            AggregateFunction::Median => "median",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Std => "std",
            AggregateFunction::Var => "var",
        }
    }

    /// Functions that only make sense over numbers.
    pub fn is_numeric_only(self) -> bool {
        !matches!(
            self,
            AggregateFunction::Count | AggregateFunction::Min | AggregateFunction::Max
        )
    }

    /// Storage type of this function's result for an input column type.
    fn output_type(self, input: ColumnType) -> ColumnType {
        match self {
            AggregateFunction::Count => ColumnType::Int64,
            AggregateFunction::Sum => match input {
                ColumnType::Int32 | ColumnType::Int64 => ColumnType::Int64,
                _ => ColumnType::Float64,
            },
            AggregateFunction::Min | AggregateFunction::Max => input,
            _ => ColumnType::Float64,
        }
    }

    /// Reduce the values of one column over a set of rows.
    fn apply(self, column: &Column, rows: &[usize]) -> ColumnValue {
        let values = || rows.iter().filter_map(|&r| column.get(r)).filter(|v| !v.is_null());

        match self {
            AggregateFunction::Count => ColumnValue::Int64(rows.len() as i64),
            AggregateFunction::Min => values()
                .min_by(|a, b| a.natural_cmp(b))
                .cloned()
                .unwrap_or(ColumnValue::Null),
            AggregateFunction::Max => values()
                .max_by(|a, b| a.natural_cmp(b))
                .cloned()
                .unwrap_or(ColumnValue::Null),
            _ if column.dtype() != DType::Numeric => ColumnValue::Null,
            AggregateFunction::Sum => match column.column_type() {
                ColumnType::Int32 | ColumnType::Int64 => {
                    let mut seen = false;
                    let total: i128 = values()
                        .filter_map(ColumnValue::as_i64)
                        .inspect(|_| seen = true)
                        .map(i128::from)
                        .sum();
                    match i64::try_from(total) {
                        Ok(total) if seen => ColumnValue::Int64(total),
                        _ => ColumnValue::Null,
                    }
                }
                _ => {
                    let nums: Vec<f64> = values().filter_map(ColumnValue::to_f64).collect();
                    if nums.is_empty() {
                        ColumnValue::Null
                    } else {
                        ColumnValue::Float64(nums.iter().sum())
                    }
                }
            },
            AggregateFunction::Mean => {
                let nums: Vec<f64> = values().filter_map(ColumnValue::to_f64).collect();
                mean(&nums).into()
            }
            AggregateFunction::Median => {
                let mut nums: Vec<f64> = values().filter_map(ColumnValue::to_f64).collect();
                nums.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
                percentile_linear(&nums, 0.5).into()
            }
            AggregateFunction::Var => {
                let nums: Vec<f64> = values().filter_map(ColumnValue::to_f64).collect();
                sample_variance(&nums).into()
            }
            AggregateFunction::Std => {
                let nums: Vec<f64> = values().filter_map(ColumnValue::to_f64).collect();
                sample_variance(&nums).map(f64::sqrt).into()
            }
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregateFunction {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "count" => Ok(AggregateFunction::Count),
            "sum" => Ok(AggregateFunction::Sum),
            "mean" | "avg" | "average" => Ok(AggregateFunction::Mean),
            "median" | "med" => Ok(AggregateFunction::Median),
            "min" | "minimum" => Ok(AggregateFunction::Min),
            "max" | "maximum" => Ok(AggregateFunction::Max),
            "std" | "stddev" => Ok(AggregateFunction::Std),
            "var" | "variance" => Ok(AggregateFunction::Var),
            _ => Err(LensError::UnknownAggregate(s.to_string())),
        }
    }
}

/// Ordered, de-duplicated set of aggregate functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AggregateFunction>", into = "Vec<AggregateFunction>")]
pub struct AggregateSpec(Vec<AggregateFunction>);

impl AggregateSpec {
    pub fn new(functions: impl IntoIterator<Item = AggregateFunction>) -> Self {
        let mut selected = Vec::new();
        for func in functions {
            if !selected.contains(&func) {
                selected.push(func);
            }
        }
        AggregateSpec(selected)
    }

    /// Parse function names such as `["sum", "count"]`.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let functions = names
            .iter()
            .map(|n| n.as_ref().parse())
            .collect::<Result<Vec<_>>>()?;
        Ok(AggregateSpec::new(functions))
    }

    pub fn functions(&self) -> &[AggregateFunction] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<AggregateFunction>> for AggregateSpec {
    fn from(functions: Vec<AggregateFunction>) -> Self {
        AggregateSpec::new(functions)
    }
}

impl From<AggregateSpec> for Vec<AggregateFunction> {
    fn from(spec: AggregateSpec) -> Self {
        spec.0
    }
}

/// Which part of a grouping the caller wants to see.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "lowercase")]
pub enum GroupSelection {
    /// No concrete group chosen: show the top-N aggregate overview.
    #[default]
    Overview,
    /// The rows of a single group.
    Group(ColumnValue),
}

/// One partition of the source rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    key: ColumnValue,
    rows: Vec<usize>,
}

impl Group {
    /// Key value; [`ColumnValue::Null`] for the missing-key group.
    pub fn key(&self) -> &ColumnValue {
        &self.key
    }

    /// Source row indices, ascending.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A table partitioned by the values of one key column.
#[derive(Debug, Clone)]
pub struct GroupedTable<'a> {
    table: &'a Table,
    key_column: String,
    key_type: ColumnType,
    groups: Vec<Group>,
}

impl<'a> GroupedTable<'a> {
    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn keys(&self) -> Vec<&ColumnValue> {
        self.groups.iter().map(Group::key).collect()
    }

    /// Look up a group by key. Numeric keys match across integer and float
    /// spellings of the same number (`4` finds the `4.0` group).
    pub fn find(&self, key: &ColumnValue) -> Option<&Group> {
        let wanted = key.clone().coerce_to(self.key_type).key();
        self.groups.iter().find(|g| g.key.key() == wanted)
    }

    /// The sub-table holding the rows of one group, in source order.
    pub fn get_group(&self, key: &ColumnValue) -> Result<Table> {
        self.find(key)
            .map(|group| self.table.take(&group.rows))
            .ok_or_else(|| LensError::UnknownGroup(key.label()))
    }
}

/// Partition `table` by the distinct values of `key`.
pub fn group_by<'a>(table: &'a Table, key: &str) -> Result<GroupedTable<'a>> {
    let column = table.column(key)?;
    if table.is_empty() {
        return Err(LensError::EmptyTable("group"));
    }

    let mut positions: HashMap<ValueKey, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();
    for (row, value) in column.iter().enumerate() {
        let slot = *positions.entry(value.key()).or_insert_with(|| {
            groups.push(Group {
                key: value.clone(),
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].rows.push(row);
    }

    Ok(GroupedTable {
        table,
        key_column: key.to_string(),
        key_type: column.column_type(),
        groups,
    })
}

/// Columns an aggregation runs over: the selection, or every numeric
/// column other than `exclude` when the selection is empty.
fn resolve_targets<'t>(
    table: &'t Table,
    selection: &ColumnSelection,
    exclude: Option<&str>,
) -> Result<Vec<&'t Column>> {
    if selection.is_empty() {
        return Ok(table
            .iter_columns()
            .filter(|c| c.dtype().is_numeric() && Some(c.name()) != exclude)
            .collect());
    }
    selection.names().iter().map(|n| table.column(n)).collect()
}

/// One row per group, one column per (selected column × function).
///
/// The first output column repeats the group key; the others are named
/// `"{column}_{function}"`, with a numeric suffix if that name is already
/// used. `count` is the number of rows in the group.
pub fn aggregate(
    grouped: &GroupedTable<'_>,
    selection: &ColumnSelection,
    spec: &AggregateSpec,
) -> Result<Table> {
    let table = grouped.table;
    let key_source = table.column(&grouped.key_column)?;
    let targets = resolve_targets(table, selection, Some(&grouped.key_column))?;

    let mut key_column = Column::new(grouped.key_column.clone(), key_source.column_type());
    for group in &grouped.groups {
        key_column.append(group.key.clone())?;
    }

    let mut out = vec![key_column];
    for column in targets {
        for &func in spec.functions() {
            let taken: Vec<&str> = out.iter().map(Column::name).collect();
            let name = unique_column_name(&format!("{}_{}", column.name(), func), &taken);
            let mut result = Column::new(name, func.output_type(column.column_type()));
            for group in &grouped.groups {
                result.append(func.apply(column, &group.rows))?;
            }
            out.push(result);
        }
    }

    Table::from_columns(table.name(), out)
}

/// How many leading groups a top-N overview keeps.
pub fn top_n_groups(grouped: &GroupedTable<'_>, requested: usize) -> usize {
    RowWindow::new(requested).resolve(grouped.group_count())
}

/// Either the rows of one concrete group or the aggregate overview.
///
/// A concrete key always wins over `top_n`; `top_n` only bounds the overview.
pub fn select_group(
    grouped: &GroupedTable<'_>,
    selection: &GroupSelection,
    columns: &ColumnSelection,
    spec: &AggregateSpec,
    top_n: usize,
) -> Result<Table> {
    match selection {
        GroupSelection::Group(key) => grouped.get_group(key)?.select(columns),
        GroupSelection::Overview => {
            let overview = aggregate(grouped, columns, spec)?;
            Ok(overview.head(top_n_groups(grouped, top_n)))
        }
    }
}

/// Whole-table aggregation: one row per function, one column per selected
/// column (all columns when the selection is empty).
///
/// The first column names the function. It is called `"aggregate"`, or
/// `"aggregate_1"` and so on when a selected column already has that name.
/// Numeric columns produce FLOAT64 results. Other columns produce STRING
/// results so that counts and extremes can share a column.
pub fn aggregate_frame(
    table: &Table,
    selection: &ColumnSelection,
    spec: &AggregateSpec,
) -> Result<Table> {
    let targets: Vec<&Column> = if selection.is_empty() {
        table.iter_columns().collect()
    } else {
        resolve_targets(table, selection, None)?
    };
    let all_rows: Vec<usize> = (0..table.row_count()).collect();

    let taken: Vec<&str> = targets.iter().map(|c| c.name()).collect();
    let mut labels = Column::new(unique_column_name("aggregate", &taken), ColumnType::String);
    for func in spec.functions() {
        labels.append(ColumnValue::from(func.name()))?;
    }

    let mut out = vec![labels];
    for column in targets {
        let numeric = column.dtype().is_numeric();
        let col_type = if numeric { ColumnType::Float64 } else { ColumnType::String };
        let mut result = Column::new(column.name(), col_type);
        for &func in spec.functions() {
            let value = match func.apply(column, &all_rows) {
                ColumnValue::Null => ColumnValue::Null,
                v if numeric => v.to_f64().into(),
                v => ColumnValue::String(v.to_string()),
            };
            result.append(value)?;
        }
        out.push(result);
    }

    Table::from_columns(table.name(), out)
}

/// [`aggregate_frame`] over the rows of one group.
pub fn aggregate_group(
    grouped: &GroupedTable<'_>,
    key: &ColumnValue,
    selection: &ColumnSelection,
    spec: &AggregateSpec,
) -> Result<Table> {
    aggregate_frame(&grouped.get_group(key)?, selection, spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Schema;

    fn scores() -> Table {
        let schema = Schema::new(vec![
            ("name".to_string(), ColumnType::String),
            ("score".to_string(), ColumnType::Int32),
        ]);
        Table::from_rows(
            "scores",
            schema,
            vec![
                vec![ColumnValue::from("a"), ColumnValue::Int32(10)],
                vec![ColumnValue::from("b"), ColumnValue::Int32(20)],
                vec![ColumnValue::from("a"), ColumnValue::Int32(30)],
            ],
        )
        .unwrap()
    }

    fn sales() -> Table {
        let schema = Schema::new(vec![
            ("region".to_string(), ColumnType::String),
            ("rep".to_string(), ColumnType::String),
            ("units".to_string(), ColumnType::Int32),
            ("price".to_string(), ColumnType::Float64),
        ]);
        let rows = vec![
            ("north", "ann", Some(3), Some(2.0)),
            ("south", "bo", Some(5), None),
            ("north", "cy", Some(7), Some(4.0)),
            ("east", "di", None, Some(1.0)),
            ("west", "ed", Some(1), Some(8.0)),
            ("", "fi", Some(2), Some(3.0)),
            ("central", "gu", Some(4), Some(5.0)),
            ("north", "ho", Some(11), Some(6.0)),
        ];
        let rows = rows
            .into_iter()
            .map(|(region, rep, units, price)| {
                vec![
                    if region.is_empty() { ColumnValue::Null } else { ColumnValue::from(region) },
                    ColumnValue::from(rep),
                    ColumnValue::from(units),
                    ColumnValue::from(price),
                ]
            })
            .collect();
        Table::from_rows("sales", schema, rows).unwrap()
    }

    #[test]
    fn test_group_by_first_occurrence_order() {
        let table = scores();
        let grouped = group_by(&table, "score").unwrap();
        assert_eq!(grouped.group_count(), 3);

        let grouped = group_by(&table, "name").unwrap();
        assert_eq!(
            grouped.keys(),
            vec![&ColumnValue::from("a"), &ColumnValue::from("b")]
        );
        assert_eq!(grouped.groups()[0].rows(), &[0, 2]);
        assert_eq!(grouped.groups()[1].rows(), &[1]);
    }

    #[test]
    fn test_group_by_missing_key_forms_group() {
        let table = sales();
        let grouped = group_by(&table, "region").unwrap();
        let keys: Vec<String> = grouped.keys().iter().map(|k| k.label()).collect();
        assert_eq!(keys, vec!["north", "south", "east", "west", "missing", "central"]);
        assert_eq!(grouped.get_group(&ColumnValue::Null).unwrap().row_count(), 1);
    }

    #[test]
    fn test_group_by_errors() {
        let table = scores();
        assert!(matches!(group_by(&table, "team"), Err(LensError::Schema(_))));

        let empty = table.take(&[]);
        assert!(matches!(group_by(&empty, "name"), Err(LensError::EmptyTable(_))));
    }

    #[test]
    fn test_aggregate_sum_count() {
        let table = scores();
        let grouped = group_by(&table, "name").unwrap();
        let spec = AggregateSpec::new([AggregateFunction::Sum, AggregateFunction::Count]);
        let out = aggregate(&grouped, &ColumnSelection::new(["score"]), &spec).unwrap();

        assert_eq!(out.columns(), vec!["name", "score_sum", "score_count"]);
        assert_eq!(out.get_value(0, "name").unwrap().as_string(), Some("a"));
        assert_eq!(out.get_value(0, "score_sum").unwrap(), ColumnValue::Int64(40));
        assert_eq!(out.get_value(0, "score_count").unwrap(), ColumnValue::Int64(2));
        assert_eq!(out.get_value(1, "score_sum").unwrap(), ColumnValue::Int64(20));
        assert_eq!(out.get_value(1, "score_count").unwrap(), ColumnValue::Int64(1));
    }

    #[test]
    fn test_aggregate_statistics() {
        let table = sales();
        let grouped = group_by(&table, "region").unwrap();
        let spec = AggregateSpec::parse(&["mean", "median", "std", "var", "min", "max"]).unwrap();
        let out = aggregate(&grouped, &ColumnSelection::new(["units"]), &spec).unwrap();

        // north: 3, 7, 11
        assert_eq!(out.get_value(0, "units_mean").unwrap(), ColumnValue::Float64(7.0));
        assert_eq!(out.get_value(0, "units_median").unwrap(), ColumnValue::Float64(7.0));
        assert_eq!(out.get_value(0, "units_var").unwrap(), ColumnValue::Float64(16.0));
        assert_eq!(out.get_value(0, "units_std").unwrap(), ColumnValue::Float64(4.0));
        assert_eq!(out.get_value(0, "units_min").unwrap(), ColumnValue::Int32(3));
        assert_eq!(out.get_value(0, "units_max").unwrap(), ColumnValue::Int32(11));

        // south has one value: no sample variance
        assert!(out.get_value(1, "units_std").unwrap().is_null());
        // east has only a missing value
        assert!(out.get_value(2, "units_mean").unwrap().is_null());
        assert!(out.get_value(2, "units_min").unwrap().is_null());
    }

    #[test]
    fn test_aggregate_text_degrades_to_null() {
        let table = sales();
        let grouped = group_by(&table, "region").unwrap();
        let spec = AggregateSpec::parse(&["count", "min", "max", "mean", "sum"]).unwrap();
        let out = aggregate(&grouped, &ColumnSelection::new(["rep"]), &spec).unwrap();

        assert_eq!(out.get_value(0, "rep_count").unwrap(), ColumnValue::Int64(3));
        assert_eq!(out.get_value(0, "rep_min").unwrap().as_string(), Some("ann"));
        assert_eq!(out.get_value(0, "rep_max").unwrap().as_string(), Some("ho"));
        assert!(out.get_value(0, "rep_mean").unwrap().is_null());
        assert!(out.get_value(0, "rep_sum").unwrap().is_null());
    }

    #[test]
    fn test_aggregate_empty_selection_uses_numeric_columns() {
        let table = sales();
        let grouped = group_by(&table, "rep").unwrap();
        let spec = AggregateSpec::new([AggregateFunction::Count]);
        let out = aggregate(&grouped, &ColumnSelection::all(), &spec).unwrap();
        assert_eq!(out.columns(), vec!["rep", "units_count", "price_count"]);
        assert_eq!(out.row_count(), 8);
    }

    #[test]
    fn test_top_n_groups_clamp() {
        let table = sales();
        let grouped = group_by(&table, "region").unwrap();
        assert_eq!(top_n_groups(&grouped, 1), 5);
        assert_eq!(top_n_groups(&grouped, 50), 6);

        let small = scores();
        let grouped = group_by(&small, "name").unwrap();
        assert_eq!(top_n_groups(&grouped, 5), 2);
    }

    #[test]
    fn test_select_group_branches() {
        let table = sales();
        let grouped = group_by(&table, "region").unwrap();
        let spec = AggregateSpec::new([AggregateFunction::Sum]);
        let cols = ColumnSelection::new(["units"]);

        let detail = select_group(
            &grouped,
            &GroupSelection::Group(ColumnValue::from("north")),
            &cols,
            &spec,
            1,
        )
        .unwrap();
        assert_eq!(detail.columns(), vec!["units"]);
        assert_eq!(detail.row_count(), 3);

        let overview = select_group(&grouped, &GroupSelection::Overview, &cols, &spec, 1).unwrap();
        assert_eq!(overview.row_count(), 5);
        assert_eq!(overview.get_value(0, "units_sum").unwrap(), ColumnValue::Int64(21));

        let missing = select_group(
            &grouped,
            &GroupSelection::Group(ColumnValue::from("mars")),
            &cols,
            &spec,
            5,
        );
        assert!(matches!(missing, Err(LensError::UnknownGroup(_))));
    }

    #[test]
    fn test_aggregate_frame() {
        let table = sales();
        let spec = AggregateSpec::parse(&["count", "max"]).unwrap();
        let out = aggregate_frame(&table, &ColumnSelection::new(["units", "rep"]), &spec).unwrap();

        assert_eq!(out.columns(), vec!["aggregate", "units", "rep"]);
        assert_eq!(out.get_value(0, "aggregate").unwrap().as_string(), Some("count"));
        assert_eq!(out.get_value(0, "units").unwrap(), ColumnValue::Float64(8.0));
        assert_eq!(out.get_value(1, "units").unwrap(), ColumnValue::Float64(11.0));
        assert_eq!(out.get_value(1, "rep").unwrap().as_string(), Some("ho"));
    }

    #[test]
    fn test_find_matches_numeric_spellings() {
        let table = Table::from_csv("t", "price,units\n2.5,1\n4.0,2\n4.0,3\n").unwrap();
        let grouped = group_by(&table, "price").unwrap();
        let group = grouped.get_group(&ColumnValue::Int32(4)).unwrap();
        assert_eq!(group.row_count(), 2);
        assert!(grouped.find(&ColumnValue::Float64(4.0)).is_some());
        assert!(grouped.find(&ColumnValue::Int32(3)).is_none());

        let table = scores();
        let grouped = group_by(&table, "score").unwrap();
        assert_eq!(grouped.get_group(&ColumnValue::Float64(20.0)).unwrap().row_count(), 1);
        assert!(matches!(
            grouped.get_group(&ColumnValue::Float64(20.5)),
            Err(LensError::UnknownGroup(_))
        ));
    }

    #[test]
    fn test_aggregate_group() {
        let table = sales();
        let grouped = group_by(&table, "region").unwrap();
        let spec = AggregateSpec::parse(&["sum", "max"]).unwrap();
        let out = aggregate_group(
            &grouped,
            &ColumnValue::from("north"),
            &ColumnSelection::new(["units", "price"]),
            &spec,
        )
        .unwrap();

        assert_eq!(out.columns(), vec!["aggregate", "units", "price"]);
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.get_value(0, "units").unwrap(), ColumnValue::Float64(21.0));
        assert_eq!(out.get_value(1, "price").unwrap(), ColumnValue::Float64(6.0));

        let missing = aggregate_group(&grouped, &ColumnValue::from("mars"), &ColumnSelection::all(), &spec);
        assert!(matches!(missing, Err(LensError::UnknownGroup(_))));
    }

    #[test]
    fn test_generated_names_avoid_existing_columns() {
        let schema = Schema::new(vec![
            ("score_sum".to_string(), ColumnType::String),
            ("score".to_string(), ColumnType::Int32),
            ("aggregate".to_string(), ColumnType::Int32),
        ]);
        let table = Table::from_rows(
            "clash",
            schema,
            vec![
                vec![ColumnValue::from("x"), ColumnValue::Int32(1), ColumnValue::Int32(7)],
                vec![ColumnValue::from("x"), ColumnValue::Int32(2), ColumnValue::Int32(8)],
            ],
        )
        .unwrap();

        let grouped = group_by(&table, "score_sum").unwrap();
        let spec = AggregateSpec::new([AggregateFunction::Sum]);
        let out = aggregate(&grouped, &ColumnSelection::new(["score"]), &spec).unwrap();
        assert_eq!(out.columns(), vec!["score_sum", "score_sum_1"]);
        assert_eq!(out.get_value(0, "score_sum_1").unwrap(), ColumnValue::Int64(3));

        let frame = aggregate_frame(&table, &ColumnSelection::new(["aggregate"]), &spec).unwrap();
        assert_eq!(frame.columns(), vec!["aggregate_1", "aggregate"]);
        assert_eq!(frame.get_value(0, "aggregate").unwrap(), ColumnValue::Float64(15.0));
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!("AVG".parse::<AggregateFunction>().unwrap(), AggregateFunction::Mean);
        assert!(matches!(
            "mode".parse::<AggregateFunction>(),
            Err(LensError::UnknownAggregate(_))
        ));
        let spec = AggregateSpec::parse(&["sum", "sum", "count"]).unwrap();
        assert_eq!(spec.functions(), &[AggregateFunction::Sum, AggregateFunction::Count]);

        let json: AggregateSpec = serde_json::from_str(r#"["median","var"]"#).unwrap();
        assert_eq!(json.functions(), &[AggregateFunction::Median, AggregateFunction::Var]);
    }
}
