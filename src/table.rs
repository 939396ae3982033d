//! TableLens Table Implementation
//!
//! A Table is an ordered collection of equally long, uniquely named columns.
//! Tables are built once (from columns, rows, CSV or JSON) and never mutated:
//! projection, truncation and reordering all return a new Table, so the
//! source stays available for re-analysis under a different choice.
//!
//! # Examples
//!
//! ```
//! use tablelens::{ColumnSelection, ColumnType, ColumnValue, Schema, Table};
//!
//! let schema = Schema::new(vec![
//!     ("name".to_string(), ColumnType::String),
//!     ("score".to_string(), ColumnType::Int32),
//! ]);
//! let table = Table::from_rows(
//!     "scores",
//!     schema,
//!     vec![
//!         vec![ColumnValue::from("a"), ColumnValue::Int32(10)],
//!         vec![ColumnValue::from("b"), ColumnValue::Null],
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table.missing_count("score").unwrap(), 1);
//!
//! let names = table.select(&ColumnSelection::new(["name"])).unwrap();
//! assert_eq!(names.columns(), vec!["name"]);
//! ```

use crate::column::{Column, ColumnType, ColumnValue, DType};
use crate::error::{LensError, Result};
use crate::view::{ColumnSelection, RowWindow};
use std::collections::{HashMap, HashSet};

/// Cell spellings read as missing values when decoding text input.
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
];

/// Schema definition with column names and types.
///
/// # Examples
///
/// ```
/// use tablelens::{Schema, ColumnType};
///
/// let schema = Schema::new(vec![
///     ("id".to_string(), ColumnType::Int32),
///     ("email".to_string(), ColumnType::String),
/// ]);
///
/// assert_eq!(schema.len(), 2);
/// assert_eq!(schema.get_column_index("email"), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<(String, ColumnType)>,
}

impl Schema {
    pub fn new(columns: Vec<(String, ColumnType)>) -> Self {
        Schema { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get_column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _)| n == name)
    }

    /// Returns (name, type) for the column at `index`.
    pub fn get_column_info(&self, index: usize) -> Option<(&str, ColumnType)> {
        self.columns.get(index).map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn get_column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ty)| *ty)
    }
}

/// Immutable in-memory columnar dataset.
#[derive(Clone, PartialEq)]
pub struct Table {
    name: String,
    schema: Schema,
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Assemble a table from prepared columns.
    ///
    /// Fails with [`LensError::DuplicateColumn`] if two columns share a name and
    /// with [`LensError::LengthMismatch`] if the columns differ in length.
    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name()) {
                return Err(LensError::DuplicateColumn(col.name().to_string()));
            }
            if col.len() != row_count {
                return Err(LensError::LengthMismatch {
                    column: col.name().to_string(),
                    expected: row_count,
                    found: col.len(),
                });
            }
        }
        Ok(Self::from_parts(name.into(), columns, row_count))
    }

    /// Build a table row by row against a schema. Each row lists one value per
    /// schema column, in schema order.
    pub fn from_rows(name: impl Into<String>, schema: Schema, rows: Vec<Vec<ColumnValue>>) -> Result<Self> {
        let mut columns: Vec<Column> = schema
            .columns
            .iter()
            .map(|(col_name, col_type)| Column::new(col_name.clone(), *col_type))
            .collect();

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(LensError::Parse(format!(
                    "Row {} has {} values, expected {}",
                    row_idx,
                    row.len(),
                    columns.len()
                )));
            }
            for (col, value) in columns.iter_mut().zip(row) {
                col.append(value)?;
            }
        }

        Self::from_columns(name, columns)
    }

    /// Internal constructor for derived tables whose columns are already
    /// known to be consistent.
    fn from_parts(name: String, columns: Vec<Column>, row_count: usize) -> Self {
        let schema = Schema::new(
            columns
                .iter()
                .map(|c| (c.name().to_string(), c.column_type()))
                .collect(),
        );
        Table {
            name,
            schema,
            columns,
            row_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Column names in table order.
    pub fn columns(&self) -> Vec<&str> {
        self.schema.get_column_names()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.schema
            .get_column_index(name)
            .map(|idx| &self.columns[idx])
            .ok_or_else(|| LensError::Schema(name.to_string()))
    }

    pub fn iter_columns(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn dtype(&self, name: &str) -> Result<DType> {
        self.column(name).map(Column::dtype)
    }

    pub fn column_type(&self, name: &str) -> Result<ColumnType> {
        self.column(name).map(Column::column_type)
    }

    pub fn get_value(&self, row: usize, column: &str) -> Result<ColumnValue> {
        let col = self.column(column)?;
        col.get(row).cloned().ok_or(LensError::RowOutOfRange {
            row,
            len: self.row_count,
        })
    }

    pub fn get_row(&self, row: usize) -> Result<HashMap<String, ColumnValue>> {
        if row >= self.row_count {
            return Err(LensError::RowOutOfRange {
                row,
                len: self.row_count,
            });
        }

        Ok(self
            .columns
            .iter()
            .map(|col| (col.name().to_string(), col.values()[row].clone()))
            .collect())
    }

    pub fn iter_rows(&self) -> TableRowIterator<'_> {
        TableRowIterator {
            table: self,
            index: 0,
        }
    }

    /// Project onto the selected columns, in selection order.
    ///
    /// An empty selection means "all columns" and returns the table unchanged.
    pub fn select(&self, selection: &ColumnSelection) -> Result<Table> {
        if selection.is_empty() {
            return Ok(self.clone());
        }
        let columns = selection
            .names()
            .iter()
            .map(|name| self.column(name).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_parts(self.name.clone(), columns, self.row_count))
    }

    /// The first `k` rows, with `k` clamped the same way as a [`RowWindow`].
    pub fn head(&self, k: usize) -> Table {
        let k = RowWindow::new(k).resolve(self.row_count);
        let indices: Vec<usize> = (0..k).collect();
        self.take(&indices)
    }

    /// Gather rows by index, in the order given.
    pub(crate) fn take(&self, indices: &[usize]) -> Table {
        let columns = self.columns.iter().map(|c| c.take(indices)).collect();
        Self::from_parts(self.name.clone(), columns, indices.len())
    }

    pub fn missing_count(&self, name: &str) -> Result<usize> {
        self.column(name).map(Column::missing_count)
    }

    /// Distinct non-missing values in a column.
    pub fn unique_count(&self, name: &str) -> Result<usize> {
        self.column(name).map(Column::unique_count)
    }

    // ========================================================================
    // Serialization Methods
    // ========================================================================

    /// Column names plus row-major JSON values, aligned with the names.
    pub fn to_records(&self) -> (Vec<String>, Vec<Vec<serde_json::Value>>) {
        let names = self.columns.iter().map(|c| c.name().to_string()).collect();
        let rows = (0..self.row_count)
            .map(|row| self.columns.iter().map(|c| c.values()[row].to_json()).collect())
            .collect();
        (names, rows)
    }

    /// Export table to JSON format (array of objects).
    pub fn to_json(&self) -> Result<String> {
        let rows: Vec<serde_json::Value> = (0..self.row_count)
            .map(|row| {
                let obj: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .map(|c| (c.name().to_string(), c.values()[row].to_json()))
                    .collect();
                serde_json::Value::Object(obj)
            })
            .collect();

        Ok(serde_json::to_string_pretty(&rows)?)
    }

    /// Create a table from a CSV string.
    ///
    /// The first line is the header. Column types are inferred from every
    /// non-missing cell of the column, widening as needed:
    /// - all `true`/`false` (case-insensitive) → BOOL
    /// - integers fitting in i32 → INT32, larger integers → INT64
    /// - any decimal among numbers → FLOAT64
    /// - anything else → STRING
    ///
    /// Empty cells and common NA spellings (`NA`, `NaN`, `null`, ...) are missing.
    ///
    /// ```
    /// use tablelens::{ColumnType, Table};
    ///
    /// let csv = "id,name,score\n1,Alice,95.5\n2,Bob,87";
    /// let table = Table::from_csv("students", csv).unwrap();
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.column_type("score").unwrap(), ColumnType::Float64);
    /// ```
    pub fn from_csv(name: &str, csv: &str) -> Result<Table> {
        let mut all_rows = parse_csv_rows(csv);

        if all_rows.is_empty() {
            return Err(LensError::Parse("CSV is empty".to_string()));
        }

        let column_names = all_rows.remove(0);
        if column_names.iter().all(|h| h.trim().is_empty()) {
            return Err(LensError::Parse("CSV header is empty".to_string()));
        }

        let rows: Vec<Vec<String>> = all_rows
            .into_iter()
            .filter(|row| !row.iter().all(|f| f.is_empty()))
            .collect();

        for (i, row) in rows.iter().enumerate() {
            if row.len() > column_names.len() {
                return Err(LensError::Parse(format!(
                    "Row {} has {} fields, but the header has {}",
                    i + 1,
                    row.len(),
                    column_names.len()
                )));
            }
        }

        let mut columns = Vec::with_capacity(column_names.len());
        for (col_idx, col_name) in column_names.iter().enumerate() {
            let cells: Vec<&str> = rows
                .iter()
                .map(|row| row.get(col_idx).map_or("", String::as_str))
                .collect();
            let col_type = infer_csv_column_type(&cells);
            let mut column = Column::new(col_name.trim(), col_type);
            for cell in cells {
                column.append(parse_csv_value(cell, col_type)?)?;
            }
            columns.push(column);
        }

        Table::from_columns(name, columns)
    }

    /// Create a table from a JSON string (array of objects).
    ///
    /// Columns appear in order of first appearance across the objects; a key
    /// missing from an object is a missing value. Integers map to INT32/INT64,
    /// any float in a numeric column makes it FLOAT64, and a column mixing
    /// unrelated kinds falls back to STRING.
    ///
    /// ```
    /// use tablelens::Table;
    ///
    /// let json = r#"[{"id": 1, "name": "Alice"}, {"id": 2, "name": "Bob"}]"#;
    /// let table = Table::from_json("users", json).unwrap();
    /// assert_eq!(table.len(), 2);
    /// ```
    pub fn from_json(name: &str, json: &str) -> Result<Table> {
        let parsed: Vec<serde_json::Value> = serde_json::from_str(json)?;

        let mut objects = Vec::with_capacity(parsed.len());
        for item in &parsed {
            let obj = item
                .as_object()
                .ok_or_else(|| LensError::Parse("Expected array of objects".to_string()))?;
            objects.push(obj);
        }

        let mut column_names: Vec<&str> = Vec::new();
        for obj in &objects {
            for key in obj.keys() {
                if !column_names.contains(&key.as_str()) {
                    column_names.push(key);
                }
            }
        }

        let mut columns = Vec::with_capacity(column_names.len());
        for col_name in column_names {
            let cells: Vec<Option<&serde_json::Value>> =
                objects.iter().map(|obj| obj.get(col_name)).collect();
            let col_type = cells
                .iter()
                .flatten()
                .filter_map(|v| json_value_type(v))
                .fold(None, |acc, ty| Some(widen(acc, ty)))
                .unwrap_or(ColumnType::String);

            let mut column = Column::new(col_name, col_type);
            for cell in cells {
                column.append(json_to_column_value(cell, col_type))?;
            }
            columns.push(column);
        }

        Table::from_columns(name, columns)
    }
}

// ============================================================================
// Helper functions for decoding
// ============================================================================

/// Parse a CSV string into rows, handling quoted fields with embedded newlines
fn parse_csv_rows(csv: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut current_row = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = csv.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                // Doubled quote inside a quoted field
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current_field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                current_row.push(std::mem::take(&mut current_field));
            }
            '\n' if !in_quotes => {
                current_row.push(std::mem::take(&mut current_field));
                rows.push(std::mem::take(&mut current_row));
            }
            '\r' if !in_quotes => {}
            _ => current_field.push(c),
        }
    }

    if !current_field.is_empty() || !current_row.is_empty() {
        current_row.push(current_field);
        rows.push(current_row);
    }

    rows
}

/// `base`, or `base_1`, `base_2`, ... when `base` is already taken.
pub(crate) fn unique_column_name(base: &str, taken: &[&str]) -> String {
    if !taken.contains(&base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{}_{}", base, i))
        .find(|candidate| !taken.contains(&candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

fn is_missing_marker(value: &str) -> bool {
    MISSING_MARKERS.contains(&value.trim())
}

/// Infer the type of a single non-missing CSV cell
fn infer_type_from_csv_value(value: &str) -> ColumnType {
    let trimmed = value.trim();

    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
        return ColumnType::Bool;
    }

    if let Ok(n) = trimmed.parse::<i64>() {
        if i32::try_from(n).is_ok() {
            return ColumnType::Int32;
        }
        return ColumnType::Int64;
    }

    // only decimal spellings; "inf" or "Infinity" stay text
    let decimal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if decimal && trimmed.parse::<f64>().is_ok() {
        return ColumnType::Float64;
    }

    ColumnType::String
}

fn infer_csv_column_type(cells: &[&str]) -> ColumnType {
    cells
        .iter()
        .filter(|c| !is_missing_marker(c))
        .map(|c| infer_type_from_csv_value(c))
        .fold(None, |acc, ty| Some(widen(acc, ty)))
        .unwrap_or(ColumnType::String)
}

/// Least common type of what has been seen so far and the next cell.
fn widen(current: Option<ColumnType>, next: ColumnType) -> ColumnType {
    use ColumnType::*;
    match (current, next) {
        (None, ty) => ty,
        (Some(a), b) if a == b => a,
        (Some(Int32), Int64) | (Some(Int64), Int32) => Int64,
        (Some(Int32 | Int64 | Float64), Int32 | Int64 | Float64) => Float64,
        _ => String,
    }
}

/// Parse a CSV value into a ColumnValue based on the inferred column type
fn parse_csv_value(value: &str, col_type: ColumnType) -> Result<ColumnValue> {
    if is_missing_marker(value) {
        return Ok(ColumnValue::Null);
    }
    let trimmed = value.trim();

    let parse_err = |ty: &str| LensError::Parse(format!("Cannot parse '{}' as {}", trimmed, ty));
    match col_type {
        ColumnType::Int32 => trimmed
            .parse::<i32>()
            .map(ColumnValue::Int32)
            .map_err(|_| parse_err("INT32")),
        ColumnType::Int64 => trimmed
            .parse::<i64>()
            .map(ColumnValue::Int64)
            .map_err(|_| parse_err("INT64")),
        ColumnType::Float64 => trimmed
            .parse::<f64>()
            .map(ColumnValue::Float64)
            .map_err(|_| parse_err("FLOAT64")),
        ColumnType::Bool => {
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(ColumnValue::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(ColumnValue::Bool(false))
            } else {
                Err(parse_err("BOOL"))
            }
        }
        ColumnType::String => Ok(ColumnValue::String(value.to_string())),
    }
}

fn json_value_type(value: &serde_json::Value) -> Option<ColumnType> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(_) => Some(ColumnType::Bool),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(v) if i32::try_from(v).is_ok() => Some(ColumnType::Int32),
            Some(_) => Some(ColumnType::Int64),
            None => Some(ColumnType::Float64),
        },
        _ => Some(ColumnType::String),
    }
}

fn json_to_column_value(value: Option<&serde_json::Value>, col_type: ColumnType) -> ColumnValue {
    let value = match value {
        None | Some(serde_json::Value::Null) => return ColumnValue::Null,
        Some(v) => v,
    };
    match (col_type, value) {
        (ColumnType::String, serde_json::Value::String(s)) => ColumnValue::String(s.clone()),
        (ColumnType::String, other) => ColumnValue::String(other.to_string()),
        (ColumnType::Bool, serde_json::Value::Bool(b)) => ColumnValue::Bool(*b),
        (ColumnType::Int32, serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map_or(ColumnValue::Null, ColumnValue::Int32),
        (ColumnType::Int64, serde_json::Value::Number(n)) => {
            n.as_i64().map_or(ColumnValue::Null, ColumnValue::Int64)
        }
        (ColumnType::Float64, serde_json::Value::Number(n)) => {
            n.as_f64().map_or(ColumnValue::Null, ColumnValue::Float64)
        }
        _ => ColumnValue::Null,
    }
}

pub struct TableRowIterator<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Iterator for TableRowIterator<'a> {
    type Item = HashMap<String, ColumnValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.table.row_count {
            None
        } else {
            let result = self.table.get_row(self.index).ok();
            self.index += 1;
            result
        }
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Table {{ name: '{}', columns: {}, rows: {} }}",
            self.name,
            self.schema.len(),
            self.row_count
        )
    }
}
