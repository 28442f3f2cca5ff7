use std::collections::BTreeSet;
use std::fmt;

use anyhow::{Result, bail};
use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common tabular dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                String(_) => 3,
                Date(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Parse a raw text cell. Empty text becomes `Null`; otherwise the first
    /// of integer, float, ISO date that parses wins, falling back to text.
    pub fn parse(s: &str) -> CellValue {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if let Some(d) = parse_date(s) {
            return CellValue::Date(d);
        }
        CellValue::String(s.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Interpret the value as an `f64` for axis projection.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Interpret the value as a calendar date for the time filter.
    ///
    /// Integers in a plausible year range are treated as January 1st of that
    /// year so that bare `year` columns can drive the time range.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::Integer(y) if (1000..=3000).contains(y) => {
                NaiveDate::from_ymd_opt(*y as i32, 1, 1)
            }
            CellValue::String(s) => parse_date(s),
            _ => None,
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Column – one named column of uniform inferred type
// ---------------------------------------------------------------------------

/// The inferred scalar type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Date,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Unify the cell types observed in a column. Nulls are ignored; mixed
    /// integer/float unifies to float, anything else mixed demotes to text.
    pub fn unify(cells: &[CellValue]) -> ColumnType {
        let mut seen_int = false;
        let mut seen_float = false;
        let mut seen_date = false;
        let mut seen_text = false;
        for cell in cells {
            match cell {
                CellValue::Integer(_) => seen_int = true,
                CellValue::Float(_) => seen_float = true,
                CellValue::Date(_) => seen_date = true,
                CellValue::String(_) => seen_text = true,
                CellValue::Null => {}
            }
        }
        if seen_text {
            ColumnType::Text
        } else if seen_date {
            if seen_int || seen_float {
                ColumnType::Text
            } else {
                ColumnType::Date
            }
        } else if seen_float {
            ColumnType::Float
        } else if seen_int {
            ColumnType::Integer
        } else {
            ColumnType::Text
        }
    }
}

/// A single named column: an ordered sequence of cells.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    pub values: Vec<CellValue>,
}

impl Column {
    /// Build a column from already-typed cells, inferring the column type.
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let ty = ColumnType::unify(&values);
        Column {
            name: name.into(),
            ty,
            values,
        }
    }

    /// Build a column by parsing raw text cells.
    pub fn from_text(name: impl Into<String>, raw: &[&str]) -> Self {
        let values: Vec<CellValue> = raw.iter().map(|s| CellValue::parse(s)).collect();
        Column::new(name, values)
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An ordered sequence of equally long columns; rows are aligned by position.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, enforcing the equal-column-length invariant.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let n = first.values.len();
            for col in &columns {
                if col.values.len() != n {
                    bail!(
                        "column '{}' has {} rows, expected {}",
                        col.name,
                        col.values.len(),
                        n
                    );
                }
            }
        }
        Ok(Table { columns })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Ordered column names.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of numeric-typed columns, in table order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.ty.is_numeric())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Sorted set of distinct non-null values in a column.
    pub fn distinct_values(&self, name: &str) -> BTreeSet<CellValue> {
        self.column(name)
            .map(|c| {
                c.values
                    .iter()
                    .filter(|v| !v.is_null())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The cells of one row, paired with their column names.
    pub fn row(&self, idx: usize) -> impl Iterator<Item = (&str, &CellValue)> {
        self.columns
            .iter()
            .map(move |c| (c.name.as_str(), &c.values[idx]))
    }

    /// Derive a new table containing only the given rows, in the given order.
    /// The original table is left untouched.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                ty: c.ty,
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Table { columns }
    }

    /// Drop rows where every cell is null, mirroring the usual
    /// `dropna(how="all")` cleaning step.
    pub fn drop_blank_rows(&self) -> Table {
        let keep: Vec<usize> = (0..self.n_rows())
            .filter(|&i| self.columns.iter().any(|c| !c.values[i].is_null()))
            .collect();
        if keep.len() == self.n_rows() {
            self.clone()
        } else {
            self.select_rows(&keep)
        }
    }
}
