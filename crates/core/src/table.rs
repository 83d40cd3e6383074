use serde::Serialize;

/// An in-memory worksheet: an ordered header and string-valued data rows.
///
/// Invariants, enforced at construction:
/// - every row has exactly `columns.len()` cells (short rows are padded
///   with empty strings, long rows truncated);
/// - header cells are trimmed of surrounding whitespace.
///
/// Cells are always strings. Comparisons downstream are exact string
/// equality — no coercion, no case folding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        let columns = columns.into_iter().map(|c| c.trim().to_string()).collect();
        Self { columns, rows: Vec::new() }
    }

    /// Build a table from a raw cell grid: first row is the header, the
    /// rest are data. The caller decides whether a grid with no data rows
    /// is an error; an empty grid here just yields an empty header.
    pub fn from_values(mut values: Vec<Vec<String>>) -> Self {
        if values.is_empty() {
            return Self::new(Vec::new());
        }
        let header = values.remove(0);
        let mut table = Self::new(header);
        for row in values {
            table.push_row(row);
        }
        table
    }

    /// Append a data row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column by exact name (first occurrence).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell value by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// The full cell grid (header first), as written to a sink.
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.columns.clone());
        values.extend(self.rows.iter().cloned());
        values
    }

    /// Rows as JSON objects keyed by column name, in column order.
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut obj = serde_json::Map::new();
                for (col, cell) in self.columns.iter().zip(row) {
                    obj.insert(col.clone(), serde_json::Value::String(cell.clone()));
                }
                serde_json::Value::Object(obj)
            })
            .collect()
    }
}
