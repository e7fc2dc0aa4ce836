use std::fmt;

use serde::{Deserialize, Serialize};

/// Header of the key column shared by every key/value table.
pub const KEY_COLUMN: &str = "KEY";
/// Header of the primary value column.
pub const VALUE_COLUMN: &str = "VALUE1";
/// Header row of the five-column template sheet.
pub const TEMPLATE_COLUMNS: [&str; 5] = ["KEY", "ID", "Value1", "Value2", "Tag"];

/// Represents a single spreadsheet cell. The variant is kept so that
/// reconciliation can tell `1` apart from `"1"` or a blank cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Blank cell, or a cell holding an empty string.
    #[default]
    Empty,
    /// Plain string content.
    Text(String),
    /// Numeric content. Integers read from the workbook are widened to `f64`.
    Number(f64),
    /// Boolean content.
    Bool(bool),
}

impl CellValue {
    /// Builds a text cell, mapping the empty string to [`CellValue::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(value) => f.write_str(value),
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// A worksheet: header names plus data rows. Every row has exactly one cell
/// per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Creates an empty table with the given header.
    pub fn new(sheet_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Returns the index of the first column whose header equals `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Appends a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut cells: Vec<CellValue>) {
        cells.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(cells);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A leveled record read from a hierarchy sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    pub name: String,
    /// Carried along from the sheet; no output shape uses it yet.
    pub description: Option<String>,
    /// Relative depth hint compared against neighbouring rows.
    pub level: u32,
}

impl Row {
    pub fn new(id: impl Into<String>, name: impl Into<String>, level: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            level,
        }
    }
}

/// A key/value pair used by the flat codec and by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueEntry {
    pub key: String,
    pub value: String,
}

impl KeyValueEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A fixed five-field record of the template (game data) format. Missing
/// fields are held as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub key: String,
    pub id: String,
    pub value1: String,
    pub value2: String,
    pub tag: String,
}

/// Change status assigned to every row of a reconciled table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Unchanged,
    Modified,
    Added,
}
