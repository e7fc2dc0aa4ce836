//! Mapping between worksheet tables and the record types the codecs work on.

use crate::lingo::tools::error::{Result, ToolError};
use crate::lingo::tools::model::{
    CellValue, KEY_COLUMN, KeyValueEntry, Row, TEMPLATE_COLUMNS, Table, TemplateEntry,
    VALUE_COLUMN,
};

/// Sheet name used for workbooks produced from XML.
pub const DEFAULT_SHEET: &str = "Sheet";
/// Label used in schema errors for template sheets.
const TEMPLATE_TABLE: &str = "template";

/// A single language column of a resource sheet: header text plus the
/// key/value pairs that have both a key and a value.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageColumn {
    pub language: String,
    pub entries: Vec<KeyValueEntry>,
}

/// Reads leveled rows from the first four columns (`id, name, description,
/// level`) of a hierarchy sheet.
pub fn table_rows(table: &Table) -> Result<Vec<Row>> {
    let mut rows = Vec::with_capacity(table.rows.len());
    for (index, cells) in table.rows.iter().enumerate() {
        // Header occupies sheet row 1.
        let sheet_row = index + 2;
        let id = cell_text(cells.first());
        let name = cell_text(cells.get(1));
        let description = match cells.get(2) {
            Some(CellValue::Empty) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let level = parse_level(cells.get(3), sheet_row)?;
        rows.push(Row {
            id,
            name,
            description,
            level,
        });
    }
    Ok(rows)
}

fn parse_level(cell: Option<&CellValue>, sheet_row: usize) -> Result<u32> {
    let invalid = |detail: String| {
        ToolError::InvalidInput(format!("row {sheet_row}: level {detail}"))
    };
    match cell {
        Some(CellValue::Number(value)) => {
            if value.fract() != 0.0 || *value < 0.0 || *value > f64::from(u32::MAX) {
                Err(invalid(format!("'{value}' is not a non-negative integer")))
            } else {
                Ok(*value as u32)
            }
        }
        Some(CellValue::Text(value)) => value
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid(format!("'{value}' is not a non-negative integer"))),
        Some(CellValue::Bool(value)) => Err(invalid(format!("'{value}' is not a number"))),
        Some(CellValue::Empty) | None => Err(invalid("is missing".to_string())),
    }
}

/// Extracts `(KEY, VALUE1)` pairs from a key/value sheet, skipping rows
/// without a key. Missing values become empty strings.
pub fn key_value_entries(table: &Table, table_label: &str) -> Result<Vec<KeyValueEntry>> {
    let key_idx = table
        .column_index(KEY_COLUMN)
        .ok_or_else(|| ToolError::schema(table_label, KEY_COLUMN))?;
    let value_idx = table
        .column_index(VALUE_COLUMN)
        .ok_or_else(|| ToolError::schema(table_label, VALUE_COLUMN))?;

    Ok(table
        .rows
        .iter()
        .filter_map(|cells| {
            let key = cell_text(cells.get(key_idx));
            if key.trim().is_empty() {
                return None;
            }
            Some(KeyValueEntry::new(key, cell_text(cells.get(value_idx))))
        })
        .collect())
}

/// Reads the five template fields by header name, skipping rows without a
/// key. Every template column must be present; column order is free.
pub fn template_entries(table: &Table) -> Result<Vec<TemplateEntry>> {
    let mut indices = [0usize; TEMPLATE_COLUMNS.len()];
    for (slot, column) in indices.iter_mut().zip(TEMPLATE_COLUMNS) {
        *slot = table
            .column_index(column)
            .ok_or_else(|| ToolError::schema(TEMPLATE_TABLE, column))?;
    }
    let [key, id, value1, value2, tag] = indices;

    Ok(table
        .rows
        .iter()
        .filter(|cells| !cell_text(cells.get(key)).trim().is_empty())
        .map(|cells| TemplateEntry {
            key: cell_text(cells.get(key)),
            id: cell_text(cells.get(id)),
            value1: cell_text(cells.get(value1)),
            value2: cell_text(cells.get(value2)),
            tag: cell_text(cells.get(tag)),
        })
        .collect())
}

/// Splits a resource sheet into one column per language. The first column
/// holds the keys; every other column header names a language.
pub fn language_columns(table: &Table) -> Vec<LanguageColumn> {
    table
        .columns
        .iter()
        .enumerate()
        .skip(1)
        .map(|(col_idx, language)| {
            let entries = table
                .rows
                .iter()
                .filter_map(|cells| {
                    let key = cells.first()?;
                    let value = cells.get(col_idx)?;
                    let key_text = key.to_string();
                    if value.is_empty() || key_text.trim().is_empty() {
                        return None;
                    }
                    Some(KeyValueEntry::new(key_text, value.to_string()))
                })
                .collect();
            LanguageColumn {
                language: language.clone(),
                entries,
            }
        })
        .collect()
}

/// Builds the two-column `KEY`/`VALUE1` table written for parsed XML.
pub fn entries_to_table(entries: &[KeyValueEntry]) -> Table {
    let mut table = Table::new(
        DEFAULT_SHEET,
        vec![KEY_COLUMN.to_string(), VALUE_COLUMN.to_string()],
    );
    for entry in entries {
        table.push_row(vec![
            CellValue::text(entry.key.clone()),
            CellValue::text(entry.value.clone()),
        ]);
    }
    table
}

fn cell_text(cell: Option<&CellValue>) -> String {
    cell.map(CellValue::to_string).unwrap_or_default()
}
