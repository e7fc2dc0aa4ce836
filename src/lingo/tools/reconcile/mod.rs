//! Key-based reconciliation of two key/value tables.
//!
//! The destination table keeps its shape: existing rows stay in place and
//! have their value overwritten when the source disagrees, and source keys
//! the destination lacks are appended as new rows.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::lingo::tools::error::{Result, ToolError};
use crate::lingo::tools::model::{
    CellValue, ChangeKind, KEY_COLUMN, KeyValueEntry, Table, VALUE_COLUMN,
};

/// Label used in schema errors for the table providing new values.
pub const SOURCE_LABEL: &str = "source";
/// Label used in schema errors for the table being updated.
pub const DESTINATION_LABEL: &str = "destination";

/// The merged destination table and one change annotation per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub table: Table,
    pub changes: Vec<ChangeKind>,
}

/// Modification and addition counts reported back to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub modified: usize,
    pub added: usize,
}

impl Reconciliation {
    pub fn summary(&self) -> ChangeSummary {
        let mut summary = ChangeSummary::default();
        for change in &self.changes {
            match change {
                ChangeKind::Modified => summary.modified += 1,
                ChangeKind::Added => summary.added += 1,
                ChangeKind::Unchanged => {}
            }
        }
        summary
    }

    /// Rows that were modified or added, with their row index.
    pub fn marked_rows(&self) -> impl Iterator<Item = (usize, ChangeKind)> + '_ {
        self.changes
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, change)| *change != ChangeKind::Unchanged)
    }
}

/// Key text to source cells. Insertion order is the first time a key was
/// seen; a later duplicate replaces the cells but keeps that position.
type Lookup = IndexMap<String, SourceCells>;

struct SourceCells {
    key: CellValue,
    value: CellValue,
}

/// Reconciles `destination` against a tabular `source`. Both tables must
/// carry `KEY` and `VALUE1` columns; this is checked before anything changes.
pub fn reconcile(source: &Table, destination: Table) -> Result<Reconciliation> {
    let (src_key, src_value) = key_value_columns(source, SOURCE_LABEL)?;
    let columns = key_value_columns(&destination, DESTINATION_LABEL)?;

    let mut lookup = Lookup::new();
    for row in &source.rows {
        let key = key_text(row.get(src_key));
        if key.is_empty() {
            continue;
        }
        lookup.insert(
            key,
            SourceCells {
                key: row.get(src_key).cloned().unwrap_or_default(),
                value: row.get(src_value).cloned().unwrap_or_default(),
            },
        );
    }
    Ok(apply(lookup, destination, columns))
}

/// Reconciles `destination` against key/value pairs, for instance the
/// entries of a resource-string document. Values are compared as text.
pub fn reconcile_entries(source: &[KeyValueEntry], destination: Table) -> Result<Reconciliation> {
    let columns = key_value_columns(&destination, DESTINATION_LABEL)?;

    let mut lookup = Lookup::new();
    for entry in source.iter().filter(|entry| !entry.key.is_empty()) {
        lookup.insert(
            entry.key.clone(),
            SourceCells {
                key: CellValue::text(entry.key.clone()),
                value: CellValue::text(entry.value.clone()),
            },
        );
    }
    Ok(apply(lookup, destination, columns))
}

fn apply(
    lookup: Lookup,
    mut destination: Table,
    (key_idx, value_idx): (usize, usize),
) -> Reconciliation {
    debug!(
        source_keys = lookup.len(),
        destination_rows = destination.rows.len(),
        "reconciling tables"
    );
    let mut changes = Vec::with_capacity(destination.rows.len() + lookup.len());
    let mut existing: HashSet<String> = HashSet::new();

    let width = destination.columns.len();
    for row in &mut destination.rows {
        row.resize(width, CellValue::Empty);
        let key = key_text(row.get(key_idx));
        let mut change = ChangeKind::Unchanged;
        if let Some(source) = lookup.get(&key).filter(|_| !key.is_empty()) {
            if row[value_idx] != source.value {
                row[value_idx] = source.value.clone();
                change = ChangeKind::Modified;
            }
        }
        changes.push(change);
        existing.insert(key);
    }

    for (key, source) in lookup {
        if existing.contains(&key) {
            continue;
        }
        let mut row = vec![CellValue::Empty; width];
        row[key_idx] = source.key;
        row[value_idx] = source.value;
        destination.rows.push(row);
        changes.push(ChangeKind::Added);
    }

    Reconciliation {
        table: destination,
        changes,
    }
}

fn key_value_columns(table: &Table, label: &str) -> Result<(usize, usize)> {
    let key = table
        .column_index(KEY_COLUMN)
        .ok_or_else(|| ToolError::schema(label, KEY_COLUMN))?;
    let value = table
        .column_index(VALUE_COLUMN)
        .ok_or_else(|| ToolError::schema(label, VALUE_COLUMN))?;
    Ok((key, value))
}

fn key_text(cell: Option<&CellValue>) -> String {
    cell.map(CellValue::to_string).unwrap_or_default()
}
