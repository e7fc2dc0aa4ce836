use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::lingo::tools::config::Settings;
use crate::lingo::tools::error::{Result, ToolError};
use crate::lingo::tools::flatten;
use crate::lingo::tools::hierarchy::{self, Node};
use crate::lingo::tools::io::excel_read;
use crate::lingo::tools::io::excel_write::{self, SheetContent};
use crate::lingo::tools::io::xml_read;
use crate::lingo::tools::io::xml_write::{self, HierarchyLayout};
use crate::lingo::tools::model::Table;
use crate::lingo::tools::reconcile::{self, Reconciliation};

/// The three operations offered to a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    XmlToSpreadsheet,
    SpreadsheetToXml,
    Reconcile,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::XmlToSpreadsheet => write!(f, "XML to spreadsheet"),
            Operation::SpreadsheetToXml => write!(f, "spreadsheet to XML"),
            Operation::Reconcile => write!(f, "spreadsheet reconcile"),
        }
    }
}

/// Output document shape for [`spreadsheet_to_xml`].
#[derive(Debug, Clone, PartialEq)]
pub enum XmlShape {
    /// One flat entry per keyed row.
    Flat,
    /// Nested entries rebuilt from the leveled rows.
    Hierarchy(HierarchyLayout),
    /// One resource-string file per language column.
    Resources,
    /// Five-field template records.
    Template,
}

/// Where an operation writes its result.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTarget {
    /// Output folder; defaults to the folder of the input file.
    pub folder: Option<PathBuf>,
    /// File base name; anything from the first `.` on is discarded.
    pub base_name: String,
}

impl OutputTarget {
    pub fn new(folder: Option<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            folder,
            base_name: base_name.into(),
        }
    }

    /// Resolves `<folder>/<base><suffix>.<extension>`.
    pub fn resolve(&self, input: &Path, suffix: &str, extension: &str) -> Result<PathBuf> {
        let stem = self
            .base_name
            .split('.')
            .next()
            .unwrap_or_default()
            .trim();
        if stem.is_empty() {
            return Err(ToolError::InvalidInput("output file name is empty".into()));
        }
        let folder = match &self.folder {
            Some(folder) => folder.clone(),
            None => input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        Ok(folder.join(format!("{stem}{suffix}.{extension}")))
    }
}

/// Outcome handed back to the caller: success flag, a human readable message
/// and the counts the front end displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationReport {
    pub operation: Operation,
    pub success: bool,
    pub message: String,
    pub modified: usize,
    pub added: usize,
    /// Entries dropped by the lenient row policy.
    pub skipped: usize,
    pub written: Vec<PathBuf>,
}

impl OperationReport {
    fn succeeded(operation: Operation, written: Vec<PathBuf>) -> Self {
        Self {
            operation,
            success: true,
            message: format!("{operation} succeeded"),
            modified: 0,
            added: 0,
            skipped: 0,
            written,
        }
    }

    /// Folds an operation result into a report, turning errors into a
    /// failed report carrying the error text.
    pub fn from_result(operation: Operation, result: Result<OperationReport>) -> Self {
        result.unwrap_or_else(|error| Self {
            operation,
            success: false,
            message: format!("{operation} failed: {error}"),
            modified: 0,
            added: 0,
            skipped: 0,
            written: Vec::new(),
        })
    }
}

/// Converts a language XML document into a two-column `KEY`/`VALUE1`
/// workbook.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %target.base_name)
)]
pub fn xml_to_spreadsheet(
    input: &Path,
    target: &OutputTarget,
    settings: &Settings,
) -> Result<OperationReport> {
    ensure_exists(input)?;
    let output = target.resolve(input, "", "xlsx")?;

    let parsed = xml_read::read_entries(input, settings.include_nested, settings.row_policy)?;
    info!(
        entry_count = parsed.entries.len(),
        skipped = parsed.skipped,
        "parsed entries from XML source"
    );
    let table = flatten::entries_to_table(&parsed.entries);
    excel_write::write_table(&output, &table)?;

    let mut report = OperationReport::succeeded(Operation::XmlToSpreadsheet, vec![output]);
    report.skipped = parsed.skipped;
    if parsed.skipped > 0 {
        report.message = format!(
            "{} ({} entries skipped)",
            report.message, parsed.skipped
        );
    }
    Ok(report)
}

/// Converts a worksheet into XML of the requested shape.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %target.base_name, ?shape)
)]
pub fn spreadsheet_to_xml(
    input: &Path,
    target: &OutputTarget,
    shape: &XmlShape,
    settings: &Settings,
) -> Result<OperationReport> {
    ensure_exists(input)?;
    let table = excel_read::read_table(input, settings.sheet.as_deref())?;
    info!(row_count = table.row_count(), "read rows from workbook");

    let written = match shape {
        XmlShape::Flat => {
            let output = target.resolve(input, "", "xml")?;
            let entries = flatten::key_value_entries(&table, "input")?;
            xml_write::write_flat(&output, &entries)?;
            vec![output]
        }
        XmlShape::Hierarchy(layout) => {
            let output = target.resolve(input, "", "xml")?;
            let root = tree_from_table(&table)?;
            xml_write::write_hierarchy(&output, &root, layout)?;
            vec![output]
        }
        XmlShape::Resources => {
            let mut written = Vec::new();
            for column in flatten::language_columns(&table) {
                let output = target.resolve(input, &format!("_{}", column.language), "xml")?;
                debug!(
                    language = %column.language,
                    entry_count = column.entries.len(),
                    "writing resource strings"
                );
                xml_write::write_resources(&output, &column.entries)?;
                written.push(output);
            }
            written
        }
        XmlShape::Template => {
            let output = target.resolve(input, "", "xml")?;
            let entries = flatten::template_entries(&table)?;
            xml_write::write_template(&output, &entries)?;
            vec![output]
        }
    };

    Ok(OperationReport::succeeded(Operation::SpreadsheetToXml, written))
}

/// Builds the tree of a hierarchy sheet and renders it as an outline.
pub fn hierarchy_outline(input: &Path, settings: &Settings) -> Result<String> {
    ensure_exists(input)?;
    let table = excel_read::read_table(input, settings.sheet.as_deref())?;
    Ok(tree_from_table(&table)?.outline())
}

fn tree_from_table(table: &Table) -> Result<Node> {
    let rows = flatten::table_rows(table)?;
    let root = hierarchy::build_tree(&rows)?;
    debug!(node_count = root.descendant_count(), "hierarchy built");
    Ok(root)
}

/// Reconciles `destination` against `source` and overwrites `destination`
/// with the merged table, filling modified and added rows with the palette
/// colours. A `.xml` source is read as a resource-string document.
///
/// Other sheets of the destination are written back with their cell values
/// in their original order; their formatting is not kept.
#[instrument(
    level = "info",
    skip_all,
    fields(source = %source.display(), destination = %destination.display())
)]
pub fn reconcile_files(
    source: &Path,
    destination: &Path,
    settings: &Settings,
) -> Result<OperationReport> {
    ensure_exists(source)?;
    ensure_exists(destination)?;

    let current = excel_read::read_table(destination, settings.sheet.as_deref())?;
    let merged: Reconciliation = match extension(source).as_deref() {
        Some("xml") => {
            let entries = xml_read::read_resources(source)?;
            info!(entry_count = entries.len(), "parsed resource strings");
            reconcile::reconcile_entries(&entries, current)?
        }
        Some("xlsx") | Some("xlsm") => {
            let table = excel_read::read_table(source, settings.sheet.as_deref())?;
            info!(row_count = table.row_count(), "read source workbook");
            reconcile::reconcile(&table, current)?
        }
        _ => return Err(ToolError::UnsupportedInput(source.to_path_buf())),
    };

    let siblings = excel_read::read_raw_sheets(destination)?;
    let sheets: Vec<SheetContent<'_>> = siblings
        .iter()
        .map(|sheet| {
            if sheet.name == merged.table.sheet_name {
                SheetContent::Table {
                    table: &merged.table,
                    marks: &merged.changes,
                }
            } else {
                SheetContent::Raw(sheet)
            }
        })
        .collect();
    debug!(sheet_count = sheets.len(), "rewriting destination workbook");
    excel_write::write_workbook(destination, &sheets, &settings.palette)?;

    let summary = merged.summary();
    info!(
        modified = summary.modified,
        added = summary.added,
        "destination updated"
    );
    let mut report =
        OperationReport::succeeded(Operation::Reconcile, vec![destination.to_path_buf()]);
    report.modified = summary.modified;
    report.added = summary.added;
    report.message = format!(
        "{} ({} modified, {} added)",
        report.message, summary.modified, summary.added
    );
    Ok(report)
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ToolError::MissingInput(path.to_path_buf()))
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}
