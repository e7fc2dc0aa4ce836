use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::lingo::tools::error::{Result, ToolError};
use crate::lingo::tools::model::{CellValue, Table};

/// Reads a worksheet into a [`Table`]. When `sheet` is `None` the first sheet
/// of the workbook is used.
///
/// Rows and columns that are entirely empty are removed before the header is
/// taken, so the first non-empty row always becomes the header.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ToolError::InvalidWorkbook("workbook contains no sheets".into()))?,
    };
    let range = read_required_sheet(&mut workbook, &sheet_name)?;

    let grid: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect();
    let mut grid = strip_empty(grid);
    debug!(
        sheet = %sheet_name,
        rows = grid.len(),
        "worksheet loaded after stripping empty rows and columns"
    );

    if grid.is_empty() {
        return Ok(Table::new(sheet_name, Vec::new()));
    }

    let header = grid.remove(0);
    let columns = header.iter().map(CellValue::to_string).collect();
    let mut table = Table::new(sheet_name, columns);
    for row in grid {
        table.push_row(row);
    }
    Ok(table)
}

/// A worksheet as stored: no stripping and no header detection. `origin`
/// is the zero-based `(row, column)` of the first used cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub origin: (u32, u32),
    pub cells: Vec<Vec<CellValue>>,
}

/// Reads every sheet of the workbook in workbook order. Cell values are
/// kept; formatting is not.
pub fn read_raw_sheets(path: &Path) -> Result<Vec<RawSheet>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = read_required_sheet(&mut workbook, &name)?;
        let origin = range.start().unwrap_or((0, 0));
        let cells = range
            .rows()
            .map(|row| row.iter().map(cell_value).collect())
            .collect();
        sheets.push(RawSheet {
            name,
            origin,
            cells,
        });
    }
    Ok(sheets)
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

/// Drops rows whose cells are all empty, then columns whose cells are all
/// empty in the remaining rows.
pub fn strip_empty(grid: Vec<Vec<CellValue>>) -> Vec<Vec<CellValue>> {
    let mut rows: Vec<Vec<CellValue>> = grid
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let keep: Vec<bool> = (0..width)
        .map(|col| {
            rows.iter()
                .any(|row| row.get(col).is_some_and(|cell| !cell.is_empty()))
        })
        .collect();

    for row in &mut rows {
        row.resize(width, CellValue::Empty);
        let mut col = 0;
        row.retain(|_| {
            let kept = keep[col];
            col += 1;
            kept
        });
    }
    rows
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => CellValue::text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::DateTime(value) => CellValue::Number(*value),
        DataType::Empty => CellValue::Empty,
        other => CellValue::text(other.to_string()),
    }
}
