use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook, Worksheet};

use crate::lingo::tools::config::Palette;
use crate::lingo::tools::error::Result;
use crate::lingo::tools::io::excel_read::RawSheet;
use crate::lingo::tools::model::{CellValue, ChangeKind, Table};

/// One worksheet of a workbook being written.
#[derive(Debug, Clone, Copy)]
pub enum SheetContent<'a> {
    /// A header row plus data rows, with per-row change marks.
    Table {
        table: &'a Table,
        marks: &'a [ChangeKind],
    },
    /// Cells copied back unchanged from an existing workbook.
    Raw(&'a RawSheet),
}

/// Writes the table as the only sheet of a new workbook at `path`.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    write_marked_table(path, table, &[], &Palette::default())
}

/// Writes the table and fills every cell of rows marked `Modified` or
/// `Added` with the palette colour for that change. `marks` is parallel to
/// `table.rows`; missing entries count as unchanged.
pub fn write_marked_table(
    path: &Path,
    table: &Table,
    marks: &[ChangeKind],
    palette: &Palette,
) -> Result<()> {
    write_workbook(path, &[SheetContent::Table { table, marks }], palette)
}

/// Writes a new workbook at `path` with one worksheet per entry of
/// `sheets`, in order.
pub fn write_workbook(path: &Path, sheets: &[SheetContent<'_>], palette: &Palette) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    for content in sheets {
        let worksheet = workbook_writer.add_worksheet();
        match content {
            SheetContent::Table { table, marks } => {
                write_table_sheet(worksheet, table, marks, palette)?;
            }
            SheetContent::Raw(sheet) => write_raw_sheet(worksheet, sheet)?,
        }
    }
    workbook_writer.save(path)?;
    Ok(())
}

fn write_raw_sheet(worksheet: &mut Worksheet, sheet: &RawSheet) -> Result<()> {
    worksheet.set_name(&sheet.name)?;
    let (first_row, first_col) = sheet.origin;
    for (row_offset, row) in sheet.cells.iter().enumerate() {
        for (col_offset, cell) in row.iter().enumerate() {
            let row_idx = first_row + row_offset as u32;
            let col_idx = (first_col as usize + col_offset) as u16;
            write_cell(worksheet, row_idx, col_idx, cell, None)?;
        }
    }
    Ok(())
}

fn write_table_sheet(
    worksheet: &mut Worksheet,
    table: &Table,
    marks: &[ChangeKind],
    palette: &Palette,
) -> Result<()> {
    if !table.sheet_name.is_empty() {
        worksheet.set_name(&table.sheet_name)?;
    }

    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    let modified = fill_format(palette.modified);
    let added = fill_format(palette.added);

    for (row_idx, row) in table.rows.iter().enumerate() {
        let format = match marks.get(row_idx) {
            Some(ChangeKind::Modified) => Some(&modified),
            Some(ChangeKind::Added) => Some(&added),
            Some(ChangeKind::Unchanged) | None => None,
        };
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            write_cell(worksheet, excel_row, col_idx as u16, cell, format)?;
        }
    }

    if !table.columns.is_empty() {
        let col_end = (table.columns.len() as u16).saturating_sub(1);
        worksheet.autofilter(0, 0, table.rows.len() as u32, col_end)?;
    }
    Ok(())
}

fn fill_format(rgb: u32) -> Format {
    Format::new()
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(rgb))
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: Option<&Format>,
) -> Result<()> {
    match (cell, format) {
        (CellValue::Empty, None) => {}
        (CellValue::Empty, Some(format)) => {
            worksheet.write_blank(row, col, format)?;
        }
        (CellValue::Text(value), None) => {
            worksheet.write_string(row, col, value)?;
        }
        (CellValue::Text(value), Some(format)) => {
            worksheet.write_string_with_format(row, col, value, format)?;
        }
        (CellValue::Number(value), None) => {
            worksheet.write_number(row, col, *value)?;
        }
        (CellValue::Number(value), Some(format)) => {
            worksheet.write_number_with_format(row, col, *value, format)?;
        }
        (CellValue::Bool(value), None) => {
            worksheet.write_boolean(row, col, *value)?;
        }
        (CellValue::Bool(value), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, *value, format)?;
        }
    }
    Ok(())
}
