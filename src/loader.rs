use calamine::{Data, Reader, Xlsx};
use std::io::Cursor;

use crate::timesheet::{ParseError, RawRow, SchemaError, Timesheet};

/// Expected header names, matched case-insensitively against the first row.
const MONTH_COLUMN: &str = "month";
const EMPLOYEE_COLUMN: &str = "employee";
const HOURS_COLUMN: &str = "hours";

/// List the sheet names of an uploaded workbook
///
/// Each sheet of the workbook holds one project's timesheet, so the sheet
/// names double as the project list shown in the dashboard.
///
/// # Arguments
/// * `data` - Raw bytes of an uploaded XLSX workbook
///
/// # Returns
/// * `Result<Vec<String>, ParseError>` - Sheet names in workbook order, or a
///   `ParseError` if the bytes are not a readable workbook
///
/// # Examples
/// ```no_run
/// use timesheet_dashboard::loader::sheet_names;
///
/// let data = std::fs::read("timesheet.xlsx").unwrap();
/// match sheet_names(&data) {
///     Ok(projects) => println!("Found {} projects", projects.len()),
///     Err(e) => eprintln!("Error reading workbook: {}", e),
/// }
/// ```
pub fn sheet_names(data: &[u8]) -> Result<Vec<String>, ParseError> {
    let workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Load one project sheet from an uploaded workbook
///
/// Parses the named sheet into a [`Timesheet`], binding the month, employee
/// and hours columns by header name. Column binding is validated up front:
/// a sheet whose header row does not carry the expected names fails with a
/// descriptive [`SchemaError`] instead of silently reading the wrong columns.
///
/// The returned timesheet is raw - callers run [`Timesheet::clean`] before
/// filtering so that the sparse month column is forward-filled.
///
/// # Arguments
/// * `data` - Raw bytes of an uploaded XLSX workbook
/// * `sheet_name` - Name of the sheet (project) to load
///
/// # Returns
/// * `Result<Timesheet, ParseError>` - The loaded rows, or a `ParseError`
///   when the workbook is unreadable, the sheet is absent, or the header row
///   does not bind
pub fn load_sheet(data: &[u8], sheet_name: &str) -> Result<Timesheet, ParseError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))?;

    if !workbook.sheet_names().iter().any(|name| name == sheet_name) {
        return Err(ParseError::SheetNotFound(sheet_name.to_string()));
    }

    let range = workbook.worksheet_range(sheet_name)?;
    let mut rows = range.rows();

    let header = match rows.next() {
        Some(cells) => cells,
        None => return Err(SchemaError::EmptySheet(sheet_name.to_string()).into()),
    };

    let month_col = bind_column(header, MONTH_COLUMN, sheet_name)?;
    let employee_col = bind_column(header, EMPLOYEE_COLUMN, sheet_name)?;
    let hours_col = bind_column(header, HOURS_COLUMN, sheet_name)?;

    let raw_rows = rows
        .map(|cells| {
            RawRow::new(
                cells.get(month_col).and_then(cell_text),
                cells.get(employee_col).and_then(cell_text),
                cells.get(hours_col).and_then(cell_hours),
            )
        })
        .collect();

    Ok(Timesheet::new(sheet_name, raw_rows))
}

/// Find the index of a named column in the header row
///
/// Matching is case-insensitive and accepts longer header labels that
/// contain the expected word, so "Employee Name" binds the employee column
/// and "Hours Worked" binds the hours column.
fn bind_column(
    header: &[Data],
    column: &'static str,
    sheet_name: &str,
) -> Result<usize, SchemaError> {
    let position = header.iter().position(|cell| {
        cell_text(cell)
            .map(|label| label.to_lowercase().contains(column))
            .unwrap_or(false)
    });

    position.ok_or_else(|| SchemaError::MissingColumn {
        sheet: sheet_name.to_string(),
        column,
        header: header.iter().filter_map(cell_text).collect(),
    })
}

/// Text content of a cell, with whitespace-only strings treated as blank
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric content of an hours cell
///
/// Numeric cells are taken as-is; string cells are accepted when they parse
/// as a number. Anything else is treated as missing, so a malformed hours
/// value drops the row from aggregation instead of crashing it.
fn cell_hours(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
