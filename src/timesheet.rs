use serde::Serialize;
use thiserror::Error;

/// Schema validation failure raised while binding the expected columns of a
/// sheet at load time.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("sheet '{0}' has no header row")]
    EmptySheet(String),

    #[error("sheet '{sheet}' has no '{column}' column (header row: {header:?})")]
    MissingColumn {
        sheet: String,
        column: &'static str,
        header: Vec<String>,
    },
}

/// Failure to turn uploaded bytes and a sheet name into a [`Timesheet`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not read workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("workbook has no sheet named '{0}'")]
    SheetNotFound(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// One row of a project sheet as it appears in the source workbook.
///
/// The month column is sparsely populated in the uploaded files (merged
/// header cells survive export as one value followed by blanks), so all
/// three fields are optional until [`Timesheet::clean`] runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    pub month: Option<String>,
    pub employee: Option<String>,
    pub hours: Option<f64>,
}

impl RawRow {
    pub fn new(
        month: Option<String>,
        employee: Option<String>,
        hours: Option<f64>,
    ) -> Self {
        RawRow {
            month,
            employee,
            hours,
        }
    }

    /// A row with no month, no employee and no hours value.
    pub fn is_blank(&self) -> bool {
        self.month.is_none() && self.employee.is_none() && self.hours.is_none()
    }
}

/// The `(employee, hours)` projection produced by month filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeHours {
    pub employee: String,
    pub hours: f64,
}

/// One project's timesheet: the rows of a single workbook sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Timesheet {
    pub project: String,
    rows: Vec<RawRow>,
}

impl Timesheet {
    pub fn new(project: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Timesheet {
            project: project.into(),
            rows,
        }
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// Repair the sparse month column and drop empty rows.
    ///
    /// Forward-fills the month column - each blank cell inherits the nearest
    /// preceding non-blank value in row order, which undoes the merged-cell
    /// layout of the source spreadsheet - and then discards rows that are
    /// blank across all columns. Calling this twice is the same as calling
    /// it once.
    pub fn clean(&mut self) {
        let mut last_month: Option<String> = None;
        for row in &mut self.rows {
            match &row.month {
                Some(month) => last_month = Some(month.clone()),
                None => row.month = last_month.clone(),
            }
        }
        self.rows.retain(|row| !row.is_blank());
    }

    /// Distinct non-blank month values, in first-occurrence order.
    pub fn months(&self) -> Vec<String> {
        let mut months: Vec<String> = Vec::new();
        for row in &self.rows {
            if let Some(month) = &row.month {
                if !months.iter().any(|m| m == month) {
                    months.push(month.clone());
                }
            }
        }
        months
    }

    /// Rows for one month, projected to `(employee, hours)`.
    ///
    /// A row missing either field (no employee name, or hours that did not
    /// parse as a number) is dropped from the result rather than failing the
    /// whole slice.
    pub fn for_month(&self, month: &str) -> Vec<EmployeeHours> {
        self.rows
            .iter()
            .filter(|row| row.month.as_deref() == Some(month))
            .filter_map(|row| {
                let employee = row.employee.clone()?;
                let hours = row.hours?;
                Some(EmployeeHours { employee, hours })
            })
            .collect()
    }
}

/// Sum of the hours field; `0.0` on empty input.
pub fn total_hours(entries: &[EmployeeHours]) -> f64 {
    entries.iter().map(|e| e.hours).sum()
}
