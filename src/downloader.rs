use crate::timesheet::EmployeeHours;
use std::error::Error;

/// Convert a filtered timesheet slice to CSV format
///
/// This function exports the `(employee, hours)` rows of one project/month
/// selection to CSV (Comma-Separated Values) format. It creates a string
/// where:
/// - The header row is `Employee,Hours`
/// - Values are comma-separated, one row per employee
/// - Special characters (commas, quotes, newlines) are properly escaped
/// - No index column is emitted
///
/// # Arguments
/// * `entries` - The filtered rows to export
///
/// # Returns
/// * `String` - CSV content
///
/// # Examples
/// ```
/// use timesheet_dashboard::timesheet::EmployeeHours;
/// use timesheet_dashboard::downloader::to_csv;
///
/// let entries = vec![EmployeeHours { employee: "Alice".to_string(), hours: 5.0 }];
/// assert_eq!(to_csv(&entries), "Employee,Hours\nAlice,5\n");
/// ```
pub fn to_csv(entries: &[EmployeeHours]) -> String {
    let mut csv_content = String::from("Employee,Hours\n");

    for entry in entries {
        csv_content.push_str(&escape_csv_field(&entry.employee));
        csv_content.push(',');
        csv_content.push_str(&entry.hours.to_string());
        csv_content.push('\n');
    }

    csv_content
}

/// Convert a filtered timesheet slice to XLSX format
///
/// This function exports the same table as [`to_csv`] to XLSX (Excel) format
/// using the rust_xlsxwriter library, for users who want the slice back in
/// spreadsheet form.
///
/// # Arguments
/// * `entries` - The filtered rows to export
///
/// # Returns
/// * `Result<Vec<u8>, Box<dyn Error>>` - XLSX file content as bytes or an error
pub fn to_xlsx(entries: &[EmployeeHours]) -> Result<Vec<u8>, Box<dyn Error>> {
    use rust_xlsxwriter::{Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    worksheet.write_string(0, 0, "Employee")?;
    worksheet.write_string(0, 1, "Hours")?;

    for (r, entry) in entries.iter().enumerate() {
        let row = (r + 1) as u32;
        worksheet.write_string(row, 0, &entry.employee)?;
        worksheet.write_number(row, 1, entry.hours)?;
    }

    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

/// File name for a downloaded slice: `{project}_{month}_timesheet.{ext}`
///
/// # Examples
/// ```
/// use timesheet_dashboard::downloader::export_filename;
///
/// assert_eq!(export_filename("ProjectX", "Jan", "csv"), "ProjectX_Jan_timesheet.csv");
/// ```
pub fn export_filename(project: &str, month: &str, extension: &str) -> String {
    format!("{}_{}_timesheet.{}", project, month, extension)
}

// Quote a field when it contains a comma, quote or newline
fn escape_csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        value.to_string()
    }
}
