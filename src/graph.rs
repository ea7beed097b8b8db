#![cfg(not(tarpaulin_include))]

use crate::timesheet::EmployeeHours;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

/// Available chart types for the hours-per-employee view
///
/// The dashboard defaults to a bar chart; the line variant mirrors the
/// optional line-chart toggle of the dashboard page.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphType {
    /// Bar chart - one bar per employee, bar height is hours worked
    Bar,

    /// Line chart - employees along the X axis, hours connected by a line
    Line,
}

impl GraphType {
    /// Parse a chart type from its query-string name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "bar" => Some(GraphType::Bar),
            "line" => Some(GraphType::Line),
            _ => None,
        }
    }
}

/// Configuration options for chart generation
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,

    /// Type of chart to generate
    pub graph_type: GraphType,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            title: "Hours Distribution".to_string(),
            x_label: "Employee".to_string(),
            y_label: "Hours".to_string(),
            width: 800,
            height: 600,
            graph_type: GraphType::Bar,
        }
    }
}

/// Creates a chart from a filtered timesheet slice
///
/// This is the entry point for chart generation. It renders one bar (or line
/// point) per employee and returns the chart as PNG image data.
///
/// # Arguments
/// * `entries` - The filtered `(employee, hours)` rows to plot
/// * `options` - Chart styling and type options
///
/// # Returns
/// * A Result containing the PNG image data as bytes or an error
///
/// # Errors
/// * Returns an error when `entries` is empty - callers are expected to show
///   an error state instead of an empty chart
///
/// # Implementation Notes
/// * Renders through a uniquely named temporary file so concurrent chart
///   requests cannot clobber each other's output
pub fn create_graph(
    entries: &[EmployeeHours],
    options: &GraphOptions,
) -> Result<Vec<u8>, Box<dyn Error>> {
    if entries.is_empty() {
        return Err("no rows to plot for this selection".into());
    }

    let file = tempfile::Builder::new().suffix(".png").tempfile()?;
    let path = file.path().to_path_buf();

    match options.graph_type {
        GraphType::Bar => draw_bar_chart(entries, options, &path)?,
        GraphType::Line => draw_line_chart(entries, options, &path)?,
    }

    // The temp file is removed when `file` drops
    let png_data = std::fs::read(&path)?;

    Ok(png_data)
}

/// Draws a bar chart of hours per employee to the given path
///
/// # Implementation Notes
/// * Bars are 0.6 units wide, centred on integer employee positions
/// * The Y axis is scaled to 110% of the largest hours value
fn draw_bar_chart(
    entries: &[EmployeeHours],
    options: &GraphOptions,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = -0.5f64..entries.len() as f64 - 0.5;
    let y_range = 0.0..y_axis_top(entries);

    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(entries.len())
        .x_label_formatter(&|x| employee_label(entries, *x))
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    chart.draw_series(entries.iter().enumerate().map(|(i, entry)| {
        Rectangle::new(
            [(i as f64 - 0.3, 0.0), (i as f64 + 0.3, entry.hours)],
            BLUE.filled(),
        )
    }))?;

    root.present()?;

    Ok(())
}

/// Draws a line chart of hours per employee to the given path
fn draw_line_chart(
    entries: &[EmployeeHours],
    options: &GraphOptions,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = -0.5f64..entries.len() as f64 - 0.5;
    let y_range = 0.0..y_axis_top(entries);

    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(entries.len())
        .x_label_formatter(&|x| employee_label(entries, *x))
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    chart.draw_series(LineSeries::new(
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i as f64, entry.hours)),
        &BLUE,
    ))?;

    chart.draw_series(
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| Circle::new((i as f64, entry.hours), 4, BLUE.filled())),
    )?;

    root.present()?;

    Ok(())
}

// Y axis upper bound; keeps the axis non-degenerate when all hours are zero
fn y_axis_top(entries: &[EmployeeHours]) -> f64 {
    let max_hours = entries.iter().map(|e| e.hours).fold(0.0f64, f64::max);
    if max_hours > 0.0 {
        max_hours * 1.1
    } else {
        1.0
    }
}

// Map an axis position back to the employee name at that bar
fn employee_label(entries: &[EmployeeHours], position: f64) -> String {
    let index = position.round();
    if index >= 0.0 && (index as usize) < entries.len() {
        entries[index as usize].employee.clone()
    } else {
        String::new()
    }
}
