/*!
# Timesheet Dashboard

A browser-based dashboard for project timesheet workbooks, built in Rust.

## Overview

A user uploads a spreadsheet workbook in which every sheet holds one
project's timesheet. The dashboard lets them pick a project and a month and
then shows the per-employee hours for that slice as a table, a total-hours
metric and a chart, with the filtered rows available for download.

Source workbooks use merged cells in the month column, which export as one
value followed by blanks. The cleaning step forward-fills those blanks and
drops empty rows before any filtering happens.

## Architecture

The application follows a client-server architecture:

### Frontend Layer
- **Technologies**: HTML, CSS, vanilla JavaScript
- A single dashboard page that drives the JSON API: upload form, project and
  month selectors, hours table, total metric, chart image and download links

### Backend Layer
- **Technologies**: Rust, axum
- **Core Components**:
  - Timesheet Table - Row model, month forward-fill, filtering, aggregation
  - Workbook Loader - XLSX parsing and named-column binding via calamine
  - Exporter - CSV and XLSX downloads of a filtered slice
  - Chart Renderer - Hours-per-employee bar and line charts via plotters

### State
- One uploaded workbook per server process, held in memory; every selection
  re-reads the stored bytes, so there is no persistence layer and nothing to
  migrate or clean up

## Modules

- **timesheet**: Core row model and table operations (clean, months, filter,
  total) together with the typed load errors
- **loader**: Workbook parsing and schema-validated column binding
- **downloader**: Export functionality (CSV, XLSX) and download file naming
- **graph**: Chart generation from a filtered slice
- **app**: Routing, handlers and server state

## REST API Endpoints

- `POST /api/upload` - Accepts a workbook file, replies with the project list
- `GET /api/projects` - Projects (sheet names) of the uploaded workbook
- `GET /api/months?project=` - Months present in one project sheet
- `GET /api/timesheet?project=&month=` - Filtered rows and total hours
- `GET /api/chart?project=&month=&kind=` - PNG chart (bar or line)
- `GET /api/download?project=&month=&format=` - CSV or XLSX attachment
*/

// Re-export all modules so they appear in the documentation
pub mod app;
pub mod downloader;
pub mod graph;
pub mod loader;
pub mod timesheet;

/// Re-export everything from these modules to make it easier to use
pub use downloader::*;
pub use graph::*;
pub use loader::*;
pub use timesheet::*;
