use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::sync::Arc;
use timesheet_dashboard::app::{self, AppState};
use timesheet_dashboard::downloader::to_csv;
use timesheet_dashboard::loader;
use timesheet_dashboard::timesheet::total_hours;
use tower::ServiceExt;

// A workbook shaped like the real uploads: one sheet per project, a header
// row, and a month column left sparse by merged cells.
fn sample_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();

    let mut project_x = Worksheet::new();
    project_x.set_name("ProjectX").unwrap();
    project_x.write_string(0, 0, "Month").unwrap();
    project_x.write_string(0, 1, "Employee").unwrap();
    project_x.write_string(0, 2, "Hours").unwrap();
    project_x.write_string(1, 0, "Jan").unwrap();
    project_x.write_string(1, 1, "Alice").unwrap();
    project_x.write_number(1, 2, 5).unwrap();
    // Month cell left blank: inherits "Jan" after cleaning
    project_x.write_string(2, 1, "Bob").unwrap();
    project_x.write_number(2, 2, 3).unwrap();
    project_x.write_string(3, 0, "Feb").unwrap();
    project_x.write_string(3, 1, "Carol").unwrap();
    project_x.write_number(3, 2, 8).unwrap();
    workbook.push_worksheet(project_x);

    let mut no_months = Worksheet::new();
    no_months.set_name("Unscheduled").unwrap();
    no_months.write_string(0, 0, "Month").unwrap();
    no_months.write_string(0, 1, "Employee").unwrap();
    no_months.write_string(0, 2, "Hours").unwrap();
    no_months.write_string(1, 1, "Dave").unwrap();
    no_months.write_number(1, 2, 6).unwrap();
    workbook.push_worksheet(no_months);

    workbook.save_to_buffer().unwrap()
}

#[test]
fn workbook_to_filtered_slice_end_to_end() {
    let data = sample_workbook();

    let projects = loader::sheet_names(&data).unwrap();
    assert_eq!(projects, vec!["ProjectX", "Unscheduled"]);

    let mut sheet = loader::load_sheet(&data, "ProjectX").unwrap();
    sheet.clean();
    assert_eq!(sheet.months(), vec!["Jan", "Feb"]);

    let jan = sheet.for_month("Jan");
    let names: Vec<&str> = jan.iter().map(|e| e.employee.as_str()).collect();
    let hours: Vec<f64> = jan.iter().map(|e| e.hours).collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
    assert_eq!(hours, vec![5.0, 3.0]);
    assert_eq!(format!("{:.2}", total_hours(&jan)), "8.00");

    assert_eq!(to_csv(&jan), "Employee,Hours\nAlice,5\nBob,3\n");
}

#[test]
fn sheet_without_month_values_reports_no_months() {
    let data = sample_workbook();

    let mut sheet = loader::load_sheet(&data, "Unscheduled").unwrap();
    sheet.clean();

    // The caller is expected to show an error state for this sheet
    assert!(sheet.months().is_empty());
}

#[test]
fn monthly_totals_partition_the_cleaned_sheet() {
    let data = sample_workbook();

    let mut sheet = loader::load_sheet(&data, "ProjectX").unwrap();
    sheet.clean();

    let by_month: f64 = sheet
        .months()
        .iter()
        .map(|month| total_hours(&sheet.for_month(month)))
        .sum();

    assert_eq!(by_month, 16.0);
}

#[tokio::test]
async fn dashboard_page_is_served_at_the_root() {
    let app = app::router(Arc::new(AppState::default()));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(body.to_vec()).unwrap();
    assert!(page.contains("Timesheet Dashboard"));
}

#[tokio::test]
async fn api_prompts_for_upload_before_any_workbook() {
    let app = app::router(Arc::new(AppState::default()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/projects")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let reply: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply["status"], "error");
    assert_eq!(
        reply["message"],
        "Please upload an Excel file to view the dashboard"
    );
}

#[tokio::test]
async fn months_endpoint_degrades_to_an_error_message() {
    let app = app::router(Arc::new(AppState::default()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/months?project=ProjectX")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let reply: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply["status"], "error");
}

#[tokio::test]
async fn chart_endpoint_rejects_unknown_kinds() {
    let app = app::router(Arc::new(AppState::default()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/chart?project=P&month=Jan&kind=pie")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // No workbook is uploaded either, but the selection is validated first
    // against the stored state, so this still comes back as a client error.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
}
