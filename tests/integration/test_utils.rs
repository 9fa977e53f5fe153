//! Shared test utilities for integration tests
//!
//! Pipeline builders over in-memory stores and mock transports, plus environment isolation
//! for tests that load configuration.

use serde_json::{json, Value};
use spend_monitor::pipeline::{Pipeline, PipelineSettings};
use spend_monitor::prompt::ScriptedPrompt;
use spend_monitor::rest::{HttpRequest, HttpResponse, MockTransport, RestClient, StaticToken};
use spend_monitor::services::reporting::DEFAULT_BASE_URL as REPORTING_URL;
use spend_monitor::services::warehouse::{dataset_url, DEFAULT_BASE_URL as WAREHOUSE_URL};
use spend_monitor::services::{ReportingClient, WarehouseClient};
use spend_monitor::sheet::{CellValue, MemoryWorkbook, TabularStore};
use spend_monitor::tables::{ExternalSource, TableLayout};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/monitor";

/// Global mutex to serialize config-related environment variable access across all tests
static CONFIG_ENV_MUTEX: Mutex<()> = Mutex::new(());

const ISOLATED_VARS: &[&str] = &[
    "HOME",
    "XDG_CONFIG_HOME",
    "SPEND_MONITOR_ENV",
    "SPEND_MONITOR__GCP__PROJECT_ID",
    "SPEND_MONITOR__GCP__DATASET_ID",
    "SPEND_MONITOR__WORKBOOK__SOURCE_URI",
];

/// Run `f` with HOME and XDG_CONFIG_HOME pointing into `test_dir` and no SPEND_MONITOR_*
/// overrides set. The original environment is restored afterwards.
pub fn with_config_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(&str, Option<String>)> = ISOLATED_VARS
        .iter()
        .map(|key| (*key, std::env::var(key).ok()))
        .collect();

    for key in ISOLATED_VARS {
        std::env::remove_var(key);
    }
    let home = test_dir.path().join("home");
    let config_home = test_dir.path().join("xdg");
    std::fs::create_dir_all(&home).unwrap();
    std::fs::create_dir_all(&config_home).unwrap();
    std::env::set_var("HOME", &home);
    std::env::set_var("XDG_CONFIG_HOME", &config_home);

    let result = f();

    for (key, value) in saved {
        match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }
    result
}

pub fn source() -> ExternalSource {
    ExternalSource {
        source_uri: SHEET_URL.to_string(),
        source_format: "GOOGLE_SHEETS".to_string(),
        skip_leading_rows: 1,
    }
}

pub fn settings() -> PipelineSettings {
    PipelineSettings::new("proj", "spend", source())
}

pub fn pipeline(
    store: Box<dyn TabularStore>,
    prompt: Arc<ScriptedPrompt>,
    reporting: Arc<MockTransport>,
    warehouse: Arc<MockTransport>,
) -> Pipeline {
    let tokens = Arc::new(StaticToken::new("test-token"));
    Pipeline::new(
        settings(),
        store,
        prompt,
        ReportingClient::new(RestClient::new(REPORTING_URL, reporting, tokens.clone())),
        WarehouseClient::new(RestClient::new(
            dataset_url(WAREHOUSE_URL, "proj", "spend"),
            warehouse,
            tokens,
        )),
    )
}

/// Transport that fails the test if it is ever called.
pub fn unused_transport() -> Arc<MockTransport> {
    Arc::new(MockTransport::new(|request| {
        panic!("unexpected request: {} {}", request.method, request.url)
    }))
}

/// Warehouse transport where every table lookup answers `lookup_status` and mutations echo
/// the posted table.
pub fn warehouse_transport(lookup_status: u16) -> Arc<MockTransport> {
    Arc::new(MockTransport::new(move |request: &HttpRequest| {
        if request.method == spend_monitor::rest::Method::GET {
            if lookup_status == 200 {
                let table_id = request.url.rsplit('/').next().unwrap_or_default();
                return HttpResponse::ok(json!({
                    "type": "EXTERNAL",
                    "tableReference": {"projectId": "proj", "datasetId": "spend", "tableId": table_id}
                }));
            }
            return HttpResponse::new(lookup_status, r#"{"error":{"message":"lookup failed"}}"#);
        }
        HttpResponse::ok(request.json_body().unwrap_or(Value::Null))
    }))
}

fn cells(row: &[Value]) -> Vec<CellValue> {
    row.iter()
        .map(|value| match value {
            Value::Null => CellValue::Empty,
            Value::Number(n) => CellValue::Number(n.as_f64().unwrap()),
            Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        })
        .collect()
}

/// Write a header row for `layout` followed by `rows` into `store`.
pub fn seed_table(store: &mut dyn TabularStore, layout: &TableLayout, rows: &[Vec<Value>]) {
    store.ensure_table(&layout.name).unwrap();
    let header = layout
        .fields
        .iter()
        .map(|field| CellValue::Text(field.clone()))
        .collect();
    let mut block = vec![header];
    block.extend(rows.iter().map(|row| cells(row)));
    store.write_range(&layout.name, 1, 1, &block).unwrap();
}

/// Partner row in layout order: name, id, caps, thresholds, report id.
pub fn partner_row(name: &str, id: i64, report_id: Option<i64>) -> Vec<Value> {
    vec![
        json!(name),
        json!(id),
        json!(100000),
        json!(5000),
        json!(0.5),
        json!(0.8),
        json!(0.9),
        json!(1.0),
        report_id.map(|id| json!(id)).unwrap_or(Value::Null),
    ]
}

pub fn memory_store_with_partners(rows: &[Vec<Value>]) -> Box<dyn TabularStore> {
    let mut store = MemoryWorkbook::new();
    seed_table(&mut store, &TableLayout::partner(), rows);
    Box::new(store)
}

/// Value of the `report_id` column for data rows 2..=`last_row`.
pub fn report_column(store: &dyn TabularStore, last_row: usize) -> Vec<CellValue> {
    let layout = TableLayout::partner();
    let column = layout.column_of("report_id").unwrap();
    store
        .read_range(&layout.name, 2, column, last_row - 1, 1)
        .unwrap()
        .into_iter()
        .map(|mut row| row.remove(0))
        .collect()
}
