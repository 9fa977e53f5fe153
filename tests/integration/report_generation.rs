//! GenerateReports against an in-memory workbook and a mocked reporting API

use super::test_utils::{
    memory_store_with_partners, partner_row, pipeline, report_column, seed_table,
    unused_transport,
};
use serde_json::json;
use spend_monitor::error::{PipelineError, StoreError};
use spend_monitor::pipeline::reports::{ALL_PRESENT_MESSAGE, NO_PARTNERS_MESSAGE};
use spend_monitor::pipeline::GenerateOutcome;
use spend_monitor::prompt::ScriptedPrompt;
use spend_monitor::rest::{HttpResponse, Method, MockTransport};
use spend_monitor::sheet::{CellValue, MemoryWorkbook, TabularStore};
use spend_monitor::tables::TableLayout;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Reporting API that hands out sequential query ids starting at `first_id`.
fn sequential_reporting(first_id: i64) -> Arc<MockTransport> {
    let next = AtomicI64::new(first_id);
    Arc::new(MockTransport::new(move |_| {
        let id = next.fetch_add(1, Ordering::SeqCst);
        HttpResponse::ok(json!({"queryId": id.to_string()}))
    }))
}

#[tokio::test]
async fn creates_reports_only_for_partners_without_one() {
    let store = memory_store_with_partners(&[
        partner_row("Acme", 11, None),
        partner_row("Beta", 12, Some(555)),
        partner_row("Gamma", 13, None),
    ]);
    let reporting = sequential_reporting(1001);
    let prompt = Arc::new(ScriptedPrompt::default());
    let mut pipeline = pipeline(store, prompt.clone(), reporting.clone(), unused_transport());

    let outcome = pipeline.generate_reports().await.unwrap();

    let GenerateOutcome::Generated(summary) = outcome else {
        panic!("expected reports to be generated");
    };
    assert!(summary.failed.is_empty());
    let rows: Vec<(usize, i64)> = summary.created.iter().map(|c| (c.row, c.report_id)).collect();
    assert_eq!(rows, vec![(2, 1001), (4, 1002)]);

    let posts = reporting.requests_to(&Method::POST, "/query");
    assert_eq!(posts.len(), 2);
    let first = posts[0].json_body().unwrap();
    assert_eq!(first["params"]["filters"][0]["value"], "11");
    assert_eq!(first["metadata"]["title"], "DV360 Spend Report Acme");
    let second = posts[1].json_body().unwrap();
    assert_eq!(second["params"]["filters"][0]["value"], "13");

    assert_eq!(
        report_column(pipeline.store(), 4),
        vec![
            CellValue::Number(1001.0),
            CellValue::Number(555.0),
            CellValue::Number(1002.0)
        ]
    );
    assert!(prompt.alerts().is_empty());
}

#[tokio::test]
async fn one_failed_partner_does_not_block_the_others() {
    let store = memory_store_with_partners(&[
        partner_row("Acme", 11, None),
        partner_row("Beta", 12, None),
        partner_row("Gamma", 13, None),
    ]);
    let next = AtomicI64::new(2001);
    let reporting = Arc::new(MockTransport::new(move |request| {
        let body = request.json_body().unwrap();
        if body["params"]["filters"][0]["value"] == "12" {
            return HttpResponse::new(500, r#"{"error":{"message":"backend error"}}"#);
        }
        let id = next.fetch_add(1, Ordering::SeqCst);
        HttpResponse::ok(json!({"queryId": id}))
    }));
    let mut pipeline = pipeline(
        store,
        Arc::new(ScriptedPrompt::default()),
        reporting.clone(),
        unused_transport(),
    );

    let outcome = pipeline.generate_reports().await.unwrap();

    assert!(matches!(
        outcome.failure(),
        Some(PipelineError::ReportsFailed {
            failed: 1,
            created: 2
        })
    ));
    let GenerateOutcome::Generated(summary) = outcome else {
        panic!("expected reports to be generated");
    };
    assert_eq!(summary.failed[0].partner_id, "12");
    assert_eq!(summary.failed[0].row, 3);
    assert!(summary.failed[0].error.contains("500"));
    assert_eq!(reporting.requests().len(), 3);
    assert_eq!(
        report_column(pipeline.store(), 4),
        vec![
            CellValue::Number(2001.0),
            CellValue::Empty,
            CellValue::Number(2002.0)
        ]
    );
}

#[tokio::test]
async fn alerts_when_there_are_no_partners() {
    let header_only = memory_store_with_partners(&[]);
    let prompt = Arc::new(ScriptedPrompt::default());
    let mut pipeline = pipeline(header_only, prompt.clone(), unused_transport(), unused_transport());
    assert_eq!(
        pipeline.generate_reports().await.unwrap(),
        GenerateOutcome::NoPartners
    );

    let missing_table = Box::new(MemoryWorkbook::new());
    let mut pipeline = pipeline_with(missing_table, prompt.clone());
    assert_eq!(
        pipeline.generate_reports().await.unwrap(),
        GenerateOutcome::NoPartners
    );

    let alerts = prompt.alerts();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].1, NO_PARTNERS_MESSAGE);
}

fn pipeline_with(
    store: Box<MemoryWorkbook>,
    prompt: Arc<ScriptedPrompt>,
) -> spend_monitor::pipeline::Pipeline {
    pipeline(store, prompt, unused_transport(), unused_transport())
}

#[tokio::test]
async fn alerts_when_every_partner_has_a_report() {
    let store = memory_store_with_partners(&[
        partner_row("Acme", 11, Some(1)),
        partner_row("Beta", 12, Some(2)),
    ]);
    let prompt = Arc::new(ScriptedPrompt::default());
    let mut pipeline = pipeline(store, prompt.clone(), unused_transport(), unused_transport());

    assert_eq!(
        pipeline.generate_reports().await.unwrap(),
        GenerateOutcome::AllPresent
    );
    assert_eq!(
        prompt.alerts(),
        vec![("Notification".to_string(), ALL_PRESENT_MESSAGE.to_string())]
    );
}

#[tokio::test]
async fn partner_names_with_quotes_reach_the_api_intact() {
    let store = memory_store_with_partners(&[partner_row("Acme \"Global\" Ads", 21, None)]);
    let reporting = sequential_reporting(7);
    let mut pipeline = pipeline(
        store,
        Arc::new(ScriptedPrompt::default()),
        reporting.clone(),
        unused_transport(),
    );

    pipeline.generate_reports().await.unwrap();

    let body = reporting.requests()[0].json_body().unwrap();
    assert_eq!(
        body["metadata"]["title"],
        "DV360 Spend Report Acme \"Global\" Ads"
    );
}

#[tokio::test]
async fn partner_without_name_keeps_placeholder() {
    let mut row = partner_row("", 31, None);
    row[0] = serde_json::Value::Null;
    let store = memory_store_with_partners(&[row]);
    let reporting = sequential_reporting(8);
    let mut pipeline = pipeline(
        store,
        Arc::new(ScriptedPrompt::default()),
        reporting.clone(),
        unused_transport(),
    );

    pipeline.generate_reports().await.unwrap();

    let body = reporting.requests()[0].json_body().unwrap();
    assert_eq!(body["metadata"]["title"], "DV360 Spend Report ${partnerName}");
    assert_eq!(body["params"]["filters"][0]["value"], "31");
}

/// Store that rejects every write to one row.
struct LockedRow {
    inner: MemoryWorkbook,
    locked_row: usize,
}

impl TabularStore for LockedRow {
    fn has_table(&self, name: &str) -> bool {
        self.inner.has_table(name)
    }

    fn ensure_table(&mut self, name: &str) -> Result<(), StoreError> {
        self.inner.ensure_table(name)
    }

    fn clear_table(&mut self, name: &str) -> Result<(), StoreError> {
        self.inner.clear_table(name)
    }

    fn last_row(&self, name: &str) -> Result<usize, StoreError> {
        self.inner.last_row(name)
    }

    fn read_range(
        &self,
        name: &str,
        start_row: usize,
        start_column: usize,
        rows: usize,
        columns: usize,
    ) -> Result<Vec<Vec<CellValue>>, StoreError> {
        self.inner
            .read_range(name, start_row, start_column, rows, columns)
    }

    fn write_range(
        &mut self,
        name: &str,
        start_row: usize,
        start_column: usize,
        values: &[Vec<CellValue>],
    ) -> Result<(), StoreError> {
        if start_row == self.locked_row {
            return Err(StoreError::InvalidRange(format!("row {} is protected", start_row)));
        }
        self.inner.write_range(name, start_row, start_column, values)
    }

    fn set_column_format(
        &mut self,
        name: &str,
        column: usize,
        start_row: usize,
        pattern: &str,
    ) -> Result<(), StoreError> {
        self.inner.set_column_format(name, column, start_row, pattern)
    }
}

#[tokio::test]
async fn failed_write_back_keeps_the_created_id_and_continues() {
    let mut inner = MemoryWorkbook::new();
    seed_table(
        &mut inner,
        &TableLayout::partner(),
        &[partner_row("Acme", 11, None), partner_row("Beta", 12, None)],
    );
    let store = Box::new(LockedRow {
        inner,
        locked_row: 2,
    });
    let reporting = sequential_reporting(9);
    let mut pipeline = pipeline(
        store,
        Arc::new(ScriptedPrompt::default()),
        reporting.clone(),
        unused_transport(),
    );

    let outcome = pipeline.generate_reports().await.unwrap();

    assert!(matches!(
        outcome.failure(),
        Some(PipelineError::ReportsFailed {
            failed: 1,
            created: 1
        })
    ));
    let GenerateOutcome::Generated(summary) = outcome else {
        panic!("expected reports to be generated");
    };
    assert_eq!(summary.failed[0].partner_id, "11");
    assert_eq!(summary.failed[0].report_id, Some(9));
    assert!(summary.failed[0].error.contains("protected"));
    assert_eq!(summary.created[0].partner_id, "12");
    assert_eq!(summary.created[0].report_id, 10);
    assert_eq!(reporting.requests().len(), 2);
    assert_eq!(
        report_column(pipeline.store(), 3),
        vec![CellValue::Empty, CellValue::Number(10.0)]
    );
}
