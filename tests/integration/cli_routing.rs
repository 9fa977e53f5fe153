//! Command routing through RunContext with a pre-built pipeline

use super::test_utils::{memory_store_with_partners, partner_row, pipeline, unused_transport};
use serde_json::json;
use spend_monitor::cli::{map_error, Commands, OutputFormat, RunContext, TableArg};
use spend_monitor::error::PipelineError;
use spend_monitor::prompt::ScriptedPrompt;
use spend_monitor::rest::{HttpResponse, Method, MockTransport};
use std::sync::Arc;

fn stored_report(query_id: i64) -> serde_json::Value {
    json!({
        "queryId": query_id.to_string(),
        "metadata": {"title": "DV360 Spend Report Acme", "dataRange": "CURRENT_MONTH", "format": "CSV"},
        "params": {
            "type": "TYPE_GENERAL",
            "groupBys": ["FILTER_PARTNER"],
            "filters": [{"type": "FILTER_PARTNER", "value": "11"}],
            "metrics": ["METRIC_REVENUE_USD"]
        }
    })
}

fn report_context(reporting: Arc<MockTransport>) -> RunContext {
    let store = memory_store_with_partners(&[
        partner_row("Acme", 11, Some(555)),
        partner_row("Beta", 12, None),
    ]);
    RunContext::with_pipeline(pipeline(
        store,
        Arc::new(ScriptedPrompt::default()),
        reporting,
        unused_transport(),
    ))
}

#[tokio::test]
async fn report_command_fetches_the_recorded_query() {
    let reporting = Arc::new(MockTransport::new(|_| HttpResponse::ok(stored_report(555))));
    let mut context = report_context(reporting.clone());

    let output = context
        .execute(&Commands::Report {
            partner_id: "11".to_string(),
            format: OutputFormat::Text,
        })
        .await
        .unwrap();

    assert!(output.text.contains("Query ID: 555"));
    assert!(output.text.contains("Title: DV360 Spend Report Acme"));
    assert!(output.text.contains("FILTER_PARTNER = 11"));
    assert_eq!(reporting.requests_to(&Method::GET, "/query/555").len(), 1);
}

#[tokio::test]
async fn report_command_renders_json() {
    let reporting = Arc::new(MockTransport::new(|_| HttpResponse::ok(stored_report(555))));
    let mut context = report_context(reporting);

    let output = context
        .execute(&Commands::Report {
            partner_id: "11".to_string(),
            format: OutputFormat::Json,
        })
        .await
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(parsed["partner"]["partner_name"], "Acme");
    assert_eq!(parsed["report"]["metadata"]["title"], "DV360 Spend Report Acme");
    assert_eq!(parsed["report"]["metadata"]["format"], "CSV");
}

#[tokio::test]
async fn report_command_distinguishes_unknown_partner_from_missing_report() {
    let mut context = report_context(unused_transport());

    let unknown = context
        .execute(&Commands::Report {
            partner_id: "99".to_string(),
            format: OutputFormat::Text,
        })
        .await
        .unwrap_err();
    assert!(matches!(unknown, PipelineError::PartnerNotFound(ref id) if id == "99"));

    let missing = context
        .execute(&Commands::Report {
            partner_id: "12".to_string(),
            format: OutputFormat::Text,
        })
        .await
        .unwrap_err();
    assert!(matches!(missing, PipelineError::ReportMissing { ref partner_id, .. } if partner_id == "12"));
    assert!(map_error(&missing).contains("12"));
}

#[tokio::test]
async fn partial_generation_failure_is_carried_alongside_output() {
    let store = memory_store_with_partners(&[partner_row("Acme", 11, None)]);
    let reporting = Arc::new(MockTransport::new(|_| HttpResponse::new(500, "boom")));
    let mut context = RunContext::with_pipeline(pipeline(
        store,
        Arc::new(ScriptedPrompt::default()),
        reporting,
        unused_transport(),
    ));

    let output = context.execute(&Commands::GenerateReports).await.unwrap();

    assert!(output.text.contains("0 created, 1 failed"));
    assert!(matches!(
        output.failure,
        Some(PipelineError::ReportsFailed {
            failed: 1,
            created: 0
        })
    ));
}

#[tokio::test]
async fn show_command_lists_partner_records_as_json() {
    let mut context = report_context(unused_transport());

    let output = context
        .execute(&Commands::Show {
            table: TableArg::Partners,
            format: OutputFormat::Json,
        })
        .await
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(parsed["total"], 2);
    assert_eq!(parsed["records"][0]["partner_id"], json!(11.0));
    assert_eq!(parsed["records"][1]["partner_name"], "Beta");

    let advertisers = context
        .execute(&Commands::Show {
            table: TableArg::Advertisers,
            format: OutputFormat::Text,
        })
        .await
        .unwrap();
    assert_eq!(advertisers.text, "No records.");
}
