//! CreateOrUpdateExternalTables against a mocked warehouse API

use super::test_utils::{pipeline, unused_transport, warehouse_transport, SHEET_URL};
use spend_monitor::error::{ApiError, PipelineError};
use spend_monitor::pipeline::SyncAction;
use spend_monitor::prompt::ScriptedPrompt;
use spend_monitor::rest::{HttpResponse, Method, MockTransport};
use spend_monitor::sheet::MemoryWorkbook;
use std::sync::Arc;

fn empty_pipeline(warehouse: Arc<MockTransport>) -> spend_monitor::pipeline::Pipeline {
    pipeline(
        Box::new(MemoryWorkbook::new()),
        Arc::new(ScriptedPrompt::default()),
        unused_transport(),
        warehouse,
    )
}

#[tokio::test]
async fn missing_tables_are_created_with_suffix_schema() {
    let warehouse = warehouse_transport(404);
    let pipeline = empty_pipeline(warehouse.clone());

    let summary = pipeline.sync_external_tables(true).await.unwrap();

    assert_eq!(summary.action_for("partner_config"), Some(SyncAction::Create));
    assert_eq!(summary.action_for("advertiser_config"), Some(SyncAction::Create));

    let creates = warehouse.requests_to(&Method::POST, "/projects/proj/datasets/spend/tables");
    assert_eq!(creates.len(), 2);
    assert!(warehouse.requests_to(&Method::PUT, "").is_empty());

    let partner = creates[0].json_body().unwrap();
    assert_eq!(partner["type"], "EXTERNAL");
    assert_eq!(partner["tableReference"]["tableId"], "partner_config");
    let external = &partner["externalDataConfiguration"];
    assert_eq!(external["sourceUris"][0], SHEET_URL);
    assert_eq!(external["sourceFormat"], "GOOGLE_SHEETS");
    assert_eq!(external["googleSheetsOptions"]["skipLeadingRows"], "1");
    assert_eq!(external["googleSheetsOptions"]["range"], "Partner Config");

    let types: Vec<(String, String)> = external["schema"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| {
            (
                f["name"].as_str().unwrap().to_string(),
                f["type"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(types[0], ("partner_name".to_string(), "STRING".to_string()));
    assert_eq!(types[1], ("partner_id".to_string(), "INTEGER".to_string()));
    assert_eq!(types[2], ("partner_monthly_cap".to_string(), "FLOAT".to_string()));
    assert_eq!(types[4], ("warning1_threshold".to_string(), "FLOAT".to_string()));
    assert_eq!(types[8], ("report_id".to_string(), "INTEGER".to_string()));

    let advertiser = creates[1].json_body().unwrap();
    assert_eq!(advertiser["tableReference"]["tableId"], "advertiser_config");
    assert_eq!(
        advertiser["externalDataConfiguration"]["schema"]["fields"]
            .as_array()
            .unwrap()
            .len(),
        5
    );
}

#[tokio::test]
async fn existing_tables_are_left_alone_in_create_only_mode() {
    let warehouse = warehouse_transport(200);
    let pipeline = empty_pipeline(warehouse.clone());

    let summary = pipeline.sync_external_tables(false).await.unwrap();

    assert_eq!(summary.action_for("partner_config"), Some(SyncAction::Keep));
    assert_eq!(summary.action_for("advertiser_config"), Some(SyncAction::Keep));
    assert_eq!(warehouse.requests().len(), 2);
    assert!(warehouse
        .requests()
        .iter()
        .all(|request| request.method == Method::GET));
}

#[tokio::test]
async fn existing_tables_are_replaced_when_updating() {
    let warehouse = warehouse_transport(200);
    let pipeline = empty_pipeline(warehouse.clone());

    let summary = pipeline.sync_external_tables(true).await.unwrap();

    assert_eq!(summary.action_for("partner_config"), Some(SyncAction::Update));
    let puts = warehouse.requests_to(&Method::PUT, "/tables/partner_config");
    assert_eq!(puts.len(), 1);
    assert_eq!(
        puts[0].json_body().unwrap()["externalDataConfiguration"]["googleSheetsOptions"]["range"],
        "Partner Config"
    );
    assert_eq!(warehouse.requests_to(&Method::PUT, "/tables/advertiser_config").len(), 1);
    assert!(warehouse.requests_to(&Method::POST, "").is_empty());
}

#[tokio::test]
async fn lookup_failures_other_than_not_found_abort_without_creating() {
    let warehouse = warehouse_transport(403);
    let pipeline = empty_pipeline(warehouse.clone());

    let err = pipeline.sync_external_tables(true).await.unwrap_err();

    match err {
        PipelineError::TableLookup { table_id, source } => {
            assert_eq!(table_id, "partner_config");
            assert_eq!(source.code(), Some(403));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(warehouse.requests().len(), 1);
    assert!(warehouse
        .requests_to(&Method::GET, "/tables/advertiser_config")
        .is_empty());
}

#[tokio::test]
async fn server_error_during_lookup_is_not_treated_as_missing() {
    let warehouse = Arc::new(MockTransport::new(|_| HttpResponse::new(503, "unavailable")));
    let pipeline = empty_pipeline(warehouse.clone());

    let err = pipeline.sync_external_tables(false).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::TableLookup {
            source: ApiError::Status { code: 503, .. },
            ..
        }
    ));
    assert!(warehouse.requests_to(&Method::POST, "").is_empty());
}

#[tokio::test]
async fn empty_success_bodies_still_count_as_created() {
    let warehouse = Arc::new(MockTransport::new(|request| {
        if request.method == Method::GET {
            HttpResponse::new(404, "")
        } else {
            HttpResponse::empty(200)
        }
    }));
    let pipeline = empty_pipeline(warehouse.clone());

    let summary = pipeline.sync_external_tables(true).await.unwrap();

    assert_eq!(summary.action_for("partner_config"), Some(SyncAction::Create));
    assert_eq!(summary.action_for("advertiser_config"), Some(SyncAction::Create));
    assert_eq!(warehouse.requests_to(&Method::POST, "/tables").len(), 2);
}
