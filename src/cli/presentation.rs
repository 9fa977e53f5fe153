//! CLI presentation: text and json formatters per command.

use crate::cli::parse::OutputFormat;
use crate::error::PipelineError;
use crate::pipeline::{GenerateOutcome, InitializeOutcome, SyncAction, SyncSummary};
use crate::services::ReportDefinition;
use crate::sheet::ConfigRecord;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::{json, Map, Value};

/// Format a section heading with bold/underline.
fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_generate_outcome(outcome: &GenerateOutcome) -> String {
    let summary = match outcome {
        GenerateOutcome::NoPartners => return "No partners configured.".to_string(),
        GenerateOutcome::AllPresent => return "All partners already have a report.".to_string(),
        GenerateOutcome::Generated(summary) => summary,
    };

    let mut out = format!("{}\n", format_section_heading("Reports"));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Row", "Partner", "Partner ID", "Report ID", "Status"]);
    for created in &summary.created {
        table.add_row(vec![
            created.row.to_string(),
            created.partner_name.clone(),
            created.partner_id.clone(),
            created.report_id.to_string(),
            "created".to_string(),
        ]);
    }
    for failed in &summary.failed {
        table.add_row(vec![
            failed.row.to_string(),
            failed.partner_name.clone(),
            failed.partner_id.clone(),
            failed
                .report_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            format!("failed: {}", failed.error),
        ]);
    }
    out.push_str(&table.to_string());
    out.push_str(&format!(
        "\n\n{} created, {} failed",
        summary.created.len(),
        summary.failed.len()
    ));
    out
}

pub fn format_sync_summary(summary: &SyncSummary) -> String {
    let mut out = format!("{}\n", format_section_heading("External Tables"));
    for table in &summary.tables {
        let action = match table.action {
            SyncAction::Create => "created",
            SyncAction::Update => "updated",
            SyncAction::Keep => "unchanged",
        };
        out.push_str(&format!("  {:<24} {}\n", table.table_id, action));
    }
    out
}

pub fn format_initialize_outcome(outcome: &InitializeOutcome) -> String {
    match outcome {
        InitializeOutcome::Cancelled => "Initialization cancelled; nothing was changed.".to_string(),
        InitializeOutcome::Initialized(summary) => format!(
            "Configuration tables initialized.\n\n{}",
            format_sync_summary(summary)
        ),
    }
}

pub fn format_records_text(fields: &[String], records: &[ConfigRecord]) -> String {
    if records.is_empty() {
        return "No records.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(fields.to_vec());
    for record in records {
        table.add_row(
            fields
                .iter()
                .map(|field| record.value(field).to_string())
                .collect::<Vec<_>>(),
        );
    }
    format!("{}\n\nTotal: {} record(s)", table, records.len())
}

fn record_json(record: &ConfigRecord) -> Value {
    let mut object = Map::new();
    for (field, value) in record.fields().zip(record.values()) {
        object.insert(field.to_string(), serde_json::to_value(value).unwrap_or(Value::Null));
    }
    Value::Object(object)
}

pub fn format_records_json(records: &[ConfigRecord]) -> Result<String, PipelineError> {
    let out = json!({
        "records": records.iter().map(record_json).collect::<Vec<_>>(),
        "total": records.len(),
    });
    serde_json::to_string_pretty(&out)
        .map_err(|e| PipelineError::Config(format!("Failed to render JSON: {}", e)))
}

pub fn format_partner_report(
    partner: &ConfigRecord,
    report: &ReportDefinition,
    format: OutputFormat,
) -> Result<String, PipelineError> {
    if format == OutputFormat::Json {
        let out = json!({ "partner": record_json(partner), "report": report });
        return serde_json::to_string_pretty(&out)
            .map_err(|e| PipelineError::Config(format!("Failed to render JSON: {}", e)));
    }

    let mut out = format!("{}\n", format_section_heading("Report"));
    if let Some(query_id) = report.query_id {
        out.push_str(&format!("Query ID: {}\n", query_id));
    }
    out.push_str(&format!("Title: {}\n", report.metadata.title));
    out.push_str(&format!("Date range: {}\n", report.metadata.data_range));
    out.push_str(&format!("Type: {}\n", report.params.report_type));
    if !report.params.filters.is_empty() {
        out.push_str("Filters:\n");
        for filter in &report.params.filters {
            out.push_str(&format!("  {} = {}\n", filter.filter_type, filter.value));
        }
    }
    if !report.params.group_bys.is_empty() {
        out.push_str(&format!("Group by: {}\n", report.params.group_bys.join(", ")));
    }
    if !report.params.metrics.is_empty() {
        out.push_str(&format!("Metrics: {}\n", report.params.metrics.join(", ")));
    }
    out.push_str(&format!("\n{}\n", format_section_heading("Partner")));
    for (field, value) in partner.fields().zip(partner.values()) {
        out.push_str(&format!("  {:<24} {}\n", field, value));
    }
    Ok(out)
}
