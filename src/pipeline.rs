//! Orchestration Pipeline
//!
//! The operations a user can invoke: generate missing partner reports, initialize the
//! configuration tables and register them as external warehouse tables. Everything the
//! pipeline needs is injected at construction; it reads no ambient configuration.

use crate::config::MonitorConfig;
use crate::error::PipelineError;
use crate::prompt::UserPrompt;
use crate::services::reporting::{default_report_template, ReportDefinition};
use crate::services::{ReportingClient, WarehouseClient};
use crate::sheet::{ConfigRecord, ConfigSheet, TabularStore, FIRST_DATA_ROW};
use crate::tables::{ExternalSource, TableLayout, PARTNER_ID, REPORT_ID};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub mod external_tables;
pub mod initialize;
pub mod reports;

pub use external_tables::{plan_table_sync, SyncAction, SyncSummary, TableSync};
pub use initialize::InitializeOutcome;
pub use reports::{CreatedReport, FailedReport, GenerateOutcome, GenerationSummary};

/// Deployment constants and table layouts the pipeline operates on.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub project_id: String,
    pub dataset_id: String,
    pub partner_table_id: String,
    pub advertiser_table_id: String,
    pub source: ExternalSource,
    /// Report definition with `${partnerId}` / `${partnerName}` placeholders
    pub report_template: Value,
    pub partner_layout: TableLayout,
    pub advertiser_layout: TableLayout,
}

impl PipelineSettings {
    /// Settings with the standard table ids, layouts and report template.
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        source: ExternalSource,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            partner_table_id: "partner_config".to_string(),
            advertiser_table_id: "advertiser_config".to_string(),
            source,
            report_template: default_report_template(),
            partner_layout: TableLayout::partner(),
            advertiser_layout: TableLayout::advertiser(),
        }
    }

    /// Build settings from loaded configuration. A relative `reporting.template_file` is
    /// resolved against `workspace_root`.
    pub fn from_config(
        config: &MonitorConfig,
        workspace_root: &Path,
    ) -> Result<Self, PipelineError> {
        let report_template = match &config.reporting.template_file {
            Some(path) => load_template(&workspace_root.join(path))?,
            None => default_report_template(),
        };
        check_template(&report_template)?;

        Ok(Self {
            project_id: config.gcp.project_id.clone(),
            dataset_id: config.gcp.dataset_id.clone(),
            partner_table_id: config.gcp.partner_table_id.clone(),
            advertiser_table_id: config.gcp.advertiser_table_id.clone(),
            source: ExternalSource {
                source_uri: config.workbook.source_uri.clone(),
                source_format: config.external_tables.source_format.clone(),
                skip_leading_rows: config.external_tables.skip_leading_rows,
            },
            report_template,
            partner_layout: TableLayout::partner(),
            advertiser_layout: TableLayout::advertiser(),
        })
    }

    pub fn layout(&self, table: ConfigTable) -> &TableLayout {
        match table {
            ConfigTable::Partners => &self.partner_layout,
            ConfigTable::Advertisers => &self.advertiser_layout,
        }
    }
}

fn load_template(path: &Path) -> Result<Value, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::Template(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&text)
        .map_err(|e| PipelineError::Template(format!("{} is not valid JSON: {}", path.display(), e)))
}

/// The template must already have the shape of a report definition.
fn check_template(template: &Value) -> Result<(), PipelineError> {
    serde_json::from_value::<ReportDefinition>(template.clone())
        .map(|_| ())
        .map_err(|e| PipelineError::Template(e.to_string()))
}

/// One of the two configuration tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigTable {
    Partners,
    Advertisers,
}

/// Orchestration pipeline over injected store, prompt and service clients.
pub struct Pipeline {
    settings: PipelineSettings,
    store: Box<dyn TabularStore>,
    prompt: Arc<dyn UserPrompt>,
    reporting: ReportingClient,
    warehouse: WarehouseClient,
}

impl Pipeline {
    pub fn new(
        settings: PipelineSettings,
        store: Box<dyn TabularStore>,
        prompt: Arc<dyn UserPrompt>,
        reporting: ReportingClient,
        warehouse: WarehouseClient,
    ) -> Self {
        Self {
            settings,
            store,
            prompt,
            reporting,
            warehouse,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn store(&self) -> &dyn TabularStore {
        self.store.as_ref()
    }

    pub fn into_store(self) -> Box<dyn TabularStore> {
        self.store
    }

    /// Every record of a configuration table, in row order.
    pub fn records(&mut self, table: ConfigTable) -> Result<Vec<ConfigRecord>, PipelineError> {
        let layout = self.settings.layout(table);
        let sheet = ConfigSheet::new(self.store.as_mut(), layout.name.as_str());
        if sheet.last_row()? < FIRST_DATA_ROW {
            return Ok(Vec::new());
        }
        Ok(sheet.read_records(&layout.fields, FIRST_DATA_ROW)?)
    }

    /// Fetch the report definition recorded for `partner_id`.
    pub async fn partner_report(
        &mut self,
        partner_id: &str,
    ) -> Result<(ConfigRecord, ReportDefinition), PipelineError> {
        let layout = &self.settings.partner_layout;
        let sheet = ConfigSheet::new(self.store.as_mut(), layout.name.as_str());
        let mut partners = if sheet.last_row()? < FIRST_DATA_ROW {
            Default::default()
        } else {
            sheet.read_records_by_id(&layout.fields, PARTNER_ID)?
        };
        let partner = partners
            .remove(partner_id)
            .ok_or_else(|| PipelineError::PartnerNotFound(partner_id.to_string()))?;

        let report_cell = partner.value(REPORT_ID);
        let query_id = report_cell
            .as_number()
            .filter(|n| n.fract() == 0.0)
            .map(|n| n as i64)
            .ok_or_else(|| PipelineError::ReportMissing {
                partner_id: partner_id.to_string(),
                report_id: report_cell.to_string(),
            })?;

        debug!(partner_id, query_id, "Fetching partner report");
        let report = self.reporting.get_query(query_id).await?;
        info!(partner_id, query_id, "Fetched partner report");
        Ok((partner, report))
    }
}
