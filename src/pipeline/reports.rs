//! GenerateReports: create a report for every partner that has none and record its id.

use super::Pipeline;
use crate::error::PipelineError;
use crate::interpolate::interpolate_value;
use crate::services::ReportDefinition;
use crate::sheet::{CellValue, ConfigRecord, ConfigSheet, FIRST_DATA_ROW};
use crate::tables::{PARTNER_ID, PARTNER_NAME, REPORT_ID};
use serde_json::json;
use tracing::{info, warn};

pub const NOTIFICATION_TITLE: &str = "Notification";
pub const NO_PARTNERS_MESSAGE: &str = "There is no partner.";
pub const ALL_PRESENT_MESSAGE: &str = "All partners have the reports.";

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedReport {
    pub partner_id: String,
    pub partner_name: String,
    /// Table row the id was written to
    pub row: usize,
    pub report_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedReport {
    pub partner_id: String,
    pub partner_name: String,
    pub row: usize,
    /// Set when the report was created but the id could not be written back
    pub report_id: Option<i64>,
    pub error: String,
}

/// Per-partner results of one generation run, in table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationSummary {
    pub created: Vec<CreatedReport>,
    pub failed: Vec<FailedReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// The partner table has no data rows.
    NoPartners,
    /// Every partner already has a report id.
    AllPresent,
    Generated(GenerationSummary),
}

impl GenerateOutcome {
    /// Error to return when any partner failed, so unattended runs exit non-zero.
    pub fn failure(&self) -> Option<PipelineError> {
        match self {
            GenerateOutcome::Generated(summary) if !summary.failed.is_empty() => {
                Some(PipelineError::ReportsFailed {
                    failed: summary.failed.len(),
                    created: summary.created.len(),
                })
            }
            _ => None,
        }
    }
}

impl Pipeline {
    /// Create a report for every partner whose `report_id` is blank and write the new id
    /// into that partner's row.
    ///
    /// Partners are handled one at a time in table order. A failed creation or write-back is
    /// logged and recorded in the summary; the remaining partners are still processed.
    /// A template that cannot be turned into a report definition aborts the run.
    pub async fn generate_reports(&mut self) -> Result<GenerateOutcome, PipelineError> {
        let layout = self.settings.partner_layout.clone();
        let report_column = layout.column_of(REPORT_ID).ok_or_else(|| {
            PipelineError::Config(format!("Table '{}' has no {} field", layout.name, REPORT_ID))
        })?;

        let partners = {
            let sheet = ConfigSheet::new(self.store.as_mut(), layout.name.as_str());
            if sheet.last_row()? < FIRST_DATA_ROW {
                self.prompt.alert(NOTIFICATION_TITLE, NO_PARTNERS_MESSAGE);
                return Ok(GenerateOutcome::NoPartners);
            }
            sheet.read_records(&layout.fields, FIRST_DATA_ROW)?
        };

        let missing: Vec<(usize, &ConfigRecord)> = partners
            .iter()
            .enumerate()
            .filter(|(_, partner)| partner.value(REPORT_ID).is_blank())
            .collect();
        if missing.is_empty() {
            self.prompt.alert(NOTIFICATION_TITLE, ALL_PRESENT_MESSAGE);
            return Ok(GenerateOutcome::AllPresent);
        }
        info!(
            partners = partners.len(),
            missing = missing.len(),
            "Generating missing partner reports"
        );

        let mut summary = GenerationSummary::default();
        for (index, partner) in missing {
            let row = FIRST_DATA_ROW + index;
            let partner_id = partner.value(PARTNER_ID);
            let partner_name = partner.value(PARTNER_NAME);
            let report = self.build_report(&partner_id, &partner_name)?;

            let report_id = match self.reporting.create_query(&report).await {
                Ok(report_id) => report_id,
                Err(e) => {
                    warn!(partner_id = %partner_id, row, error = %e, "Failed to create report");
                    summary.failed.push(FailedReport {
                        partner_id: partner_id.to_string(),
                        partner_name: partner_name.to_string(),
                        row,
                        report_id: None,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let mut sheet = ConfigSheet::new(self.store.as_mut(), layout.name.as_str());
            match sheet.write_cell(row, report_column, CellValue::from(report_id)) {
                Ok(()) => {
                    info!(partner_id = %partner_id, row, report_id, "Report created");
                    summary.created.push(CreatedReport {
                        partner_id: partner_id.to_string(),
                        partner_name: partner_name.to_string(),
                        row,
                        report_id,
                    });
                }
                Err(e) => {
                    warn!(
                        partner_id = %partner_id,
                        row,
                        report_id,
                        error = %e,
                        "Report created but its id could not be saved"
                    );
                    summary.failed.push(FailedReport {
                        partner_id: partner_id.to_string(),
                        partner_name: partner_name.to_string(),
                        row,
                        report_id: Some(report_id),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(GenerateOutcome::Generated(summary))
    }

    /// Fill the partner's id and name into the report template. Unresolved placeholders are
    /// left as written.
    fn build_report(
        &self,
        partner_id: &CellValue,
        partner_name: &CellValue,
    ) -> Result<ReportDefinition, PipelineError> {
        let parameters = json!({
            "partnerId": partner_id.to_json(),
            "partnerName": partner_name.to_json(),
        });
        let definition = interpolate_value(&self.settings.report_template, &parameters, true)?;
        serde_json::from_value(definition).map_err(|e| PipelineError::Template(e.to_string()))
    }
}
