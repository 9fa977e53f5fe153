//! InitializeConfiguration: reset both configuration tables to a bare header row.

use super::external_tables::SyncSummary;
use super::Pipeline;
use crate::error::PipelineError;
use crate::sheet::ConfigSheet;
use crate::tables::format_rules;
use tracing::info;

pub const CONFIRM_TITLE: &str = "Please confirm";
pub const ERASE_WARNING: &str =
    "This will erase everything on the Partner or Advertiser Config sheet, Continue?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitializeOutcome {
    /// The user declined; nothing was changed.
    Cancelled,
    Initialized(SyncSummary),
}

impl Pipeline {
    /// Clear both tables, write their headers and display formats, then create any missing
    /// external table. Asks for confirmation first when either table holds anything.
    pub async fn initialize_configuration(&mut self) -> Result<InitializeOutcome, PipelineError> {
        let layouts = [
            self.settings.partner_layout.clone(),
            self.settings.advertiser_layout.clone(),
        ];

        let mut has_data = false;
        for layout in &layouts {
            let sheet = ConfigSheet::new(self.store.as_mut(), layout.name.as_str());
            has_data |= sheet.last_row()? > 0;
        }
        if has_data && !self.prompt.confirm(CONFIRM_TITLE, ERASE_WARNING)? {
            info!("Initialization cancelled, tables left unchanged");
            return Ok(InitializeOutcome::Cancelled);
        }

        let formats = format_rules();
        for layout in &layouts {
            let mut sheet = ConfigSheet::new(self.store.as_mut(), layout.name.as_str());
            sheet.initialize_table(&layout.fields)?;
            sheet.apply_column_format(&layout.fields, &formats)?;
            info!(table = %layout.name, fields = layout.fields.len(), "Table initialized");
        }

        let summary = self.sync_external_tables(false).await?;
        Ok(InitializeOutcome::Initialized(summary))
    }
}
