//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to the pipeline.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat, TableArg};
pub use presentation::{
    format_generate_outcome, format_initialize_outcome, format_partner_report,
    format_records_json, format_records_text, format_sync_summary,
};
pub use route::{CommandOutput, RunContext};
