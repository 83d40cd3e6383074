//! The blocking pipeline: connect, fetch three tables, reconcile, and
//! (for the persisting variant) overwrite the destination worksheet.

use serde::Serialize;
use sheetsync_core::Table;
use sheetsync_recon::{reconcile, ReconOutcome};
use sheetsync_sheets::SheetsClient;
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::ServiceError;

/// Summary returned by `/api/run`.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub status: &'static str,
    pub input_rows: usize,
    pub matched_in_scrdata: usize,
    pub existing_in_fr_sheet: usize,
    pub new_rows_written: usize,
    pub output_sheet: String,
}

/// Fetch + reconcile + write: the full run. Returns the summary only
/// after the destination overwrite succeeded.
pub fn run_sync(config: &ServiceConfig) -> Result<RunSummary, ServiceError> {
    let (client, outcome) = reconcile_from_remote(config)?;

    client.write_table(
        &config.destination_workbook,
        &config.destination_worksheet,
        &outcome.table,
    )?;

    let summary = RunSummary {
        status: "ok",
        input_rows: outcome.input_rows,
        matched_in_scrdata: outcome.matched,
        existing_in_fr_sheet: outcome.already_present,
        new_rows_written: outcome.table.len(),
        output_sheet: format!(
            "{}/{}",
            config.destination_workbook, config.destination_worksheet
        ),
    };
    info!(
        input_rows = summary.input_rows,
        matched = summary.matched_in_scrdata,
        written = summary.new_rows_written,
        output = %summary.output_sheet,
        "sync run complete"
    );
    Ok(summary)
}

/// Fetch + reconcile without persisting: the read-only report behind
/// `/api/data`.
pub fn run_report(config: &ServiceConfig) -> Result<Table, ServiceError> {
    let (_client, outcome) = reconcile_from_remote(config)?;
    info!(
        input_rows = outcome.input_rows,
        matched = outcome.matched,
        net_new = outcome.table.len(),
        "report run complete"
    );
    Ok(outcome.table)
}

/// Shared front half: credentials → connection → three fetches → engine.
fn reconcile_from_remote(
    config: &ServiceConfig,
) -> Result<(SheetsClient, ReconOutcome), ServiceError> {
    let key = config.load_credentials()?;
    let client = SheetsClient::connect_with(&key, config.endpoints.clone())?;

    let primary = client.fetch_table(&config.source_workbook, &config.primary_worksheet)?;
    let reference = client.fetch_table(&config.source_workbook, &config.reference_worksheet)?;
    let destination = client.fetch_table(
        &config.destination_workbook,
        &config.destination_worksheet,
    )?;

    let outcome = reconcile(&primary, &reference, &destination, &config.recon)?;
    Ok((client, outcome))
}
