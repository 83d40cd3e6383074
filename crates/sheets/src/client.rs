use std::fmt;
use std::time::Duration;

use serde_json::Value;
use sheetsync_core::Table;

use crate::auth::{fetch_access_token, ServiceAccountKey};

// ── Constants ───────────────────────────────────────────────────────

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
const DRIVE_API_BASE: &str = "https://www.googleapis.com";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const USER_AGENT: &str = concat!("sheetsync/", env!("CARGO_PKG_VERSION"));

/// Capacity given to a destination worksheet created on first write.
const NEW_SHEET_ROWS: u32 = 1000;
const NEW_SHEET_COLS: u32 = 26;

// ── Errors ──────────────────────────────────────────────────────────

/// Error type for remote table operations.
#[derive(Debug)]
pub enum SheetsError {
    /// Missing or malformed credentials.
    Configuration(String),
    /// Remote source unreachable, unauthenticated, or a workbook /
    /// worksheet that cannot be located on the read path.
    Connection(String),
    /// Worksheet exists but holds no data rows (empty or header-only).
    DataNotFound { worksheet: String },
    /// Destination mutation failed after the workbook was reachable.
    Write(String),
}

impl fmt::Display for SheetsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::Connection(msg) => write!(f, "connection error: {msg}"),
            Self::DataNotFound { worksheet } => {
                write!(f, "no data found in sheet: {worksheet}")
            }
            Self::Write(msg) => write!(f, "write error: {msg}"),
        }
    }
}

impl std::error::Error for SheetsError {}

// ── Endpoints ───────────────────────────────────────────────────────

/// Base URLs for the two Google APIs the client talks to. Swappable so
/// tests can point the client at a local mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub sheets_base: String,
    pub drive_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            sheets_base: SHEETS_API_BASE.to_string(),
            drive_base: DRIVE_API_BASE.to_string(),
        }
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// Authenticated Sheets/Drive client (blocking).
///
/// One instance per pipeline run; nothing is cached across runs.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    token: String,
    endpoints: Endpoints,
}

impl SheetsClient {
    /// Build an HTTP client and exchange the service-account key for an
    /// access token.
    pub fn connect(key: &ServiceAccountKey) -> Result<Self, SheetsError> {
        Self::connect_with(key, Endpoints::default())
    }

    pub fn connect_with(key: &ServiceAccountKey, endpoints: Endpoints) -> Result<Self, SheetsError> {
        let http = build_http()?;
        let token = fetch_access_token(&http, key)?;
        Ok(Self { http, token, endpoints })
    }

    /// Construct with an already-issued token. Test seam.
    pub fn with_token(token: impl Into<String>, endpoints: Endpoints) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            http,
            token: token.into(),
            endpoints,
        }
    }

    /// Fetch a whole worksheet: first row is the header, the rest are
    /// data. Fails with `DataNotFound` when there is no data row.
    pub fn fetch_table(&self, workbook: &str, worksheet: &str) -> Result<Table, SheetsError> {
        let id = self.find_spreadsheet_id(workbook)?.ok_or_else(|| {
            SheetsError::Connection(format!("workbook '{workbook}' not found"))
        })?;

        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.endpoints.sheets_base,
            id,
            range_for(worksheet)
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .map_err(net_err)?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(SheetsError::Connection(format!(
                "worksheet '{worksheet}' not found in workbook '{workbook}'"
            )));
        }
        if status == 400 {
            // An unknown worksheet comes back as a range parse failure;
            // any other 400 keeps its own message.
            let text = response.text().unwrap_or_default();
            if text.contains("Unable to parse range") {
                return Err(SheetsError::Connection(format!(
                    "worksheet '{worksheet}' not found in workbook '{workbook}'"
                )));
            }
            return Err(SheetsError::Connection(format!(
                "reading worksheet '{worksheet}' failed (400): {text}"
            )));
        }
        let body = check(response, &format!("reading worksheet '{worksheet}'"))?;

        let values = grid_from(&body);
        if values.len() < 2 {
            return Err(SheetsError::DataNotFound {
                worksheet: worksheet.to_string(),
            });
        }
        Ok(Table::from_values(values))
    }

    /// Replace the destination worksheet's entire contents with `table`,
    /// creating the worksheet if it does not exist. Full overwrite:
    /// re-running with the same table leaves the same state.
    pub fn write_table(
        &self,
        workbook: &str,
        worksheet: &str,
        table: &Table,
    ) -> Result<(), SheetsError> {
        let id = self.find_spreadsheet_id(workbook)?.ok_or_else(|| {
            SheetsError::Write(format!("cannot open workbook '{workbook}'"))
        })?;

        self.ensure_worksheet(&id, worksheet)?;

        let clear_url = format!(
            "{}/v4/spreadsheets/{}/values/{}:clear",
            self.endpoints.sheets_base,
            id,
            range_for(worksheet)
        );
        let response = self
            .http
            .post(&clear_url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({}))
            .send()
            .map_err(net_err)?;
        check_write(response, &format!("clearing worksheet '{worksheet}'"))?;

        let update_url = format!(
            "{}/v4/spreadsheets/{}/values/{}!A1",
            self.endpoints.sheets_base,
            id,
            range_for(worksheet)
        );
        let body = serde_json::json!({
            "majorDimension": "ROWS",
            "values": table.to_values(),
        });
        let response = self
            .http
            .put(&update_url)
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .map_err(net_err)?;
        check_write(response, &format!("writing worksheet '{worksheet}'"))?;

        Ok(())
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// Resolve a workbook title to a spreadsheet id through Drive.
    /// `Ok(None)` when no spreadsheet carries that name.
    fn find_spreadsheet_id(&self, title: &str) -> Result<Option<String>, SheetsError> {
        let url = format!("{}/drive/v3/files", self.endpoints.drive_base);
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            title.replace('\'', "\\'"),
            SPREADSHEET_MIME
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("pageSize", "1"),
            ])
            .send()
            .map_err(net_err)?;
        let body = check(response, &format!("looking up workbook '{title}'"))?;

        Ok(body["files"]
            .as_array()
            .and_then(|files| files.first())
            .and_then(|file| file["id"].as_str())
            .map(String::from))
    }

    /// Create the worksheet if the workbook does not already carry it.
    fn ensure_worksheet(&self, spreadsheet_id: &str, worksheet: &str) -> Result<(), SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}",
            self.endpoints.sheets_base, spreadsheet_id
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .map_err(net_err)?;
        let body = check_write(response, &format!("listing worksheets for '{worksheet}'"))?;

        let exists = body["sheets"]
            .as_array()
            .map(|sheets| {
                sheets
                    .iter()
                    .any(|s| s["properties"]["title"].as_str() == Some(worksheet))
            })
            .unwrap_or(false);
        if exists {
            return Ok(());
        }

        let url = format!(
            "{}/v4/spreadsheets/{}:batchUpdate",
            self.endpoints.sheets_base, spreadsheet_id
        );
        let body = serde_json::json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": worksheet,
                        "gridProperties": {
                            "rowCount": NEW_SHEET_ROWS,
                            "columnCount": NEW_SHEET_COLS,
                        },
                    },
                },
            }],
        });
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(net_err)?;
        check_write(response, &format!("creating worksheet '{worksheet}'"))?;
        Ok(())
    }
}

// ── Free functions ──────────────────────────────────────────────────

fn build_http() -> Result<reqwest::blocking::Client, SheetsError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SheetsError::Connection(format!("failed to build HTTP client: {e}")))
}

fn net_err(e: reqwest::Error) -> SheetsError {
    SheetsError::Connection(e.to_string())
}

/// A1-notation range covering a whole worksheet. Apostrophes in titles
/// are doubled per A1 quoting rules.
fn range_for(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

/// Read-path status handling: auth failures and any other non-success
/// both surface as connection errors.
fn check(response: reqwest::blocking::Response, context: &str) -> Result<Value, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .map_err(|e| SheetsError::Connection(format!("{context}: malformed response: {e}")));
    }
    let body = response.text().unwrap_or_default();
    if matches!(status.as_u16(), 401 | 403) {
        return Err(SheetsError::Connection(format!(
            "unauthenticated while {context} ({}): {body}",
            status.as_u16()
        )));
    }
    Err(SheetsError::Connection(format!(
        "{context} failed ({}): {body}",
        status.as_u16()
    )))
}

/// Write-path status handling: auth failures stay connection errors,
/// everything else is a write error.
fn check_write(response: reqwest::blocking::Response, context: &str) -> Result<Value, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .map_err(|e| SheetsError::Write(format!("{context}: malformed response: {e}")));
    }
    let body = response.text().unwrap_or_default();
    if matches!(status.as_u16(), 401 | 403) {
        return Err(SheetsError::Connection(format!(
            "unauthenticated while {context} ({}): {body}",
            status.as_u16()
        )));
    }
    Err(SheetsError::Write(format!(
        "{context} failed ({}): {body}",
        status.as_u16()
    )))
}

/// Flatten the `values` grid of a ValueRange response into strings.
/// Numeric and boolean cells are rendered with their JSON text form.
fn grid_from(body: &Value) -> Vec<Vec<String>> {
    body["values"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| cells.iter().map(cell_to_string).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
