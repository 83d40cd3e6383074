use sheetsync_recon::ReconConfig;
use sheetsync_sheets::{Endpoints, ServiceAccountKey, SheetsError};

/// Source workbook and its two worksheets.
pub const SOURCE_WORKBOOK: &str = "BTS_10_NEW";
pub const PRIMARY_WORKSHEET: &str = "FR3";
pub const REFERENCE_WORKSHEET: &str = "scrdata";

/// Destination workbook and worksheet.
pub const DESTINATION_WORKBOOK: &str = "BTSPT";
pub const DESTINATION_WORKSHEET: &str = "FR_SHEET";

/// Environment variable holding the service-account credential JSON.
pub const CREDENTIALS_ENV: &str = "GOOGLE_CREDENTIALS_JSON";

pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_PORT: u16 = 10000;

/// Everything one pipeline run needs, passed in explicitly so tests can
/// substitute workbooks, endpoints, and the credential source.
///
/// Credentials are looked up per run, not at construction: a deployment
/// with a missing credential still answers `/healthz`.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub source_workbook: String,
    pub primary_worksheet: String,
    pub reference_worksheet: String,
    pub destination_workbook: String,
    pub destination_worksheet: String,
    /// Name of the environment variable carrying the credential JSON.
    pub credentials_env: String,
    pub endpoints: Endpoints,
    pub recon: ReconConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            source_workbook: SOURCE_WORKBOOK.into(),
            primary_worksheet: PRIMARY_WORKSHEET.into(),
            reference_worksheet: REFERENCE_WORKSHEET.into(),
            destination_workbook: DESTINATION_WORKBOOK.into(),
            destination_worksheet: DESTINATION_WORKSHEET.into(),
            credentials_env: CREDENTIALS_ENV.into(),
            endpoints: Endpoints::default(),
            recon: ReconConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Read and parse the credential payload from the environment.
    pub fn load_credentials(&self) -> Result<ServiceAccountKey, SheetsError> {
        let payload = std::env::var(&self.credentials_env).map_err(|_| {
            SheetsError::Configuration(format!("{} env var is missing", self.credentials_env))
        })?;
        ServiceAccountKey::from_json(&payload)
    }
}

/// Listen port from the environment, falling back to the default.
pub fn listen_port() -> u16 {
    std::env::var(PORT_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_env_is_configuration_error() {
        let config = ServiceConfig {
            credentials_env: "SHEETSYNC_TEST_UNSET_CREDS".into(),
            ..ServiceConfig::default()
        };
        let err = config.load_credentials().unwrap_err();
        assert!(matches!(err, SheetsError::Configuration(_)));
        assert!(err.to_string().contains("SHEETSYNC_TEST_UNSET_CREDS"));
    }

    #[test]
    fn default_config_names_production_worksheets() {
        let config = ServiceConfig::default();
        assert_eq!(config.source_workbook, "BTS_10_NEW");
        assert_eq!(config.primary_worksheet, "FR3");
        assert_eq!(config.reference_worksheet, "scrdata");
        assert_eq!(config.destination_worksheet, "FR_SHEET");
    }
}
