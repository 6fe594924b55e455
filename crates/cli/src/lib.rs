// mediagrid CLI library: inventory and catalog clients, the worker pool,
// and the commands behind the `mgrid` binary.

pub mod audit;
pub mod collect;
pub mod exit_codes;
pub mod fetch;

use exit_codes::{EXIT_ERROR, EXIT_INVENTORY_CONNECT, EXIT_USAGE};
use fetch::FetchError;

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Inventory server unreachable or token rejected.
    pub fn connect(err: FetchError) -> Self {
        let hint = match &err {
            FetchError::Status { status: 401 | 403, .. } => "check --token / PLEX_TOKEN",
            _ => "check --server / PLEX_URL and that the server is running",
        };
        Self {
            code: EXIT_INVENTORY_CONNECT,
            message: format!("cannot reach inventory server: {err}"),
            hint: Some(hint.to_string()),
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<mediagrid_io::ExportError> for CliError {
    fn from(err: mediagrid_io::ExportError) -> Self {
        Self { code: exit_codes::export_exit_code(&err), message: err.to_string(), hint: None }
    }
}

impl From<mediagrid_config::SettingsError> for CliError {
    fn from(err: mediagrid_config::SettingsError) -> Self {
        Self::args(err.to_string())
    }
}
