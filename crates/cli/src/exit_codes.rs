//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error (unspecified)                      |
//! | 2    | Usage error (bad args, bad config, bad section)  |
//! | 3    | Output path not writable (pre-check)             |
//! | 4    | Inventory server unreachable or auth rejected    |
//! | 5    | Workbook could not be written                    |
//!
//! Catalog lookup failures never produce an exit code: they degrade the
//! affected item to UNKNOWN and the run continues.

use mediagrid_io::ExportError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, invalid config, unknown section name.
pub const EXIT_USAGE: u8 = 2;

/// Output destination failed the writability pre-check.
/// Raised before the inventory server is contacted.
pub const EXIT_OUTPUT_NOT_WRITABLE: u8 = 3;

/// Inventory server could not be reached, or rejected the token.
pub const EXIT_INVENTORY_CONNECT: u8 = 4;

/// Workbook serialization or the final rename failed.
pub const EXIT_OUTPUT_WRITE: u8 = 5;

/// Map an export error to its exit code.
pub fn export_exit_code(err: &ExportError) -> u8 {
    match err {
        ExportError::NotWritable { .. } => EXIT_OUTPUT_NOT_WRITABLE,
        ExportError::Sheet { .. } | ExportError::Save(_) => EXIT_OUTPUT_WRITE,
    }
}
