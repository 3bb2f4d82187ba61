//! CLI Exit Code Registry
//!
//! Single source of truth for `padconv` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                               |
//! |------|-------------------------------------------------------|
//! | 0    | Success                                               |
//! | 1    | General error (unspecified)                           |
//! | 2    | Usage error (bad period, unknown kind)                |
//! | 3    | Settings or recon config missing, unparsable, invalid |
//! | 4    | Schema invalid                                        |
//! | 5    | One or more source files were rejected                |
//! | 6    | Cache or output could not be written                  |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments.
pub const EXIT_USAGE: u8 = 2;

/// Settings file or `[recon]` table unreadable or invalid.
pub const EXIT_CONFIG: u8 = 3;

/// A schema failed validation, or lacks a column the engine reads.
pub const EXIT_SCHEMA: u8 = 4;

/// Run completed, but at least one source file was rejected.
/// Outputs are still written from the files that decoded.
pub const EXIT_DECODE: u8 = 5;

/// Writer or cache persistence failed.
pub const EXIT_WRITE: u8 = 6;
