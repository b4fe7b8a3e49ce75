//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                                |
//! |---------|-----------|--------------------------------------------|
//! | 0       | Universal | Success                                    |
//! | 1       | Universal | General error (unspecified)                |
//! | 2       | Universal | CLI usage error (bad args, missing file)   |
//! | 3       | Universal | IO error (unreadable dir, unwritable output) |
//! | 4       | Universal | Config error (parse or validation)         |
//! | 50-59   | fetch     | Listing page download                      |
//!
//! Per-document problems never change the exit code; they are reported in
//! the Flag column of the summary.
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-4)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing input file.
pub const EXIT_USAGE: u8 = 2;

/// Filesystem error - data dir unreadable, output not writable.
pub const EXIT_IO: u8 = 3;

/// Config file could not be read, parsed or validated.
pub const EXIT_CONFIG: u8 = 4;

// =============================================================================
// Fetch (50-59)
// =============================================================================

/// Listing page unreachable (DNS, connect, timeout, bad URL).
pub const EXIT_FETCH_CONNECT: u8 = 50;

/// Listing page answered with a non-success HTTP status.
pub const EXIT_FETCH_STATUS: u8 = 51;
