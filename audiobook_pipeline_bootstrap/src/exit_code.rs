// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Code Management
//!
//! Standardized Unix exit codes following BSD `sysexits.h` conventions.
//!
//! - **0**: Success
//! - **1**: General error
//! - **64-78**: Specific error conditions (BSD sysexits.h)
//! - **128+N**: Fatal signal N (e.g., 130 = SIGINT)

use std::fmt;

/// Exit codes following Unix conventions (BSD sysexits.h)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    #[default]
    Success = 0,
    Error = 1,

    /// Invalid arguments, missing required arguments, unknown flags.
    UsageError = 64,

    /// Malformed configuration, invalid request body, parse errors.
    DataError = 65,

    /// Book, chunk, or file not found.
    NoInput = 66,

    /// Unknown user or invalid bearer token.
    NoUser = 67,

    NoHost = 68,

    /// Database or blob store unreachable at startup.
    Unavailable = 69,

    /// Unexpected internal error, assertion failure, stage handler panic.
    Software = 70,

    OsError = 71,
    OsFile = 72,

    /// Cannot create the blob root or write the database file.
    CantCreate = 73,

    IoError = 74,

    /// Transient error; caller should retry.
    TempFail = 75,

    Protocol = 76,

    /// Ownership mismatch or missing bearer token.
    NoPerm = 77,

    /// Invalid or missing signing secret, malformed config file.
    Config = 78,

    /// SIGINT (Ctrl+C) received.
    Interrupted = 130,

    /// SIGTERM received.
    Terminated = 143,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps a boxed error's message to the closest `sysexits.h` code.
    /// Best-effort: heuristic string matching, not a type-based dispatch,
    /// since callers at the CLI edge only have `dyn std::error::Error`.
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        let error_string = error.to_string().to_lowercase();

        if error_string.contains("permission") || error_string.contains("access denied") || error_string.contains("ownership") {
            ExitCode::NoPerm
        } else if error_string.contains("not found") || error_string.contains("no such") {
            ExitCode::NoInput
        } else if error_string.contains("signing") || error_string.contains("config") {
            ExitCode::Config
        } else if error_string.contains("invalid") || error_string.contains("argument") {
            ExitCode::UsageError
        } else if error_string.contains("parse") || error_string.contains("format") || error_string.contains("validation") {
            ExitCode::DataError
        } else if error_string.contains("io") || error_string.contains("read") || error_string.contains("write") {
            ExitCode::IoError
        } else if error_string.contains("unavailable") || error_string.contains("not available") {
            ExitCode::Unavailable
        } else if error_string.contains("transient") {
            ExitCode::TempFail
        } else {
            ExitCode::Error
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::Error => "General error",
            ExitCode::UsageError => "Command line usage error",
            ExitCode::DataError => "Data format error",
            ExitCode::NoInput => "Cannot open input",
            ExitCode::NoUser => "User does not exist",
            ExitCode::NoHost => "Host name unknown",
            ExitCode::Unavailable => "Service unavailable",
            ExitCode::Software => "Internal software error",
            ExitCode::OsError => "System error",
            ExitCode::OsFile => "Critical OS file missing",
            ExitCode::CantCreate => "Cannot create output file",
            ExitCode::IoError => "I/O error",
            ExitCode::TempFail => "Temporary failure, retry",
            ExitCode::Protocol => "Remote error in protocol",
            ExitCode::NoPerm => "Permission denied",
            ExitCode::Config => "Configuration error",
            ExitCode::Interrupted => "Interrupted by signal (SIGINT)",
            ExitCode::Terminated => "Terminated by signal (SIGTERM)",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }

    pub fn is_error(self) -> bool {
        !self.is_success()
    }

    pub fn is_signal(self) -> bool {
        matches!(self, ExitCode::Interrupted | ExitCode::Terminated)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code.as_i32()
    }
}

/// Maps a `Result` to a process exit code, logging the error (if any) at
/// error level before returning.
pub fn result_to_exit_code<E: std::error::Error>(result: Result<(), E>) -> std::process::ExitCode {
    match result {
        Ok(()) => std::process::ExitCode::from(ExitCode::Success.as_i32() as u8),
        Err(e) => {
            tracing::error!(error = %e, "application exited with an error");
            std::process::ExitCode::from(ExitCode::from_error(&e).as_i32() as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_values_match_sysexits() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::Error.as_i32(), 1);
        assert_eq!(ExitCode::UsageError.as_i32(), 64);
        assert_eq!(ExitCode::Config.as_i32(), 78);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
        assert_eq!(ExitCode::Terminated.as_i32(), 143);
    }

    #[test]
    fn is_success_and_is_error_are_complementary() {
        assert!(ExitCode::Success.is_success());
        assert!(!ExitCode::Success.is_error());
        assert!(ExitCode::Config.is_error());
    }

    #[test]
    fn is_signal_recognizes_interrupt_and_terminate() {
        assert!(ExitCode::Interrupted.is_signal());
        assert!(ExitCode::Terminated.is_signal());
        assert!(!ExitCode::Success.is_signal());
    }

    #[test]
    fn from_error_maps_permission_errors() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        assert_eq!(ExitCode::from_error(&err), ExitCode::NoPerm);
    }

    #[test]
    fn from_error_maps_not_found_errors() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "book not found");
        assert_eq!(ExitCode::from_error(&err), ExitCode::NoInput);
    }

    #[test]
    fn display_includes_description_and_numeric_code() {
        let rendered = ExitCode::UsageError.to_string();
        assert!(rendered.contains("Command line usage error"));
        assert!(rendered.contains("64"));
    }
}
