//! Error codes for all analyzer diagnostics.
//!
//! Each code is a stable identifier (e.g., `EAM001`) used for `--explain`
//! lookups, suppression, and documentation. A code keeps its meaning across
//! versions; retired codes are never reassigned.

use std::fmt;

use crate::Severity;

/// Error codes for all analyzer diagnostics.
///
/// - EAM001..EAM003: argument-versus-constraint checks
/// - EAM004..EAM005: capture arity checks
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    /// Constant argument does not match the parameter's pattern
    EAM001,
    /// Argument is not a compile-time constant, or the pattern does not compile
    EAM002,
    /// Matching the argument against the pattern exceeded the time budget
    EAM003,
    /// Destructuring call binds a different number of captures than the pattern has
    EAM004,
    /// Destructuring call uses a pattern that cannot be determined statically
    EAM005,
}

impl ErrorCode {
    /// Every supported diagnostic, in code order.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::EAM001,
        ErrorCode::EAM002,
        ErrorCode::EAM003,
        ErrorCode::EAM004,
        ErrorCode::EAM005,
    ];

    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EAM001 => "EAM001",
            ErrorCode::EAM002 => "EAM002",
            ErrorCode::EAM003 => "EAM003",
            ErrorCode::EAM004 => "EAM004",
            ErrorCode::EAM005 => "EAM005",
        }
    }

    /// Short title shown in rule listings.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorCode::EAM001 => "Argument fails pattern",
            ErrorCode::EAM002 => "Argument cannot be checked against pattern",
            ErrorCode::EAM003 => "Pattern check timed out",
            ErrorCode::EAM004 => "Capture count mismatch",
            ErrorCode::EAM005 => "Capture count cannot be verified",
        }
    }

    /// Severity the diagnostic is reported with.
    pub fn default_severity(&self) -> Severity {
        match self {
            ErrorCode::EAM001 | ErrorCode::EAM004 => Severity::Error,
            ErrorCode::EAM002 | ErrorCode::EAM005 => Severity::Warning,
            ErrorCode::EAM003 => Severity::Note,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
