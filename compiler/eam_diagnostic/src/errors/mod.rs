//! Embedded error documentation for `--explain` support.
//!
//! Each error code has a markdown documentation file that explains the
//! diagnostic, shows an example, and suggests a fix. These are embedded at
//! compile time and can be accessed via `ErrorDocs::get()`.

use crate::ErrorCode;

/// Registry of embedded error documentation.
pub struct ErrorDocs;

impl ErrorDocs {
    /// Get the documentation for an error code.
    ///
    /// Returns `Some(markdown)` if documentation exists for the code,
    /// `None` otherwise.
    pub fn get(code: ErrorCode) -> Option<&'static str> {
        DOCS.iter().find(|(c, _)| *c == code).map(|(_, doc)| *doc)
    }
}

static DOCS: &[(ErrorCode, &str)] = &[
    (ErrorCode::EAM001, include_str!("EAM001.md")),
    (ErrorCode::EAM002, include_str!("EAM002.md")),
    (ErrorCode::EAM003, include_str!("EAM003.md")),
    (ErrorCode::EAM004, include_str!("EAM004.md")),
    (ErrorCode::EAM005, include_str!("EAM005.md")),
];

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
