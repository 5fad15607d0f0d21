//! Diagnostic system for the pattern-constraint analyzer.
//!
//! Every diagnostic carries:
//! - A stable error code for searchability (`EAM001`..)
//! - A severity derived from the code
//! - A clear message (what went wrong, including the pattern text)
//! - A primary span anchored at the offending argument or call
//!
//! Error codes are never reused for a different meaning; `ErrorDocs` has
//! the long-form explanation for each.

mod diagnostic;
mod error_code;
pub mod errors;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use errors::ErrorDocs;
