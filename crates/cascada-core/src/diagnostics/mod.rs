//! Diagnostics shared by the parser and the compiler passes.
//!
//! The system is built around [`Diagnostic`]: one error or warning with an
//! optional [`ErrorCode`], one or more labeled source locations, and help
//! text. The parser wraps diagnostics in its own fatal error type; compiler
//! passes report them into an [`ErrorManager`], which collects and keeps
//! going so a single job surfaces every problem at once.
//!
//! # Example
//!
//! ```
//! use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
//! use cascada_core::location::SourceUnit;
//!
//! let unit = SourceUnit::new("app.gss", "@else { a { b: c } }");
//! let mut errors = ErrorManager::new();
//!
//! errors.report(
//!     Diagnostic::error("@else without previous @if")
//!         .with_code(ErrorCode::E201)
//!         .with_label(unit.location(0, 5), "this branch has no chain to join"),
//! );
//!
//! assert!(errors.has_errors());
//! ```

mod diagnostic;
mod error_code;
mod label;
mod manager;
mod severity;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use manager::ErrorManager;
pub use severity::Severity;
