//! Core types shared across the Corten lint components.
//!
//! This crate provides the foundational reporting types: where a finding
//! happened and how it is classified.
//!
//! # Overview
//!
//! - [`Diagnostic`] - A classified finding with message and position
//! - [`Severity`] - Info, warning or error
//! - [`SourcePosition`] - Source code location
//!
//! # Examples
//!
//! ```
//! use core_types::{Diagnostic, Severity, SourcePosition};
//!
//! let diag = Diagnostic {
//!     severity: Severity::Error,
//!     code: "E001".to_string(),
//!     message: "Unclosed string.".to_string(),
//!     template: "Unclosed string.".to_string(),
//!     position: SourcePosition::new(4, 12),
//!     scope: "(main)".to_string(),
//! };
//! assert!(diag.is_error());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod diagnostic;
mod source;

pub use diagnostic::{Diagnostic, Severity};
pub use source::SourcePosition;
