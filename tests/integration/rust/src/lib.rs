//! Integration test suite for the Corten JavaScript linter
//!
//! This crate provides integration tests that verify components work
//! together correctly across component boundaries.

/// Re-export components for test convenience
pub mod components {
    pub use core_types;
    pub use lint_cli;
    pub use linter;
}
