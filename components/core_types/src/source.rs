//! Source position types for diagnostic reporting.
//!
//! Lines and columns are 1-based, matching what editors display. Findings
//! that are not tied to any source text (for example a bad option passed in
//! a configuration object) use line 0.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a position in source code.
///
/// Columns count characters, so a tab occupies a single column.
///
/// # Examples
///
/// ```
/// use core_types::SourcePosition;
///
/// let pos = SourcePosition::new(10, 5);
///
/// assert_eq!(pos.line, 10);
/// assert_eq!(pos.to_string(), "10:5");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    /// Line number (1-indexed, 0 for positionless findings)
    pub line: u32,
    /// Column number (1-indexed)
    pub column: u32,
}

impl SourcePosition {
    /// Create a position from a line and column
    pub fn new(line: u32, column: u32) -> Self {
        SourcePosition { line, column }
    }

    /// Position used for findings that have no place in the source
    pub fn detached() -> Self {
        SourcePosition { line: 0, column: 0 }
    }

    /// Whether this position points into the source
    pub fn is_attached(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_position_creation() {
        let pos = SourcePosition::new(10, 5);
        assert_eq!(pos.line, 10);
        assert_eq!(pos.column, 5);
        assert!(pos.is_attached());
    }

    #[test]
    fn test_detached_position() {
        let pos = SourcePosition::detached();
        assert!(!pos.is_attached());
        assert_eq!(pos, SourcePosition::default());
    }

    #[test]
    fn test_positions_order_by_line_then_column() {
        let a = SourcePosition::new(2, 30);
        let b = SourcePosition::new(3, 1);
        let c = SourcePosition::new(3, 7);
        assert!(a < b);
        assert!(b < c);
    }
}
