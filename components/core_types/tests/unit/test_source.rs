//! Unit tests for SourcePosition

use core_types::SourcePosition;
use std::collections::BTreeSet;

#[cfg(test)]
mod source_position_tests {
    use super::*;

    #[test]
    fn test_source_position_display() {
        assert_eq!(SourcePosition::new(1, 1).to_string(), "1:1");
        assert_eq!(SourcePosition::new(120, 48).to_string(), "120:48");
    }

    #[test]
    fn test_detached_position_displays_zero() {
        assert_eq!(SourcePosition::detached().to_string(), "0:0");
    }

    #[test]
    fn test_source_position_copy() {
        let pos1 = SourcePosition::new(42, 7);
        let pos2 = pos1;
        assert_eq!(pos1, pos2);
    }

    #[test]
    fn test_positions_sort_in_source_order() {
        let set: BTreeSet<_> = [
            SourcePosition::new(3, 1),
            SourcePosition::new(1, 9),
            SourcePosition::new(1, 2),
            SourcePosition::detached(),
        ]
        .into_iter()
        .collect();
        let ordered: Vec<_> = set.into_iter().map(|p| p.to_string()).collect();
        assert_eq!(ordered, vec!["0:0", "1:2", "1:9", "3:1"]);
    }

    #[test]
    fn test_source_position_large_values() {
        let pos = SourcePosition::new(u32::MAX, u32::MAX);
        assert!(pos.is_attached());
        assert_eq!(pos.line, u32::MAX);
    }
}

#[cfg(test)]
mod serialization_tests {
    use super::*;

    #[test]
    fn test_source_position_json() {
        let json = serde_json::to_string(&SourcePosition::new(4, 12)).unwrap();
        assert_eq!(json, r#"{"line":4,"column":12}"#);

        let back: SourcePosition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SourcePosition::new(4, 12));
    }
}
