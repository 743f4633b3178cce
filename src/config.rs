//! Synchronization tunables
//!
//! All knobs that govern fingerprint matching and restore scheduling live in
//! one struct, with serde support so an embedding application can persist or
//! transmit them alongside its other settings. The defaults are the values
//! the matching heuristics were tuned with; they rarely need changing.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// SyncConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for cursor synchronization behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Characters captured on each side of the cursor fingerprint (default: 10)
    pub context_window: usize,
    /// How many lines above/below the target line to search (default: 2)
    pub line_search_radius: usize,
    /// Minimum combined context length worth searching for (default: 3)
    pub min_context_len: usize,
    /// `percent_in_line` at or above this snaps the cursor to the block end
    /// (default: 0.95)
    pub end_snap_threshold: f32,
    /// Readiness polls before a deferred restore is abandoned (default: 10)
    pub max_restore_attempts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            context_window: 10,
            line_search_radius: 2,
            min_context_len: 3,
            end_snap_threshold: 0.95,
            max_restore_attempts: 10,
        }
    }
}

impl SyncConfig {
    /// Line offsets to search, nearest first: 0, -1, +1, -2, +2, …
    pub(crate) fn search_offsets(&self) -> Vec<isize> {
        let mut offsets = vec![0];
        for d in 1..=self.line_search_radius as isize {
            offsets.push(-d);
            offsets.push(d);
        }
        offsets
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = SyncConfig::default();
        assert_eq!(config.context_window, 10);
        assert_eq!(config.line_search_radius, 2);
        assert_eq!(config.min_context_len, 3);
        assert!((config.end_snap_threshold - 0.95).abs() < f32::EPSILON);
        assert_eq!(config.max_restore_attempts, 10);
    }

    #[test]
    fn test_search_offsets_order() {
        let config = SyncConfig::default();
        assert_eq!(config.search_offsets(), vec![0, -1, 1, -2, 2]);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: SyncConfig = serde_json::from_str(r#"{"line_search_radius": 4}"#).unwrap();
        assert_eq!(config.line_search_radius, 4);
        assert_eq!(config.context_window, 10);
    }
}
