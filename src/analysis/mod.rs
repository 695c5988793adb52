/// Hunk header parsing and insertion-point resolution
pub mod hunk;

/// Regex-table reason and keyword detection
pub mod classifier;
