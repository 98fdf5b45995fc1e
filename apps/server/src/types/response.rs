// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use gdt_lite_core::{OutputRow, TableSummary};
use serde::{Deserialize, Serialize};

/// Extracted tolerance table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// Uploaded file name, when one was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Tolerance rows in source order, then datum rows.
    pub rows: Vec<OutputRow>,
    /// Row counts.
    pub summary: TableSummary,
    /// Processing statistics.
    pub stats: ExtractionStats,
}

impl ExtractResponse {
    pub fn new(filename: Option<String>, rows: Vec<OutputRow>, stats: ExtractionStats) -> Self {
        let summary = TableSummary::from_rows(&rows);
        Self {
            filename,
            rows,
            summary,
            stats,
        }
    }
}

/// Processing statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Time spent in extraction (ms).
    pub extraction_time_ms: u64,
    /// Size of the uploaded content in bytes.
    pub input_bytes: usize,
}
