// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Record Builder
//!
//! Turns tolerance records and datums into flat table rows.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::GeometryTables;
use crate::location::LocationClassifier;
use crate::tolerance::ToleranceRecord;

/// Type column of datum rows
pub const DATUM_TYPE: &str = "Datum";

/// Location prefixes that get an axis-orientation annotation
const PLANAR_PREFIXES: [&str; 2] = ["top face", "bottom face"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RowCategory {
    Tolerance,
    Datum,
}

/// One row of the extracted table
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutputRow {
    /// Glyph and kind label, or `Datum`
    #[cfg_attr(feature = "serde", serde(rename = "Type"))]
    pub type_label: String,
    /// `±<value>`, `N/A`, or the datum letter
    #[cfg_attr(feature = "serde", serde(rename = "Value"))]
    pub value: String,
    #[cfg_attr(feature = "serde", serde(rename = "Datum"))]
    pub datum_letter: String,
    #[cfg_attr(feature = "serde", serde(rename = "Location"))]
    pub location: String,
    #[cfg_attr(feature = "serde", serde(rename = "Surface"))]
    pub surface: String,
    #[cfg_attr(feature = "serde", serde(rename = "Category"))]
    pub category: RowCategory,
}

impl OutputRow {
    #[inline]
    pub fn is_datum(&self) -> bool {
        self.category == RowCategory::Datum
    }
}

/// Builds rows from resolved records
#[derive(Debug, Clone, Copy)]
pub struct RecordBuilder<'g> {
    geometry: &'g GeometryTables,
    coarse: &'g LocationClassifier,
    surface: &'g LocationClassifier,
}

impl<'g> RecordBuilder<'g> {
    pub fn new(
        geometry: &'g GeometryTables,
        coarse: &'g LocationClassifier,
        surface: &'g LocationClassifier,
    ) -> Self {
        Self {
            geometry,
            coarse,
            surface,
        }
    }

    pub fn tolerance_row(&self, record: &ToleranceRecord) -> OutputRow {
        let (location, surface) = self.describe(&record.location);
        OutputRow {
            type_label: record.kind.type_label(),
            value: record.value_display(),
            datum_letter: record.datum_letter.map(String::from).unwrap_or_default(),
            location,
            surface,
            category: RowCategory::Tolerance,
        }
    }

    /// Row for a datum letter and the name of the feature it resolved to
    pub fn datum_row(&self, letter: char, feature_name: &str) -> OutputRow {
        let (location, surface) = self.describe(feature_name);
        OutputRow {
            type_label: DATUM_TYPE.to_string(),
            value: letter.to_string(),
            datum_letter: letter.to_string(),
            location,
            surface,
            category: RowCategory::Datum,
        }
    }

    /// Location and surface text, with orientation for planar faces
    fn describe(&self, feature_name: &str) -> (String, String) {
        let location = self.coarse.classify(feature_name);
        let mut surface = self.surface.classify(feature_name).to_string();

        if PLANAR_PREFIXES.iter().any(|prefix| location.starts_with(prefix)) {
            if let Some(orientation) = self.geometry.first_plane_orientation() {
                surface = format!("{} ({})", location, orientation);
            }
        }

        (location.to_string(), surface)
    }
}

/// Row count for one type label
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeCount {
    pub type_label: String,
    pub count: usize,
}

/// Counts over an extracted table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableSummary {
    pub total: usize,
    pub tolerances: usize,
    pub datums: usize,
    /// Sorted by type label
    pub by_type: Vec<TypeCount>,
}

impl TableSummary {
    pub fn from_rows(rows: &[OutputRow]) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in rows {
            *counts.entry(row.type_label.as_str()).or_default() += 1;
        }

        let datums = rows.iter().filter(|row| row.is_datum()).count();

        Self {
            total: rows.len(),
            tolerances: rows.len() - datums,
            datums,
            by_type: counts
                .into_iter()
                .map(|(type_label, count)| TypeCount {
                    type_label: type_label.to_string(),
                    count,
                })
                .collect(),
        }
    }

    /// Count for one type label (zero when absent)
    pub fn count_of(&self, type_label: &str) -> usize {
        self.by_type
            .iter()
            .find(|entry| entry.type_label == type_label)
            .map_or(0, |entry| entry.count)
    }
}
