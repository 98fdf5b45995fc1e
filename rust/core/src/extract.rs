// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extraction pipeline
//!
//! Runs the resolvers in order and builds the output table. All tables are
//! local to one [`Extraction`]; nothing is shared between calls.

use std::borrow::Cow;

use crate::error::Result;
use crate::geometry::GeometryTables;
use crate::index::LineIndex;
use crate::location::LocationClassifier;
use crate::table::{OutputRow, RecordBuilder};
use crate::tolerance::{extract_tolerances, ToleranceRecord};
use crate::topology::TopologyTables;

/// Intermediate products of one extraction
#[derive(Debug, Clone)]
pub struct Extraction<'a> {
    pub index: LineIndex<'a>,
    pub geometry: GeometryTables,
    pub topology: TopologyTables<'a>,
    pub tolerances: Vec<ToleranceRecord>,
    coarse: LocationClassifier,
    surface: LocationClassifier,
}

impl<'a> Extraction<'a> {
    /// Extract with the default location classifiers
    pub fn from_text(text: &'a str) -> Self {
        Self::with_classifiers(text, LocationClassifier::coarse(), LocationClassifier::surface())
    }

    /// Extract with custom classifiers for the Location and Surface columns
    ///
    /// `coarse` also classifies tagged shape aspects.
    pub fn with_classifiers(
        text: &'a str,
        coarse: LocationClassifier,
        surface: LocationClassifier,
    ) -> Self {
        let index = LineIndex::build(text);
        let geometry = GeometryTables::scan(&index);
        let topology = TopologyTables::scan(&index, &coarse);
        let tolerances = extract_tolerances(&index, &topology);

        Self {
            index,
            geometry,
            topology,
            tolerances,
            coarse,
            surface,
        }
    }

    pub fn builder(&self) -> RecordBuilder<'_> {
        RecordBuilder::new(&self.geometry, &self.coarse, &self.surface)
    }

    /// Datum letters with their feature names, ascending by letter
    pub fn datums(&self) -> Vec<(char, &'a str)> {
        self.topology
            .datum_letter_to_faceid
            .keys()
            .filter_map(|&letter| {
                self.topology
                    .datum_face(letter)
                    .map(|(_, name)| (letter, name))
            })
            .collect()
    }

    /// Tolerance rows in source order, then datum rows by letter
    pub fn rows(&self) -> Vec<OutputRow> {
        let builder = self.builder();
        let mut rows: Vec<OutputRow> = self
            .tolerances
            .iter()
            .map(|record| builder.tolerance_row(record))
            .collect();
        rows.extend(
            self.datums()
                .into_iter()
                .map(|(letter, name)| builder.datum_row(letter, name)),
        );

        let datums = rows.len() - self.tolerances.len();
        tracing::info!(
            rows = rows.len(),
            tolerances = self.tolerances.len(),
            datums,
            "extracted tolerance table"
        );
        if rows.is_empty() && !self.index.is_empty() {
            tracing::warn!(
                entities = self.index.len(),
                "no tolerances or datums found in input"
            );
        }

        rows
    }
}

/// Extract the tolerance table from text
pub fn extract_tolerance_table(text: &str) -> Vec<OutputRow> {
    Extraction::from_text(text).rows()
}

/// Decode strictly as UTF-8, then extract
pub fn extract_from_bytes(bytes: &[u8]) -> Result<Vec<OutputRow>> {
    let text = std::str::from_utf8(bytes)?;
    Ok(extract_tolerance_table(text))
}

/// Decode as UTF-8 dropping invalid sequences, then extract
pub fn extract_from_bytes_lossy(bytes: &[u8]) -> Vec<OutputRow> {
    extract_tolerance_table(&decode_dropping_invalid(bytes))
}

/// UTF-8 decode that skips invalid byte sequences instead of replacing them
fn decode_dropping_invalid(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::table::RowCategory;

    const PART: &str = r#"ISO-10303-21;
DATA;
#1=DATUM('TopFace',$,#2,.F.,'A');
#2=SHAPE_ASPECT('TopFace','',#3,.T.);
#10=FLATNESS_TOLERANCE('flat','',#20,#2);
#20=LENGTH_MEASURE(0.05);
ENDSEC;"#;

    #[test]
    fn test_rows_order() {
        let rows = extract_tolerance_table(PART);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, RowCategory::Tolerance);
        assert_eq!(rows[0].datum_letter, "A");
        assert_eq!(rows[0].location, "top face");
        assert_eq!(rows[1].category, RowCategory::Datum);
        assert_eq!(rows[1].value, "A");
    }

    #[test]
    fn test_datums() {
        let extraction = Extraction::from_text(PART);
        assert_eq!(extraction.datums(), vec![('A', "TopFace")]);
        assert_eq!(extraction.tolerances.len(), 1);
    }

    #[test]
    fn test_custom_classifiers() {
        let coarse = LocationClassifier::new().rule(&["topface"], "datum face");
        let extraction =
            Extraction::with_classifiers(PART, coarse, LocationClassifier::surface());
        let rows = extraction.rows();
        assert_eq!(rows[1].location, "datum face");
        assert_eq!(rows[1].surface, "top face");
    }

    #[test]
    fn test_bytes_strict_and_lossy() {
        assert_eq!(extract_from_bytes(PART.as_bytes()).unwrap().len(), 2);

        let mut bytes = PART.as_bytes().to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        assert!(matches!(extract_from_bytes(&bytes), Err(Error::InvalidUtf8(_))));
        assert_eq!(extract_from_bytes_lossy(&bytes).len(), 2);
    }

    #[test]
    fn test_lossy_drops_invalid_bytes() {
        assert_eq!(decode_dropping_invalid(b"#1\xff0=A"), "#10=A");
        assert!(matches!(decode_dropping_invalid(b"#10=A"), Cow::Borrowed("#10=A")));

        let bytes = b"#1\xff0=FLATNESS_TOLERANCE('f','',#2\xfe\xfe0);\n#20=LENGTH_MEASURE(0.05);";
        let rows = extract_from_bytes_lossy(bytes);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "±0.05");
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_tolerance_table("").is_empty());
        assert!(extract_from_bytes(b"").unwrap().is_empty());
    }
}
