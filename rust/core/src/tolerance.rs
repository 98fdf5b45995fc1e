// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerance Extractor
//!
//! Finds every `<KIND>_TOLERANCE` entity in the text, reads its nominal value
//! from the referenced value entity and resolves the datum letter and
//! location it applies to.
//!
//! Datum resolution tries, in order:
//!
//! 1. **Exact face**: the last `#n` on the tolerance's source line equals a
//!    datum's shape aspect id.
//! 2. **Sniffed letter**: the tolerance name contains `(x)` for a letter `x`
//!    seeded by a tagged shape aspect. The location comes from the letter's
//!    shape aspect, else from its tagged location.
//! 3. **Face substring**: the first face id (ascending) whose decimal text
//!    occurs in the datum reference or the tolerance name.
//!
//! Anything that does not resolve is left empty.

use std::fmt;

use crate::fast_parse::{entity_refs, find_measure_text, parse_float, MEASURE_TAGS};
use crate::index::LineIndex;
use crate::parser::{find_all, tolerance_head, ToleranceHead};
use crate::schema::ToleranceKind;
use crate::topology::TopologyTables;

/// Nominal tolerance value with its source text
#[derive(Debug, Clone, PartialEq)]
pub struct NominalValue {
    pub value: f64,
    /// Number exactly as written, e.g. `0.050`
    pub text: String,
}

impl fmt::Display for NominalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "±{}", self.text)
    }
}

/// How a tolerance's datum and location were resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatumResolution {
    ExactFace,
    SniffedLetter,
    /// Sniffed letter located through the tagged datum table
    DatumLocation,
    FaceSubstring,
    Unresolved,
}

/// One extracted tolerance
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceRecord {
    pub id: u32,
    pub kind: ToleranceKind,
    /// Quoted label of the tolerance entity
    pub raw_name: String,
    pub nominal: Option<NominalValue>,
    pub datum_letter: Option<char>,
    /// Resolved feature name or coarse location, possibly empty
    pub location: String,
    pub resolution: DatumResolution,
}

impl ToleranceRecord {
    #[inline]
    pub fn nominal_value(&self) -> Option<f64> {
        self.nominal.as_ref().map(|nominal| nominal.value)
    }

    /// `±<text>` or `N/A`
    pub fn value_display(&self) -> String {
        match &self.nominal {
            Some(nominal) => nominal.to_string(),
            None => "N/A".to_string(),
        }
    }
}

/// Extract all tolerance records in source order
pub fn extract_tolerances(
    index: &LineIndex<'_>,
    topology: &TopologyTables<'_>,
) -> Vec<ToleranceRecord> {
    find_all(index.content(), tolerance_head)
        .into_iter()
        .map(|head| resolve_tolerance(index, topology, head))
        .collect()
}

fn resolve_tolerance(
    index: &LineIndex<'_>,
    topology: &TopologyTables<'_>,
    head: ToleranceHead<'_>,
) -> ToleranceRecord {
    let nominal = nominal_value(index, head.value_ref);

    // Last reference on the first line mentioning this tolerance's id token
    let datum_ref = index
        .first_line_containing(head.id_token)
        .and_then(|line| entity_refs(line).last().copied())
        .unwrap_or(head.value_ref);

    let (datum_letter, location, resolution) = match exact_face_match(topology, datum_ref) {
        Some((letter, location)) => (Some(letter), location, DatumResolution::ExactFace),
        None => fallback_match(topology, head.name, datum_ref),
    };

    tracing::debug!(
        id = head.id,
        kind = %head.kind,
        datum_ref,
        ?datum_letter,
        ?resolution,
        "resolved tolerance"
    );

    ToleranceRecord {
        id: head.id,
        kind: head.kind,
        raw_name: head.name.to_string(),
        nominal,
        datum_letter,
        location,
        resolution,
    }
}

/// Read the nominal value from the referenced value entity
///
/// A digit-and-dot run that is not a float (`1.2.3`) counts as missing.
fn nominal_value(index: &LineIndex<'_>, value_ref: u32) -> Option<NominalValue> {
    let definition = index.definition(value_ref)?;
    let text = find_measure_text(definition, &MEASURE_TAGS)?;
    let value = parse_float(text)?;
    Some(NominalValue {
        value,
        text: text.to_string(),
    })
}

/// Datum letter whose shape aspect id equals `datum_ref` (ascending letters)
fn exact_face_match(topology: &TopologyTables<'_>, datum_ref: u32) -> Option<(char, String)> {
    topology
        .datum_letter_to_faceid
        .iter()
        .find(|(_, face_id)| **face_id == datum_ref)
        .map(|(&letter, &face_id)| (letter, topology.face_name(face_id)))
}

fn fallback_match(
    topology: &TopologyTables<'_>,
    name: &str,
    datum_ref: u32,
) -> (Option<char>, String, DatumResolution) {
    let lowered = name.to_lowercase();
    let letter = topology.tagged_letters().find(|letter| {
        let needle: String = ['(', letter.to_ascii_lowercase(), ')'].iter().collect();
        lowered.contains(&needle)
    });

    if let Some(letter) = letter {
        if let Some((face_id, _)) = topology.datum_face(letter) {
            return (
                Some(letter),
                topology.face_name(face_id),
                DatumResolution::SniffedLetter,
            );
        }
        if let Some(location) = topology.datum_results.get(&letter) {
            if !location.is_empty() {
                return (Some(letter), location.clone(), DatumResolution::DatumLocation);
            }
        }
    }

    match face_substring_match(topology, name, datum_ref) {
        Some(location) => (letter, location, DatumResolution::FaceSubstring),
        None if letter.is_some() => (letter, String::new(), DatumResolution::SniffedLetter),
        None => (None, String::new(), DatumResolution::Unresolved),
    }
}

/// First face id (ascending) whose decimal text occurs in the datum
/// reference's decimal text or in the tolerance name
fn face_substring_match(topology: &TopologyTables<'_>, name: &str, datum_ref: u32) -> Option<String> {
    let datum_ref_text = datum_ref.to_string();
    topology
        .face_to_plane
        .iter()
        .find(|(face_id, _)| {
            let face_text = face_id.to_string();
            datum_ref_text.contains(&face_text) || name.contains(&face_text)
        })
        .map(|(_, location)| location.clone())
}
