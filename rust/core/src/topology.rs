// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology Resolver
//!
//! Links datum letters to shape aspects and shape aspects to names and
//! coarse locations.
//!
//! A `DATUM` line names its feature by text, not by reference. The feature is
//! joined to a face by searching for a strict `SHAPE_ASPECT` line whose name
//! *contains* the datum's feature text ([`resolve_face_by_name_substring`]).
//! This is a heuristic: it can match zero, one or several aspects, and the
//! first one in file order wins.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::index::LineIndex;
use crate::location::{Fallback, LocationClassifier};
use crate::parser::{datum, find_all, shape_aspect, tagged_shape_aspect};

/// Named face or feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeAspect<'a> {
    pub id: u32,
    pub feature_name: &'a str,
}

/// Find the first strict `SHAPE_ASPECT` line whose name contains `feature`
pub fn resolve_face_by_name_substring<'a>(
    lines: &[&'a str],
    feature: &str,
) -> Option<ShapeAspect<'a>> {
    lines.iter().find_map(|&line| match shape_aspect(line) {
        Ok((_, (id, name))) if name.contains(feature) => Some(ShapeAspect {
            id,
            feature_name: name,
        }),
        _ => None,
    })
}

/// Datum and shape-aspect tables for one extraction
#[derive(Debug, Clone, Default)]
pub struct TopologyTables<'a> {
    /// Datum letter -> shape aspect id, for datums whose feature resolved
    pub datum_letter_to_faceid: BTreeMap<char, u32>,
    /// Shape aspect id -> feature name
    pub faceid_to_name: FxHashMap<u32, &'a str>,
    /// Face id (from tagged shape aspects) -> coarse location, possibly empty
    pub face_to_plane: BTreeMap<u32, String>,
    /// Datum letter -> coarse location, from tagged shape aspect labels
    pub datum_results: BTreeMap<char, String>,
}

impl<'a> TopologyTables<'a> {
    /// Build all tables
    ///
    /// `classifier` supplies the keyword rules for tagged shape aspects; an
    /// unmatched name stores an empty location regardless of its fallback.
    pub fn scan(index: &LineIndex<'a>, classifier: &LocationClassifier) -> Self {
        let mut tables = Self::default();
        let lines = index.lines();

        for &line in lines {
            if let Ok((_, (feature, letter))) = datum(line) {
                match resolve_face_by_name_substring(lines, feature) {
                    Some(aspect) => {
                        tables.datum_letter_to_faceid.insert(letter, aspect.id);
                        tables.faceid_to_name.insert(aspect.id, aspect.feature_name);
                    }
                    None => {
                        tracing::debug!(%letter, feature, "datum feature has no shape aspect");
                    }
                }
            } else if let Ok((_, (id, name))) = shape_aspect(line) {
                tables.faceid_to_name.insert(id, name);
            }
        }

        let plane_rules = classifier.clone().with_fallback(Fallback::Empty);
        for tagged in find_all(index.content(), tagged_shape_aspect) {
            let location = plane_rules.classify(tagged.name).to_string();
            if let Some(letter) = tagged.letter {
                tables.datum_results.insert(letter, location.clone());
            }
            tables.face_to_plane.insert(tagged.face_id, location);
        }

        tracing::debug!(
            datums = tables.datum_letter_to_faceid.len(),
            shape_aspects = tables.faceid_to_name.len(),
            tagged_faces = tables.face_to_plane.len(),
            tagged_datums = tables.datum_results.len(),
            "scanned topology"
        );

        tables
    }

    /// Face id and feature name of a datum letter
    pub fn datum_face(&self, letter: char) -> Option<(u32, &'a str)> {
        let face_id = *self.datum_letter_to_faceid.get(&letter)?;
        let name = self.faceid_to_name.get(&face_id).copied().unwrap_or("");
        Some((face_id, name))
    }

    /// Name of a face, falling back to its coarse location, then empty
    pub fn face_name(&self, face_id: u32) -> String {
        if let Some(name) = self.faceid_to_name.get(&face_id) {
            return (*name).to_string();
        }
        self.face_to_plane.get(&face_id).cloned().unwrap_or_default()
    }

    /// Letters seeded by tagged shape aspect labels, ascending
    ///
    /// Letters known only from `DATUM` lines are not included.
    pub fn tagged_letters(&self) -> impl Iterator<Item = char> + '_ {
        self.datum_results.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(content: &str) -> TopologyTables<'_> {
        let index = LineIndex::build(content);
        TopologyTables::scan(&index, &LocationClassifier::coarse())
    }

    #[test]
    fn test_datum_links_to_shape_aspect() {
        let tables = scan(
            r#"#1=DATUM('TopFace',$,#2,.F.,'A');
#2=SHAPE_ASPECT('TopFace','',#3,.T.);"#,
        );
        assert_eq!(tables.datum_letter_to_faceid.get(&'A'), Some(&2));
        assert_eq!(tables.datum_face('A'), Some((2, "TopFace")));
    }

    #[test]
    fn test_substring_join_first_match_wins() {
        let content = r#"#1=DATUM('Side',$,#9,.F.,'B');
#4=SHAPE_ASPECT('Left Side','',#3,.T.);
#2=SHAPE_ASPECT('Right Side','',#3,.T.);"#;
        let index = LineIndex::build(content);
        let aspect = resolve_face_by_name_substring(index.lines(), "Side").unwrap();
        assert_eq!(aspect.id, 4);
        assert_eq!(aspect.feature_name, "Left Side");

        let tables = TopologyTables::scan(&index, &LocationClassifier::coarse());
        assert_eq!(tables.datum_face('B'), Some((4, "Left Side")));
        assert_eq!(tables.faceid_to_name.len(), 2);
    }

    #[test]
    fn test_unresolved_datum_not_added() {
        let tables = scan("#1=DATUM('Hole',$,#2,.F.,'C');\n#2=SHAPE_ASPECT('Top','',#3,.T.);");
        assert!(tables.datum_letter_to_faceid.is_empty());
        assert_eq!(tables.faceid_to_name.get(&2), Some(&"Top"));
    }

    #[test]
    fn test_tagged_shape_aspects() {
        let tables = scan(
            r#"#5=SHAPE_ASPECT('Side(B','',#6);
#7 = SHAPE_ASPECT('Chamfer(','',#8);"#,
        );
        assert_eq!(tables.datum_results.get(&'B').map(String::as_str), Some("cylindrical side"));
        assert_eq!(tables.face_to_plane.get(&6).map(String::as_str), Some("cylindrical side"));
        // No keyword match stores an empty location
        assert_eq!(tables.face_to_plane.get(&8).map(String::as_str), Some(""));
        // Neither line has the strict form
        assert!(tables.faceid_to_name.is_empty());
    }

    #[test]
    fn test_strict_shape_aspect_is_not_tagged() {
        let tables = scan("#5=SHAPE_ASPECT('Side(B)','',#6,.T.);");
        assert_eq!(tables.faceid_to_name.get(&5), Some(&"Side(B)"));
        assert!(tables.face_to_plane.is_empty());
        assert!(tables.datum_results.is_empty());
    }

    #[test]
    fn test_face_name_fallbacks() {
        let tables = scan(
            r#"#2=SHAPE_ASPECT('TopFace','',#3,.T.);
#5=SHAPE_ASPECT('Bottom(D','',#6);"#,
        );
        assert_eq!(tables.face_name(2), "TopFace");
        assert_eq!(tables.face_name(6), "bottom face");
        assert_eq!(tables.face_name(42), "");
    }

    #[test]
    fn test_tagged_letters() {
        let tables = scan(
            r#"#1=DATUM('Top',$,#2,.F.,'C');
#2=SHAPE_ASPECT('Top','',#3,.T.);
#3=DATUM('Boss',$,#2,.F.,'E');
#4=SHAPE_ASPECT('Boss','',#3,.T.);
#7=SHAPE_ASPECT('Top(C','',#8);
#5=SHAPE_ASPECT('Side(A','',#6);"#,
        );
        assert_eq!(tables.tagged_letters().collect::<Vec<_>>(), vec!['A', 'C']);
        assert!(tables.datum_letter_to_faceid.contains_key(&'E'));
    }
}
