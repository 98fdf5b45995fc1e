// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end extraction over small STEP fragments.

use approx::assert_relative_eq;
use gdt_lite_core::{
    extract_tolerance_table, DatumResolution, Extraction, OutputRow, RowCategory, TableSummary,
    ToleranceKind,
};

fn row<'a>(rows: &'a [OutputRow], type_label: &str) -> &'a OutputRow {
    rows.iter()
        .find(|row| row.type_label == type_label)
        .unwrap_or_else(|| panic!("no row with type {type_label}"))
}

#[test]
fn flatness_without_datums() {
    let content = "#10=FLATNESS_TOLERANCE('(A)','',#20);\n#20=LENGTH_MEASURE(0.05);";
    let rows = extract_tolerance_table(content);

    assert_eq!(rows.len(), 1);
    let flatness = &rows[0];
    assert_eq!(flatness.type_label, "□ Flatness");
    assert_eq!(flatness.value, "±0.05");
    assert_eq!(flatness.datum_letter, "");
    assert_eq!(flatness.location, "");
    assert_eq!(flatness.surface, "");
    assert_eq!(flatness.category, RowCategory::Tolerance);
}

#[test]
fn datum_on_named_top_face() {
    let content = "#1=DATUM('TopFace',$,#2,.F.,'A');\n#2=SHAPE_ASPECT('TopFace','',#3,.T.);";
    let rows = extract_tolerance_table(content);

    assert_eq!(rows.len(), 1);
    let datum = &rows[0];
    assert_eq!(datum.type_label, "Datum");
    assert_eq!(datum.value, "A");
    assert_eq!(datum.datum_letter, "A");
    assert_eq!(datum.location, "top face");
    assert_eq!(datum.surface, "top face");
    assert_eq!(datum.category, RowCategory::Datum);
}

#[test]
fn datum_on_top_face_with_plane_chain() {
    let content = r#"#1=DATUM('TopFace',$,#2,.F.,'A');
#2=SHAPE_ASPECT('TopFace','',#3,.T.);
#30=DIRECTION('normal',(0.,0.,1.));
#31=DIRECTION('ref',(1.,0.,0.));
#32=AXIS2_PLACEMENT_3D('',#33,#30,#31);
#34=PLANE('',#32);"#;
    let rows = extract_tolerance_table(content);
    assert_eq!(rows[0].surface, "top face (facing +Z)");
}

#[test]
fn axis_orientation_follows_first_direction() {
    let up = Extraction::from_text(
        "#1=DIRECTION('',(0.,0.,1.));\n#2=AXIS2_PLACEMENT_3D('',#9,#1,#1);\n#3=PLANE('',#2);",
    );
    assert_eq!(up.geometry.describe_axis(3), "facing +Z");

    let down = Extraction::from_text(
        "#1=DIRECTION('',(0.,0.,-1.));\n#2=AXIS2_PLACEMENT_3D('',#9,#1,#5);\n#5=DIRECTION('',(1.,0.,0.));\n#3=PLANE('',#2);",
    );
    assert_eq!(down.geometry.describe_axis(3), "facing -Z");
}

#[test]
fn sniffed_letter_resolves_cylindrical_side() {
    let content = r#"#5=SHAPE_ASPECT('Outer Side(B','',#6);
#10=CYLINDRICITY_TOLERANCE('cyl (B)','',#20);
#20=LENGTH_MEASURE(0.02);"#;
    let extraction = Extraction::from_text(content);
    let record = &extraction.tolerances[0];
    assert_eq!(record.datum_letter, Some('B'));
    assert_eq!(record.location, "cylindrical side");

    let rows = extraction.rows();
    let cylindricity = row(&rows, "⌀ Cylindricity");
    assert_eq!(cylindricity.datum_letter, "B");
    assert_eq!(cylindricity.location, "cylindrical side");
}

#[test]
fn closed_label_suffix_does_not_seed_fallbacks() {
    let content = r#"#5=SHAPE_ASPECT('Side(B)','',#6,.T.);
#10=FLATNESS_TOLERANCE('f (B)','',#20,#60);
#20=LENGTH_MEASURE(0.05);"#;
    let extraction = Extraction::from_text(content);
    assert!(extraction.topology.face_to_plane.is_empty());
    assert!(extraction.topology.datum_results.is_empty());

    let record = &extraction.tolerances[0];
    assert_eq!(record.datum_letter, None);
    assert_eq!(record.location, "");
    assert_eq!(record.resolution, DatumResolution::Unresolved);
}

#[test]
fn tagged_face_id_is_first_closed_reference() {
    let extraction = Extraction::from_text("#5=SHAPE_ASPECT('Top(A','',(#7),#41,.T.);");
    let face_to_plane = &extraction.topology.face_to_plane;
    assert_eq!(face_to_plane.get(&7).map(String::as_str), Some("top face"));
    assert!(!face_to_plane.contains_key(&41));
    assert_eq!(
        extraction.topology.datum_results.get(&'A').map(String::as_str),
        Some("top face")
    );
}

#[test]
fn empty_input_yields_no_rows() {
    assert!(extract_tolerance_table("").is_empty());
    assert!(extract_tolerance_table("ISO-10303-21;\nHEADER;\nENDSEC;\nEND-ISO-10303-21;").is_empty());
}

#[test]
fn roundness_is_labeled_circularity() {
    let rows = extract_tolerance_table(
        "#10=ROUNDNESS_TOLERANCE('round','',#20);\n#20=LENGTH_MEASURE(0.01);",
    );
    assert_eq!(rows[0].type_label, "○ Circularity");
    assert!(!rows[0].type_label.contains("Roundness"));
}

#[test]
fn extraction_is_idempotent() {
    let content = r#"#1=DATUM('TopFace',$,#2,.F.,'A');
#2=SHAPE_ASPECT('TopFace','',#3,.T.);
#5=SHAPE_ASPECT('Side(B','',#6);
#10=FLATNESS_TOLERANCE('flat','',#20,#2);
#11=POSITION_TOLERANCE('pos (b)','',#21);
#20=LENGTH_MEASURE(0.05);
#21=VALUE_REPRESENTATION_ITEM('d',LENGTH_MEASURE(0.3));"#;
    assert_eq!(extract_tolerance_table(content), extract_tolerance_table(content));
}

#[test]
fn nominal_value_round_trip() {
    for text in ["0", "0.5", "0.050", "12.", "3.14159", "100"] {
        let content = format!("#10=STRAIGHTNESS_TOLERANCE('s','',#20);\n#20=LENGTH_MEASURE({text});");
        let extraction = Extraction::from_text(&content);
        let record = &extraction.tolerances[0];
        let expected: f64 = text.parse().unwrap();
        assert_relative_eq!(record.nominal_value().unwrap(), expected);
        assert_eq!(extraction.rows()[0].value, format!("±{text}"));
    }
}

#[test]
fn missing_value_entity_degrades_to_na() {
    let extraction = Extraction::from_text("#10=ANGULARITY_TOLERANCE('a','',#404);");
    assert_eq!(extraction.tolerances[0].nominal_value(), None);
    assert_eq!(extraction.rows()[0].value, "N/A");
}

#[test]
fn exact_face_match_beats_name_sniffing() {
    let content = r#"#1=DATUM('TopFace',$,#9,.F.,'A');
#2=SHAPE_ASPECT('TopFace','',#3,.T.);
#5=SHAPE_ASPECT('Side(B','',#6);
#10=PERPENDICULARITY_TOLERANCE('perp (B)','',#20,#2);
#20=LENGTH_MEASURE(0.1);"#;
    let extraction = Extraction::from_text(content);
    let record = &extraction.tolerances[0];
    assert_eq!(record.datum_letter, Some('A'));
    assert_eq!(record.resolution, DatumResolution::ExactFace);
    assert_eq!(record.location, "TopFace");
}

#[test]
fn face_substring_tie_breaks_on_lowest_face_id() {
    let content = r#"#50=SHAPE_ASPECT('Bottom(','',#12);
#51=SHAPE_ASPECT('Top(','',#2);
#10=FLATNESS_TOLERANCE('f','',#20,#12);
#20=LENGTH_MEASURE(0.1);"#;
    let extraction = Extraction::from_text(content);
    // "2" and "12" both occur in "12"; face 2 is tried first
    assert_eq!(extraction.tolerances[0].location, "top face");
    assert_eq!(extraction.tolerances[0].resolution, DatumResolution::FaceSubstring);
}

#[test]
fn first_resolvable_plane_annotates_surface() {
    let content = r#"#1=DATUM('Bottom',$,#9,.F.,'C');
#2=SHAPE_ASPECT('Bottom plate','',#3,.T.);
#4=PLANE('',#99);
#40=PLANE('',#41);
#41=AXIS2_PLACEMENT_3D('',#9,#42,#42);
#42=DIRECTION('',(0.,-1.,0.));"#;
    let rows = extract_tolerance_table(content);
    assert_eq!(rows[0].location, "bottom face");
    assert_eq!(rows[0].surface, "bottom face (facing -Y)");
}

#[test]
fn all_extended_kinds_are_recognized() {
    let mut content = String::new();
    for (i, kind) in ToleranceKind::ALL.iter().enumerate() {
        content.push_str(&format!(
            "#{}={}_TOLERANCE('t','',#999);\n",
            100 + i,
            kind.keyword()
        ));
    }
    content.push_str("#999=LENGTH_MEASURE(0.1);\n");

    let extraction = Extraction::from_text(&content);
    let kinds: Vec<ToleranceKind> = extraction.tolerances.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, ToleranceKind::ALL.to_vec());

    let rows = extraction.rows();
    assert_eq!(row(&rows, "⌓ Profile of Surface").value, "±0.1");
    assert_eq!(row(&rows, "↗ Circular Runout").value, "±0.1");
}

#[test]
fn datum_rows_follow_tolerances_in_letter_order() {
    let content = r#"#1=DATUM('Side',$,#9,.F.,'B');
#2=DATUM('Top',$,#9,.F.,'A');
#3=SHAPE_ASPECT('Top','',#8,.T.);
#4=SHAPE_ASPECT('Side','',#8,.T.);
#10=SYMMETRY_TOLERANCE('sym','',#20);
#20=LENGTH_MEASURE(0.1);"#;
    let rows = extract_tolerance_table(content);
    let types: Vec<&str> = rows.iter().map(|r| r.type_label.as_str()).collect();
    assert_eq!(types, vec!["⌯ Symmetry", "Datum", "Datum"]);
    assert_eq!(rows[1].value, "A");
    assert_eq!(rows[2].value, "B");
    assert_eq!(rows[2].location, "cylindrical side");

    let summary = TableSummary::from_rows(&rows);
    assert_eq!(summary.tolerances, 1);
    assert_eq!(summary.datums, 2);
    assert_eq!(summary.count_of("Datum"), 2);
}

#[test]
fn crlf_input_matches_lf_input() {
    let lf = "#1=DATUM('TopFace',$,#2,.F.,'A');\n#2=SHAPE_ASPECT('TopFace','',#3,.T.);\n#10=FLATNESS_TOLERANCE('f','',#20,#2);\n#20=LENGTH_MEASURE(0.05);\n";
    let crlf = lf.replace('\n', "\r\n");
    assert_eq!(extract_tolerance_table(lf), extract_tolerance_table(&crlf));
}
