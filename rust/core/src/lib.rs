// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # GDT-Lite Core
//!
//! GD&T tolerance and datum extraction from STEP exchange files, built with
//! [nom](https://docs.rs/nom).
//!
//! ## Overview
//!
//! The engine reads a STEP text, recognizes a small set of single-line entity
//! forms and produces a flat table with one row per tolerance and one row per
//! datum:
//!
//! - **Line Indexing**: entity id to defining line, using [memchr](https://docs.rs/memchr)
//! - **Geometry**: `PLANE` -> `AXIS2_PLACEMENT_3D` -> `DIRECTION` chains and
//!   the principal axis a face normal is aligned with
//! - **Topology**: datum letters, shape aspects and their names
//! - **Tolerances**: fourteen GD&T characteristics with nominal values and
//!   resolved datums
//!
//! Unrecognized lines are skipped and unresolved references render as empty
//! text, `N/A` or `unknown axis`. Content never makes extraction fail.
//!
//! ## Quick Start
//!
//! ```rust
//! use gdt_lite_core::extract_tolerance_table;
//!
//! let content = "#10=FLATNESS_TOLERANCE('(A)','',#20);\n#20=LENGTH_MEASURE(0.05);";
//! let rows = extract_tolerance_table(content);
//!
//! assert_eq!(rows[0].type_label, "□ Flatness");
//! assert_eq!(rows[0].value, "±0.05");
//! ```
//!
//! ## Typed Results
//!
//! ```rust
//! use gdt_lite_core::{Extraction, ToleranceKind};
//!
//! let content = "#10=ROUNDNESS_TOLERANCE('r','',#20);\n#20=LENGTH_MEASURE(0.01);";
//! let extraction = Extraction::from_text(content);
//!
//! let record = &extraction.tolerances[0];
//! assert_eq!(record.kind, ToleranceKind::Circularity);
//! assert_eq!(record.nominal_value(), Some(0.01));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for output rows and summaries

pub mod error;
pub mod extract;
pub mod fast_parse;
pub mod geometry;
pub mod index;
pub mod location;
pub mod parser;
pub mod schema;
pub mod table;
pub mod tolerance;
pub mod topology;

pub use error::{Error, Result};
pub use extract::{
    extract_from_bytes, extract_from_bytes_lossy, extract_tolerance_table, Extraction,
};
pub use geometry::{Axis, AxisOrientation, GeometryTables, UNKNOWN_AXIS};
pub use index::{EntityLine, LineIndex};
pub use location::{Fallback, LocationClassifier, LocationRule};
pub use schema::ToleranceKind;
pub use table::{OutputRow, RecordBuilder, RowCategory, TableSummary, TypeCount, DATUM_TYPE};
pub use tolerance::{DatumResolution, NominalValue, ToleranceRecord};
pub use topology::{resolve_face_by_name_substring, ShapeAspect, TopologyTables};
