// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GD&T Tolerance Kinds
//!
//! Fast kind dispatch using a closed enum instead of string comparison.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geometric tolerance characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ToleranceKind {
    // Form
    Straightness,
    Flatness,
    Circularity,
    Cylindricity,

    // Location
    Concentricity,
    Symmetry,
    Position,

    // Orientation
    Perpendicularity,
    Parallelism,
    Angularity,

    // Profile
    ProfileOfLine,
    ProfileOfSurface,

    // Runout
    CircularRunout,
    TotalRunout,
}

impl ToleranceKind {
    /// Every kind, in declaration order
    pub const ALL: [ToleranceKind; 14] = [
        Self::Straightness,
        Self::Flatness,
        Self::Circularity,
        Self::Cylindricity,
        Self::Concentricity,
        Self::Symmetry,
        Self::Position,
        Self::Perpendicularity,
        Self::Parallelism,
        Self::Angularity,
        Self::ProfileOfLine,
        Self::ProfileOfSurface,
        Self::CircularRunout,
        Self::TotalRunout,
    ];

    /// Parse the kind prefix of a `<KIND>_TOLERANCE` keyword, case-insensitive
    ///
    /// Accepts the AP242 spellings `LINE_PROFILE` and `SURFACE_PROFILE` as
    /// aliases.
    pub fn from_keyword(s: &str) -> Option<Self> {
        let upper = s.to_ascii_uppercase();
        let kind = match upper.as_str() {
            "STRAIGHTNESS" => Self::Straightness,
            "FLATNESS" => Self::Flatness,
            "ROUNDNESS" => Self::Circularity,
            "CYLINDRICITY" => Self::Cylindricity,
            "CONCENTRICITY" => Self::Concentricity,
            "SYMMETRY" => Self::Symmetry,
            "POSITION" => Self::Position,
            "PERPENDICULARITY" => Self::Perpendicularity,
            "PARALLELISM" => Self::Parallelism,
            "ANGULARITY" => Self::Angularity,
            "PROFILE_OF_LINE" | "LINE_PROFILE" => Self::ProfileOfLine,
            "PROFILE_OF_SURFACE" | "SURFACE_PROFILE" => Self::ProfileOfSurface,
            "CIRCULAR_RUNOUT" => Self::CircularRunout,
            "TOTAL_RUNOUT" => Self::TotalRunout,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical keyword prefix as written in STEP files
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Straightness => "STRAIGHTNESS",
            Self::Flatness => "FLATNESS",
            Self::Circularity => "ROUNDNESS",
            Self::Cylindricity => "CYLINDRICITY",
            Self::Concentricity => "CONCENTRICITY",
            Self::Symmetry => "SYMMETRY",
            Self::Position => "POSITION",
            Self::Perpendicularity => "PERPENDICULARITY",
            Self::Parallelism => "PARALLELISM",
            Self::Angularity => "ANGULARITY",
            Self::ProfileOfLine => "PROFILE_OF_LINE",
            Self::ProfileOfSurface => "PROFILE_OF_SURFACE",
            Self::CircularRunout => "CIRCULAR_RUNOUT",
            Self::TotalRunout => "TOTAL_RUNOUT",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Straightness => "Straightness",
            Self::Flatness => "Flatness",
            Self::Circularity => "Circularity",
            Self::Cylindricity => "Cylindricity",
            Self::Concentricity => "Concentricity",
            Self::Symmetry => "Symmetry",
            Self::Position => "Position",
            Self::Perpendicularity => "Perpendicularity",
            Self::Parallelism => "Parallelism",
            Self::Angularity => "Angularity",
            Self::ProfileOfLine => "Profile of Line",
            Self::ProfileOfSurface => "Profile of Surface",
            Self::CircularRunout => "Circular Runout",
            Self::TotalRunout => "Total Runout",
        }
    }

    /// GD&T symbol
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Straightness => "─",
            Self::Flatness => "□",
            Self::Circularity => "○",
            Self::Cylindricity => "⌀",
            Self::Concentricity => "◎",
            Self::Symmetry => "⌯",
            Self::Position => "⌖",
            Self::Perpendicularity => "⊥",
            Self::Parallelism => "∥",
            Self::Angularity => "∠",
            Self::ProfileOfLine => "⌒",
            Self::ProfileOfSurface => "⌓",
            Self::CircularRunout => "↗",
            Self::TotalRunout => "⌰",
        }
    }

    /// Table type column: glyph and label, e.g. `□ Flatness`
    pub fn type_label(&self) -> String {
        format!("{} {}", self.glyph(), self.label())
    }
}

impl fmt::Display for ToleranceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
