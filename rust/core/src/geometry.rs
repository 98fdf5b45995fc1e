// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry Resolver
//!
//! Collects `DIRECTION`, `AXIS2_PLACEMENT_3D` and `PLANE` lines and follows
//! the chain `plane -> placement -> axis direction -> vector` to report which
//! principal axis a planar face's normal is most aligned with.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::Vector3;
use rustc_hash::FxHashMap;

use crate::fast_parse::parse_vector3;
use crate::index::LineIndex;
use crate::parser::{axis2_placement_3d, direction, plane};

/// Sentinel for a plane whose axis chain does not resolve
pub const UNKNOWN_AXIS: &str = "unknown axis";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction {
    pub id: u32,
    pub vector: Vector3<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisPlacement {
    pub id: u32,
    pub normal_direction_id: u32,
    pub ref_direction_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plane {
    pub id: u32,
    pub axis_placement_id: u32,
}

/// Principal axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn unit(&self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    #[inline]
    fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// Closest principal axis of a normal and the sign along it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisOrientation {
    pub axis: Axis,
    pub positive: bool,
}

impl AxisOrientation {
    /// Project `normal` onto X, Y and Z and keep the largest |dot|
    ///
    /// Ties go to the earlier axis. Zero counts as positive.
    pub fn from_normal(normal: &Vector3<f64>) -> Self {
        let mut best = Axis::X;
        let mut best_projection = f64::NEG_INFINITY;

        for axis in Axis::ALL {
            let projection = normal.dot(&axis.unit()).abs();
            if projection > best_projection {
                best = axis;
                best_projection = projection;
            }
        }

        Self {
            axis: best,
            positive: normal[best.index()] >= 0.0,
        }
    }
}

impl fmt::Display for AxisOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.positive { '+' } else { '-' };
        write!(f, "facing {}{}", sign, self.axis)
    }
}

/// Geometry tables for one extraction
#[derive(Debug, Clone, Default)]
pub struct GeometryTables {
    directions: FxHashMap<u32, Direction>,
    placements: FxHashMap<u32, AxisPlacement>,
    /// Ordered by plane id for deterministic lookup
    planes: BTreeMap<u32, Plane>,
}

impl GeometryTables {
    /// Scan every line with the three recognizers, in priority order
    pub fn scan(index: &LineIndex<'_>) -> Self {
        let mut tables = Self::default();

        for line in index.lines() {
            if let Ok((_, (id, components))) = direction(line) {
                if let Some([x, y, z]) = parse_vector3(components) {
                    tables.directions.insert(
                        id,
                        Direction {
                            id,
                            vector: Vector3::new(x, y, z),
                        },
                    );
                }
            } else if let Ok((_, (id, axis, ref_dir))) = axis2_placement_3d(line) {
                tables.placements.insert(
                    id,
                    AxisPlacement {
                        id,
                        normal_direction_id: axis,
                        ref_direction_id: ref_dir,
                    },
                );
            } else if let Ok((_, (id, axis_placement_id))) = plane(line) {
                tables.planes.insert(
                    id,
                    Plane {
                        id,
                        axis_placement_id,
                    },
                );
            }
        }

        tracing::debug!(
            directions = tables.directions.len(),
            placements = tables.placements.len(),
            planes = tables.planes.len(),
            "scanned geometry"
        );

        tables
    }

    /// Normal vector of a plane, following its placement's first direction
    pub fn normal_of_plane(&self, plane_id: u32) -> Option<Vector3<f64>> {
        let plane = self.planes.get(&plane_id)?;
        let placement = self.placements.get(&plane.axis_placement_id)?;
        let direction = self.directions.get(&placement.normal_direction_id)?;
        Some(direction.vector)
    }

    pub fn axis_orientation(&self, plane_id: u32) -> Option<AxisOrientation> {
        self.normal_of_plane(plane_id)
            .map(|normal| AxisOrientation::from_normal(&normal))
    }

    /// Orientation text, or [`UNKNOWN_AXIS`] when the chain is broken
    pub fn describe_axis(&self, plane_id: u32) -> String {
        match self.axis_orientation(plane_id) {
            Some(orientation) => orientation.to_string(),
            None => UNKNOWN_AXIS.to_string(),
        }
    }

    /// First plane (ascending id) whose chain resolves
    pub fn first_plane_orientation(&self) -> Option<AxisOrientation> {
        self.planes
            .keys()
            .find_map(|&plane_id| self.axis_orientation(plane_id))
    }

    pub fn direction(&self, id: u32) -> Option<&Direction> {
        self.directions.get(&id)
    }

    pub fn placement(&self, id: u32) -> Option<&AxisPlacement> {
        self.placements.get(&id)
    }

    pub fn plane(&self, id: u32) -> Option<&Plane> {
        self.planes.get(&id)
    }

    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }
}
