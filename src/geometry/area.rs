// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Field area computation.
//!
//! Area is the planar shoelace sum over the boundary's vertices mapped
//! into the local meter frame (see [`LocalFrame`]). The absolute value is
//! taken, so vertex winding direction does not matter. The result
//! inherits the frame's flat-earth approximation: good to well under a
//! percent for field-sized boundaries, not geodesically exact.

use super::{LocalFrame, Ring, planar_area};
use crate::settings;

/// Square meters per hectare.
const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Planar area of a boundary ring in square meters. Always non-negative.
pub fn area_square_meters(ring: &Ring) -> f64 {
    let frame = LocalFrame::for_ring(ring);
    let local: Vec<kurbo::Point> = ring.corners().iter().map(|&p| frame.to_local(p)).collect();
    planar_area(&local)
}

/// Convert square meters to hectares.
pub fn hectares(square_meters: f64) -> f64 {
    square_meters / SQUARE_METERS_PER_HECTARE
}

/// Number of cells a default-sized mesh would produce for the given
/// area, before clipping losses. Shown to the user alongside a completed
/// draft so they can judge the cell size before generating.
pub fn estimated_cell_count(square_meters: f64) -> u64 {
    let cell_area = settings::mesh::DEFAULT_CELL_SIZE_M * settings::mesh::DEFAULT_CELL_SIZE_M;
    (square_meters / cell_area).ceil() as u64
}
