// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Mesh generation: lay a regular grid over the boundary's bounding box
//! and keep each cell's intersection with the boundary.
//!
//! Generation can take a while for large fields at small cell sizes, so
//! it is packaged as a [`MeshJob`] stamped with the editor session's
//! mesh epoch. The host runs the job off the interaction thread (or
//! inline when cheap) and delivers the [`MeshOutcome`] back as an event;
//! the session discards outcomes whose epoch is no longer current, so a
//! newer request always wins over an older one still in flight.

use super::clip::clip_to_rect;
use super::{CellId, MeshCell, MeshGrid};
use crate::error::MeshError;
use crate::geometry::{LocalFrame, Ring, planar_area};
use crate::settings;
use kurbo::{Point, Rect};

/// Generate the mesh for a boundary at the given cell size.
///
/// The grid starts at the bounding box's minimum corner in the local
/// meter frame. Cells fully outside the boundary are discarded; kept
/// cells carry their clipped intersection geometry. A zero-area boundary
/// yields an empty mesh, not an error.
pub fn generate(ring: &Ring, cell_size_m: f64) -> Result<MeshGrid, MeshError> {
    if !cell_size_m.is_finite()
        || cell_size_m < settings::mesh::MIN_CELL_SIZE_M
        || cell_size_m > settings::mesh::MAX_CELL_SIZE_M
    {
        return Err(MeshError::InvalidCellSize(cell_size_m));
    }

    let frame = LocalFrame::for_ring(ring);
    let corners: Vec<Point> = ring.corners().iter().map(|&p| frame.to_local(p)).collect();

    if planar_area(&corners) < settings::mesh::MIN_KEPT_CELL_AREA_M2 {
        return Ok(MeshGrid::empty(cell_size_m));
    }

    let mut max = Point::new(0.0, 0.0);
    for p in &corners {
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    let cols = (max.x / cell_size_m).ceil() as usize;
    let rows = (max.y / cell_size_m).ceil() as usize;
    let candidate = rows.saturating_mul(cols);
    if candidate > settings::mesh::MAX_CANDIDATE_CELLS {
        return Err(MeshError::GridTooLarge {
            candidate,
            max: settings::mesh::MAX_CANDIDATE_CELLS,
        });
    }

    let mut cells = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let cell_rect = Rect::new(
                col as f64 * cell_size_m,
                row as f64 * cell_size_m,
                (col + 1) as f64 * cell_size_m,
                (row + 1) as f64 * cell_size_m,
            );
            let clipped = clip_to_rect(&corners, cell_rect);
            if clipped.len() < 3 || planar_area(&clipped) < settings::mesh::MIN_KEPT_CELL_AREA_M2 {
                continue;
            }
            cells.push(MeshCell {
                id: CellId::new(cell_size_m, row as u32, col as u32),
                row: row as u32,
                col: col as u32,
                boundary: clipped.into_iter().map(|p| frame.to_lon_lat(p)).collect(),
                is_selected: false,
                is_occupied: false,
            });
        }
    }

    tracing::debug!(
        "mesh generated: {} of {} candidate cells kept at {} m",
        cells.len(),
        candidate,
        cell_size_m
    );
    Ok(MeshGrid::new(cell_size_m, cells))
}

/// A pending mesh generation, stamped with the session's mesh epoch.
#[derive(Debug, Clone)]
pub struct MeshJob {
    epoch: u64,
    boundary: Ring,
    cell_size_m: f64,
}

impl MeshJob {
    pub(crate) fn new(epoch: u64, boundary: Ring, cell_size_m: f64) -> Self {
        Self {
            epoch,
            boundary,
            cell_size_m,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn cell_size_m(&self) -> f64 {
        self.cell_size_m
    }

    /// Run the generation. Cheap enough to call inline for small fields;
    /// hosts with bigger fields run it on a worker and deliver the
    /// outcome as an event.
    pub fn run(self) -> MeshOutcome {
        let result = generate(&self.boundary, self.cell_size_m);
        MeshOutcome {
            epoch: self.epoch,
            result,
        }
    }
}

/// A finished mesh generation, delivered back to the session.
#[derive(Debug)]
pub struct MeshOutcome {
    pub epoch: u64,
    pub result: Result<MeshGrid, MeshError>,
}
