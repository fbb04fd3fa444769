// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! GeoJSON-shaped feature records and the draft/mesh layer plumbing.
//!
//! Mesh cells are pushed as one feature collection replacing the whole
//! mesh source: cell sets change as a batch (full regeneration), never
//! one cell at a time, so there is no incremental patch path. Cell
//! selection/occupancy travel as feature properties; the engine's paint
//! expressions key off them.

use super::{
    DRAFT_FILL_LAYER, DRAFT_SOURCE, DRAFT_STROKE_LAYER, MESH_FILL_LAYER, MESH_SOURCE,
    MESH_STROKE_LAYER, MapSurface,
};
use crate::error::RenderSyncError;
use crate::geometry::Ring;
use crate::mesh::MeshCell;
use crate::theme;
use kurbo::Point;
use serde_json::{Value, json};

/// GeoJSON `coordinates` for a polygon, closing the ring if needed.
fn polygon_coordinates(points: &[Point]) -> Value {
    let mut pairs: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
    if !pairs.is_empty() && pairs.first() != pairs.last() {
        let first = pairs[0];
        pairs.push(first);
    }
    json!([pairs])
}

/// A single polygon feature for a draft or persisted boundary.
pub fn polygon_feature(ring: &Ring) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": polygon_coordinates(ring.points()),
        },
        "properties": {},
    })
}

/// One feature per mesh cell, flags as properties.
pub fn cell_feature(cell: &MeshCell) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": polygon_coordinates(&cell.boundary),
        },
        "properties": {
            "cellId": cell.id.to_string(),
            "isSelected": cell.is_selected,
            "isOccupied": cell.is_occupied,
        },
    })
}

/// The whole mesh as one feature collection.
pub fn mesh_feature_collection(cells: &[MeshCell]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": cells.iter().map(cell_feature).collect::<Vec<_>>(),
    })
}

fn empty_collection() -> Value {
    json!({ "type": "FeatureCollection", "features": [] })
}

/// Install the mesh source and its fill/stroke layers, initially empty.
///
/// Called once after the map style loads (and again after a style swap,
/// which destroys all custom layers).
pub fn install_mesh_layers(surface: &mut dyn MapSurface) -> Result<(), RenderSyncError> {
    surface.set_source(MESH_SOURCE, empty_collection())?;
    surface.add_fill_layer(
        MESH_FILL_LAYER,
        MESH_SOURCE,
        theme::mesh::CELL_FILL,
        theme::mesh::FILL_OPACITY,
    )?;
    surface.add_line_layer(
        MESH_STROKE_LAYER,
        MESH_SOURCE,
        theme::mesh::CELL_STROKE,
        theme::mesh::STROKE_WIDTH,
    )?;
    Ok(())
}

/// Replace the mesh source with the given cell set.
pub fn update_mesh_layer(
    surface: &mut dyn MapSurface,
    cells: &[MeshCell],
) -> Result<(), RenderSyncError> {
    surface.set_source(MESH_SOURCE, mesh_feature_collection(cells))
}

/// Install the draft source and its fill/stroke layers, initially empty.
pub fn install_draft_layers(surface: &mut dyn MapSurface) -> Result<(), RenderSyncError> {
    surface.set_source(DRAFT_SOURCE, empty_collection())?;
    surface.add_fill_layer(
        DRAFT_FILL_LAYER,
        DRAFT_SOURCE,
        theme::draft::FILL,
        theme::draft::FILL_OPACITY,
    )?;
    surface.add_line_layer(
        DRAFT_STROKE_LAYER,
        DRAFT_SOURCE,
        theme::draft::STROKE,
        theme::draft::STROKE_WIDTH,
    )?;
    Ok(())
}

/// Show a boundary on the draft layer.
pub fn show_draft(surface: &mut dyn MapSurface, ring: &Ring) -> Result<(), RenderSyncError> {
    surface.set_source(
        DRAFT_SOURCE,
        json!({
            "type": "FeatureCollection",
            "features": [polygon_feature(ring)],
        }),
    )
}

/// Empty the draft layer.
pub fn clear_draft(surface: &mut dyn MapSurface) -> Result<(), RenderSyncError> {
    surface.set_source(DRAFT_SOURCE, empty_collection())
}
