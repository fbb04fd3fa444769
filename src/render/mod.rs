// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Bridge to the map rendering engine.
//!
//! The engine itself (tile rendering, the drawing toolkit) is an
//! external collaborator; this crate talks to it exclusively through the
//! [`MapSurface`] trait. A source holds GeoJSON-shaped feature data;
//! layers reference a source and paint it. `set_source` is
//! add-or-replace, which is what makes whole-batch updates (mesh
//! regeneration, overlay replace-in-place) single calls.

pub mod features;

use crate::error::RenderSyncError;
use peniko::Color;
use serde_json::Value;

// ===== Draft and mesh layer ids =====
//
// These are fixed: there is at most one draft and one mesh at a time.
// Overlay layer ids are derived per entity by the overlay manager.

/// Source holding the draft boundary feature
pub const DRAFT_SOURCE: &str = "farmplot-draft";
/// Draft fill layer
pub const DRAFT_FILL_LAYER: &str = "farmplot-draft-fill";
/// Draft outline layer
pub const DRAFT_STROKE_LAYER: &str = "farmplot-draft-stroke";

/// Source holding the mesh cell feature collection
pub const MESH_SOURCE: &str = "farmplot-mesh";
/// Mesh cell fill layer
pub const MESH_FILL_LAYER: &str = "farmplot-mesh-fill";
/// Mesh cell outline layer
pub const MESH_STROKE_LAYER: &str = "farmplot-mesh-stroke";

/// The mutation surface of the map rendering engine.
///
/// Implementations are expected to stack layers in the order they are
/// added. Every method may fail with [`RenderSyncError`]; callers in
/// this crate treat those failures as recoverable and log them.
pub trait MapSurface {
    /// Create or replace a GeoJSON source wholesale.
    fn set_source(&mut self, id: &str, data: Value) -> Result<(), RenderSyncError>;

    /// Remove a source and any data it held.
    fn remove_source(&mut self, id: &str) -> Result<(), RenderSyncError>;

    /// Add a polygon fill layer over a source.
    fn add_fill_layer(
        &mut self,
        id: &str,
        source: &str,
        color: Color,
        opacity: f64,
    ) -> Result<(), RenderSyncError>;

    /// Add a polygon outline layer over a source.
    fn add_line_layer(
        &mut self,
        id: &str,
        source: &str,
        color: Color,
        width: f64,
    ) -> Result<(), RenderSyncError>;

    /// Remove a layer.
    fn remove_layer(&mut self, id: &str) -> Result<(), RenderSyncError>;

    /// Update an existing layer's paint color without re-adding it.
    fn set_layer_color(&mut self, id: &str, color: Color) -> Result<(), RenderSyncError>;
}

/// Log a recoverable engine failure and move on.
///
/// Layer/source mutations can race the engine (a style swap may have
/// destroyed what the bookkeeping still lists); the registration tables
/// re-converge on the next show, so these are warnings, not errors.
pub(crate) fn log_render_failure(context: &str, error: RenderSyncError) {
    tracing::warn!("{}: {}", context, error);
}
