// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Non-visual settings and tuning constants.
//!
//! This module holds behavioral settings that stay stable across theme
//! changes. Visual styling (colors, opacities, stroke widths) belongs in
//! `theme.rs`.

// ============================================================================
// MESH SETTINGS
// ============================================================================
/// Default mesh cell size in meters (5 m x 5 m cells)
const MESH_DEFAULT_CELL_SIZE_M: f64 = 5.0;

/// Smallest cell size a user may request (meters)
const MESH_MIN_CELL_SIZE_M: f64 = 0.5;

/// Largest cell size a user may request (meters)
const MESH_MAX_CELL_SIZE_M: f64 = 100.0;

// ============================================================================
// PERFORMANCE SETTINGS
// ============================================================================
/// Upper bound on the candidate grid (rows x cols) before clipping.
///
/// Mesh generation walks every candidate cell in the polygon's bounding
/// box. A tiny cell size on a large field would freeze the interaction
/// thread, so generation refuses parameter combinations past this bound
/// instead of grinding through them.
const MESH_MAX_CANDIDATE_CELLS: usize = 262_144;

/// Clipped cells with less than this area (square meters) are dropped
/// as slivers.
const MESH_MIN_KEPT_CELL_AREA_M2: f64 = 1e-6;

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Mesh generation settings (cell sizes, candidate grid bound)
pub mod mesh {
    /// Default cell size in meters
    pub const DEFAULT_CELL_SIZE_M: f64 = super::MESH_DEFAULT_CELL_SIZE_M;

    /// Smallest accepted cell size in meters
    pub const MIN_CELL_SIZE_M: f64 = super::MESH_MIN_CELL_SIZE_M;

    /// Largest accepted cell size in meters
    pub const MAX_CELL_SIZE_M: f64 = super::MESH_MAX_CELL_SIZE_M;

    /// Candidate grid bound before clipping
    pub const MAX_CANDIDATE_CELLS: usize = super::MESH_MAX_CANDIDATE_CELLS;

    /// Minimum clipped-cell area kept (square meters)
    pub const MIN_KEPT_CELL_AREA_M2: f64 = super::MESH_MIN_KEPT_CELL_AREA_M2;
}
