// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the geometry, mesh, editing, overlay, and persistence
//! layers.
//!
//! Each failure domain gets its own enum so callers can match on exactly
//! the cases they can recover from. Backend failures are opaque: the
//! hosting dashboard owns the transport, so `PersistenceError` wraps
//! whatever it reports as an `anyhow::Error`.

use thiserror::Error;

/// Rejected polygon geometry.
///
/// Raised before any area or mesh computation; no draft is created from
/// a ring that fails validation.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Fewer than 4 vertices, or the ring is not closed (first != last),
    /// or fewer than 3 distinct corners.
    #[error("degenerate ring: a closed boundary needs at least 3 distinct corners")]
    Degenerate,

    /// Two non-adjacent boundary segments cross.
    #[error("boundary crosses itself")]
    SelfIntersecting,

    /// A vertex is outside the valid longitude/latitude range (or not
    /// finite).
    #[error("vertex out of range: lon {lon}, lat {lat}")]
    OutOfRange { lon: f64, lat: f64 },
}

/// Mesh generation failure. The draft survives; its mesh stays empty
/// until the user retries with a different cell size.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Cell size is non-positive, non-finite, or outside the configured
    /// clamp range.
    #[error("invalid mesh cell size: {0} m")]
    InvalidCellSize(f64),

    /// The candidate grid before clipping would exceed the configured
    /// cell limit (polygon too large for the requested cell size).
    #[error("candidate grid of {candidate} cells exceeds the limit of {max}")]
    GridTooLarge { candidate: usize, max: usize },
}

/// Failure reported by the backend collaborator while persisting a plot.
///
/// Draft/edit state is preserved exactly as before the attempt so the
/// user can retry without re-drawing.
#[derive(Debug, Error)]
#[error("plot persistence request failed: {source}")]
pub struct PersistenceError {
    #[from]
    pub source: anyhow::Error,
}

/// Invalid editor operation (not a state corruption: the session refuses
/// the request and stays as it was).
#[derive(Debug, Error)]
pub enum EditorError {
    /// A save is already pending; a second one cannot start until the
    /// first resolves.
    #[error("a save request is already in flight")]
    SaveInFlight,

    /// There is no completed draft to save.
    #[error("no draft to save")]
    NothingToSave,

    /// The requested operation needs an active edit target.
    #[error("no plot is being edited")]
    NotEditing,

    /// The referenced plot is not in the loaded plot list.
    #[error("unknown plot for entity id {0}")]
    UnknownPlot(crate::model::CropId),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// A layer or source mutation rejected by the rendering engine.
///
/// Treated as non-fatal throughout: the overlay manager's
/// replace-in-place policy recovers on the next `show`.
#[derive(Debug, Error)]
pub enum RenderSyncError {
    #[error("layer '{0}' already exists")]
    DuplicateLayer(String),

    #[error("layer '{0}' does not exist")]
    UnknownLayer(String),

    #[error("source '{0}' does not exist")]
    UnknownSource(String),

    /// Any other engine-side failure, stringly reported.
    #[error("map engine error: {0}")]
    Engine(String),
}
