// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Farmplot: the farm-plot geometry editor core.
//!
//! The hosting dashboard page draws an irregular field boundary on a
//! map; this crate computes its area, subdivides it into a grid mesh
//! clipped to the boundary, runs the draw/edit interaction state
//! machine, and manages the per-crop overlay layers on the map - without
//! owning the map engine, the drawing toolkit, or the backend, all of
//! which stay behind traits and events.
//!
//! Typical wiring: implement [`render::MapSurface`] over the map engine,
//! feed toolkit and UI events as [`editing::EditorEvent`]s into a
//! [`data::FieldMapController`], and act on the returned
//! [`data::Notification`]s.

pub mod data;
pub mod editing;
pub mod error;
pub mod geometry;
pub mod mesh;
pub mod model;
pub mod overlay;
pub mod render;
pub mod settings;
pub mod theme;

pub use data::{FieldMapController, Notification, PlotBackend, SaveRequest};
pub use editing::{DrawMode, EditorEvent, EditorSession, FarmAreaDraft, SideEffect};
pub use error::{EditorError, GeometryError, MeshError, PersistenceError, RenderSyncError};
pub use geometry::Ring;
pub use mesh::{CellId, MeshCell, MeshGrid, MeshJob, MeshOutcome};
pub use model::{CropId, PersistedPlot, PlotColor, PlotId};
pub use overlay::OverlayManager;
pub use render::MapSurface;

/// Initialize the tracing subscriber (can be controlled via the
/// `RUST_LOG` env var). Called once by the hosting application at
/// startup; library code only emits through `tracing` macros.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("farmplot=info".parse().unwrap()),
        )
        .init();
}
