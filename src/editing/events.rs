// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Typed events into, and side effects out of, the draw session state
//! machine.
//!
//! The drawing toolkit and the hosting page deliver [`EditorEvent`]s;
//! the session reduces each one to a list of [`SideEffect`]s for the
//! host to apply, in order. The session never touches the map surface or
//! the backend itself, which keeps every transition unit-testable and
//! the machine independent of how events are physically wired.

use crate::error::{GeometryError, MeshError};
use crate::geometry::Ring;
use crate::mesh::{CellId, MeshCell, MeshJob, MeshOutcome};
use crate::model::{CropId, PlotId};
use kurbo::Point;

/// An input to the draw session state machine.
#[derive(Debug)]
pub enum EditorEvent {
    /// The user picked the draw tool.
    DrawToolSelected,

    /// The toolkit reported a closed polygon (double-click / first-vertex
    /// click). Vertices are raw toolkit output, validated here.
    PolygonCompleted { vertices: Vec<Point> },

    /// Explicit cancel gesture while drawing (or with an uncommitted
    /// draft).
    DrawCancelled,

    /// The user asked to reshape a persisted plot.
    EditRequested { plot_id: CropId, boundary: Ring },

    /// The toolkit reported the editable layer's current geometry after
    /// a vertex drag.
    VertexEdited { vertices: Vec<Point> },

    /// The user finished reshaping; the edited geometry should be
    /// persisted.
    EditCompleted,

    /// The host's persistence request succeeded.
    SaveSucceeded { id: PlotId },

    /// The host's persistence request failed; draft/edit state must
    /// survive for a retry.
    SaveFailed,

    /// The user picked a different mesh cell size.
    CellSizeChanged { meters: f64 },

    /// The user clicked a mesh cell.
    CellToggled { id: CellId },

    /// The user cleared the cell selection.
    SelectionCleared,

    /// A mesh generation finished (possibly stale).
    MeshReady(MeshOutcome),

    /// The base-map style was swapped; the engine dropped every custom
    /// source and layer.
    StyleReloaded,
}

/// An instruction back to the host, produced by the state machine.
///
/// Effects are ordered: outbound emissions come before the cleanup that
/// would destroy what they reference, and style-swap recovery lists
/// overlay restoration before the draft/mesh layers so stacking order
/// comes back right.
#[derive(Debug)]
pub enum SideEffect {
    /// A draft was completed; hand it to the hosting page for
    /// confirmation and save.
    DraftCompleted(crate::editing::FarmAreaDraft),

    /// The completed or edited geometry was rejected; prompt the user to
    /// keep drawing.
    GeometryRejected(GeometryError),

    /// Mesh generation failed; tell the user and keep the draft.
    MeshFailed(MeshError),

    /// Run this mesh generation and deliver the outcome back as
    /// [`EditorEvent::MeshReady`].
    SpawnMeshJob(MeshJob),

    /// Replace the mesh layer source with these cells.
    RefreshMeshLayers(Vec<MeshCell>),

    /// Show this boundary on the draft layer.
    RefreshDraftLayers(Ring),

    /// Empty the draft layer.
    ClearDraftLayers,

    /// Hide one plot's overlay (edit started).
    HideOverlay(CropId),

    /// Re-show one plot's overlay from the host's current record (edit
    /// finished or cancelled).
    RestoreOverlay(CropId),

    /// Replay every overlay registration (style swap).
    RestoreOverlays,

    /// Re-install the draft and mesh sources/layers (style swap dropped
    /// them). Ordered after `RestoreOverlays` so they stack on top.
    ReinstallEditorLayers,

    /// Load a plot's geometry into the toolkit's editable layer.
    LoadEditableGeometry { plot_id: CropId, boundary: Ring },

    /// Remove the editable layer's feature.
    ClearEditableGeometry,

    /// Edited geometry is ready to persist for this plot.
    EditedGeometryReady { plot_id: CropId, boundary: Ring },

    /// The set of selected cells changed; report it to the host.
    SelectionChanged(Vec<MeshCell>),
}
