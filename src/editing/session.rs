// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Editor session - the draw/edit mode state machine.
//!
//! `EditorSession` owns everything the interaction lifecycle needs: the
//! current [`DrawMode`], the single draft, the edit target, the mesh
//! epoch, and the save-in-flight flag. It is a total reducer: every
//! event produces a (possibly empty) list of side effects and leaves the
//! session in a valid state - in particular, never with more than one
//! draft or edit target.

use super::draft::FarmAreaDraft;
use super::events::{EditorEvent, SideEffect};
use crate::error::EditorError;
use crate::geometry::Ring;
use crate::mesh::{MeshGrid, MeshJob, MeshOutcome};
use crate::model::CropId;
use crate::settings;

/// The interaction mode. Exactly one value at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Idle: panning the map. Initial and terminal state.
    Pan,
    /// Capturing a new boundary polygon.
    Draw,
    /// Reshaping an existing persisted plot's vertices.
    Edit(CropId),
}

/// A persisted plot checked out for reshaping.
#[derive(Debug, Clone)]
pub struct EditTarget {
    pub plot_id: CropId,
    pub boundary: Ring,
    pub mesh: Option<MeshGrid>,
}

/// State machine for the draw/edit interaction lifecycle.
#[derive(Debug)]
pub struct EditorSession {
    mode: DrawMode,
    draft: Option<FarmAreaDraft>,
    edit: Option<EditTarget>,
    cell_size_m: f64,
    mesh_epoch: u64,
    save_in_flight: bool,
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            mode: DrawMode::Pan,
            draft: None,
            edit: None,
            cell_size_m: settings::mesh::DEFAULT_CELL_SIZE_M,
            mesh_epoch: 0,
            save_in_flight: false,
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn draft(&self) -> Option<&FarmAreaDraft> {
        self.draft.as_ref()
    }

    pub fn edit_target(&self) -> Option<&EditTarget> {
        self.edit.as_ref()
    }

    pub fn save_in_flight(&self) -> bool {
        self.save_in_flight
    }

    pub fn cell_size_m(&self) -> f64 {
        self.cell_size_m
    }

    /// The boundary mesh operations apply to: the draft's, or the edit
    /// target's.
    pub fn active_boundary(&self) -> Option<&Ring> {
        match (&self.draft, &self.edit) {
            (Some(draft), _) => Some(&draft.boundary),
            (None, Some(edit)) => Some(&edit.boundary),
            (None, None) => None,
        }
    }

    /// The mesh attached to the active draft or edit target.
    pub fn active_mesh(&self) -> Option<&MeshGrid> {
        match (&self.draft, &self.edit) {
            (Some(draft), _) => draft.mesh.as_ref(),
            (None, Some(edit)) => edit.mesh.as_ref(),
            (None, None) => None,
        }
    }

    fn active_mesh_mut(&mut self) -> Option<&mut Option<MeshGrid>> {
        match (&mut self.draft, &mut self.edit) {
            (Some(draft), _) => Some(&mut draft.mesh),
            (None, Some(edit)) => Some(&mut edit.mesh),
            (None, None) => None,
        }
    }

    /// Mark a draft save as started. Refused while another save is
    /// pending or when there is nothing to save; the session is
    /// unchanged on refusal.
    pub fn begin_save(&mut self) -> Result<&FarmAreaDraft, EditorError> {
        if self.save_in_flight {
            return Err(EditorError::SaveInFlight);
        }
        let Some(draft) = self.draft.as_ref() else {
            return Err(EditorError::NothingToSave);
        };
        self.save_in_flight = true;
        Ok(draft)
    }

    /// Reduce one event to its side effects.
    pub fn handle_event(&mut self, event: EditorEvent) -> Vec<SideEffect> {
        match event {
            EditorEvent::DrawToolSelected => self.on_draw_tool_selected(),
            EditorEvent::PolygonCompleted { vertices } => self.on_polygon_completed(vertices),
            EditorEvent::DrawCancelled => self.on_draw_cancelled(),
            EditorEvent::EditRequested { plot_id, boundary } => {
                self.on_edit_requested(plot_id, boundary)
            }
            EditorEvent::VertexEdited { vertices } => self.on_vertex_edited(vertices),
            EditorEvent::EditCompleted => self.on_edit_completed(),
            EditorEvent::SaveSucceeded { id } => self.on_save_succeeded(id),
            EditorEvent::SaveFailed => self.on_save_failed(),
            EditorEvent::CellSizeChanged { meters } => self.on_cell_size_changed(meters),
            EditorEvent::CellToggled { id } => self.on_cell_toggled(id),
            EditorEvent::SelectionCleared => self.on_selection_cleared(),
            EditorEvent::MeshReady(outcome) => self.on_mesh_ready(outcome),
            EditorEvent::StyleReloaded => self.on_style_reloaded(),
        }
    }

    // ===== Transitions =====

    fn on_draw_tool_selected(&mut self) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        self.cancel_current(&mut effects);
        self.mode = DrawMode::Draw;
        tracing::info!("entering draw mode");
        effects
    }

    fn on_polygon_completed(&mut self, vertices: Vec<kurbo::Point>) -> Vec<SideEffect> {
        if self.mode != DrawMode::Draw {
            tracing::debug!("ignoring polygon completion outside draw mode");
            return Vec::new();
        }
        match FarmAreaDraft::from_vertices(vertices) {
            Ok(draft) => {
                self.mode = DrawMode::Pan;
                self.mesh_epoch += 1;
                let job = MeshJob::new(self.mesh_epoch, draft.boundary.clone(), self.cell_size_m);
                let boundary = draft.boundary.clone();
                self.draft = Some(draft.clone());
                tracing::info!(
                    "draft completed: {:.1} m^2, ~{} cells",
                    draft.area_square_meters,
                    draft.estimated_cell_count
                );
                // The emission comes first: the host sees the draft
                // before any layer mutation it might react to.
                vec![
                    SideEffect::DraftCompleted(draft),
                    SideEffect::RefreshDraftLayers(boundary),
                    SideEffect::SpawnMeshJob(job),
                ]
            }
            Err(error) => {
                tracing::warn!("rejected completed polygon: {}", error);
                vec![SideEffect::GeometryRejected(error)]
            }
        }
    }

    fn on_draw_cancelled(&mut self) -> Vec<SideEffect> {
        match self.mode {
            DrawMode::Draw => {
                let mut effects = Vec::new();
                self.discard_draft(&mut effects);
                self.mode = DrawMode::Pan;
                tracing::info!("draw cancelled");
                effects
            }
            // A completed-but-unsaved draft can also be discarded.
            DrawMode::Pan if self.draft.is_some() => {
                let mut effects = Vec::new();
                self.discard_draft(&mut effects);
                tracing::info!("draft discarded");
                effects
            }
            _ => Vec::new(),
        }
    }

    fn on_edit_requested(&mut self, plot_id: CropId, boundary: Ring) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        self.cancel_current(&mut effects);
        self.mode = DrawMode::Edit(plot_id);
        self.edit = Some(EditTarget {
            plot_id,
            boundary: boundary.clone(),
            mesh: None,
        });
        tracing::info!("editing plot geometry for entity {}", plot_id);
        effects.push(SideEffect::HideOverlay(plot_id));
        effects.push(SideEffect::LoadEditableGeometry { plot_id, boundary });
        effects
    }

    fn on_vertex_edited(&mut self, vertices: Vec<kurbo::Point>) -> Vec<SideEffect> {
        let Some(edit) = self.edit.as_mut() else {
            tracing::debug!("ignoring vertex edit outside edit mode");
            return Vec::new();
        };
        match Ring::new(vertices) {
            Ok(ring) => {
                edit.boundary = ring.clone();
                // A mesh generated for the old geometry is stale.
                if edit.mesh.take().is_some() {
                    self.mesh_epoch += 1;
                    let job = MeshJob::new(self.mesh_epoch, ring, self.cell_size_m);
                    vec![SideEffect::SpawnMeshJob(job)]
                } else {
                    Vec::new()
                }
            }
            Err(error) => {
                tracing::debug!("rejected edited geometry: {}", error);
                vec![SideEffect::GeometryRejected(error)]
            }
        }
    }

    fn on_edit_completed(&mut self) -> Vec<SideEffect> {
        let Some(edit) = self.edit.as_ref() else {
            tracing::debug!("ignoring edit completion outside edit mode");
            return Vec::new();
        };
        if self.save_in_flight {
            tracing::warn!("edit completion ignored: a save is already in flight");
            return Vec::new();
        }
        self.save_in_flight = true;
        vec![SideEffect::EditedGeometryReady {
            plot_id: edit.plot_id,
            boundary: edit.boundary.clone(),
        }]
    }

    fn on_save_succeeded(&mut self, id: crate::model::PlotId) -> Vec<SideEffect> {
        if !self.save_in_flight {
            tracing::debug!("ignoring save confirmation with no save in flight");
            return Vec::new();
        }
        self.save_in_flight = false;
        match self.mode {
            DrawMode::Edit(plot_id) => {
                self.edit = None;
                self.mode = DrawMode::Pan;
                self.mesh_epoch += 1;
                tracing::info!("edited geometry persisted as plot {}", id);
                vec![
                    SideEffect::ClearEditableGeometry,
                    SideEffect::RestoreOverlay(plot_id),
                    SideEffect::RefreshMeshLayers(Vec::new()),
                ]
            }
            _ => {
                let mut effects = Vec::new();
                self.discard_draft(&mut effects);
                tracing::info!("draft persisted as plot {}", id);
                effects
            }
        }
    }

    fn on_save_failed(&mut self) -> Vec<SideEffect> {
        // Draft/edit state is untouched so the user can retry.
        self.save_in_flight = false;
        tracing::warn!("save failed; keeping draft/edit state for retry");
        Vec::new()
    }

    fn on_cell_size_changed(&mut self, meters: f64) -> Vec<SideEffect> {
        let Some(boundary) = self.active_boundary().cloned() else {
            tracing::warn!("cell size change ignored: no draft or edit target");
            return Vec::new();
        };
        self.cell_size_m = meters;
        self.mesh_epoch += 1;
        let job = MeshJob::new(self.mesh_epoch, boundary, meters);
        vec![SideEffect::SpawnMeshJob(job)]
    }

    fn on_cell_toggled(&mut self, id: crate::mesh::CellId) -> Vec<SideEffect> {
        let Some(mesh_slot) = self.active_mesh_mut() else {
            return Vec::new();
        };
        let Some(mesh) = mesh_slot.as_mut() else {
            return Vec::new();
        };
        if mesh.toggle_selected(id).is_none() {
            tracing::debug!("toggle for unknown cell {}", id);
            return Vec::new();
        }
        vec![
            SideEffect::RefreshMeshLayers(mesh.cells().to_vec()),
            SideEffect::SelectionChanged(mesh.selected_cells()),
        ]
    }

    fn on_selection_cleared(&mut self) -> Vec<SideEffect> {
        let Some(mesh_slot) = self.active_mesh_mut() else {
            return Vec::new();
        };
        let Some(mesh) = mesh_slot.as_mut() else {
            return Vec::new();
        };
        mesh.clear_selection();
        vec![
            SideEffect::RefreshMeshLayers(mesh.cells().to_vec()),
            SideEffect::SelectionChanged(Vec::new()),
        ]
    }

    fn on_mesh_ready(&mut self, outcome: MeshOutcome) -> Vec<SideEffect> {
        if outcome.epoch != self.mesh_epoch {
            // A newer request superseded this one while it ran.
            tracing::debug!(
                "discarding stale mesh outcome (epoch {} != {})",
                outcome.epoch,
                self.mesh_epoch
            );
            return Vec::new();
        }
        match outcome.result {
            Ok(mut grid) => {
                let Some(mesh_slot) = self.active_mesh_mut() else {
                    tracing::debug!("mesh outcome arrived with no active geometry");
                    return Vec::new();
                };
                if let Some(previous) = mesh_slot.as_ref() {
                    grid.adopt_selection_from(previous);
                }
                let effects = vec![
                    SideEffect::RefreshMeshLayers(grid.cells().to_vec()),
                    SideEffect::SelectionChanged(grid.selected_cells()),
                ];
                *mesh_slot = Some(grid);
                effects
            }
            Err(error) => {
                tracing::warn!("mesh generation failed: {}", error);
                if let Some(mesh_slot) = self.active_mesh_mut() {
                    *mesh_slot = None;
                }
                vec![
                    SideEffect::RefreshMeshLayers(Vec::new()),
                    SideEffect::MeshFailed(error),
                ]
            }
        }
    }

    fn on_style_reloaded(&mut self) -> Vec<SideEffect> {
        // Overlays first, then the editor's own layers, so draft and
        // mesh stack above every overlay fill/stroke pair.
        let mut effects = vec![SideEffect::RestoreOverlays, SideEffect::ReinstallEditorLayers];
        if let Some(draft) = &self.draft {
            effects.push(SideEffect::RefreshDraftLayers(draft.boundary.clone()));
        }
        if let Some(mesh) = self.active_mesh() {
            effects.push(SideEffect::RefreshMeshLayers(mesh.cells().to_vec()));
        }
        if let Some(edit) = &self.edit {
            effects.push(SideEffect::LoadEditableGeometry {
                plot_id: edit.plot_id,
                boundary: edit.boundary.clone(),
            });
        }
        effects
    }

    // ===== Helpers =====

    /// Force-cancel whatever is in progress (draft or edit) before a new
    /// session starts. Guarantees at most one draft/edit target exists.
    fn cancel_current(&mut self, effects: &mut Vec<SideEffect>) {
        if let Some(edit) = self.edit.take() {
            tracing::info!("cancelling edit of entity {}", edit.plot_id);
            effects.push(SideEffect::ClearEditableGeometry);
            effects.push(SideEffect::RestoreOverlay(edit.plot_id));
            effects.push(SideEffect::RefreshMeshLayers(Vec::new()));
            self.mesh_epoch += 1;
        }
        if self.draft.is_some() || self.mode == DrawMode::Draw {
            self.discard_draft(effects);
        }
        self.mode = DrawMode::Pan;
    }

    /// Drop the draft and everything rendered for it.
    fn discard_draft(&mut self, effects: &mut Vec<SideEffect>) {
        self.draft = None;
        // Invalidate any in-flight mesh generation for the old geometry.
        self.mesh_epoch += 1;
        effects.push(SideEffect::ClearDraftLayers);
        effects.push(SideEffect::RefreshMeshLayers(Vec::new()));
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}
