// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Host boundary: the save payload, the backend collaborator trait, and
//! `FieldMapController`, the reference wiring of session + overlay
//! manager + render bridge.
//!
//! The controller applies the session's side effects to a
//! [`MapSurface`], keeps the loaded plot records, and runs the guarded
//! save cycle against a [`PlotBackend`]. Anything the core cannot do
//! itself (prompt the user, drive the drawing toolkit, run a request)
//! comes back as a [`Notification`] for the hosting page.

use crate::editing::{EditorEvent, EditorSession, FarmAreaDraft, SideEffect};
use crate::error::{EditorError, GeometryError, MeshError, PersistenceError};
use crate::geometry::Ring;
use crate::mesh::{MeshCell, MeshJob};
use crate::model::{CropId, PersistedPlot, PlotColor, PlotId};
use crate::overlay::OverlayManager;
use crate::render::{MapSurface, features, log_render_failure};
use peniko::Color;
use serde::Serialize;
use std::collections::BTreeMap;

/// The persistence payload for a completed draft, shaped the way the
/// dashboard backend expects it.
#[derive(Debug, Clone, Serialize)]
pub struct SaveRequest {
    pub name: String,
    pub description: String,
    pub geometry: Ring,
    pub mesh_size_meters: f64,
    pub tags: Vec<String>,
}

/// The backend collaborator. The hosting page owns the transport; from
/// here it is a plain request/response call with an opaque error.
pub trait PlotBackend {
    /// Persist a new plot; returns its backend-assigned id.
    fn save_plot(&mut self, request: &SaveRequest) -> Result<PlotId, PersistenceError>;

    /// Replace a persisted plot's boundary.
    fn update_geometry(&mut self, id: PlotId, boundary: &Ring) -> Result<(), PersistenceError>;
}

/// Something the hosting page must act on.
#[derive(Debug)]
pub enum Notification {
    /// A draft was completed; prompt the user to name and save it.
    DraftCompleted(FarmAreaDraft),

    /// The drawn/edited geometry was rejected; tell the user to keep
    /// drawing.
    GeometryRejected(GeometryError),

    /// Mesh generation failed; the draft survives, the mesh is empty.
    MeshFailed(MeshError),

    /// A mesh generation is pending; run it (inline or on a worker) and
    /// feed the outcome back, or use
    /// [`FieldMapController::run_mesh_job`].
    MeshJobSpawned(MeshJob),

    /// The selected cell set changed.
    SelectionChanged(Vec<MeshCell>),

    /// Load this geometry into the drawing toolkit's editable layer.
    BeginEditingGeometry { plot_id: CropId, boundary: Ring },

    /// Remove the editable layer's feature.
    EndEditingGeometry,

    /// Edited geometry awaits persistence (hosts driving their own save
    /// flow; [`FieldMapController::save_edit`] handles it directly).
    GeometryReadyToPersist { plot_id: CropId, boundary: Ring },
}

/// Reference wiring of the editor core for a hosting page.
#[derive(Debug, Default)]
pub struct FieldMapController {
    session: EditorSession,
    overlay: OverlayManager,
    plots: BTreeMap<CropId, PersistedPlot>,
}

impl FieldMapController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn overlay(&self) -> &OverlayManager {
        &self.overlay
    }

    /// The loaded record for one crop entity.
    pub fn plot(&self, entity: CropId) -> Option<&PersistedPlot> {
        self.plots.get(&entity)
    }

    /// Install the draft and mesh sources/layers. Called once after the
    /// map style has loaded; style swaps re-run it via effects.
    pub fn install(&mut self, surface: &mut dyn MapSurface) {
        if let Err(e) = features::install_draft_layers(surface) {
            log_render_failure("install draft layers", e);
        }
        if let Err(e) = features::install_mesh_layers(surface) {
            log_render_failure("install mesh layers", e);
        }
    }

    /// Replace the loaded plot list and re-render every overlay.
    ///
    /// Clears all existing registrations first so no stale overlay
    /// survives for a plot that is no longer in the list.
    pub fn load_plots(&mut self, surface: &mut dyn MapSurface, plots: Vec<PersistedPlot>) {
        self.overlay.clear_all(surface);
        self.plots = plots
            .into_iter()
            .map(|p| (p.owning_entity_id, p))
            .collect();
        let list: Vec<PersistedPlot> = self.plots.values().cloned().collect();
        tracing::info!("loaded {} plots", list.len());
        self.overlay.show_all(surface, &list);
    }

    /// Feed one event through the state machine and apply its effects.
    pub fn handle_event(
        &mut self,
        surface: &mut dyn MapSurface,
        event: EditorEvent,
    ) -> Vec<Notification> {
        let effects = self.session.handle_event(event);
        self.apply_effects(surface, effects)
    }

    /// Start reshaping a loaded plot's boundary.
    pub fn begin_edit(
        &mut self,
        surface: &mut dyn MapSurface,
        entity: CropId,
    ) -> Result<Vec<Notification>, EditorError> {
        let plot = self
            .plots
            .get(&entity)
            .ok_or(EditorError::UnknownPlot(entity))?;
        let boundary = plot.boundary.clone();
        Ok(self.handle_event(
            surface,
            EditorEvent::EditRequested {
                plot_id: entity,
                boundary,
            },
        ))
    }

    /// Run the guarded save cycle for the current draft.
    ///
    /// On failure the draft is preserved exactly as it was, so the
    /// caller can surface a retryable error.
    pub fn save_draft(
        &mut self,
        surface: &mut dyn MapSurface,
        backend: &mut dyn PlotBackend,
        name: String,
        description: String,
        tags: Vec<String>,
    ) -> Result<PlotId, EditorError> {
        let fallback_cell_size = self.session.cell_size_m();
        let draft = self.session.begin_save()?;
        let request = SaveRequest {
            name,
            description,
            geometry: draft.boundary.clone(),
            mesh_size_meters: draft
                .mesh
                .as_ref()
                .map(|m| m.cell_size_m())
                .unwrap_or(fallback_cell_size),
            tags,
        };
        match backend.save_plot(&request) {
            Ok(id) => {
                self.handle_event(surface, EditorEvent::SaveSucceeded { id });
                Ok(id)
            }
            Err(error) => {
                self.handle_event(surface, EditorEvent::SaveFailed);
                Err(error.into())
            }
        }
    }

    /// Persist the edited geometry of the plot currently being reshaped
    /// and restore its overlay with the new boundary.
    pub fn save_edit(
        &mut self,
        surface: &mut dyn MapSurface,
        backend: &mut dyn PlotBackend,
    ) -> Result<(), EditorError> {
        if self.session.save_in_flight() {
            return Err(EditorError::SaveInFlight);
        }
        let Some(target) = self.session.edit_target() else {
            return Err(EditorError::NotEditing);
        };
        let entity = target.plot_id;
        let boundary = target.boundary.clone();
        let plot_id = self
            .plots
            .get(&entity)
            .ok_or(EditorError::UnknownPlot(entity))?
            .id;

        // Marks the save as in flight and hands the geometry out.
        self.handle_event(surface, EditorEvent::EditCompleted);

        match backend.update_geometry(plot_id, &boundary) {
            Ok(()) => {
                // The overlay is restored from our record; update it
                // first so the re-show uses the new boundary.
                if let Some(plot) = self.plots.get_mut(&entity) {
                    plot.boundary = boundary;
                }
                self.handle_event(surface, EditorEvent::SaveSucceeded { id: plot_id });
                Ok(())
            }
            Err(error) => {
                self.handle_event(surface, EditorEvent::SaveFailed);
                Err(error.into())
            }
        }
    }

    /// Run a spawned mesh generation inline and deliver its outcome.
    ///
    /// Hosts with large fields run the job on a worker instead and feed
    /// [`EditorEvent::MeshReady`] themselves.
    pub fn run_mesh_job(
        &mut self,
        surface: &mut dyn MapSurface,
        job: MeshJob,
    ) -> Vec<Notification> {
        self.handle_event(surface, EditorEvent::MeshReady(job.run()))
    }

    /// Change a loaded plot's display color, in place.
    pub fn recolor_plot(
        &mut self,
        surface: &mut dyn MapSurface,
        entity: CropId,
        color: Color,
    ) -> Result<(), EditorError> {
        let plot = self
            .plots
            .get_mut(&entity)
            .ok_or(EditorError::UnknownPlot(entity))?;
        plot.color = PlotColor::new(color);
        self.overlay.recolor(surface, entity, color);
        Ok(())
    }

    fn apply_effects(
        &mut self,
        surface: &mut dyn MapSurface,
        effects: Vec<SideEffect>,
    ) -> Vec<Notification> {
        let mut notifications = Vec::new();
        for effect in effects {
            match effect {
                SideEffect::DraftCompleted(draft) => {
                    notifications.push(Notification::DraftCompleted(draft));
                }
                SideEffect::GeometryRejected(error) => {
                    notifications.push(Notification::GeometryRejected(error));
                }
                SideEffect::MeshFailed(error) => {
                    notifications.push(Notification::MeshFailed(error));
                }
                SideEffect::SpawnMeshJob(job) => {
                    notifications.push(Notification::MeshJobSpawned(job));
                }
                SideEffect::RefreshMeshLayers(cells) => {
                    if let Err(e) = features::update_mesh_layer(surface, &cells) {
                        log_render_failure("update mesh layer", e);
                    }
                }
                SideEffect::RefreshDraftLayers(ring) => {
                    if let Err(e) = features::show_draft(surface, &ring) {
                        log_render_failure("show draft", e);
                    }
                }
                SideEffect::ClearDraftLayers => {
                    if let Err(e) = features::clear_draft(surface) {
                        log_render_failure("clear draft", e);
                    }
                }
                SideEffect::HideOverlay(entity) => {
                    self.overlay.hide(surface, entity);
                }
                SideEffect::RestoreOverlay(entity) => match self.plots.get(&entity).cloned() {
                    Some(plot) => self.overlay.show(surface, &plot),
                    None => tracing::warn!("no record to restore overlay for entity {}", entity),
                },
                SideEffect::RestoreOverlays => {
                    self.overlay.restore_all(surface);
                }
                SideEffect::ReinstallEditorLayers => {
                    self.install(surface);
                }
                SideEffect::LoadEditableGeometry { plot_id, boundary } => {
                    notifications.push(Notification::BeginEditingGeometry { plot_id, boundary });
                }
                SideEffect::ClearEditableGeometry => {
                    notifications.push(Notification::EndEditingGeometry);
                }
                SideEffect::EditedGeometryReady { plot_id, boundary } => {
                    notifications.push(Notification::GeometryReadyToPersist { plot_id, boundary });
                }
                SideEffect::SelectionChanged(cells) => {
                    notifications.push(Notification::SelectionChanged(cells));
                }
            }
        }
        notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::DrawMode;
    use crate::geometry::METERS_PER_DEGREE;
    use crate::render::testing::RecordingSurface;
    use crate::render::{DRAFT_SOURCE, MESH_SOURCE};
    use anyhow::anyhow;
    use kurbo::Point;

    #[derive(Default)]
    struct MockBackend {
        next_id: i64,
        saved: Vec<SaveRequest>,
        updated: Vec<(PlotId, Ring)>,
        fail: bool,
    }

    impl PlotBackend for MockBackend {
        fn save_plot(&mut self, request: &SaveRequest) -> Result<PlotId, PersistenceError> {
            if self.fail {
                return Err(PersistenceError::from(anyhow!("503 service unavailable")));
            }
            self.next_id += 1;
            self.saved.push(request.clone());
            Ok(PlotId(self.next_id))
        }

        fn update_geometry(
            &mut self,
            id: PlotId,
            boundary: &Ring,
        ) -> Result<(), PersistenceError> {
            if self.fail {
                return Err(PersistenceError::from(anyhow!("503 service unavailable")));
            }
            self.updated.push((id, boundary.clone()));
            Ok(())
        }
    }

    fn field_vertices(width_m: f64, height_m: f64) -> Vec<Point> {
        let lat0: f64 = 35.0;
        let dlon = width_m / (METERS_PER_DEGREE * lat0.to_radians().cos());
        let dlat = height_m / METERS_PER_DEGREE;
        vec![
            Point::new(135.0, lat0),
            Point::new(135.0 + dlon, lat0),
            Point::new(135.0 + dlon, lat0 + dlat),
            Point::new(135.0, lat0 + dlat),
            Point::new(135.0, lat0),
        ]
    }

    fn plot(entity: i64) -> PersistedPlot {
        PersistedPlot {
            id: PlotId(entity * 10),
            owning_entity_id: CropId(entity),
            boundary: Ring::new(field_vertices(20.0, 10.0)).unwrap(),
            color: PlotColor::from_hex("#3366cc").unwrap(),
            mesh_size_meters: None,
            name: None,
            created_at: None,
        }
    }

    /// Draw and complete a draft; returns the pending mesh job.
    fn complete_draft(
        controller: &mut FieldMapController,
        surface: &mut RecordingSurface,
    ) -> MeshJob {
        controller.handle_event(surface, EditorEvent::DrawToolSelected);
        let notifications = controller.handle_event(
            surface,
            EditorEvent::PolygonCompleted {
                vertices: field_vertices(20.0, 10.0),
            },
        );
        notifications
            .into_iter()
            .find_map(|n| match n {
                Notification::MeshJobSpawned(job) => Some(job),
                _ => None,
            })
            .expect("completion spawns a mesh job")
    }

    #[test]
    fn load_plots_renders_every_overlay() {
        let mut surface = RecordingSurface::new();
        let mut controller = FieldMapController::new();
        controller.load_plots(&mut surface, vec![plot(1), plot(2)]);

        assert_eq!(controller.overlay().len(), 2);
        assert_eq!(surface.layers.len(), 4);
    }

    #[test]
    fn reloading_plots_drops_stale_overlays() {
        let mut surface = RecordingSurface::new();
        let mut controller = FieldMapController::new();
        controller.load_plots(&mut surface, vec![plot(1), plot(2)]);
        controller.load_plots(&mut surface, vec![plot(2)]);

        assert_eq!(controller.overlay().len(), 1);
        assert!(!controller.overlay().is_registered(CropId(1)));
        assert!(!surface.layers.contains_key("farmplot-plot-1-fill"));
    }

    #[test]
    fn draft_completion_reaches_the_host() {
        let mut surface = RecordingSurface::new();
        let mut controller = FieldMapController::new();
        controller.install(&mut surface);

        controller.handle_event(&mut surface, EditorEvent::DrawToolSelected);
        let notifications = controller.handle_event(
            &mut surface,
            EditorEvent::PolygonCompleted {
                vertices: field_vertices(20.0, 10.0),
            },
        );

        assert!(
            notifications
                .iter()
                .any(|n| matches!(n, Notification::DraftCompleted(_)))
        );
        // The draft boundary is on the draft layer.
        let features = surface.sources[DRAFT_SOURCE]["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn mesh_job_populates_mesh_source() {
        let mut surface = RecordingSurface::new();
        let mut controller = FieldMapController::new();
        controller.install(&mut surface);

        let job = complete_draft(&mut controller, &mut surface);
        controller.run_mesh_job(&mut surface, job);

        let features = surface.sources[MESH_SOURCE]["features"].as_array().unwrap();
        // 20 x 10 m at the default 5 m cell size: 4 x 2 cells.
        assert_eq!(features.len(), 8);
    }

    #[test]
    fn save_draft_round_trip() {
        let mut surface = RecordingSurface::new();
        let mut controller = FieldMapController::new();
        let mut backend = MockBackend::default();
        controller.install(&mut surface);

        complete_draft(&mut controller, &mut surface);
        let id = controller
            .save_draft(
                &mut surface,
                &mut backend,
                "tomato field".into(),
                "north slope".into(),
                vec!["tomato".into()],
            )
            .unwrap();

        assert_eq!(id, PlotId(1));
        assert_eq!(backend.saved.len(), 1);
        assert_eq!(backend.saved[0].name, "tomato field");
        assert_eq!(backend.saved[0].mesh_size_meters, 5.0);
        // Draft is gone; saving again is refused.
        assert!(controller.session().draft().is_none());
        assert!(matches!(
            controller.save_draft(
                &mut surface,
                &mut backend,
                String::new(),
                String::new(),
                Vec::new()
            ),
            Err(EditorError::NothingToSave)
        ));
    }

    #[test]
    fn failed_save_preserves_draft_for_retry() {
        let mut surface = RecordingSurface::new();
        let mut controller = FieldMapController::new();
        let mut backend = MockBackend {
            fail: true,
            ..Default::default()
        };
        controller.install(&mut surface);

        complete_draft(&mut controller, &mut surface);
        let result = controller.save_draft(
            &mut surface,
            &mut backend,
            "beans".into(),
            String::new(),
            Vec::new(),
        );
        assert!(matches!(result, Err(EditorError::Persistence(_))));
        assert!(controller.session().draft().is_some());
        assert!(!controller.session().save_in_flight());

        // The retry succeeds.
        backend.fail = false;
        assert!(
            controller
                .save_draft(
                    &mut surface,
                    &mut backend,
                    "beans".into(),
                    String::new(),
                    Vec::new()
                )
                .is_ok()
        );
    }

    #[test]
    fn edit_cycle_persists_and_restores_overlay() {
        let mut surface = RecordingSurface::new();
        let mut controller = FieldMapController::new();
        let mut backend = MockBackend::default();
        controller.install(&mut surface);
        controller.load_plots(&mut surface, vec![plot(1)]);

        let notifications = controller.begin_edit(&mut surface, CropId(1)).unwrap();
        assert!(
            notifications
                .iter()
                .any(|n| matches!(n, Notification::BeginEditingGeometry { .. }))
        );
        // Overlay hidden while editing.
        assert!(!controller.overlay().is_registered(CropId(1)));

        // The toolkit reports a reshaped boundary.
        controller.handle_event(
            &mut surface,
            EditorEvent::VertexEdited {
                vertices: field_vertices(30.0, 10.0),
            },
        );

        controller.save_edit(&mut surface, &mut backend).unwrap();
        assert_eq!(backend.updated.len(), 1);
        assert_eq!(backend.updated[0].0, PlotId(10));
        assert_eq!(controller.session().mode(), DrawMode::Pan);
        // Overlay restored with the new geometry.
        assert!(controller.overlay().is_registered(CropId(1)));
        assert_eq!(
            controller.plot(CropId(1)).unwrap().boundary,
            backend.updated[0].1
        );
    }

    #[test]
    fn failed_edit_save_keeps_editing() {
        let mut surface = RecordingSurface::new();
        let mut controller = FieldMapController::new();
        let mut backend = MockBackend {
            fail: true,
            ..Default::default()
        };
        controller.install(&mut surface);
        controller.load_plots(&mut surface, vec![plot(1)]);
        controller.begin_edit(&mut surface, CropId(1)).unwrap();

        let result = controller.save_edit(&mut surface, &mut backend);
        assert!(matches!(result, Err(EditorError::Persistence(_))));
        assert_eq!(controller.session().mode(), DrawMode::Edit(CropId(1)));
        // Overlay stays hidden; the user is still editing.
        assert!(!controller.overlay().is_registered(CropId(1)));
    }

    #[test]
    fn save_edit_outside_edit_mode_is_refused() {
        let mut surface = RecordingSurface::new();
        let mut controller = FieldMapController::new();
        let mut backend = MockBackend::default();
        assert!(matches!(
            controller.save_edit(&mut surface, &mut backend),
            Err(EditorError::NotEditing)
        ));
    }

    #[test]
    fn style_swap_recovers_everything_in_order() {
        let mut surface = RecordingSurface::new();
        let mut controller = FieldMapController::new();
        controller.install(&mut surface);
        controller.load_plots(&mut surface, vec![plot(1)]);

        let job = complete_draft(&mut controller, &mut surface);
        controller.run_mesh_job(&mut surface, job);

        surface.swap_style();
        controller.handle_event(&mut surface, EditorEvent::StyleReloaded);

        // Overlays are back.
        assert!(surface.layers.contains_key("farmplot-plot-1-fill"));
        // Draft and mesh sources repopulated.
        assert_eq!(
            surface.sources[DRAFT_SOURCE]["features"].as_array().unwrap().len(),
            1
        );
        assert_eq!(
            surface.sources[MESH_SOURCE]["features"].as_array().unwrap().len(),
            8
        );
        // Stacking: every overlay layer sits below the editor layers.
        let overlay_pos = surface
            .layer_order
            .iter()
            .position(|l| l == "farmplot-plot-1-fill")
            .unwrap();
        let draft_pos = surface
            .layer_order
            .iter()
            .position(|l| l == crate::render::DRAFT_FILL_LAYER)
            .unwrap();
        assert!(overlay_pos < draft_pos);
    }

    #[test]
    fn recolor_updates_record_and_layers() {
        let mut surface = RecordingSurface::new();
        let mut controller = FieldMapController::new();
        controller.load_plots(&mut surface, vec![plot(1)]);

        let green = Color::from_rgb8(0x10, 0xc0, 0x40);
        controller
            .recolor_plot(&mut surface, CropId(1), green)
            .unwrap();
        assert_eq!(
            controller.plot(CropId(1)).unwrap().color,
            PlotColor::new(green)
        );
        assert_eq!(surface.layers["farmplot-plot-1-fill"].color, green);
    }

    #[test]
    fn selection_reaches_the_host() {
        let mut surface = RecordingSurface::new();
        let mut controller = FieldMapController::new();
        controller.install(&mut surface);

        let job = complete_draft(&mut controller, &mut surface);
        controller.run_mesh_job(&mut surface, job);
        let id = controller.session().active_mesh().unwrap().cells()[0].id;

        let notifications =
            controller.handle_event(&mut surface, EditorEvent::CellToggled { id });
        let selected = notifications
            .iter()
            .find_map(|n| match n {
                Notification::SelectionChanged(cells) => Some(cells),
                _ => None,
            })
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, id);
    }
}
