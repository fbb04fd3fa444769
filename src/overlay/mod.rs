// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Overlay manager: renders persisted plots as fill+stroke layer pairs,
//! one per crop entity.
//!
//! The manager never queries the rendering engine for what exists; its
//! own registration table is the source of truth. Every add/remove is
//! driven from the table, which is what makes `show` idempotent and
//! style-swap recovery a plain replay. Engine rejections are logged and
//! non-fatal: the replace-in-place policy means the next `show` for that
//! entity reconverges.

use crate::model::{CropId, PersistedPlot};
use crate::render::{MapSurface, log_render_failure};
use crate::theme;
use peniko::Color;
use serde_json::json;
use std::collections::BTreeMap;

/// Bookkeeping for one rendered plot: the source/layer ids materialized
/// on the map, plus the plot record itself so a style swap can replay
/// the `show`.
#[derive(Debug, Clone)]
pub struct OverlayRegistration {
    plot: PersistedPlot,
    source_id: String,
    fill_layer_id: String,
    stroke_layer_id: String,
}

impl OverlayRegistration {
    fn for_plot(plot: PersistedPlot) -> Self {
        let entity = plot.owning_entity_id;
        Self {
            plot,
            source_id: format!("farmplot-plot-{entity}"),
            fill_layer_id: format!("farmplot-plot-{entity}-fill"),
            stroke_layer_id: format!("farmplot-plot-{entity}-stroke"),
        }
    }
}

/// Renders and re-renders persisted plot polygons, keyed by owning
/// entity id. At most one registration (one fill+stroke pair) exists per
/// entity.
#[derive(Debug, Default)]
pub struct OverlayManager {
    registrations: BTreeMap<CropId, OverlayRegistration>,
}

impl OverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered plots.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Whether a plot is currently registered for this entity.
    pub fn is_registered(&self, entity: CropId) -> bool {
        self.registrations.contains_key(&entity)
    }

    /// Show a plot. Idempotent: an existing registration for the same
    /// entity is replaced in place (old layers removed, new ones added),
    /// never stacked.
    pub fn show(&mut self, surface: &mut dyn MapSurface, plot: &PersistedPlot) {
        let entity = plot.owning_entity_id;
        if let Some(existing) = self.registrations.remove(&entity) {
            remove_layers(surface, &existing);
        }

        let registration = OverlayRegistration::for_plot(plot.clone());
        let color = plot.color.color();
        add_layers(surface, &registration, color);
        self.registrations.insert(entity, registration);
    }

    /// Remove a plot's layers and source. A no-op when nothing is
    /// registered for the entity.
    pub fn hide(&mut self, surface: &mut dyn MapSurface, entity: CropId) {
        let Some(registration) = self.registrations.remove(&entity) else {
            return;
        };
        remove_layers(surface, &registration);
    }

    /// Show every plot in the list. Existing registrations for listed
    /// plots are replaced; registrations for plots not in the list are
    /// left alone (callers needing strict sync call `clear_all` first).
    pub fn show_all(&mut self, surface: &mut dyn MapSurface, plots: &[PersistedPlot]) {
        for plot in plots {
            self.show(surface, plot);
        }
    }

    /// Remove every registration this manager created. Layers and
    /// sources it did not create (draft, mesh, base map) are untouched.
    pub fn clear_all(&mut self, surface: &mut dyn MapSurface) {
        let registrations = std::mem::take(&mut self.registrations);
        for registration in registrations.values() {
            remove_layers(surface, registration);
        }
    }

    /// Update a registered plot's paint color in place, without removing
    /// and re-adding layers. Returns false when the entity has no
    /// registration.
    pub fn recolor(&mut self, surface: &mut dyn MapSurface, entity: CropId, color: Color) -> bool {
        let Some(registration) = self.registrations.get_mut(&entity) else {
            return false;
        };
        registration.plot.color = crate::model::PlotColor::new(color);
        if let Err(e) = surface.set_layer_color(&registration.fill_layer_id, color) {
            log_render_failure("recolor fill", e);
        }
        let stroke = theme::darken(color, theme::overlay::STROKE_DARKEN);
        if let Err(e) = surface.set_layer_color(&registration.stroke_layer_id, stroke) {
            log_render_failure("recolor stroke", e);
        }
        true
    }

    /// Replay every registration after the engine dropped all custom
    /// layers (base-map style swap). Nothing is removed first: the
    /// engine-side state is gone, only the table survives.
    pub fn restore_all(&mut self, surface: &mut dyn MapSurface) {
        tracing::info!("restoring {} plot overlays after style swap", self.len());
        for registration in self.registrations.values() {
            let color = registration.plot.color.color();
            add_layers(surface, registration, color);
        }
    }
}

fn add_layers(surface: &mut dyn MapSurface, registration: &OverlayRegistration, color: Color) {
    let feature = crate::render::features::polygon_feature(&registration.plot.boundary);
    let data = json!({ "type": "FeatureCollection", "features": [feature] });
    if let Err(e) = surface.set_source(&registration.source_id, data) {
        log_render_failure("show source", e);
    }
    if let Err(e) = surface.add_fill_layer(
        &registration.fill_layer_id,
        &registration.source_id,
        color,
        theme::overlay::FILL_OPACITY,
    ) {
        log_render_failure("show fill layer", e);
    }
    let stroke = theme::darken(color, theme::overlay::STROKE_DARKEN);
    if let Err(e) = surface.add_line_layer(
        &registration.stroke_layer_id,
        &registration.source_id,
        stroke,
        theme::overlay::STROKE_WIDTH,
    ) {
        log_render_failure("show stroke layer", e);
    }
}

fn remove_layers(surface: &mut dyn MapSurface, registration: &OverlayRegistration) {
    for layer in [&registration.fill_layer_id, &registration.stroke_layer_id] {
        if let Err(e) = surface.remove_layer(layer) {
            log_render_failure("hide layer", e);
        }
    }
    if let Err(e) = surface.remove_source(&registration.source_id) {
        log_render_failure("hide source", e);
    }
}
