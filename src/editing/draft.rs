// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! The in-progress farm area draft.

use crate::error::GeometryError;
use crate::geometry::{Ring, area};
use crate::mesh::{MeshCell, MeshGrid};
use kurbo::Point;

/// A completed-but-unsaved field boundary with its derived measures.
///
/// Created when a draw session closes its polygon; destroyed on cancel,
/// save, or the start of a new draft. The editor session enforces that
/// at most one draft exists at any time.
#[derive(Debug, Clone)]
pub struct FarmAreaDraft {
    pub boundary: Ring,
    pub area_square_meters: f64,
    pub area_hectares: f64,
    /// Cell count a default-sized mesh would produce, shown before any
    /// mesh is generated.
    pub estimated_cell_count: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Generated mesh, once a generation for this boundary resolves.
    pub mesh: Option<MeshGrid>,
}

impl FarmAreaDraft {
    /// Validate raw toolkit vertices and derive the area measures.
    pub fn from_vertices(vertices: Vec<Point>) -> Result<Self, GeometryError> {
        let boundary = Ring::new(vertices)?;
        let area_square_meters = area::area_square_meters(&boundary);
        Ok(Self {
            area_square_meters,
            area_hectares: area::hectares(area_square_meters),
            estimated_cell_count: area::estimated_cell_count(area_square_meters),
            boundary,
            name: None,
            description: None,
            mesh: None,
        })
    }

    /// Currently selected mesh cells, empty when no mesh exists.
    pub fn selected_cells(&self) -> Vec<MeshCell> {
        self.mesh
            .as_ref()
            .map(|m| m.selected_cells())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::METERS_PER_DEGREE;

    #[test]
    fn draft_derives_area_fields() {
        let lat0: f64 = 35.0;
        let dlon = 103.0 / (METERS_PER_DEGREE * lat0.to_radians().cos());
        let dlat = 47.0 / METERS_PER_DEGREE;
        let draft = FarmAreaDraft::from_vertices(vec![
            Point::new(135.0, lat0),
            Point::new(135.0 + dlon, lat0),
            Point::new(135.0 + dlon, lat0 + dlat),
            Point::new(135.0, lat0 + dlat),
            Point::new(135.0, lat0),
        ])
        .unwrap();

        let expected = 103.0 * 47.0;
        assert!((draft.area_square_meters - expected).abs() / expected < 1e-3);
        assert!((draft.area_hectares - 0.4841).abs() < 1e-3);
        // 4841 m^2 / 25 m^2 per default cell, rounded up.
        assert_eq!(draft.estimated_cell_count, 194);
        assert!(draft.mesh.is_none());
    }

    #[test]
    fn degenerate_vertices_create_no_draft() {
        let result = FarmAreaDraft::from_vertices(vec![
            Point::new(135.0, 35.0),
            Point::new(135.001, 35.0),
        ]);
        assert!(matches!(result, Err(GeometryError::Degenerate)));
    }
}
