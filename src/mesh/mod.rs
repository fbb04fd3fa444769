// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Mesh cells: the uniform grid a field boundary is subdivided into.
//!
//! Cells are value objects recreated wholesale whenever the boundary or
//! cell size changes; only the selection flags are carried across a
//! regeneration, matched by [`CellId`]. Ids are a deterministic composite
//! of (cell size, row, col), so generating the same boundary at the same
//! cell size always reproduces the same id set.

mod clip;
mod generate;

pub use generate::{MeshJob, MeshOutcome, generate};

use kurbo::Point;
use std::collections::BTreeSet;
use std::fmt;

/// Stable identifier for one grid cell.
///
/// The cell size participates (in centimeters, so the composite stays
/// integral) to keep ids from one mesh resolution from colliding with
/// another's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId {
    size_cm: u32,
    row: u32,
    col: u32,
}

impl CellId {
    /// Compose an id from the generating cell size and grid indices.
    pub fn new(cell_size_m: f64, row: u32, col: u32) -> Self {
        Self {
            size_cm: (cell_size_m * 100.0).round() as u32,
            row,
            col,
        }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{},{}", self.size_cm, self.row, self.col)
    }
}

/// One grid cell clipped to the field boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshCell {
    pub id: CellId,
    pub row: u32,
    pub col: u32,
    /// Clipped cell boundary in (lon, lat), unclosed. Equal to the full
    /// cell square when the cell lies entirely inside the field.
    pub boundary: Vec<Point>,
    pub is_selected: bool,
    pub is_occupied: bool,
}

/// A generated mesh: the kept cells for one boundary at one cell size.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGrid {
    cell_size_m: f64,
    cells: Vec<MeshCell>,
}

impl MeshGrid {
    pub(crate) fn new(cell_size_m: f64, cells: Vec<MeshCell>) -> Self {
        Self { cell_size_m, cells }
    }

    /// An empty mesh (zero-area boundary, or cleared state).
    pub fn empty(cell_size_m: f64) -> Self {
        Self::new(cell_size_m, Vec::new())
    }

    /// The cell size this mesh was generated with, in meters.
    pub fn cell_size_m(&self) -> f64 {
        self.cell_size_m
    }

    /// Kept cells, in row-major order.
    pub fn cells(&self) -> &[MeshCell] {
        &self.cells
    }

    /// Number of kept cells after clipping.
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// Cells whose selection flag is set.
    pub fn selected_cells(&self) -> Vec<MeshCell> {
        self.cells.iter().filter(|c| c.is_selected).cloned().collect()
    }

    /// Toggle one cell's selection flag. Returns the new state, or
    /// `None` if the id is not in this mesh.
    pub fn toggle_selected(&mut self, id: CellId) -> Option<bool> {
        let cell = self.cells.iter_mut().find(|c| c.id == id)?;
        cell.is_selected = !cell.is_selected;
        Some(cell.is_selected)
    }

    /// Clear every selection flag.
    pub fn clear_selection(&mut self) {
        for cell in &mut self.cells {
            cell.is_selected = false;
        }
    }

    /// Carry selection flags over from a previous mesh of the same cell
    /// size. Ids that no longer exist are dropped silently; a mesh of a
    /// different cell size contributes nothing.
    pub fn adopt_selection_from(&mut self, previous: &MeshGrid) {
        if previous.cell_size_m != self.cell_size_m {
            return;
        }
        let selected: BTreeSet<CellId> = previous
            .cells
            .iter()
            .filter(|c| c.is_selected)
            .map(|c| c.id)
            .collect();
        if selected.is_empty() {
            return;
        }
        for cell in &mut self.cells {
            if selected.contains(&cell.id) {
                cell.is_selected = true;
            }
        }
    }
}
