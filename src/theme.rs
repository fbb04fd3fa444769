// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Theme colors and paint constants for plot overlays, the draft layer,
//! and the mesh layer.
//!
//! All colors use hexadecimal format: Color::from_rgb8(0xRR, 0xGG, 0xBB)

use peniko::Color;

// ============================================================================
// PLOT OVERLAYS (persisted plots, one fill+stroke pair per crop)
// ============================================================================
/// Fill translucency applied to every plot's assigned color
const OVERLAY_FILL_OPACITY: f64 = 0.35;

/// Per-channel reduction for the stroke variant of a plot color
const OVERLAY_STROKE_DARKEN: u8 = 0x28;

/// Stroke width of plot outlines (pixels)
const OVERLAY_STROKE_WIDTH: f64 = 2.0;

/// Used when a backend record carries no parseable color
const OVERLAY_FALLBACK_COLOR: Color = Color::from_rgb8(0x4c, 0xaf, 0x50);

// ============================================================================
// DRAFT LAYER (boundary being drawn or reshaped)
// ============================================================================
const DRAFT_FILL: Color = Color::from_rgba8(0xff, 0xaa, 0x33, 0x20);
const DRAFT_STROKE: Color = Color::from_rgb8(0xff, 0xaa, 0x33);
const DRAFT_STROKE_WIDTH: f64 = 2.5;
const DRAFT_FILL_OPACITY: f64 = 0.25;

// ============================================================================
// MESH LAYER (grid cells clipped to the active boundary)
// ============================================================================
const MESH_CELL_FILL: Color = Color::from_rgba8(0xff, 0xff, 0xff, 0x18);
const MESH_CELL_SELECTED_FILL: Color = Color::from_rgb8(0x14, 0x64, 0x14);
const MESH_CELL_OCCUPIED_FILL: Color = Color::from_rgb8(0x8e, 0x56, 0x20);
const MESH_CELL_STROKE: Color = Color::from_rgb8(0xc0, 0xc0, 0xc0);
const MESH_STROKE_WIDTH: f64 = 1.0;
const MESH_FILL_OPACITY: f64 = 0.4;

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Colors and paint values for persisted plot overlays
pub mod overlay {
    use super::Color;
    pub const FILL_OPACITY: f64 = super::OVERLAY_FILL_OPACITY;
    pub const STROKE_DARKEN: u8 = super::OVERLAY_STROKE_DARKEN;
    pub const STROKE_WIDTH: f64 = super::OVERLAY_STROKE_WIDTH;
    pub const FALLBACK_COLOR: Color = super::OVERLAY_FALLBACK_COLOR;
}

/// Colors and paint values for the draft boundary layer
pub mod draft {
    use super::Color;
    pub const FILL: Color = super::DRAFT_FILL;
    pub const STROKE: Color = super::DRAFT_STROKE;
    pub const STROKE_WIDTH: f64 = super::DRAFT_STROKE_WIDTH;
    pub const FILL_OPACITY: f64 = super::DRAFT_FILL_OPACITY;
}

/// Colors and paint values for the mesh cell layer
pub mod mesh {
    use super::Color;
    pub const CELL_FILL: Color = super::MESH_CELL_FILL;
    pub const CELL_SELECTED_FILL: Color = super::MESH_CELL_SELECTED_FILL;
    pub const CELL_OCCUPIED_FILL: Color = super::MESH_CELL_OCCUPIED_FILL;
    pub const CELL_STROKE: Color = super::MESH_CELL_STROKE;
    pub const STROKE_WIDTH: f64 = super::MESH_STROKE_WIDTH;
    pub const FILL_OPACITY: f64 = super::MESH_FILL_OPACITY;
}

/// Darken a color by reducing each RGB channel by `amount`, flooring at
/// zero. Alpha is preserved. Used for plot outline strokes so they read
/// against the translucent fill of the same color.
pub fn darken(color: Color, amount: u8) -> Color {
    let rgba = color.to_rgba8();
    Color::from_rgba8(
        rgba.r.saturating_sub(amount),
        rgba.g.saturating_sub(amount),
        rgba.b.saturating_sub(amount),
        rgba.a,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn darken_reduces_each_channel() {
        let darkened = darken(Color::from_rgb8(0x80, 0x90, 0xa0), 0x10);
        let rgba = darkened.to_rgba8();
        assert_eq!((rgba.r, rgba.g, rgba.b), (0x70, 0x80, 0x90));
    }

    #[test]
    fn darken_floors_at_zero() {
        let darkened = darken(Color::from_rgb8(0x05, 0x00, 0xff), 0x10);
        let rgba = darkened.to_rgba8();
        assert_eq!((rgba.r, rgba.g, rgba.b), (0x00, 0x00, 0xef));
    }

    #[test]
    fn darken_preserves_alpha() {
        let darkened = darken(Color::from_rgba8(0x80, 0x80, 0x80, 0x42), 0x10);
        assert_eq!(darkened.to_rgba8().a, 0x42);
    }
}
