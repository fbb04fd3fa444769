// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Persisted plot records as the dashboard backend delivers them.

use super::{CropId, PlotId};
use crate::geometry::Ring;
use crate::theme;
use chrono::{DateTime, Utc};
use peniko::Color;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A plot's display color, carried over the wire as a `#rrggbb` hex
/// string.
///
/// An unparseable string falls back to the theme's default plot color
/// rather than failing the whole record: a bad color is a cosmetic
/// problem, a dropped plot is a missing field on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotColor(Color);

impl PlotColor {
    pub fn new(color: Color) -> Self {
        Self(color)
    }

    /// Parse a `#rrggbb` string (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Self(Color::from_rgb8(r, g, b)))
    }

    pub fn color(&self) -> Color {
        self.0
    }

    pub fn to_hex(&self) -> String {
        let rgba = self.0.to_rgba8();
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    }
}

impl Default for PlotColor {
    fn default() -> Self {
        Self(theme::overlay::FALLBACK_COLOR)
    }
}

impl fmt::Display for PlotColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for PlotColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PlotColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Ok(Self::from_hex(&hex).unwrap_or_else(|| {
            tracing::warn!("unparseable plot color '{}', using fallback", hex);
            Self::default()
        }))
    }
}

/// A saved field boundary belonging to one crop entity, as loaded from
/// the backend by the hosting page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedPlot {
    pub id: PlotId,
    pub owning_entity_id: CropId,
    #[serde(rename = "polygon")]
    pub boundary: Ring,
    #[serde(default)]
    pub color: PlotColor,
    /// Mesh cell size the plot was saved with, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_size_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
