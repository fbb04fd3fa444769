// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Domain model: backend-assigned identifiers and persisted plot records

mod ids;
mod plot;

pub use ids::{CropId, PlotId};
pub use plot::{PersistedPlot, PlotColor};
