// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Identifiers for persisted plots and the crop entities that own them.
//!
//! Both ids are assigned by the dashboard backend, never generated here:
//! a `PlotId` comes back from a successful save, a `CropId` arrives on
//! every inbound plot record. They are used as keys in the overlay
//! manager's registration table and for matching edit targets, so a
//! typo-proof newtype for each keeps the two id spaces from mixing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend id of a saved plot record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlotId(pub i64);

impl fmt::Display for PlotId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backend id of the crop/vegetable entity a plot belongs to.
///
/// Overlay registrations are keyed by this, one per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropId(pub i64);

impl fmt::Display for CropId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
