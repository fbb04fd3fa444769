// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Draw session model and interaction

pub mod draft;
pub mod events;
pub mod session;

pub use draft::FarmAreaDraft;
pub use events::{EditorEvent, SideEffect};
pub use session::{DrawMode, EditTarget, EditorSession};
