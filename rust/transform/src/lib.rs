// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # MapLite Transform
//!
//! Bidirectional conversion between geographic coordinates and projected
//! chart units. The projection mathematics itself is not implemented
//! here: a [`Projector`] capability is injected, and the engine wraps it
//! with the affine and rotation correction stage described by a
//! document's transform definition.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use maplite_transform::{Projector, TransformEngine};
//! use maplite_core::{LonLat, TransformDefinition};
//!
//! let engine = TransformEngine::with_projector(Arc::new(MyProjector));
//! let def = TransformDefinition::new("EPSG:32633");
//!
//! let xy = engine.from_lat_lon(LonLat { lon: 10.7, lat: 59.9 }, &def)?;
//! let back = engine.to_lat_lon(xy, &def)?;
//! ```

pub mod engine;
pub mod error;
pub mod projector;

pub use engine::TransformEngine;
pub use error::{Error, Result};
pub use projector::Projector;

// Re-exported for convenience; these live with the document model.
pub use maplite_core::{LonLat, ProjectedXY, TransformDefinition};
