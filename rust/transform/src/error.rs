// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for coordinate transforms.

/// Result type alias for transform operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a coordinate conversion.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No projection capability is registered. Lat/lon conversion needs
    /// an external projector; this is a recoverable condition, not a
    /// crash. Callers test for it and fall back to data without
    /// geographic positioning.
    #[error("no projector registered: lat/lon conversion requires a projection capability")]
    MissingProjector,

    /// The registered projector rejected the conversion.
    #[error("projection failed for CRS '{crs}': {message}")]
    Projection { crs: String, message: String },
}
