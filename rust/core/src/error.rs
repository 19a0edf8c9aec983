// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for map document decoding.

use crate::geojson::GeometryKind;

/// Result type alias for decode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or decoding map documents.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document failed to parse as JSON or did not match the expected
    /// structure (wrong coordinate arity, unexpected field types).
    #[error("map document parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document's `type` field names neither a topology nor a feature
    /// collection.
    #[error("unsupported map document type: {0}")]
    UnsupportedDocument(String),

    /// A topology was asked for its default object but contains none.
    #[error("topology contains no objects")]
    NoObjects,

    /// The requested object name does not exist in the topology.
    #[error("topology has no object named '{0}'")]
    UnknownObject(String),

    /// An arc reference points outside the topology's arc table.
    #[error("arc index {index} out of range ({len} arcs in topology)")]
    ArcIndexOutOfRange { index: usize, len: usize },

    /// The nesting of a geometry's arc references or literal coordinates
    /// does not match its declared type.
    #[error("{kind} geometry is malformed: {detail}")]
    MalformedGeometry { kind: GeometryKind, detail: String },
}
