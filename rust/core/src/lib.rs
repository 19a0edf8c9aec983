// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # MapLite Core
//!
//! Map document decoding for chart rendering. Parses GeoJSON feature
//! collections and shared-arc topology documents, reconstructs explicit
//! geometries from the arc encoding, and adapts the result into the point
//! option records a map series consumes.
//!
//! ## Overview
//!
//! - **Document model**: typed [serde](https://docs.rs/serde) structs for
//!   feature collections, topologies and the chart metadata they carry
//!   (copyright notes, recommended view, lat/lon transform definitions)
//! - **Topology decode**: delta decoding of quantized arcs, recursive
//!   reconstruction of arc-referencing geometries, shared-join
//!   deduplication
//! - **Decode cache**: memoized feature collections per object,
//!   invalidated when the document title changes
//! - **Classification**: per-series filtering into point option records
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use maplite_core::{MapData, SeriesKind, TopologyDecoder};
//!
//! let data: MapData = raw_json.parse()?;
//! let mut decoder = TopologyDecoder::new();
//!
//! // Point options for an area series; topologies decode transparently.
//! let areas = decoder.series_points(&data, SeriesKind::Map)?;
//!
//! // Or work with the decoded collection directly.
//! if let MapData::Topology(topology) = &data {
//!     let collection = decoder.decode(topology, None)?;
//!     println!("{} features", collection.features.len());
//! }
//! ```

pub mod classify;
pub mod credits;
pub mod decode;
pub mod error;
pub mod geojson;
pub mod topology;

pub use classify::{series_points, MapPointOptions, SeriesKind};
pub use credits::{format_credits, CreditsOptions, CreditsSink, MapCredits};
pub use decode::TopologyDecoder;
pub use error::{Error, Result};
pub use geojson::{
    Feature, FeatureCollection, Geometry, GeometryKind, LonLat, MapData, Position, ProjectedXY,
    TransformDefinition,
};
pub use topology::{
    ArcRefs, GeometryCollection, QuantizationTransform, RawCoordinates, TopoGeometry, Topology,
    TopologyObject,
};
