// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GeoJSON document model.
//!
//! Typed representation of the feature documents consumed and produced by
//! the decoder: feature collections with chart-specific metadata
//! (copyright notes, recommended view, lat/lon transform definitions),
//! individual features, and the geometry variants relevant to map series.

use crate::error::{Error, Result};
use crate::topology::Topology;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single coordinate pair: `[lon, lat]` in geographic documents,
/// `[x, y]` in projected ones. Arity is enforced at the parse boundary.
pub type Position = [f64; 2];

/// Geometry of a feature, tagged by its GeoJSON `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

impl Geometry {
    /// The discriminant of this geometry.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point { .. } => GeometryKind::Point,
            Geometry::MultiPoint { .. } => GeometryKind::MultiPoint,
            Geometry::LineString { .. } => GeometryKind::LineString,
            Geometry::MultiLineString { .. } => GeometryKind::MultiLineString,
            Geometry::Polygon { .. } => GeometryKind::Polygon,
            Geometry::MultiPolygon { .. } => GeometryKind::MultiPolygon,
        }
    }

    /// Whether the coordinate sequence is empty. A `Point` always carries
    /// exactly one position and is never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point { .. } => false,
            Geometry::MultiPoint { coordinates } => coordinates.is_empty(),
            Geometry::LineString { coordinates } => coordinates.is_empty(),
            Geometry::MultiLineString { coordinates } => coordinates.is_empty(),
            Geometry::Polygon { coordinates } => coordinates.is_empty(),
            Geometry::MultiPolygon { coordinates } => coordinates.is_empty(),
        }
    }
}

/// Field-less geometry discriminant, used where a document declares a
/// geometry type separately from its data (topology entries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    /// The GeoJSON name of this geometry type.
    pub fn as_str(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum FeatureTag {
    #[default]
    Feature,
}

/// A geographic feature: a geometry plus its metadata bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    tag: FeatureTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn new(properties: Option<Map<String, Value>>, geometry: Option<Geometry>) -> Self {
        Self {
            tag: FeatureTag::Feature,
            properties,
            geometry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum FeatureCollectionTag {
    #[default]
    FeatureCollection,
}

/// A GeoJSON feature collection with the chart-specific metadata carried
/// by map data documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    tag: FeatureCollectionTag,
    pub features: Vec<Feature>,
    /// Full copyright note of the geographic data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    /// Short copyright note suitable for watermarks.
    #[serde(
        rename = "copyrightShort",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub copyright_short: Option<String>,
    /// Link target for the short copyright note.
    #[serde(
        rename = "copyrightUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub copyright_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Recommended initial view for the map, passed through untouched for
    /// the chart layer to interpret.
    #[serde(
        rename = "hc-recommended-mapview",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recommended_view: Option<Value>,
    /// Named lat/lon transform definitions. The definition under the key
    /// `default` applies wherever no more specific zone matches.
    #[serde(
        rename = "hc-transform",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub transforms: Option<FxHashMap<String, TransformDefinition>>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            tag: FeatureCollectionTag::FeatureCollection,
            features,
            copyright: None,
            copyright_short: None,
            copyright_url: None,
            bbox: None,
            title: None,
            version: None,
            recommended_view: None,
            transforms: None,
        }
    }

    /// The transform definition that applies outside any specific zone.
    pub fn default_transform(&self) -> Option<&TransformDefinition> {
        self.transforms.as_ref().and_then(|map| map.get("default"))
    }
}

/// A lat/lon transform definition as embedded in map data documents.
///
/// Describes the correction stage wrapped around the external projection:
/// optional clockwise rotation (radians) applied after projecting, then
/// scale and pan, then the margin/resolution adjustment used by generated
/// map bundles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformDefinition {
    /// Coordinate reference system the projection capability is keyed by.
    pub crs: String,
    /// Scaling factor applied to the projected coordinates.
    #[serde(default = "default_one")]
    pub scale: f64,
    /// Clockwise rotation in radians, applied after projection but before
    /// scaling and panning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// X offset of projected coordinates after scaling.
    #[serde(default)]
    pub xpan: f64,
    /// Y offset of projected coordinates after scaling.
    #[serde(default)]
    pub ypan: f64,
    #[serde(default)]
    pub xoffset: f64,
    #[serde(default)]
    pub yoffset: f64,
    #[serde(rename = "jsonmarginX", default)]
    pub json_margin_x: f64,
    #[serde(rename = "jsonmarginY", default)]
    pub json_margin_y: f64,
    #[serde(rename = "jsonres", default = "default_one")]
    pub json_res: f64,
    /// Precomputed cosine of `rotation`; takes precedence when present.
    #[serde(rename = "cosAngle", default, skip_serializing_if = "Option::is_none")]
    pub cos_angle: Option<f64>,
    /// Precomputed sine of `rotation`; takes precedence when present.
    #[serde(rename = "sinAngle", default, skip_serializing_if = "Option::is_none")]
    pub sin_angle: Option<f64>,
    /// Map portion this definition applies to, passed through for the
    /// chart layer's hit-zone dispatch.
    #[serde(rename = "hitZone", default, skip_serializing_if = "Option::is_none")]
    pub hit_zone: Option<Value>,
}

fn default_one() -> f64 {
    1.0
}

impl TransformDefinition {
    /// An identity definition for the given reference system.
    pub fn new(crs: impl Into<String>) -> Self {
        Self {
            crs: crs.into(),
            scale: 1.0,
            rotation: None,
            xpan: 0.0,
            ypan: 0.0,
            xoffset: 0.0,
            yoffset: 0.0,
            json_margin_x: 0.0,
            json_margin_y: 0.0,
            json_res: 1.0,
            cos_angle: None,
            sin_angle: None,
            hit_zone: None,
        }
    }

    /// Cosine and sine of the configured rotation, or `None` when the
    /// definition does not rotate. Precomputed `cosAngle`/`sinAngle`
    /// values override the computed ones.
    pub fn rotation_angles(&self) -> Option<(f64, f64)> {
        let rotation = self.rotation.filter(|r| *r != 0.0)?;
        Some((
            self.cos_angle.unwrap_or_else(|| rotation.cos()),
            self.sin_angle.unwrap_or_else(|| rotation.sin()),
        ))
    }
}

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

/// A point in projected chart units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedXY {
    pub x: f64,
    pub y: f64,
}

/// A parsed map data document: either an explicit feature collection or a
/// topology that decodes into one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MapData {
    Topology(Topology),
    GeoJson(FeatureCollection),
}

impl MapData {
    /// Parse a map data document from a JSON value, dispatching on its
    /// `type` field.
    pub fn from_value(value: Value) -> Result<Self> {
        match value.get("type").and_then(Value::as_str) {
            Some("Topology") => Ok(MapData::Topology(serde_json::from_value(value)?)),
            Some("FeatureCollection") => Ok(MapData::GeoJson(serde_json::from_value(value)?)),
            Some(other) => Err(Error::UnsupportedDocument(other.to_string())),
            None => Err(Error::UnsupportedDocument(
                "missing 'type' field".to_string(),
            )),
        }
    }
}

impl std::str::FromStr for MapData {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(value)
    }
}
