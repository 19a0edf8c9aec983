// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology document model.
//!
//! A topology stores each boundary arc once; geometries reference arcs by
//! index instead of repeating coordinates, so shared borders between
//! neighbouring shapes exist in a single copy. A negative reference `k`
//! means "arc `!k` traversed in reverse"; the one's complement encoding
//! is part of the wire format, not an implementation detail.
//!
//! Quantized topologies store arcs as integer deltas: the first position
//! of an arc is absolute, every following position is an offset from the
//! running sum, and the document-level `transform` maps the integer grid
//! back to real coordinates.

use crate::geojson::{GeometryKind, Position, TransformDefinition};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum TopologyTag {
    #[default]
    Topology,
}

/// A topology document: shared arcs plus named geometry objects that
/// reference them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(rename = "type")]
    tag: TopologyTag,
    /// Named geometry objects, in document order. The first entry is the
    /// default object for decoding.
    pub objects: IndexMap<String, TopologyObject>,
    /// The shared arc table. Delta-encoded when `transform` is present,
    /// absolute otherwise.
    pub arcs: Vec<Vec<Position>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<QuantizationTransform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(
        rename = "copyrightShort",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub copyright_short: Option<String>,
    #[serde(
        rename = "copyrightUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub copyright_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    /// Title of the geographic data. Doubles as the decode cache
    /// fingerprint: a changed title invalidates cached decodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Named lat/lon transform definitions carried by the document.
    #[serde(
        rename = "hc-transform",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub transforms: Option<FxHashMap<String, TransformDefinition>>,
}

impl Topology {
    /// The absolute-coordinate arc table.
    ///
    /// Quantized arcs are delta-decoded with a running sum per arc, then
    /// scaled and translated onto real coordinates. Without a
    /// quantization transform the stored arcs are already absolute and
    /// are borrowed unchanged. Decoders call this once per decode, since
    /// arcs are shared across many geometries.
    pub fn absolute_arcs(&self) -> Cow<'_, [Vec<Position>]> {
        let Some(transform) = &self.transform else {
            return Cow::Borrowed(&self.arcs);
        };
        let [sx, sy] = transform.scale;
        let [tx, ty] = transform.translate;

        let mut decoded = Vec::with_capacity(self.arcs.len());
        for arc in &self.arcs {
            let mut x = 0.0;
            let mut y = 0.0;
            let mut positions = Vec::with_capacity(arc.len());
            for delta in arc {
                x += delta[0];
                y += delta[1];
                positions.push([x * sx + tx, y * sy + ty]);
            }
            decoded.push(positions);
        }
        Cow::Owned(decoded)
    }
}

/// Scale/translate pair mapping a quantized integer grid back to real
/// coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantizationTransform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

/// A named entry in `Topology.objects`: either a collection of geometry
/// entries or a single bare geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopologyObject {
    Collection(GeometryCollection),
    Single(TopoGeometry),
}

impl TopologyObject {
    /// The geometry entries of this object, regardless of shape.
    pub fn geometries(&self) -> &[TopoGeometry] {
        match self {
            TopologyObject::Collection(collection) => &collection.geometries,
            TopologyObject::Single(geometry) => std::slice::from_ref(geometry),
        }
    }

    /// Recommended initial view, if the object carries one.
    pub fn recommended_view(&self) -> Option<&Value> {
        match self {
            TopologyObject::Collection(collection) => collection.recommended_view.as_ref(),
            TopologyObject::Single(_) => None,
        }
    }
}

/// The collection shape of a topology object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryCollection {
    pub geometries: Vec<TopoGeometry>,
    #[serde(
        rename = "hc-recommended-mapview",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recommended_view: Option<Value>,
}

/// One geometry entry of a topology object. Carries either arc references
/// or literal coordinates; literal coordinates win when both are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoGeometry {
    #[serde(rename = "type")]
    pub kind: GeometryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arcs: Option<ArcRefs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<RawCoordinates>,
}

/// Arc reference tree of a geometry entry. Nesting depth depends on the
/// geometry type: one list level for a line string, two for a polygon or
/// multi line string, three for a multi polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArcRefs {
    /// A plain arc index; negative values reference the arc at the one's
    /// complement of the index, traversed in reverse.
    Index(i32),
    List(Vec<ArcRefs>),
}

/// Literal coordinates of a geometry entry, at whatever nesting depth the
/// document supplies. Validated against the declared geometry type when
/// the entry is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCoordinates {
    Point(Position),
    PointList(Vec<Position>),
    RingList(Vec<Vec<Position>>),
    PolygonList(Vec<Vec<Vec<Position>>>),
}
