// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature classification: adapts decoded documents into the per-series
//! point option records a map series consumes.
//!
//! Each series type accepts a fixed set of geometry types; features that
//! do not match, or whose coordinate sequence is empty, contribute no
//! record.

use crate::credits::{format_credits, CreditsOptions, CreditsSink};
use crate::decode::TopologyDecoder;
use crate::error::Result;
use crate::geojson::{FeatureCollection, Geometry, GeometryKind, MapData};
use serde::Serialize;
use serde_json::{Map, Value};

/// Map series type to prepare point options for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// Filled areas: polygons and multi polygons.
    Map,
    /// Bubble overlays; accepts the same area geometries as [`Map`](Self::Map).
    MapBubble,
    /// Lines: line strings and multi line strings.
    MapLine,
    /// Markers: points.
    MapPoint,
}

impl SeriesKind {
    /// Whether this series type accepts the given geometry type.
    pub fn accepts(self, kind: GeometryKind) -> bool {
        match self {
            SeriesKind::Map | SeriesKind::MapBubble => {
                matches!(kind, GeometryKind::Polygon | GeometryKind::MultiPolygon)
            }
            SeriesKind::MapLine => matches!(
                kind,
                GeometryKind::LineString | GeometryKind::MultiLineString
            ),
            SeriesKind::MapPoint => matches!(kind, GeometryKind::Point),
        }
    }
}

/// One point option record, ready for a map series' data option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPointOptions {
    pub geometry: Geometry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    /// The source feature's properties bag, copied over for point lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

fn string_prop(properties: &Map<String, Value>, key: &str) -> Option<String> {
    match properties.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn number_prop(properties: &Map<String, Value>, key: &str) -> Option<f64> {
    properties.get(key).and_then(Value::as_f64)
}

/// Adapt a feature collection into point option records for one series
/// type. Non-matching and empty geometries are skipped silently.
pub fn series_points(collection: &FeatureCollection, kind: SeriesKind) -> Vec<MapPointOptions> {
    let mut records = Vec::new();
    for feature in &collection.features {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        if !kind.accepts(geometry.kind()) || geometry.is_empty() {
            continue;
        }

        let properties = feature.properties.as_ref();
        records.push(MapPointOptions {
            geometry: geometry.clone(),
            name: properties
                .and_then(|p| string_prop(p, "name").or_else(|| string_prop(p, "NAME"))),
            lat: properties.and_then(|p| number_prop(p, "lat")),
            lon: properties.and_then(|p| number_prop(p, "lon")),
            properties: feature.properties.clone(),
        });
    }
    records
}

impl TopologyDecoder {
    /// Point option records for a series type from any map data document.
    /// Topology documents are decoded (through the cache) first.
    pub fn series_points(
        &mut self,
        data: &MapData,
        kind: SeriesKind,
    ) -> Result<Vec<MapPointOptions>> {
        match data {
            MapData::GeoJson(collection) => Ok(series_points(collection, kind)),
            MapData::Topology(topology) => {
                let collection = self.decode(topology, None)?;
                Ok(series_points(&collection, kind))
            }
        }
    }

    /// Like [`series_points`](Self::series_points), additionally
    /// publishing formatted map credits to `sink` when the document
    /// carries a short copyright note.
    pub fn series_points_with_credits(
        &mut self,
        data: &MapData,
        kind: SeriesKind,
        options: &CreditsOptions,
        sink: &mut dyn CreditsSink,
    ) -> Result<Vec<MapPointOptions>> {
        match data {
            MapData::GeoJson(collection) => {
                maybe_publish(collection, options, sink);
                Ok(series_points(collection, kind))
            }
            MapData::Topology(topology) => {
                let collection = self.decode(topology, None)?;
                maybe_publish(&collection, options, sink);
                Ok(series_points(&collection, kind))
            }
        }
    }
}

fn maybe_publish(
    collection: &FeatureCollection,
    options: &CreditsOptions,
    sink: &mut dyn CreditsSink,
) {
    if collection.copyright_short.is_some() {
        sink.publish(format_credits(collection, options));
    }
}
