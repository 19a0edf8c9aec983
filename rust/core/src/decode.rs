// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology decoding: reconstructs explicit feature collections from the
//! shared-arc encoding.
//!
//! Reconstruction is a single recursive resolver over the arc reference
//! tree: a list of plain indices is a polyline stitched from consecutive
//! arcs, anything deeper recurses. Consecutive arcs share their join
//! vertex, so every arc after the first contributes its coordinates minus
//! the first point in traversal order.
//!
//! Decoded collections are memoized per object in a [`TopologyDecoder`],
//! stamped with the document title. A title change invalidates the entry;
//! an unchanged title returns the same `Arc`, so callers can rely on
//! reference identity for change detection.

use crate::error::{Error, Result};
use crate::geojson::{Feature, FeatureCollection, Geometry, GeometryKind, Position};
use crate::topology::{ArcRefs, RawCoordinates, TopoGeometry, Topology};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Reconstructed coordinate tree, one nesting level shallower than the
/// arc reference tree that produced it.
enum CoordTree {
    Line(Vec<Position>),
    Nested(Vec<CoordTree>),
}

fn malformed(kind: GeometryKind, detail: &str) -> Error {
    Error::MalformedGeometry {
        kind,
        detail: detail.to_string(),
    }
}

/// Resolve an arc reference tree against the absolute arc table.
fn resolve_arcs(kind: GeometryKind, refs: &ArcRefs, table: &[Vec<Position>]) -> Result<CoordTree> {
    let ArcRefs::List(items) = refs else {
        return Err(malformed(kind, "expected a list of arc references"));
    };

    let indices = items
        .iter()
        .filter(|item| matches!(item, ArcRefs::Index(_)))
        .count();

    if indices == items.len() && !items.is_empty() {
        let mut line = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let ArcRefs::Index(k) = item else {
                unreachable!()
            };
            let (index, reversed) = if *k < 0 {
                ((!*k) as usize, true)
            } else {
                (*k as usize, false)
            };
            let arc = table.get(index).ok_or(Error::ArcIndexOutOfRange {
                index,
                len: table.len(),
            })?;

            if reversed {
                // The join vertex is the source arc's trailing point; keep
                // it only for the first arc of the polyline.
                let take = if i == 0 {
                    arc.len()
                } else {
                    arc.len().saturating_sub(1)
                };
                line.extend(arc[..take].iter().rev().copied());
            } else if i == 0 {
                line.extend_from_slice(arc);
            } else {
                line.extend_from_slice(arc.get(1..).unwrap_or(&[]));
            }
        }
        return Ok(CoordTree::Line(line));
    }

    if indices > 0 {
        return Err(malformed(
            kind,
            "arc references mix plain indices with nested lists",
        ));
    }

    items
        .iter()
        .map(|child| resolve_arcs(kind, child, table))
        .collect::<Result<Vec<_>>>()
        .map(CoordTree::Nested)
}

fn expect_line(kind: GeometryKind, tree: CoordTree) -> Result<Vec<Position>> {
    match tree {
        CoordTree::Line(line) => Ok(line),
        CoordTree::Nested(children) if children.is_empty() => Ok(Vec::new()),
        CoordTree::Nested(_) => Err(malformed(kind, "arc references are nested too deeply")),
    }
}

fn expect_lines(kind: GeometryKind, tree: CoordTree) -> Result<Vec<Vec<Position>>> {
    match tree {
        CoordTree::Nested(children) => children
            .into_iter()
            .map(|child| expect_line(kind, child))
            .collect(),
        CoordTree::Line(_) => Err(malformed(kind, "arc references are not nested deeply enough")),
    }
}

/// Convert a resolved coordinate tree into a typed geometry, validating
/// that the nesting depth matches the declared type.
fn tree_into_geometry(kind: GeometryKind, tree: CoordTree) -> Result<Geometry> {
    match kind {
        GeometryKind::Point | GeometryKind::MultiPoint => {
            Err(malformed(kind, "point geometries cannot reference arcs"))
        }
        GeometryKind::LineString => Ok(Geometry::LineString {
            coordinates: expect_line(kind, tree)?,
        }),
        GeometryKind::MultiLineString => Ok(Geometry::MultiLineString {
            coordinates: expect_lines(kind, tree)?,
        }),
        GeometryKind::Polygon => Ok(Geometry::Polygon {
            coordinates: expect_lines(kind, tree)?,
        }),
        GeometryKind::MultiPolygon => match tree {
            CoordTree::Nested(children) => Ok(Geometry::MultiPolygon {
                coordinates: children
                    .into_iter()
                    .map(|child| expect_lines(kind, child))
                    .collect::<Result<Vec<_>>>()?,
            }),
            CoordTree::Line(_) => Err(malformed(kind, "arc references are not nested deeply enough")),
        },
    }
}

/// Convert literal coordinates into a typed geometry. Returns `None` for
/// a point entry with empty coordinates, which produces no feature.
fn raw_into_geometry(kind: GeometryKind, raw: &RawCoordinates) -> Result<Option<Geometry>> {
    use RawCoordinates as Raw;

    let geometry = match (kind, raw) {
        (GeometryKind::Point, Raw::Point(position)) => Geometry::Point {
            coordinates: *position,
        },
        (GeometryKind::Point, Raw::PointList(list)) if list.is_empty() => return Ok(None),
        (GeometryKind::MultiPoint, Raw::PointList(list)) => Geometry::MultiPoint {
            coordinates: list.clone(),
        },
        (GeometryKind::LineString, Raw::PointList(list)) => Geometry::LineString {
            coordinates: list.clone(),
        },
        (GeometryKind::MultiLineString, Raw::RingList(lines)) => Geometry::MultiLineString {
            coordinates: lines.clone(),
        },
        (GeometryKind::MultiLineString, Raw::PointList(list)) if list.is_empty() => {
            Geometry::MultiLineString {
                coordinates: Vec::new(),
            }
        }
        (GeometryKind::Polygon, Raw::RingList(rings)) => Geometry::Polygon {
            coordinates: rings.clone(),
        },
        (GeometryKind::Polygon, Raw::PointList(list)) if list.is_empty() => Geometry::Polygon {
            coordinates: Vec::new(),
        },
        (GeometryKind::MultiPolygon, Raw::PolygonList(polygons)) => Geometry::MultiPolygon {
            coordinates: polygons.clone(),
        },
        (GeometryKind::MultiPolygon, Raw::PointList(list)) if list.is_empty() => {
            Geometry::MultiPolygon {
                coordinates: Vec::new(),
            }
        }
        (kind, _) => {
            return Err(malformed(
                kind,
                "literal coordinates do not match the declared geometry type",
            ))
        }
    };
    Ok(Some(geometry))
}

/// Decode one geometry entry into a feature.
fn decode_entry(entry: &TopoGeometry, table: &[Vec<Position>]) -> Result<Feature> {
    let geometry = match (&entry.coordinates, &entry.arcs) {
        // Literal coordinates win over arc references.
        (Some(raw), _) => raw_into_geometry(entry.kind, raw)?,
        (None, Some(refs)) => Some(tree_into_geometry(
            entry.kind,
            resolve_arcs(entry.kind, refs, table)?,
        )?),
        (None, None) => {
            return Err(malformed(
                entry.kind,
                "entry has neither coordinates nor arc references",
            ))
        }
    };
    Ok(Feature::new(entry.properties.clone(), geometry))
}

/// Cached decode of one topology object.
struct CachedObject {
    title: Option<String>,
    features: Arc<FeatureCollection>,
}

/// Decodes topology objects into feature collections, memoizing the
/// result per object.
///
/// A decoder instance is scoped to a single topology document. Cached
/// entries are stamped with the document title; the title acts as a
/// content fingerprint, so decoding after a title change recomputes and
/// replaces the entry, while an unchanged title returns the identical
/// `Arc<FeatureCollection>`.
#[derive(Default)]
pub struct TopologyDecoder {
    cache: FxHashMap<String, CachedObject>,
}

impl TopologyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the named object (or the document's first object when no
    /// name is given) into a feature collection.
    ///
    /// Geometry entries whose arc references or literal coordinates do
    /// not match their declared type are skipped with a warning; the rest
    /// of the object still decodes. An object with zero geometries yields
    /// an empty feature list.
    pub fn decode(
        &mut self,
        topology: &Topology,
        object_name: Option<&str>,
    ) -> Result<Arc<FeatureCollection>> {
        let (name, object) = match object_name {
            Some(name) => {
                let object = topology
                    .objects
                    .get(name)
                    .ok_or_else(|| Error::UnknownObject(name.to_string()))?;
                (name, object)
            }
            None => {
                let (name, object) = topology.objects.first().ok_or(Error::NoObjects)?;
                (name.as_str(), object)
            }
        };

        if let Some(cached) = self.cache.get(name) {
            if cached.title == topology.title {
                tracing::debug!(object = name, "decode cache hit");
                return Ok(Arc::clone(&cached.features));
            }
        }

        // Build the absolute arc table once; arcs are shared across
        // geometries.
        let table = topology.absolute_arcs();

        let entries = object.geometries();
        let mut features = Vec::with_capacity(entries.len());
        let mut skipped = 0usize;
        for entry in entries {
            match decode_entry(entry, &table) {
                Ok(feature) => features.push(feature),
                Err(error) => {
                    skipped += 1;
                    tracing::warn!(
                        object = name,
                        kind = %entry.kind,
                        %error,
                        "skipping undecodable geometry entry"
                    );
                }
            }
        }
        tracing::debug!(
            object = name,
            features = features.len(),
            skipped,
            "decoded topology object"
        );

        let mut collection = FeatureCollection::new(features);
        collection.copyright = topology.copyright.clone();
        collection.copyright_short = topology.copyright_short.clone();
        collection.copyright_url = topology.copyright_url.clone();
        collection.bbox = topology.bbox.clone();
        collection.title = topology.title.clone();
        collection.version = topology.version.clone();
        collection.recommended_view = object.recommended_view().cloned();
        collection.transforms = topology.transforms.clone();

        let collection = Arc::new(collection);
        self.cache.insert(
            name.to_string(),
            CachedObject {
                title: topology.title.clone(),
                features: Arc::clone(&collection),
            },
        );
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode_first(topology: &Topology) -> Arc<FeatureCollection> {
        TopologyDecoder::new().decode(topology, None).unwrap()
    }

    fn topology(value: serde_json::Value) -> Topology {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn simple_polygon_decode() {
        let topology = topology(json!({
            "type": "Topology",
            "transform": { "scale": [1, 1], "translate": [0, 0] },
            "objects": {
                "default": {
                    "geometries": [
                        { "type": "Polygon", "arcs": [[0]] }
                    ]
                }
            },
            "arcs": [[[0, 0], [1, 0], [0, 1]]]
        }));
        let collection = decode_first(&topology);
        assert_eq!(collection.features.len(), 1);
        let Some(Geometry::Polygon { coordinates }) = &collection.features[0].geometry else {
            panic!("expected a polygon");
        };
        assert_eq!(coordinates, &vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]]);
    }

    #[test]
    fn shared_arc_reconstructs_reversed_without_seam_duplicates() {
        // Two squares share the arc from (0,0) to (0,1): the east ring
        // references it forward, the west ring reversed.
        let topology = topology(json!({
            "type": "Topology",
            "objects": {
                "squares": {
                    "geometries": [
                        { "type": "Polygon", "arcs": [[0, 1]] },
                        { "type": "Polygon", "arcs": [[-1, 2]] }
                    ]
                }
            },
            "arcs": [
                [[0, 0], [0, 1]],
                [[0, 1], [1, 1], [1, 0], [0, 0]],
                [[0, 0], [-1, 0], [-1, 1], [0, 1]]
            ]
        }));
        let collection = decode_first(&topology);

        let ring = |i: usize| -> &Vec<Position> {
            let Some(Geometry::Polygon { coordinates }) = &collection.features[i].geometry else {
                panic!("expected a polygon");
            };
            &coordinates[0]
        };

        let east = ring(0);
        let west = ring(1);
        assert_eq!(
            east,
            &vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]
        );
        assert_eq!(
            west,
            &vec![[0.0, 1.0], [0.0, 0.0], [-1.0, 0.0], [-1.0, 1.0], [0.0, 1.0]]
        );

        // The shared boundary appears reversed between the two rings.
        let east_shared: Vec<Position> = east[..2].to_vec();
        let mut west_shared: Vec<Position> = west[..2].to_vec();
        west_shared.reverse();
        assert_eq!(east_shared, west_shared);

        // No duplicated seam points inside either ring.
        for ring in [east, west] {
            for pair in ring.windows(2) {
                assert_ne!(pair[0], pair[1], "adjacent duplicate at an arc join");
            }
        }
    }

    #[test]
    fn reversed_arc_after_the_first_drops_the_join_vertex() {
        let topology = topology(json!({
            "type": "Topology",
            "objects": {
                "line": {
                    "geometries": [
                        { "type": "LineString", "arcs": [0, -2] }
                    ]
                }
            },
            "arcs": [
                [[0, 0], [1, 0]],
                [[2, 0], [1, 0]]
            ]
        }));
        let collection = decode_first(&topology);
        let Some(Geometry::LineString { coordinates }) = &collection.features[0].geometry else {
            panic!("expected a line string");
        };
        assert_eq!(coordinates, &vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]);
    }

    #[test]
    fn cache_returns_identical_reference_until_title_changes() {
        let mut topology = topology(json!({
            "type": "Topology",
            "title": "Regions 1.0",
            "objects": { "default": { "geometries": [] } },
            "arcs": []
        }));
        let mut decoder = TopologyDecoder::new();

        let first = decoder.decode(&topology, None).unwrap();
        let second = decoder.decode(&topology, None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        topology.title = Some("Regions 2.0".to_string());
        let third = decoder.decode(&topology, None).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.title.as_deref(), Some("Regions 2.0"));
    }

    #[test]
    fn object_selection() {
        let topology = topology(json!({
            "type": "Topology",
            "objects": {
                "first": { "geometries": [ { "type": "LineString", "arcs": [0] } ] },
                "second": { "geometries": [] }
            },
            "arcs": [[[0, 0], [1, 1]]]
        }));
        let mut decoder = TopologyDecoder::new();

        // Default is the first object in document order.
        let default = decoder.decode(&topology, None).unwrap();
        assert_eq!(default.features.len(), 1);

        let named = decoder.decode(&topology, Some("second")).unwrap();
        assert!(named.features.is_empty());

        let error = decoder.decode(&topology, Some("third")).unwrap_err();
        assert!(matches!(error, Error::UnknownObject(name) if name == "third"));
    }

    #[test]
    fn empty_topology_has_no_default_object() {
        let topology = topology(json!({
            "type": "Topology",
            "objects": {},
            "arcs": []
        }));
        let error = TopologyDecoder::new().decode(&topology, None).unwrap_err();
        assert!(matches!(error, Error::NoObjects));
    }

    #[test]
    fn literal_coordinates_pass_through_unchanged() {
        let topology = topology(json!({
            "type": "Topology",
            "objects": {
                "cities": {
                    "geometries": [
                        {
                            "type": "Point",
                            "coordinates": [10.75, 59.91],
                            "properties": { "name": "Oslo" }
                        }
                    ]
                }
            },
            "arcs": []
        }));
        let collection = decode_first(&topology);
        assert_eq!(collection.features.len(), 1);
        assert_eq!(
            collection.features[0].geometry,
            Some(Geometry::Point {
                coordinates: [10.75, 59.91]
            })
        );
        let properties = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(properties["name"], "Oslo");
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let topology = topology(json!({
            "type": "Topology",
            "objects": {
                "mixed": {
                    "geometries": [
                        // Polygon arcs nested one level short.
                        { "type": "Polygon", "arcs": [0] },
                        // Arc index outside the table.
                        { "type": "LineString", "arcs": [7] },
                        // No data at all.
                        { "type": "LineString" },
                        // This one is fine.
                        { "type": "LineString", "arcs": [0] }
                    ]
                }
            },
            "arcs": [[[0, 0], [2, 2]]]
        }));
        let collection = decode_first(&topology);
        assert_eq!(collection.features.len(), 1);
        assert_eq!(
            collection.features[0].geometry,
            Some(Geometry::LineString {
                coordinates: vec![[0.0, 0.0], [2.0, 2.0]]
            })
        );
    }

    #[test]
    fn empty_point_entry_yields_featureless_geometry() {
        let topology = topology(json!({
            "type": "Topology",
            "objects": {
                "places": {
                    "geometries": [
                        { "type": "Point", "coordinates": [] }
                    ]
                }
            },
            "arcs": []
        }));
        let collection = decode_first(&topology);
        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.features[0].geometry, None);
    }

    #[test]
    fn metadata_is_carried_onto_the_collection() {
        let topology = topology(json!({
            "type": "Topology",
            "title": "Nordics",
            "copyright": "Full note",
            "copyrightShort": "Note",
            "copyrightUrl": "https://example.org",
            "bbox": [4.0, 54.0, 32.0, 71.0],
            "hc-transform": { "default": { "crs": "EPSG:3857" } },
            "objects": {
                "default": {
                    "geometries": [],
                    "hc-recommended-mapview": { "zoom": 3 }
                }
            },
            "arcs": []
        }));
        let collection = decode_first(&topology);
        assert_eq!(collection.title.as_deref(), Some("Nordics"));
        assert_eq!(collection.copyright_short.as_deref(), Some("Note"));
        assert_eq!(collection.bbox, Some(vec![4.0, 54.0, 32.0, 71.0]));
        assert_eq!(collection.recommended_view, Some(json!({ "zoom": 3 })));
        assert!(collection.default_transform().is_some());
    }
}
