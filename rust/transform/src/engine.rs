// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The bidirectional coordinate transform engine.
//!
//! Forward conversion runs lon/lat through the external projector, then
//! the definition's correction stage: optional rotation, scale, pan, and
//! the margin/resolution adjustment used by generated map bundles. The
//! inverse undoes each step in reverse order and must round-trip exactly
//! for any fixed definition.

use crate::error::{Error, Result};
use crate::projector::Projector;
use maplite_core::{LonLat, ProjectedXY, TransformDefinition};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Converts between geographic coordinates and projected chart units
/// through an injected [`Projector`].
///
/// Conversions are pure per-point calls; the engine holds no per-point
/// state and can be shared behind `&self` across calls. Definitions are
/// caller-supplied and typically cached by the caller across many points.
#[derive(Default)]
pub struct TransformEngine {
    projector: Option<Arc<dyn Projector>>,
    missing_reported: AtomicBool,
}

impl TransformEngine {
    /// An engine with no projection capability. Conversions fail with
    /// [`Error::MissingProjector`] until one is registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine using the given projection capability.
    pub fn with_projector(projector: Arc<dyn Projector>) -> Self {
        Self {
            projector: Some(projector),
            missing_reported: AtomicBool::new(false),
        }
    }

    /// Register or replace the projection capability.
    pub fn set_projector(&mut self, projector: Arc<dyn Projector>) {
        self.projector = Some(projector);
    }

    fn projector(&self) -> Result<&dyn Projector> {
        match &self.projector {
            Some(projector) => Ok(projector.as_ref()),
            None => {
                // Report once per engine, not once per point.
                if !self.missing_reported.swap(true, Ordering::Relaxed) {
                    tracing::error!(
                        "lat/lon conversion requested without a registered projector"
                    );
                }
                Err(Error::MissingProjector)
            }
        }
    }

    /// Convert a lon/lat pair into projected chart units using the given
    /// transform definition.
    pub fn from_lat_lon(
        &self,
        lon_lat: LonLat,
        definition: &TransformDefinition,
    ) -> Result<ProjectedXY> {
        let projector = self.projector()?;
        let projected = projector.project(&definition.crs, lon_lat)?;

        let (rx, ry) = match definition.rotation_angles() {
            Some((cos, sin)) => (
                projected.x * cos + projected.y * sin,
                -projected.x * sin + projected.y * cos,
            ),
            None => (projected.x, projected.y),
        };

        Ok(ProjectedXY {
            x: ((rx - definition.xoffset) * definition.scale + definition.xpan)
                * definition.json_res
                + definition.json_margin_x,
            y: -(((definition.yoffset - ry) * definition.scale + definition.ypan)
                * definition.json_res
                - definition.json_margin_y),
        })
    }

    /// Convert a point in projected chart units back to lon/lat.
    ///
    /// Returns `Ok(None)` when the point has no vertical position (a
    /// non-finite `y`, as produced by chart points without a value).
    pub fn to_lat_lon(
        &self,
        point: ProjectedXY,
        definition: &TransformDefinition,
    ) -> Result<Option<LonLat>> {
        let projector = self.projector()?;
        if !point.y.is_finite() {
            return Ok(None);
        }

        let nx = ((point.x - definition.json_margin_x) / definition.json_res - definition.xpan)
            / definition.scale
            + definition.xoffset;
        let ny = ((point.y - definition.json_margin_y) / definition.json_res + definition.ypan)
            / definition.scale
            + definition.yoffset;

        // Undo the rotation with its algebraic inverse (transposed sign on
        // the sine), not by rotating again with a negated angle.
        let (ix, iy) = match definition.rotation_angles() {
            Some((cos, sin)) => (nx * cos - ny * sin, nx * sin + ny * cos),
            None => (nx, ny),
        };

        let lon_lat = projector.unproject(&definition.crs, ProjectedXY { x: ix, y: iy })?;
        Ok(Some(lon_lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Linear test plane: one degree maps to a fixed number of plane
    /// units per axis. Stands in for a real projection library.
    struct PlanarProjector;

    impl Projector for PlanarProjector {
        fn project(&self, _crs: &str, lon_lat: LonLat) -> Result<ProjectedXY> {
            Ok(ProjectedXY {
                x: lon_lat.lon * 111.32,
                y: lon_lat.lat * 110.57,
            })
        }

        fn unproject(&self, _crs: &str, point: ProjectedXY) -> Result<LonLat> {
            Ok(LonLat {
                lon: point.x / 111.32,
                lat: point.y / 110.57,
            })
        }
    }

    fn engine() -> TransformEngine {
        TransformEngine::with_projector(Arc::new(PlanarProjector))
    }

    #[test]
    fn forward_applies_offset_scale_pan_resolution_and_margin() {
        struct IdentityProjector;
        impl Projector for IdentityProjector {
            fn project(&self, _crs: &str, p: LonLat) -> Result<ProjectedXY> {
                Ok(ProjectedXY { x: p.lon, y: p.lat })
            }
            fn unproject(&self, _crs: &str, p: ProjectedXY) -> Result<LonLat> {
                Ok(LonLat { lon: p.x, lat: p.y })
            }
        }

        let engine = TransformEngine::with_projector(Arc::new(IdentityProjector));
        let mut def = TransformDefinition::new("EPSG:4326");
        def.scale = 2.0;
        def.xoffset = 1.0;
        def.yoffset = 3.0;
        def.xpan = 5.0;
        def.ypan = 7.0;
        def.json_res = 2.0;
        def.json_margin_x = 11.0;
        def.json_margin_y = 13.0;

        let out = engine
            .from_lat_lon(LonLat { lon: 4.0, lat: 6.0 }, &def)
            .unwrap();
        // x: ((4 - 1) * 2 + 5) * 2 + 11
        assert_relative_eq!(out.x, 33.0, epsilon = 1e-12);
        // y: -(((3 - 6) * 2 + 7) * 2 - 13)
        assert_relative_eq!(out.y, 11.0, epsilon = 1e-12);
    }

    #[test]
    fn missing_projector_is_a_typed_failure() {
        let engine = TransformEngine::new();
        let def = TransformDefinition::new("EPSG:3857");

        let forward = engine.from_lat_lon(LonLat { lon: 0.0, lat: 0.0 }, &def);
        assert!(matches!(forward, Err(Error::MissingProjector)));

        let inverse = engine.to_lat_lon(ProjectedXY { x: 0.0, y: 0.0 }, &def);
        assert!(matches!(inverse, Err(Error::MissingProjector)));
    }

    #[test]
    fn non_finite_y_means_no_position() {
        let engine = engine();
        let def = TransformDefinition::new("EPSG:3857");
        let result = engine
            .to_lat_lon(
                ProjectedXY {
                    x: 1.0,
                    y: f64::NAN,
                },
                &def,
            )
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn rotation_uses_precomputed_angles_when_present() {
        let engine = engine();
        let angle = 0.3_f64;

        let mut computed = TransformDefinition::new("EPSG:3857");
        computed.rotation = Some(angle);

        let mut precomputed = computed.clone();
        precomputed.cos_angle = Some(angle.cos());
        precomputed.sin_angle = Some(angle.sin());

        let input = LonLat {
            lon: 10.0,
            lat: 20.0,
        };
        let a = engine.from_lat_lon(input, &computed).unwrap();
        let b = engine.from_lat_lon(input, &precomputed).unwrap();
        assert_relative_eq!(a.x, b.x, epsilon = 1e-12);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-12);
    }

    #[test]
    fn rotation_round_trips_through_the_inverse() {
        let engine = engine();
        let mut def = TransformDefinition::new("EPSG:3857");
        def.rotation = Some(0.5);
        def.scale = 0.0005;
        def.xpan = 130.0;
        def.ypan = -84.0;

        let input = LonLat {
            lon: 14.5,
            lat: 47.2,
        };
        let projected = engine.from_lat_lon(input, &def).unwrap();
        let back = engine.to_lat_lon(projected, &def).unwrap().unwrap();
        assert_relative_eq!(back.lon, input.lon, epsilon = 1e-6);
        assert_relative_eq!(back.lat, input.lat, epsilon = 1e-6);
    }
}
