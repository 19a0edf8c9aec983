// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The projection capability consumed by the transform engine.

use crate::error::Result;
use maplite_core::{LonLat, ProjectedXY};

/// Maps between WGS84 geographic coordinates and the flat plane of a
/// named coordinate reference system.
///
/// The engine treats this as an external capability: it is injected at
/// construction and may be absent, in which case conversions fail with
/// [`Error::MissingProjector`](crate::Error::MissingProjector) instead of
/// panicking. Implementations typically wrap a projection library keyed
/// by CRS identifiers such as `"EPSG:32633"`.
pub trait Projector: Send + Sync {
    /// Project a WGS84 lon/lat pair onto the plane of `crs`.
    fn project(&self, crs: &str, lon_lat: LonLat) -> Result<ProjectedXY>;

    /// Invert a point on the plane of `crs` back to WGS84 lon/lat.
    fn unproject(&self, crs: &str, point: ProjectedXY) -> Result<LonLat>;
}
