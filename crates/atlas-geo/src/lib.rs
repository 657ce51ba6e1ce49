//! Geographic adapters for the `atlas-spatial` quadtree.
//!
//! The tree itself only understands rectangles with two 2D float corners.
//! This crate holds the collaborators that live on either side of that
//! boundary: building a query rectangle out of a geographic location plus a
//! metric offset, and exporting the tree's node rectangles as map-overlay
//! polygons for debugging (see [`overlay`]).
//!
//! Longitude maps to x and latitude to y throughout.
//!
//! # Example
//!
//! ```
//! use atlas_geo::{GeoPoint, quad_around};
//! use atlas_spatial::Quadtree;
//!
//! let berlin = GeoPoint::new(52.52, 13.405);
//! let bounds = quad_around(berlin, 5_000.0);
//! let mut tree = Quadtree::new(bounds);
//!
//! let station = GeoPoint::new(52.525, 13.369);
//! tree.insert(station.to_vec2(), "hbf").unwrap();
//! assert_eq!(tree.nearest(berlin.to_vec2()), Some(&"hbf"));
//! ```

use glam::Vec2;

use atlas_spatial::Quad;

pub mod overlay;

pub use overlay::{OverlayError, OverlayPolygon, overlay_geojson, quad_overlay};

/// Meters spanned by one degree of latitude.
const METERS_PER_DEGREE: f32 = 111_320.0;

/// A geographic location in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f32,
    /// Longitude in degrees, positive east.
    pub lon: f32,
}

impl GeoPoint {
    /// Creates a location from latitude and longitude in degrees.
    pub fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }

    /// Maps the location into tree coordinates, longitude as x and latitude
    /// as y.
    pub fn to_vec2(&self) -> Vec2 {
        Vec2::new(self.lon, self.lat)
    }
}

/// Builds the rectangle spanning `offset_m` meters in each cardinal
/// direction from `origin`.
///
/// Uses the equirectangular approximation: the longitude span is widened by
/// `1 / cos(lat)` so the rectangle covers the same ground distance east-west
/// as north-south. Good enough for viewport and radius queries away from the
/// poles; no validation or clamping is performed.
pub fn quad_around(origin: GeoPoint, offset_m: f32) -> Quad {
    let d_lat = offset_m / METERS_PER_DEGREE;
    let d_lon = offset_m / (METERS_PER_DEGREE * origin.lat.to_radians().cos());
    Quad::from_center_half_extents(origin.to_vec2(), Vec2::new(d_lon, d_lat))
}
