//! Region quadtree for 2D map queries.
//!
//! This crate stores caller-supplied elements keyed by a point or by an
//! axis-aligned rectangle and answers "what is here", "what intersects this
//! viewport" and "what is nearest" without a full scan, by recursive
//! subdivision of a bounding rectangle:
//!
//! - [`Quad`] - axis-aligned rectangle with inclusive containment and
//!   intersection tests
//! - [`Quadtree`] - the tree engine: insertion, point/region queries,
//!   nearest-neighbor search, removal and the subdivide/unify lifecycle
//!
//! # Example
//!
//! ```
//! use atlas_spatial::{Quad, Quadtree};
//! use glam::Vec2;
//!
//! let bounds = Quad::new(Vec2::ZERO, Vec2::splat(100.0));
//! let mut tree = Quadtree::new(bounds);
//!
//! // Insert points with associated elements
//! tree.insert(Vec2::new(10.0, 20.0), "cafe").unwrap();
//! tree.insert(Vec2::new(80.0, 64.0), "park").unwrap();
//!
//! // Query elements visible in a viewport
//! let viewport = Quad::new(Vec2::ZERO, Vec2::splat(50.0));
//! let visible: Vec<_> = tree.query_region(&viewport).collect();
//! assert_eq!(visible, vec![&"cafe"]);
//!
//! // Nearest neighbor
//! assert_eq!(tree.nearest(Vec2::new(78.0, 66.0)), Some(&"park"));
//! ```

use glam::Vec2;

mod quadtree;

pub use quadtree::*;

/// Axis-aligned rectangle given by its min and max corners.
///
/// Nothing enforces `min <= max` componentwise; callers are responsible, and
/// the predicates are unspecified for an inverted rectangle.
///
/// Containment and intersection are inclusive on every edge. Two quadrants
/// produced by the same subdivision share their middle boundary, so a point
/// exactly on that boundary is inside both of them; adjacent quads are not a
/// disjoint partition at the boundary and callers doing manual containment
/// checks must tolerate a double match.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quad {
    /// Minimum corner (lower-left).
    pub min: Vec2,
    /// Maximum corner (upper-right).
    pub max: Vec2,
}

impl Quad {
    /// Creates a rectangle from min and max corners.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a rectangle from center and half-extents.
    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Returns the center of the rectangle.
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Returns the size of the rectangle.
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Returns the half-extents (half-size) of the rectangle.
    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Checks if the rectangle contains a point, boundary included.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Checks if two rectangles intersect; touching edges count.
    pub fn intersects(&self, other: &Quad) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Returns the four equal quadrants of the rectangle in NW, NE, SW, SE
    /// order, split at the midpoints of width and height.
    pub fn quadrants(&self) -> [Quad; 4] {
        let center = self.center();
        [
            // North-west
            Quad::new(
                Vec2::new(self.min.x, center.y),
                Vec2::new(center.x, self.max.y),
            ),
            // North-east
            Quad::new(center, self.max),
            // South-west
            Quad::new(self.min, center),
            // South-east
            Quad::new(
                Vec2::new(center.x, self.min.y),
                Vec2::new(self.max.x, center.y),
            ),
        ]
    }
}

// ============================================================================
// Tests
// ============================================================================
