//! Map-overlay export of the tree's node rectangles.
//!
//! Walks the read-only quad feed of a [`Quadtree`] and renders every live
//! node as a closed polygon ring, either as plain data for a renderer or as
//! a GeoJSON FeatureCollection for tools that ingest it directly. Useful for
//! eyeballing how a tree has subdivided under real data; the export never
//! mutates the tree.

use atlas_spatial::{Quad, Quadtree};
use thiserror::Error;

/// A closed polygon ring for one tree node, in tree coordinates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverlayPolygon {
    /// Ring vertices in counter-clockwise order, first vertex repeated last.
    pub ring: Vec<[f32; 2]>,
    /// Whether the node is subdivided.
    pub subdivided: bool,
}

/// Error produced by the GeoJSON export.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// The overlay could not be serialized.
    #[error("geojson serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Renders the bounds of every live node as a closed rectangle ring, in the
/// tree's depth-first NW, NE, SW, SE order.
pub fn quad_overlay<T>(tree: &Quadtree<T>) -> Vec<OverlayPolygon> {
    tree.quads()
        .into_iter()
        .map(|(quad, subdivided)| OverlayPolygon {
            ring: ring_of(quad),
            subdivided,
        })
        .collect()
}

fn ring_of(quad: Quad) -> Vec<[f32; 2]> {
    vec![
        [quad.min.x, quad.min.y],
        [quad.max.x, quad.min.y],
        [quad.max.x, quad.max.y],
        [quad.min.x, quad.max.y],
        [quad.min.x, quad.min.y],
    ]
}

/// Serializes the overlay of `tree` as a GeoJSON FeatureCollection, one
/// Polygon feature per live node with a `subdivided` property.
pub fn overlay_geojson<T>(tree: &Quadtree<T>) -> Result<String, OverlayError> {
    let features: Vec<serde_json::Value> = quad_overlay(tree)
        .iter()
        .map(|polygon| {
            serde_json::json!({
                "type": "Feature",
                "properties": { "subdivided": polygon.subdivided },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [polygon.ring],
                },
            })
        })
        .collect();
    let collection = serde_json::json!({
        "type": "FeatureCollection",
        "features": features,
    });
    Ok(serde_json::to_string(&collection)?)
}
