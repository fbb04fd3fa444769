// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Polygon boundary geometry.
//!
//! A field boundary is a closed ring of (longitude, latitude) vertices,
//! carried as `kurbo::Point` with `x` = longitude and `y` = latitude.
//! `Ring` validates on construction so everything downstream (area, mesh
//! generation, rendering) can assume a well-formed boundary.
//!
//! All planar math here uses a flat-earth local approximation: one degree
//! is treated as a fixed number of meters, scaled by the cosine of the
//! boundary's first-vertex latitude for longitude. This is accurate to a
//! small fraction of a percent at single-field extents (sub-kilometer)
//! and is deliberately not geodesic; field areas and mesh cell counts
//! downstream depend on this approximation staying put.

pub mod area;

use crate::error::GeometryError;
use kurbo::{Point, Rect};
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// Approximate meters per degree of latitude (and of longitude at the
/// equator).
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// A validated, closed boundary ring in (lon, lat) coordinates.
///
/// Invariants, enforced at construction:
/// - at least 4 vertices with the first and last identical
/// - at least 3 distinct corners
/// - every vertex finite, lon in [-180, 180], lat in [-90, 90]
/// - no two non-adjacent segments cross
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<Point>,
}

impl Ring {
    /// Validate and construct a closed ring.
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        if points.len() < 4 {
            return Err(GeometryError::Degenerate);
        }
        let first = points[0];
        let last = points[points.len() - 1];
        if first != last {
            return Err(GeometryError::Degenerate);
        }
        for p in &points {
            if !p.x.is_finite()
                || !p.y.is_finite()
                || p.x < -180.0
                || p.x > 180.0
                || p.y < -90.0
                || p.y > 90.0
            {
                return Err(GeometryError::OutOfRange { lon: p.x, lat: p.y });
            }
        }
        let corners = &points[..points.len() - 1];
        let mut distinct: Vec<Point> = Vec::with_capacity(corners.len());
        for p in corners {
            if !distinct.contains(p) {
                distinct.push(*p);
            }
        }
        if distinct.len() < 3 {
            return Err(GeometryError::Degenerate);
        }
        if self_intersects(corners) {
            return Err(GeometryError::SelfIntersecting);
        }
        Ok(Self { points })
    }

    /// All vertices, first == last.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Vertices without the repeated closing vertex.
    pub fn corners(&self) -> &[Point] {
        &self.points[..self.points.len() - 1]
    }

    /// First vertex. Its latitude anchors the local planar frame.
    pub fn first(&self) -> Point {
        self.points[0]
    }

    /// Axis-aligned bounding box in (lon, lat) degrees.
    pub fn bounding_box(&self) -> Rect {
        let mut rect = Rect::from_points(self.points[0], self.points[0]);
        for p in &self.points[1..] {
            rect = rect.union_pt(*p);
        }
        rect
    }
}

// Rings travel over the wire as arrays of [lon, lat] pairs; validation
// re-runs on deserialization so backend data can't smuggle in a bad
// boundary.
impl Serialize for Ring {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.points.len()))?;
        for p in &self.points {
            seq.serialize_element(&[p.x, p.y])?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Ring {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RingVisitor;

        impl<'de> Visitor<'de> for RingVisitor {
            type Value = Ring;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a sequence of [lon, lat] pairs forming a closed ring")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Ring, A::Error> {
                let mut points = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some([lon, lat]) = seq.next_element::<[f64; 2]>()? {
                    points.push(Point::new(lon, lat));
                }
                Ring::new(points).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_seq(RingVisitor)
    }
}

/// Local planar frame anchored at a boundary's bounding-box minimum
/// corner, with degree-to-meter scale factors taken at the boundary's
/// first-vertex latitude.
///
/// The same frame drives area computation and mesh cell clipping, so the
/// two always agree on where a cell boundary falls.
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    origin: Point,
    meters_per_degree_lon: f64,
    meters_per_degree_lat: f64,
}

impl LocalFrame {
    /// Build the frame for a boundary ring.
    pub fn for_ring(ring: &Ring) -> Self {
        let bbox = ring.bounding_box();
        let lat0 = ring.first().y;
        Self {
            origin: Point::new(bbox.x0, bbox.y0),
            meters_per_degree_lon: METERS_PER_DEGREE * lat0.to_radians().cos(),
            meters_per_degree_lat: METERS_PER_DEGREE,
        }
    }

    /// Map a (lon, lat) point into local meters.
    pub fn to_local(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.origin.x) * self.meters_per_degree_lon,
            (p.y - self.origin.y) * self.meters_per_degree_lat,
        )
    }

    /// Map a local-meter point back to (lon, lat).
    pub fn to_lon_lat(&self, p: Point) -> Point {
        Point::new(
            self.origin.x + p.x / self.meters_per_degree_lon,
            self.origin.y + p.y / self.meters_per_degree_lat,
        )
    }
}

/// Unsigned shoelace area of a polygon given by its vertices (closing
/// vertex optional). Units are the square of the input units.
pub(crate) fn planar_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    (sum * 0.5).abs()
}

/// Whether any two non-adjacent segments of the (unclosed) corner list
/// properly cross.
fn self_intersects(corners: &[Point]) -> bool {
    let n = corners.len();
    for i in 0..n {
        for j in (i + 1)..n {
            // Skip adjacent segments (including the wrap-around pair).
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let (a1, a2) = (corners[i], corners[(i + 1) % n]);
            let (b1, b2) = (corners[j], corners[(j + 1) % n]);
            if segments_cross(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn segments_cross(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);
    (d1 * d2 < 0.0) && (d3 * d4 < 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(10.0, 50.0),
            Point::new(10.001, 50.0),
            Point::new(10.001, 50.001),
            Point::new(10.0, 50.001),
            Point::new(10.0, 50.0),
        ]
    }

    #[test]
    fn valid_ring_constructs() {
        assert!(Ring::new(square()).is_ok());
    }

    #[test]
    fn two_vertex_ring_is_degenerate() {
        let points = vec![Point::new(10.0, 50.0), Point::new(10.0, 50.0)];
        assert!(matches!(Ring::new(points), Err(GeometryError::Degenerate)));
    }

    #[test]
    fn unclosed_ring_is_degenerate() {
        let mut points = square();
        points.pop();
        assert!(matches!(Ring::new(points), Err(GeometryError::Degenerate)));
    }

    #[test]
    fn repeated_corners_are_degenerate() {
        let p = Point::new(10.0, 50.0);
        let q = Point::new(10.001, 50.0);
        let points = vec![p, q, p, q, p];
        assert!(matches!(Ring::new(points), Err(GeometryError::Degenerate)));
    }

    #[test]
    fn out_of_range_vertex_rejected() {
        let points = vec![
            Point::new(10.0, 50.0),
            Point::new(190.0, 50.0),
            Point::new(10.0, 51.0),
            Point::new(10.0, 50.0),
        ];
        assert!(matches!(
            Ring::new(points),
            Err(GeometryError::OutOfRange { .. })
        ));
    }

    #[test]
    fn bowtie_is_self_intersecting() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(0.0, 0.0),
        ];
        assert!(matches!(
            Ring::new(points),
            Err(GeometryError::SelfIntersecting)
        ));
    }

    #[test]
    fn bounding_box_covers_all_vertices() {
        let ring = Ring::new(square()).unwrap();
        let bbox = ring.bounding_box();
        assert_eq!(bbox.x0, 10.0);
        assert_eq!(bbox.y0, 50.0);
        assert_eq!(bbox.x1, 10.001);
        assert_eq!(bbox.y1, 50.001);
    }

    #[test]
    fn local_frame_round_trips() {
        let ring = Ring::new(square()).unwrap();
        let frame = LocalFrame::for_ring(&ring);
        for &p in ring.points() {
            let back = frame.to_lon_lat(frame.to_local(p));
            assert!((back.x - p.x).abs() < 1e-12);
            assert!((back.y - p.y).abs() < 1e-12);
        }
    }

    #[test]
    fn local_frame_origin_is_bbox_min() {
        let ring = Ring::new(square()).unwrap();
        let frame = LocalFrame::for_ring(&ring);
        let origin = frame.to_local(Point::new(10.0, 50.0));
        assert_eq!(origin, Point::new(0.0, 0.0));
    }

    #[test]
    fn serde_round_trip() {
        let ring = Ring::new(square()).unwrap();
        let json = serde_json::to_string(&ring).unwrap();
        let back: Ring = serde_json::from_str(&json).unwrap();
        assert_eq!(ring, back);
    }

    #[test]
    fn deserialize_rejects_bad_ring() {
        let json = "[[10.0,50.0],[10.0,50.0]]";
        assert!(serde_json::from_str::<Ring>(json).is_err());
    }

    #[test]
    fn planar_area_of_unit_square() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        assert!((planar_area(&points) - 1.0).abs() < 1e-12);
    }
}
