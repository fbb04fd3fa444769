// Copyright 2026 the Farmplot Authors
// SPDX-License-Identifier: Apache-2.0

//! Sutherland-Hodgman clipping of the field boundary against one
//! axis-aligned cell rectangle.
//!
//! The cell rectangle is the convex clip region; the (possibly concave)
//! field polygon is the subject. The output is their intersection, which
//! for a concave subject split by the rectangle may degenerate into
//! pieces joined by zero-width seams along the rectangle edges. That is
//! accepted: at field scale, clipped cells feed a translucent render
//! layer and an area threshold, not boolean geometry.

use kurbo::{Point, Rect};

/// One rectangle edge as a half-plane: keeps points with
/// `axis_value(p) <= limit` (or `>=` when `keep_greater`).
#[derive(Clone, Copy)]
struct Edge {
    vertical: bool,
    limit: f64,
    keep_greater: bool,
}

impl Edge {
    fn inside(&self, p: Point) -> bool {
        let v = if self.vertical { p.x } else { p.y };
        if self.keep_greater { v >= self.limit } else { v <= self.limit }
    }

    /// Intersection of segment a-b with this edge's boundary line.
    fn intersect(&self, a: Point, b: Point) -> Point {
        if self.vertical {
            let t = (self.limit - a.x) / (b.x - a.x);
            Point::new(self.limit, a.y + t * (b.y - a.y))
        } else {
            let t = (self.limit - a.y) / (b.y - a.y);
            Point::new(a.x + t * (b.x - a.x), self.limit)
        }
    }
}

/// Clip a polygon (unclosed vertex list) to an axis-aligned rectangle.
///
/// Returns the intersection's vertices, unclosed; empty when the polygon
/// lies entirely outside the rectangle.
pub(crate) fn clip_to_rect(subject: &[Point], rect: Rect) -> Vec<Point> {
    let edges = [
        Edge { vertical: true, limit: rect.x0, keep_greater: true },
        Edge { vertical: true, limit: rect.x1, keep_greater: false },
        Edge { vertical: false, limit: rect.y0, keep_greater: true },
        Edge { vertical: false, limit: rect.y1, keep_greater: false },
    ];

    let mut output: Vec<Point> = subject.to_vec();
    for edge in edges {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let n = input.len();
        for i in 0..n {
            let current = input[i];
            let previous = input[(i + n - 1) % n];
            let current_in = edge.inside(current);
            let previous_in = edge.inside(previous);
            if current_in {
                if !previous_in {
                    output.push(edge.intersect(previous, current));
                }
                output.push(current);
            } else if previous_in {
                output.push(edge.intersect(previous, current));
            }
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::planar_area;

    fn unit_rect() -> Rect {
        Rect::new(0.0, 0.0, 1.0, 1.0)
    }

    fn triangle() -> Vec<Point> {
        vec![
            Point::new(-1.0, -1.0),
            Point::new(3.0, -1.0),
            Point::new(-1.0, 3.0),
        ]
    }

    #[test]
    fn polygon_containing_rect_clips_to_rect() {
        let big = vec![
            Point::new(-5.0, -5.0),
            Point::new(5.0, -5.0),
            Point::new(5.0, 5.0),
            Point::new(-5.0, 5.0),
        ];
        let clipped = clip_to_rect(&big, unit_rect());
        assert!((planar_area(&clipped) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn polygon_outside_rect_clips_to_nothing() {
        let far = vec![
            Point::new(10.0, 10.0),
            Point::new(11.0, 10.0),
            Point::new(11.0, 11.0),
        ];
        assert!(clip_to_rect(&far, unit_rect()).is_empty());
    }

    #[test]
    fn polygon_inside_rect_is_unchanged() {
        let small = vec![
            Point::new(0.25, 0.25),
            Point::new(0.75, 0.25),
            Point::new(0.5, 0.75),
        ];
        let clipped = clip_to_rect(&small, unit_rect());
        assert_eq!(clipped, small);
    }

    #[test]
    fn half_covered_rect_keeps_half_area() {
        // Rectangle covering the left half of the unit square.
        let half = vec![
            Point::new(-1.0, -1.0),
            Point::new(0.5, -1.0),
            Point::new(0.5, 2.0),
            Point::new(-1.0, 2.0),
        ];
        let clipped = clip_to_rect(&half, unit_rect());
        assert!((planar_area(&clipped) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn diagonal_cut_keeps_expected_area() {
        // The triangle's hypotenuse runs from (3,-1) to (-1,3), crossing
        // the unit square; x + y = 2 on that line, so the whole unit
        // square is inside.
        let clipped = clip_to_rect(&triangle(), unit_rect());
        assert!((planar_area(&clipped) - 1.0).abs() < 1e-12);

        // A tighter triangle whose hypotenuse x + y = 1 halves the square.
        let tight = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ];
        let clipped = clip_to_rect(&tight, unit_rect());
        assert!((planar_area(&clipped) - 0.5).abs() < 1e-12);
    }
}
