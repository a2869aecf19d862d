//! Axis-aligned bounding box tests.
//!
//! Both tests use strict inequalities: rectangles that only share an edge do
//! not collide, and a point on a rectangle's border is outside it.

use crate::math::{Rect, Vec2};

/// Returns `true` if `a` and `b` overlap with non-zero area.
pub fn collide(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Returns `true` if `point` lies strictly inside `rect`.
pub fn contains_point(point: Vec2, rect: &Rect) -> bool {
    point.x > rect.x && point.x < rect.x + rect.w && point.y > rect.y && point.y < rect.y + rect.h
}
