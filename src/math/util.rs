use super::{Point2d, Point3d, Vector2d};
use cgmath::prelude::*;

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// Rotates a vector 90 degrees anti-clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Drops the z-coordinate of a point.
#[inline(always)]
pub fn flatten(point: Point3d) -> Point2d {
    Point2d::new(point.x, point.y)
}

/// The closest point to `point` on the segment from `start` to `end`.
///
/// # Returns
/// The fraction `t` in `[0, 1]` of the way along the segment, and the squared
/// distance between `point` and the closest point.
/// A zero-length segment yields `t = 0`.
pub fn closest_on_segment(point: Point2d, start: Point2d, end: Point2d) -> (f64, f64) {
    let dir = end - start;
    let len2 = dir.magnitude2();
    let t = if len2 > 0.0 {
        ((point - start).dot(dir) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = start + dir * t;
    (t, (point - closest).magnitude2())
}
