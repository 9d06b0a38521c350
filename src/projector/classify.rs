use crate::line::LineModel;
use crate::math::{project_local, rot90, Point2d, Vector2d};
use crate::result::{Relationship, Side};
use cgmath::prelude::*;

/// Classifies a projection by the side of the line the query point lies on,
/// and whether it drops perpendicularly onto the line.
///
/// # Parameters
/// * `line` - The line that was projected onto
/// * `idx` - The index of the segment containing the projection
/// * `query` - The query point
/// * `projected` - The projection of the query point onto the line
/// * `measure` - The 2D measure of the projection
/// * `tolerance` - The maximum along-track offset of a perpendicular projection
pub(super) fn classify(
    line: &LineModel,
    idx: usize,
    query: Point2d,
    projected: Point2d,
    measure: f64,
    tolerance: f64,
) -> (Side, Relationship) {
    // Zero-length segments borrow the direction of their neighbours
    let Some((dir_idx, dir)) = line.direction_near(idx) else {
        return (Side::Undefined, Relationship::Undefined);
    };
    let (start, _) = line.segment_2d(dir_idx);

    let unit = dir.normalize();
    let local = project_local(query, projected, unit, rot90(unit));

    if local.x.abs() < tolerance {
        (side_of(dir, start, query), Relationship::Perpendicular)
    } else if measure == 0.0 {
        (Side::Undefined, Relationship::Undershoot)
    } else if measure == line.length_2d() {
        (Side::Undefined, Relationship::Overshoot)
    } else {
        (side_of(dir, start, query), Relationship::Angled)
    }
}

/// Determines the side of a segment a point lies on, from the sign of
/// the cross product of the segment direction and the offset from its start.
fn side_of(dir: Vector2d, start: Point2d, point: Point2d) -> Side {
    let cross = dir.perp_dot(point - start);
    if cross > 0.0 {
        Side::Left
    } else if cross < 0.0 {
        Side::Right
    } else {
        Side::OnLine
    }
}
