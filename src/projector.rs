use crate::coord::Coord;
use crate::error::{MeasureError, MeasureResult};
use crate::line::LineModel;
use crate::math::{closest_on_segment, flatten, Point2d};
use crate::result::{LineProjection, PointProjection};
use cgmath::prelude::*;

mod classify;

/// The maximum along-track offset between a point and its projection
/// for the projection to count as perpendicular, in m.
pub const PERPENDICULAR_TOLERANCE: f64 = 1e-7;

/// Projects points and lines onto a [LineModel].
#[derive(Clone, Copy, Debug)]
pub struct Projector<'a> {
    /// The line to project onto.
    line: &'a LineModel,
    /// The perpendicularity tolerance in m.
    tolerance: f64,
}

impl<'a> Projector<'a> {
    /// Creates a projector with the default perpendicularity tolerance.
    pub fn new(line: &'a LineModel) -> Self {
        Self::with_tolerance(line, PERPENDICULAR_TOLERANCE)
    }

    /// Creates a projector with the given perpendicularity tolerance.
    pub fn with_tolerance(line: &'a LineModel, tolerance: f64) -> Self {
        Self { line, tolerance }
    }

    /// Gets the line this projector projects onto.
    pub fn line(&self) -> &'a LineModel {
        self.line
    }

    /// Projects a point onto the line.
    ///
    /// The point is matched to the closest position on the line in the plane;
    /// elevations only contribute to the 3D measure.
    ///
    /// When the point lands on a segment with no planar length, side and
    /// relationship are judged against the direction of the nearest segment
    /// that has one, looking forward along the line first. A point beside a
    /// repeated vertex therefore still gets a real side. Only a line with no
    /// planar length at all yields [Side::Undefined] and
    /// [Relationship::Undefined].
    ///
    /// [Side::Undefined]: crate::Side::Undefined
    /// [Relationship::Undefined]: crate::Relationship::Undefined
    pub fn project(&self, point: impl Into<Coord>) -> PointProjection<'a> {
        let query_point = point.into();
        let query_2d = query_point.to_2d();

        let measure_2d = self.nearest_measure(query_2d);
        let (idx, t) = self.line.segment_at(measure_2d);
        let [start, end] = [idx, idx + 1].map(|i| self.line.vertices()[i]);
        let projected_point = start + (end - start) * t;
        let measure_3d = self.line.measure_3d_at(idx, t);

        let (side, relationship) = classify::classify(
            self.line,
            idx,
            query_2d,
            flatten(projected_point),
            measure_2d,
            self.tolerance,
        );

        let distance_2d = query_2d.distance(flatten(projected_point));
        let distance_3d = (self.line.is_3d() && query_point.has_z())
            .then(|| query_point.to_3d().distance(projected_point));

        log::trace!(
            "projected {:?} to measure {:.3} on segment {} ({}, {})",
            query_point,
            measure_2d,
            idx,
            side,
            relationship
        );

        PointProjection {
            query_point,
            line: self.line,
            projected_point,
            measure_2d,
            measure_3d,
            distance_2d,
            distance_3d,
            side,
            relationship,
        }
    }

    /// Projects a point given as 2 or 3 raw components.
    pub fn project_slice(&self, point: &[f64]) -> MeasureResult<PointProjection<'a>> {
        Coord::try_from(point).map(|point| self.project(point))
    }

    /// Projects the first and last vertex of a line onto this line.
    ///
    /// Intermediate vertices are not measured.
    pub fn project_line(&self, line: &[Coord]) -> MeasureResult<LineProjection<'a>> {
        match line {
            [first, .., last] => Ok(LineProjection {
                from_result: self.project(*first),
                to_result: self.project(*last),
            }),
            _ => Err(MeasureError::too_few_vertices(line.len())),
        }
    }

    /// Finds the 2D measure of the closest point on the line.
    ///
    /// When several segments are equally close, the lowest index wins.
    fn nearest_measure(&self, point: Point2d) -> f64 {
        (0..self.line.num_segments())
            .map(|idx| {
                let (start, end) = self.line.segment_2d(idx);
                let (t, dist2) = closest_on_segment(point, start, end);
                (idx, t, dist2)
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(idx, t, _)| {
                let range = self.line.segment_range_2d(idx);
                // Land exactly on the vertex so the end of the line is recognised
                if t >= 1.0 {
                    range.max
                } else {
                    range.lerp(t)
                }
            })
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::result::{Relationship, Side};
    use assert_approx_eq::assert_approx_eq;

    fn straight() -> LineModel {
        LineModel::new([Coord::xy(0.0, 0.0), Coord::xy(10.0, 0.0)]).unwrap()
    }

    #[test]
    fn perpendicular_drop() {
        let line = straight();
        let res = line.projector().project((5.0, 5.0));
        assert_eq!(res.projected_point.x, 5.0);
        assert_eq!(res.projected_point.y, 0.0);
        assert_eq!(res.measure_2d, 5.0);
        assert_eq!(res.measure_3d, None);
        assert_eq!(res.relationship, Relationship::Perpendicular);
        assert_eq!(res.side, Side::Left);
        assert_approx_eq!(res.distance_2d, 5.0);
        assert_eq!(res.distance_3d, None);
    }

    #[test]
    fn right_side() {
        let line = straight();
        let res = line.projector().project((2.0, -3.0));
        assert_eq!(res.side, Side::Right);
        assert_eq!(res.relationship, Relationship::Perpendicular);
        assert_eq!(res.measure_2d, 2.0);
    }

    #[test]
    fn overshoot_and_undershoot() {
        let line = straight();
        let projector = line.projector();

        let res = projector.project((15.0, 5.0));
        assert_eq!(res.measure_2d, 10.0);
        assert_eq!(res.relationship, Relationship::Overshoot);
        assert_eq!(res.side, Side::Undefined);

        let res = projector.project((-3.0, 1.0));
        assert_eq!(res.measure_2d, 0.0);
        assert_eq!(res.relationship, Relationship::Undershoot);
        assert_eq!(res.side, Side::Undefined);
    }

    #[test]
    fn perpendicular_at_the_ends() {
        let line = straight();
        let res = line.projector().project((0.0, 4.0));
        assert_eq!(res.measure_2d, 0.0);
        assert_eq!(res.relationship, Relationship::Perpendicular);
        assert_eq!(res.side, Side::Left);
    }

    #[test]
    fn point_on_line() {
        let line = straight();
        let res = line.projector().project((7.0, 0.0));
        assert_approx_eq!(res.measure_2d, 7.0);
        assert_eq!(res.side, Side::OnLine);
        assert_eq!(res.relationship, Relationship::Perpendicular);
    }

    #[test]
    fn angled_outside_a_bend() {
        // An L-shaped line turning left at (10, 0)
        let line = LineModel::new([
            Coord::xy(0.0, 0.0),
            Coord::xy(10.0, 0.0),
            Coord::xy(10.0, 10.0),
        ])
        .unwrap();
        let res = line.projector().project((12.0, -2.0));
        assert_eq!(res.measure_2d, 10.0);
        assert_eq!(res.relationship, Relationship::Angled);
        assert_eq!(res.side, Side::Right);
        assert_eq!(res.projected_point.x, 10.0);
        assert_eq!(res.projected_point.y, 0.0);
    }

    #[test]
    fn interpolates_elevation() {
        let line = LineModel::new([Coord::xyz(0.0, 0.0, 0.0), Coord::xyz(10.0, 0.0, 10.0)]).unwrap();
        let res = line.projector().project((5.0, 1.0));
        assert_approx_eq!(res.measure_3d.unwrap(), 7.0710678, 1e-6);
        assert_approx_eq!(res.projected_point.z, 5.0);
        assert_eq!(res.distance_3d, None);

        let res = line.projector().project((5.0, 1.0, 5.0));
        assert_approx_eq!(res.distance_3d.unwrap(), 1.0);
    }

    #[test]
    fn ties_go_to_the_lowest_segment() {
        // A hairpin with two parallel legs equally far from the query
        let line = LineModel::new([
            Coord::xy(0.0, 1.0),
            Coord::xy(10.0, 1.0),
            Coord::xy(10.0, -1.0),
            Coord::xy(0.0, -1.0),
        ])
        .unwrap();
        let res = line.projector().project((4.0, 0.0));
        assert_eq!(res.measure_2d, 4.0);
        assert_eq!(res.side, Side::Right);
    }

    #[test]
    fn degenerate_segments_do_not_fail() {
        let line = LineModel::new([
            Coord::xyz(0.0, 0.0, 0.0),
            Coord::xyz(0.0, 0.0, 0.0),
            Coord::xyz(10.0, 0.0, 0.0),
            Coord::xyz(10.0, 0.0, 0.0),
        ])
        .unwrap();
        let projector = line.projector();

        let res = projector.project((0.0, 3.0));
        assert_eq!(res.measure_2d, 0.0);
        assert_eq!(res.measure_3d, Some(0.0));
        assert_eq!(res.relationship, Relationship::Perpendicular);
        assert_eq!(res.side, Side::Left);

        let res = projector.project((12.0, 3.0));
        assert_eq!(res.measure_2d, 10.0);
        assert_eq!(res.relationship, Relationship::Overshoot);
    }

    #[test]
    fn fully_degenerate_line_is_undefined() {
        let line = LineModel::new([Coord::xy(1.0, 1.0), Coord::xy(1.0, 1.0)]).unwrap();
        let res = line.projector().project((3.0, 3.0));
        assert_eq!(res.measure_2d, 0.0);
        assert_eq!(res.side, Side::Undefined);
        assert_eq!(res.relationship, Relationship::Undefined);
    }

    #[test]
    fn invalid_queries() {
        let line = straight();
        let projector = line.projector();
        assert!(projector.project_slice(&[1.0]).is_err());
        assert!(projector.project_slice(&[1.0, 2.0, 3.0, 4.0]).is_err());
        assert!(projector.project_line(&[Coord::xy(1.0, 1.0)]).is_err());
        assert!(projector.project_line(&[]).is_err());
        assert_approx_eq!(projector.project_slice(&[3.0, 1.0]).unwrap().measure_2d, 3.0);
    }

    #[test]
    fn line_ends_only() {
        let line = straight();
        let query = [Coord::xy(2.0, 1.0), Coord::xy(50.0, 50.0), Coord::xy(8.0, -1.0)];
        let res = line.projector().project_line(&query).unwrap();
        assert_approx_eq!(res.from_measure_2d(), 2.0);
        assert_approx_eq!(res.to_measure_2d(), 8.0);
        assert!(std::ptr::eq(res.line(), &line));
    }

    #[test]
    fn custom_tolerance() {
        let line = straight();
        // 1 mm along-track offset at the start counts as perpendicular with a loose tolerance
        let res = Projector::with_tolerance(&line, 0.01).project((-0.001, 2.0));
        assert_eq!(res.relationship, Relationship::Perpendicular);
        let res = Projector::new(&line).project((-0.001, 2.0));
        assert_eq!(res.relationship, Relationship::Undershoot);
    }
}
