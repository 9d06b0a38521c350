use std::fmt;

use crate::coord::Coord;
use crate::line::LineModel;
use crate::math::Point3d;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The side of the centerline a point lies on, looking along the
/// direction of increasing measure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Side {
    Left,
    Right,
    OnLine,
    Undefined,
}

/// How a point relates geometrically to its projection on the centerline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Relationship {
    /// The point drops perpendicularly onto the line.
    Perpendicular,
    /// The point projects onto an interior vertex from outside a bend.
    #[cfg_attr(feature = "serde", serde(rename = "on_a_angle"))]
    Angled,
    /// The point lies beyond the end of the line.
    Overshoot,
    /// The point lies before the start of the line.
    Undershoot,
    Undefined,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::OnLine => "on_line",
            Side::Undefined => "undefined",
        }
    }
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Perpendicular => "perpendicular",
            Relationship::Angled => "on_a_angle",
            Relationship::Overshoot => "overshoot",
            Relationship::Undershoot => "undershoot",
            Relationship::Undefined => "undefined",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of projecting a point onto a [LineModel].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PointProjection<'a> {
    /// The point that was projected.
    pub query_point: Coord,
    /// The line the point was projected onto.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub line: &'a LineModel,
    /// The closest point on the line, with interpolated elevation for 3D lines.
    pub projected_point: Point3d,
    /// The planar arc length to the projected point, in m.
    pub measure_2d: f64,
    /// The spatial arc length to the projected point, for 3D lines.
    pub measure_3d: Option<f64>,
    /// The planar distance from the query point to the projected point, in m.
    pub distance_2d: f64,
    /// The spatial distance from the query point to the projected point,
    /// when both the line and the query point carry elevations.
    pub distance_3d: Option<f64>,
    /// The side of the line the query point lies on.
    pub side: Side,
    /// How the query point drops onto the line.
    pub relationship: Relationship,
}

/// The result of projecting the ends of a line onto a [LineModel].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LineProjection<'a> {
    /// The projection of the first vertex.
    pub from_result: PointProjection<'a>,
    /// The projection of the last vertex.
    pub to_result: PointProjection<'a>,
}

impl<'a> LineProjection<'a> {
    /// The 2D measure of the first vertex.
    pub fn from_measure_2d(&self) -> f64 {
        self.from_result.measure_2d
    }

    /// The 2D measure of the last vertex.
    pub fn to_measure_2d(&self) -> f64 {
        self.to_result.measure_2d
    }

    /// The 3D measure of the first vertex, for 3D lines.
    pub fn from_measure_3d(&self) -> Option<f64> {
        self.from_result.measure_3d
    }

    /// The 3D measure of the last vertex, for 3D lines.
    pub fn to_measure_3d(&self) -> Option<f64> {
        self.to_result.measure_3d
    }

    /// The line both ends were projected onto.
    pub fn line(&self) -> &'a LineModel {
        self.from_result.line
    }
}

/// Formats an optional measure with millimetre precision.
struct OptMeasure(Option<f64>);

impl fmt::Display for OptMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value:.3}"),
            None => f.write_str("none"),
        }
    }
}

impl fmt::Display for PointProjection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.projected_point;
        write!(
            f,
            "PointProjection(projected=({:.3}, {:.3}, {:.3}), measure_2d={:.3}, measure_3d={}, side={}, status={})",
            p.x,
            p.y,
            p.z,
            self.measure_2d,
            OptMeasure(self.measure_3d),
            self.side,
            self.relationship
        )
    }
}

impl fmt::Display for LineProjection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LineProjection(from=2D:{:.3} 3D:{} {}, to=2D:{:.3} 3D:{} {})",
            self.from_measure_2d(),
            OptMeasure(self.from_measure_3d()),
            self.from_result.relationship,
            self.to_measure_2d(),
            OptMeasure(self.to_measure_3d()),
            self.to_result.relationship
        )
    }
}
