use crate::coord::Coord;
use crate::error::{MeasureError, MeasureResult};
use crate::math::{flatten, ParametricCurve2d, Point2d, Point3d, Vector2d};
use crate::projector::Projector;
use crate::util::Interval;
use cgmath::prelude::*;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rail centerline as an immutable piecewise-linear curve.
///
/// Measures along the line are arc lengths from the first vertex, in m.
/// The cumulative length tables are computed once at construction.
///
/// With the `serde` feature the model is (de)serialized as its list of
/// coordinates, and deserializing runs the same checks as [LineModel::new].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<Coord>", into = "Vec<Coord>")
)]
pub struct LineModel {
    /// The vertices, with `z = 0` when the line is 2D.
    vertices: Vec<Point3d>,
    /// Whether every vertex carries an elevation.
    is_3d: bool,
    /// Planar arc length at each vertex.
    cumulative_2d: Vec<f64>,
    /// Spatial arc length at each vertex, for 3D lines only.
    cumulative_3d: Option<Vec<f64>>,
}

impl LineModel {
    /// Creates a line model from its vertices.
    ///
    /// Fails with [MeasureError::InvalidGeometry] when fewer than two vertices
    /// are given, or when 2D and 3D vertices are mixed.
    pub fn new(vertices: impl IntoIterator<Item = Coord>) -> MeasureResult<Self> {
        let coords = vertices.into_iter().collect::<Vec<_>>();
        if coords.len() < 2 {
            return Err(MeasureError::too_few_vertices(coords.len()));
        }

        let is_3d = coords[0].has_z();
        if let Some(idx) = coords.iter().position(|c| c.has_z() != is_3d) {
            return Err(MeasureError::invalid_geometry(format!(
                "mixed dimensionality: vertex 0 is {}D but vertex {} is {}D",
                coords[0].dimension(),
                idx,
                coords[idx].dimension()
            )));
        }

        let vertices = coords.iter().map(Coord::to_3d).collect::<Vec<_>>();
        let cumulative_2d = cumulative_lengths(&vertices, |a, b| flatten(*a).distance(flatten(*b)));
        let cumulative_3d = is_3d.then(|| cumulative_lengths(&vertices, |a, b| a.distance(*b)));

        log::debug!(
            "built {}D line model with {} vertices, length {:.3}",
            if is_3d { 3 } else { 2 },
            vertices.len(),
            cumulative_2d[cumulative_2d.len() - 1]
        );

        Ok(Self {
            vertices,
            is_3d,
            cumulative_2d,
            cumulative_3d,
        })
    }

    /// Creates a line model from raw coordinate arrays of 2 or 3 components.
    pub fn from_slices<S: AsRef<[f64]>>(vertices: &[S]) -> MeasureResult<Self> {
        let coords = vertices
            .iter()
            .map(|v| Coord::try_from(v.as_ref()))
            .collect::<MeasureResult<Vec<_>>>()?;
        Self::new(coords)
    }

    /// Creates a projector for this line with the default tolerance.
    pub fn projector(&self) -> Projector<'_> {
        Projector::new(self)
    }

    /// The vertices of the line as coordinates of the line's dimensionality.
    pub fn coords(&self) -> Vec<Coord> {
        self.vertices
            .iter()
            .map(|&v| {
                if self.is_3d {
                    Coord::Xyz(v)
                } else {
                    Coord::Xy(flatten(v))
                }
            })
            .collect()
    }

    /// The vertices of the line. For 2D lines the z-coordinates are zero.
    pub fn vertices(&self) -> &[Point3d] {
        &self.vertices
    }

    /// The number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false, a line model has at least two vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The number of segments.
    pub fn num_segments(&self) -> usize {
        self.vertices.len() - 1
    }

    /// Whether the line carries elevations.
    pub fn is_3d(&self) -> bool {
        self.is_3d
    }

    /// The planar arc length at each vertex.
    pub fn cumulative_2d(&self) -> &[f64] {
        &self.cumulative_2d
    }

    /// The spatial arc length at each vertex, if the line is 3D.
    pub fn cumulative_3d(&self) -> Option<&[f64]> {
        self.cumulative_3d.as_deref()
    }

    /// The total planar length of the line in m.
    pub fn length_2d(&self) -> f64 {
        self.cumulative_2d[self.cumulative_2d.len() - 1]
    }

    /// The total spatial length of the line in m, if the line is 3D.
    pub fn length_3d(&self) -> Option<f64> {
        self.cumulative_3d().map(|cum| cum[cum.len() - 1])
    }

    /// The range of valid 2D measures.
    pub fn bounds(&self) -> Interval<f64> {
        Interval::new(0.0, self.length_2d())
    }

    /// The planar start and end point of a segment.
    pub(crate) fn segment_2d(&self, idx: usize) -> (Point2d, Point2d) {
        (flatten(self.vertices[idx]), flatten(self.vertices[idx + 1]))
    }

    /// The range of 2D measures covered by a segment.
    pub(crate) fn segment_range_2d(&self, idx: usize) -> Interval<f64> {
        Interval::new(self.cumulative_2d[idx], self.cumulative_2d[idx + 1])
    }

    /// Finds the segment containing the given 2D measure.
    ///
    /// A measure on the boundary between two segments belongs to the earlier one.
    ///
    /// # Returns
    /// The segment index, and the fraction of the way along that segment.
    /// The fraction is zero on segments with no planar length.
    pub fn segment_at(&self, measure: f64) -> (usize, f64) {
        let last = self.num_segments() - 1;
        let idx = self.cumulative_2d[1..]
            .partition_point(|&end| end < measure)
            .min(last);
        let t = self.segment_range_2d(idx).inv_lerp(measure).clamp(0.0, 1.0);
        (idx, t)
    }

    /// Gets the point on the line at the given 2D measure.
    ///
    /// Measures outside the line are clamped to its ends.
    pub fn point_at(&self, measure: f64) -> Point3d {
        let (idx, t) = self.segment_at(self.bounds().clamp(measure));
        self.vertices[idx] + (self.vertices[idx + 1] - self.vertices[idx]) * t
    }

    /// Gets the 3D measure corresponding to a position within a segment.
    pub(crate) fn measure_3d_at(&self, idx: usize, t: f64) -> Option<f64> {
        self.cumulative_3d()
            .map(|cum| Interval::new(cum[idx], cum[idx + 1]).lerp(t))
    }

    /// Gets the planar direction of the nearest segment with a non-zero
    /// planar length, looking forward from `idx` first and then backward.
    pub(crate) fn direction_near(&self, idx: usize) -> Option<(usize, Vector2d)> {
        (idx..self.num_segments())
            .chain((0..idx).rev())
            .map(|i| {
                let (start, end) = self.segment_2d(i);
                (i, end - start)
            })
            .find(|(_, dir)| dir.magnitude2() > 0.0)
    }
}

impl TryFrom<Vec<Coord>> for LineModel {
    type Error = MeasureError;

    fn try_from(coords: Vec<Coord>) -> MeasureResult<Self> {
        Self::new(coords)
    }
}

impl From<LineModel> for Vec<Coord> {
    fn from(line: LineModel) -> Self {
        line.coords()
    }
}

impl ParametricCurve2d for LineModel {
    fn sample(&self, t: f64) -> Point2d {
        flatten(self.point_at(t))
    }

    fn bounds(&self) -> Interval<f64> {
        LineModel::bounds(self)
    }

    fn sample_dt(&self, t: f64) -> Vector2d {
        let (idx, _) = self.segment_at(self.bounds().clamp(t));
        self.direction_near(idx)
            .map(|(_, dir)| dir.normalize())
            .unwrap_or_else(|| Vector2d::new(0.0, 0.0))
    }
}

/// Computes the running total of the distances between consecutive vertices.
fn cumulative_lengths(vertices: &[Point3d], dist: impl Fn(&Point3d, &Point3d) -> f64) -> Vec<f64> {
    std::iter::once(0.0)
        .chain(vertices.iter().tuple_windows().scan(0.0, |total, (a, b)| {
            *total += dist(a, b);
            Some(*total)
        }))
        .collect()
}
