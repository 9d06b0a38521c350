use crate::error::{MeasureError, MeasureResult};
use crate::math::{flatten, Point2d, Point3d};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D or 3D coordinate in the centerline's reference system, in m.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Coord {
    Xy(Point2d),
    Xyz(Point3d),
}

impl Coord {
    /// Creates a 2D coordinate.
    pub fn xy(x: f64, y: f64) -> Self {
        Self::Xy(Point2d::new(x, y))
    }

    /// Creates a 3D coordinate.
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self::Xyz(Point3d::new(x, y, z))
    }

    /// Whether the coordinate carries an elevation.
    pub fn has_z(&self) -> bool {
        matches!(self, Self::Xyz(_))
    }

    /// The number of components, 2 or 3.
    pub fn dimension(&self) -> usize {
        match self {
            Self::Xy(_) => 2,
            Self::Xyz(_) => 3,
        }
    }

    /// The planar part of the coordinate.
    pub fn to_2d(&self) -> Point2d {
        match *self {
            Self::Xy(p) => p,
            Self::Xyz(p) => flatten(p),
        }
    }

    /// The coordinate as a 3D point, with `z = 0` if it has no elevation.
    pub fn to_3d(&self) -> Point3d {
        match *self {
            Self::Xy(p) => Point3d::new(p.x, p.y, 0.0),
            Self::Xyz(p) => p,
        }
    }
}

impl From<Point2d> for Coord {
    fn from(p: Point2d) -> Self {
        Self::Xy(p)
    }
}

impl From<Point3d> for Coord {
    fn from(p: Point3d) -> Self {
        Self::Xyz(p)
    }
}

impl From<[f64; 2]> for Coord {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::xy(x, y)
    }
}

impl From<[f64; 3]> for Coord {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::xyz(x, y, z)
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Self::xy(x, y)
    }
}

impl From<(f64, f64, f64)> for Coord {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::xyz(x, y, z)
    }
}

impl TryFrom<&[f64]> for Coord {
    type Error = MeasureError;

    fn try_from(values: &[f64]) -> MeasureResult<Self> {
        match *values {
            [x, y] => Ok(Self::xy(x, y)),
            [x, y, z] => Ok(Self::xyz(x, y, z)),
            _ => Err(MeasureError::bad_arity(values.len())),
        }
    }
}
