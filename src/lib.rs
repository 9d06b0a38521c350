//! Projection of points and lines onto rail centerlines.
//!
//! A centerline is a 2D or 3D polyline along which positions are given as a
//! measure, the arc length from its first vertex. [LineModel] holds a
//! centerline with its precomputed arc lengths, and [Projector] finds the
//! measure of the closest position on it to a query point, along with the
//! side of the line the point lies on and how it drops onto the line.
//!
//! The [analysis] module compares measures recorded in exchange data against
//! the computed ones.

pub use cgmath;
pub use coord::Coord;
pub use error::{MeasureError, MeasureResult};
pub use line::LineModel;
pub use projector::{Projector, PERPENDICULAR_TOLERANCE};
pub use result::{LineProjection, PointProjection, Relationship, Side};
pub use util::Interval;

pub mod analysis;
mod coord;
mod error;
mod geojson;
mod line;
pub mod math;
mod projector;
mod result;
mod util;
