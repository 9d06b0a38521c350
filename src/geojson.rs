//! GeoJSON export of projection results, for inspecting them on a map.

use crate::line::LineModel;
use crate::math::Point3d;
use crate::result::{LineProjection, PointProjection};
use serde_json::{json, Value};

fn position(p: Point3d) -> Value {
    json!([p.x, p.y, p.z])
}

fn feature(geometry: Value, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": properties,
    })
}

fn point(p: Point3d) -> Value {
    json!({ "type": "Point", "coordinates": position(p) })
}

fn line_string(points: impl IntoIterator<Item = Point3d>) -> Value {
    json!({
        "type": "LineString",
        "coordinates": points.into_iter().map(position).collect::<Vec<_>>(),
    })
}

fn collection(features: Vec<Value>) -> Value {
    json!({ "type": "FeatureCollection", "features": features })
}

fn centerline(line: &LineModel) -> Value {
    line_string(line.vertices().iter().copied())
}

impl PointProjection<'_> {
    /// The features describing this projection: the input point, the line,
    /// the projected point with its measures, and the drop from one to the other.
    pub fn geojson_features(&self) -> Vec<Value> {
        let query = self.query_point.to_3d();
        vec![
            feature(point(query), json!({ "type": "input_point" })),
            feature(centerline(self.line), json!({ "type": "projection_line" })),
            feature(
                point(self.projected_point),
                json!({
                    "type": "projected_point",
                    "measure_2d": self.measure_2d,
                    "measure_3d": self.measure_3d,
                    "side": self.side.as_str(),
                    "projection_status": self.relationship.as_str(),
                }),
            ),
            feature(
                line_string([query, self.projected_point]),
                json!({ "type": "perpendicular_line" }),
            ),
        ]
    }

    /// This projection as a GeoJSON feature collection.
    pub fn to_geojson(&self) -> Value {
        collection(self.geojson_features())
    }
}

impl LineProjection<'_> {
    /// The features of both end projections, plus the projected span between them.
    pub fn geojson_features(&self) -> Vec<Value> {
        let mut features = self.from_result.geojson_features();
        features.extend(self.to_result.geojson_features());
        features.push(feature(
            line_string([
                self.from_result.projected_point,
                self.to_result.projected_point,
            ]),
            json!({ "type": "projected_segment" }),
        ));
        features
    }

    /// This projection as a GeoJSON feature collection.
    pub fn to_geojson(&self) -> Value {
        collection(self.geojson_features())
    }
}
