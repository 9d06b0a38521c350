//! Validation of recorded measures against measures computed from geometry.
//!
//! Objects reference the centerline they are located on through a field
//! ending in `@railConnectionRef`. The recorded measures sit in sibling
//! properties named `@atMeasure` for points, and `@fromMeasure` and
//! `@toMeasure` for lines.

use std::collections::HashMap;
use std::fmt;

use crate::coord::Coord;
use crate::error::{MeasureError, MeasureResult};
use crate::line::LineModel;
use crate::projector::{Projector, PERPENDICULAR_TOLERANCE};
use crate::result::PointProjection;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use issues::{issues, MeasureIssue, RevisionOperation};

mod issues;

/// The suffix of fields referencing a centerline.
pub const RAIL_CONNECTION_REF: &str = "@railConnectionRef";

/// The default maximum difference between a recorded and computed measure, in m.
pub const DEFAULT_THRESHOLD: f64 = 0.015;

/// Settings for a measure analysis.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisConfig {
    /// Differences above this many m between the recorded and computed
    /// 3D measure are reported as issues.
    pub threshold: f64,
    /// The perpendicularity tolerance used when projecting, in m.
    pub perpendicular_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            perpendicular_tolerance: PERPENDICULAR_TOLERANCE,
        }
    }
}

#[cfg(feature = "serde")]
impl AnalysisConfig {
    /// Reads settings from JSON. Missing fields take their default value.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// The geometry of a rail object.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Geometry {
    Point(Coord),
    Line(Vec<Coord>),
}

/// A reference from one rail object to another.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectRef {
    /// The path of the referencing field, e.g. `RailConnectionInfo.@railConnectionRef`.
    pub field: String,
    /// The puic of the referenced object.
    pub value: String,
}

/// An object from the exchange data, with its geometry and flattened properties.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RailObject {
    pub path: String,
    pub puic: String,
    pub name: String,
    pub geometry: Option<Geometry>,
    pub refs: Vec<ObjectRef>,
    pub properties: HashMap<String, String>,
}

impl RailObject {
    /// Reads this object's geometry as a centerline.
    pub fn line_model(&self) -> MeasureResult<LineModel> {
        match &self.geometry {
            Some(Geometry::Line(coords)) => LineModel::new(coords.iter().copied()),
            _ => Err(MeasureError::invalid_geometry(format!(
                "{} has no line geometry",
                self.puic
            ))),
        }
    }
}

/// The kind of recorded measure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeasureType {
    At,
    From,
    To,
}

impl MeasureType {
    /// The attribute name the measure is recorded under.
    pub fn attribute(&self) -> &'static str {
        match self {
            MeasureType::At => "atMeasure",
            MeasureType::From => "fromMeasure",
            MeasureType::To => "toMeasure",
        }
    }

    /// The property holding this measure for the given reference field.
    pub fn field_for(&self, ref_field: &str) -> String {
        ref_field.replace(RAIL_CONNECTION_REF, &format!("@{}", self.attribute()))
    }
}

impl fmt::Display for MeasureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

/// A recorded measure compared against the computed one.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MeasureRow {
    pub object_path: String,
    pub object_puic: String,
    pub object_name: String,
    /// The field referencing the centerline.
    pub ref_field: String,
    /// The puic of the centerline.
    pub ref_field_value: String,
    /// The name of the centerline.
    pub ref_field_name: String,
    pub measure_type: MeasureType,
    /// The measure recorded in the exchange data.
    pub imx_measure: Option<f64>,
    /// The computed 3D measure, rounded to mm.
    pub calculated_measure_3d: Option<f64>,
    pub abs_imx_vs_3d: Option<f64>,
    pub calculated_measure_2d: f64,
    pub abs_imx_vs_2d: Option<f64>,
}

/// Compares recorded measures against the object geometry.
#[derive(Clone, Debug, Default)]
pub struct MeasureAnalysis {
    config: AnalysisConfig,
}

/// The centerline models of an analysis, by puic.
type LineCache<'o> = HashMap<&'o str, MeasureResult<LineModel>>;

impl MeasureAnalysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Computes a row for every recorded measure of every object located on a centerline.
    ///
    /// Objects whose centerline is missing or malformed are logged and skipped.
    pub fn run(&self, objects: &[RailObject]) -> Vec<MeasureRow> {
        let index = objects
            .iter()
            .map(|obj| (obj.puic.as_str(), obj))
            .collect::<HashMap<_, _>>();
        let lines = Self::centerlines(objects, &index);

        #[cfg(feature = "parallel")]
        let rows = objects
            .par_iter()
            .flat_map_iter(|obj| self.measure_object(obj, &index, &lines))
            .collect::<Vec<_>>();
        #[cfg(not(feature = "parallel"))]
        let rows = objects
            .iter()
            .flat_map(|obj| self.measure_object(obj, &index, &lines))
            .collect::<Vec<_>>();

        log::info!(
            "measured {} references on {} centerlines",
            rows.len(),
            lines.len()
        );
        rows
    }

    /// Reduces rows to the issues exceeding the configured threshold.
    pub fn issues(&self, rows: &[MeasureRow]) -> Vec<MeasureIssue> {
        issues(rows, self.config.threshold)
    }

    /// Builds a line model once for every referenced centerline.
    fn centerlines<'o>(
        objects: &'o [RailObject],
        index: &HashMap<&'o str, &'o RailObject>,
    ) -> LineCache<'o> {
        let mut lines = LineCache::new();
        for obj in objects.iter().filter(|obj| is_measurable(obj)) {
            for r in obj.refs.iter().filter(|r| is_rail_connection_ref(&r.field)) {
                let Some(&rail_con) = index.get(r.value.as_str()) else {
                    continue;
                };
                lines.entry(rail_con.puic.as_str()).or_insert_with(|| {
                    let line = rail_con.line_model();
                    if let Err(err) = &line {
                        log::warn!("rail connection {} is unusable: {}", rail_con.puic, err);
                    }
                    line
                });
            }
        }
        lines
    }

    fn measure_object(
        &self,
        obj: &RailObject,
        index: &HashMap<&str, &RailObject>,
        lines: &LineCache,
    ) -> Vec<MeasureRow> {
        let mut rows = vec![];
        let Some(geometry) = &obj.geometry else {
            return rows;
        };

        for r in obj.refs.iter().filter(|r| is_rail_connection_ref(&r.field)) {
            let Some(&rail_con) = index.get(r.value.as_str()) else {
                log::warn!("rail connection {} not found for {}", r.value, obj.puic);
                continue;
            };
            let Some(Ok(line)) = lines.get(rail_con.puic.as_str()) else {
                continue;
            };

            log::info!("calculating measure for {} {}", obj.puic, rail_con.puic);
            let projector = Projector::with_tolerance(line, self.config.perpendicular_tolerance);
            let row = |measure_type: MeasureType, projection: &PointProjection| {
                let measure = extract_measure(&r.field, measure_type, &obj.properties);
                calculate_row(obj, &r.field, rail_con, measure_type, measure, projection)
            };

            match geometry {
                Geometry::Point(point) => {
                    rows.push(row(MeasureType::At, &projector.project(*point)));
                }
                Geometry::Line(coords) => match projector.project_line(coords) {
                    Ok(res) => {
                        rows.push(row(MeasureType::From, &res.from_result));
                        rows.push(row(MeasureType::To, &res.to_result));
                    }
                    Err(err) => {
                        log::warn!("skipping {}: {}", obj.puic, err);
                    }
                },
            }
        }
        rows
    }
}

fn is_measurable(obj: &RailObject) -> bool {
    obj.geometry.is_some()
}

fn is_rail_connection_ref(field: &str) -> bool {
    field.ends_with(RAIL_CONNECTION_REF)
}

/// Reads a recorded measure. Missing and empty values are absent.
fn extract_measure(
    ref_field: &str,
    measure_type: MeasureType,
    properties: &HashMap<String, String>,
) -> Option<f64> {
    let field = measure_type.field_for(ref_field);
    let value = properties.get(&field).filter(|v| !v.is_empty())?;
    match value.trim().parse() {
        Ok(measure) => Some(measure),
        Err(err) => {
            log::warn!("cannot read {} value {:?}: {}", field, value, err);
            None
        }
    }
}

/// Rounds a measure to mm.
fn round_mm(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn calculate_row(
    obj: &RailObject,
    ref_field: &str,
    rail_con: &RailObject,
    measure_type: MeasureType,
    measure: Option<f64>,
    projection: &PointProjection,
) -> MeasureRow {
    MeasureRow {
        object_path: obj.path.clone(),
        object_puic: obj.puic.clone(),
        object_name: obj.name.clone(),
        ref_field: ref_field.to_string(),
        ref_field_value: rail_con.puic.clone(),
        ref_field_name: rail_con.name.clone(),
        measure_type,
        imx_measure: measure,
        calculated_measure_3d: projection.measure_3d.map(round_mm),
        abs_imx_vs_3d: measure
            .zip(projection.measure_3d)
            .map(|(m, c)| (m - c).abs()),
        calculated_measure_2d: projection.measure_2d,
        abs_imx_vs_2d: measure.map(|m| (m - projection.measure_2d).abs()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn rail_ref(puic: &str) -> ObjectRef {
        ObjectRef {
            field: "RailConnectionInfo.@railConnectionRef".to_string(),
            value: puic.to_string(),
        }
    }

    #[test]
    fn measure_fields() {
        let field = "RailConnectionInfo.@railConnectionRef";
        assert_eq!(MeasureType::At.field_for(field), "RailConnectionInfo.@atMeasure");
        assert_eq!(MeasureType::To.field_for(field), "RailConnectionInfo.@toMeasure");
        assert_eq!(MeasureType::From.to_string(), "fromMeasure");
    }

    #[test]
    fn extracts_measures() {
        let field = "RailConnectionInfo.@railConnectionRef";
        let properties = props(&[
            ("RailConnectionInfo.@atMeasure", "12.5"),
            ("RailConnectionInfo.@fromMeasure", ""),
            ("RailConnectionInfo.@toMeasure", "twelve"),
        ]);
        assert_eq!(extract_measure(field, MeasureType::At, &properties), Some(12.5));
        assert_eq!(extract_measure(field, MeasureType::From, &properties), None);
        assert_eq!(extract_measure(field, MeasureType::To, &properties), None);
        assert_eq!(extract_measure("Other.@railConnectionRef", MeasureType::At, &properties), None);
    }

    #[test]
    fn rounds_to_mm() {
        assert_eq!(round_mm(7.0710678), 7.071);
        assert_eq!(round_mm(2.0), 2.0);
    }

    #[test]
    fn point_row() {
        let rail_con = RailObject {
            puic: "rc".to_string(),
            name: "RC 1".to_string(),
            geometry: Some(Geometry::Line(vec![
                Coord::xyz(0.0, 0.0, 0.0),
                Coord::xyz(10.0, 0.0, 10.0),
            ])),
            ..Default::default()
        };
        let signal = RailObject {
            path: "Signal".to_string(),
            puic: "sig".to_string(),
            geometry: Some(Geometry::Point(Coord::xy(5.0, 2.0))),
            refs: vec![rail_ref("rc")],
            properties: props(&[("RailConnectionInfo.@atMeasure", "7.000")]),
            ..Default::default()
        };

        let rows = MeasureAnalysis::default().run(&[rail_con, signal]);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.object_puic, "sig");
        assert_eq!(row.ref_field_value, "rc");
        assert_eq!(row.ref_field_name, "RC 1");
        assert_eq!(row.measure_type, MeasureType::At);
        assert_eq!(row.calculated_measure_3d, Some(7.071));
        assert_approx_eq!(row.calculated_measure_2d, 5.0);
        assert_approx_eq!(row.abs_imx_vs_3d.unwrap(), 0.0710678, 1e-6);
        assert_approx_eq!(row.abs_imx_vs_2d.unwrap(), 2.0);
    }
}
