use super::{MeasureRow, RAIL_CONNECTION_REF};
#[cfg(feature = "serde")]
use serde::Serialize;

/// The change proposed to fix an issue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum RevisionOperation {
    UpdateAttribute,
}

/// A recorded measure that differs too much from the computed one.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MeasureIssue {
    pub object_path: String,
    pub object_puic: String,
    /// The attribute to update, e.g. `RailConnectionInfo.@atMeasure`.
    pub attribute: String,
    pub operation: RevisionOperation,
    /// The recorded measure.
    pub value_old: f64,
    /// The computed 3D measure.
    pub value_new: f64,
    pub comment: String,
}

/// Selects the rows whose recorded measure differs from the computed 3D
/// measure by more than `threshold` m.
///
/// Rows without a recorded or a 3D measure are never issues.
pub fn issues(rows: &[MeasureRow], threshold: f64) -> Vec<MeasureIssue> {
    let comment = format!(
        "Absolute delta between calculated and IMX measures exceeds the threshold of {threshold}m."
    );

    rows.iter()
        .filter_map(|row| {
            let value_old = row.imx_measure?;
            let value_new = row.calculated_measure_3d?;
            ((value_old - value_new).abs() > threshold).then(|| MeasureIssue {
                object_path: row.object_path.clone(),
                object_puic: row.object_puic.clone(),
                attribute: row
                    .ref_field
                    .replace(RAIL_CONNECTION_REF, &format!("@{}", row.measure_type)),
                operation: RevisionOperation::UpdateAttribute,
                value_old,
                value_new,
                comment: comment.clone(),
            })
        })
        .collect()
}
