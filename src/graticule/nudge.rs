//! Post-projection label nudges.
//!
//! Meridian labels move up or down off the pole lines, parallel labels move
//! left or right off the map edges, each by a fixed planar magnitude.

use super::{Axis, ProjectedLabel};
use crate::projection::NudgeOffset;

/// Direction of a nudge: `-1` for negative values, `+1` otherwise.
///
/// Zero counts as non-negative, so `0` and `+epsilon` move the same way.
pub fn nudge_sign(value: f64) -> f64 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Nudge every label of `axis`; labels of the other axis pass through.
///
/// Meridian labels move in `y` by the sign of their latitude; parallel
/// labels move in `x` by the sign of their longitude.
pub fn apply_label_nudge(
    labels: Vec<ProjectedLabel>,
    axis: Axis,
    nudge: NudgeOffset,
) -> Vec<ProjectedLabel> {
    apply_label_nudge_about(labels, axis, nudge, 0.0)
}

/// As [`apply_label_nudge`], with parallel labels moving by the side of
/// `lon_0` they sit on rather than by the sign of their longitude
pub fn apply_label_nudge_about(
    labels: Vec<ProjectedLabel>,
    axis: Axis,
    nudge: NudgeOffset,
    lon_0: f64,
) -> Vec<ProjectedLabel> {
    labels
        .into_iter()
        .map(|mut projected| {
            if projected.label.axis == axis {
                match axis {
                    Axis::Longitude => projected.y += nudge_sign(projected.label.lat) * nudge.y,
                    Axis::Latitude => {
                        projected.x += nudge_sign(projected.label.lon - lon_0) * nudge.x
                    }
                }
            }
            projected
        })
        .collect()
}
