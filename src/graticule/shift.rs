//! Longitude shift for meridian labels.
//!
//! Meridian labels sit on the pole lines, which Robinson draws much shorter
//! than the equator. Each label is pulled toward the central meridian by a
//! correction that grows with its distance from it. Corrections are keyed
//! by that distance, the grid value minus `lon_0`, so label order and
//! duplication never affect alignment.

use std::collections::BTreeMap;

use crate::error::{MapError, Result};
use crate::geo::wrap_longitude;
use crate::graticule::{Axis, GraticuleLabel};

/// Eastern-hemisphere grid longitudes of the standard table, decreasing
pub const BASE_LONGITUDES: [i32; 9] = [160, 140, 120, 100, 80, 60, 40, 20, 0];

/// Correction in degrees for each entry of [`BASE_LONGITUDES`]
pub const BASE_SHIFTS: [f64; 9] = [10.0, 10.0, 9.0, 8.0, 8.0, 5.0, 2.0, 0.0, 0.0];

/// Tolerance when matching a grid value to an integer key
const KEY_TOLERANCE: f64 = 1e-9;

static STANDARD_TABLE: once_cell::sync::Lazy<ShiftTable> = once_cell::sync::Lazy::new(|| {
    let mut entries = BTreeMap::new();
    for (&lon, &shift) in BASE_LONGITUDES.iter().zip(BASE_SHIFTS.iter()) {
        entries.insert(lon, shift);
        if lon != 0 {
            entries.insert(-lon, -shift + 0.0);
        }
    }
    ShiftTable { entries }
});

/// Signed longitude corrections keyed by grid longitude
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftTable {
    entries: BTreeMap<i32, f64>,
}

impl ShiftTable {
    /// Build a table from eastern-hemisphere values and their corrections.
    ///
    /// The western hemisphere is the sign-flipped mirror; 0° appears once.
    pub fn from_base(longitudes: &[i32], shifts: &[f64]) -> Result<Self> {
        if longitudes.len() != shifts.len() {
            return Err(MapError::Alignment {
                message: format!(
                    "shift table has {} longitudes but {} corrections",
                    longitudes.len(),
                    shifts.len()
                ),
            });
        }

        let mut entries = BTreeMap::new();
        for (&lon, &shift) in longitudes.iter().zip(shifts) {
            if !(0..=180).contains(&lon) {
                return Err(MapError::Alignment {
                    message: format!("shift table longitude {} is outside [0, 180]", lon),
                });
            }
            if !shift.is_finite() {
                return Err(MapError::Alignment {
                    message: format!("shift for {}° is not finite", lon),
                });
            }
            if entries.insert(lon, shift).is_some() {
                return Err(MapError::Alignment {
                    message: format!("shift table lists {}° more than once", lon),
                });
            }
            if lon != 0 {
                entries.insert(-lon, -shift + 0.0);
            }
        }

        Ok(Self { entries })
    }

    /// The standard table for a 20° meridian spacing
    pub fn standard() -> Self {
        STANDARD_TABLE.clone()
    }

    /// Correction for a grid longitude
    pub fn get(&self, grid_value: f64) -> Result<f64> {
        let key = grid_key(grid_value)?;
        self.entries
            .get(&key)
            .copied()
            .ok_or_else(|| MapError::Alignment {
                message: format!("no longitude shift for grid value {}", grid_value),
            })
    }

    /// Corrections aligned with `grid_values`
    pub fn shifts_for(&self, grid_values: &[f64]) -> Result<Vec<f64>> {
        grid_values.iter().map(|&v| self.get(v)).collect()
    }

    /// Check every distinct grid value has an entry
    pub fn validate_covers(&self, grid_values: &[f64]) -> Result<()> {
        let missing: Vec<String> = grid_values
            .iter()
            .filter(|&&v| self.get(v).is_err())
            .map(|v| v.to_string())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MapError::Alignment {
                message: format!(
                    "no longitude shift for grid values: {}",
                    missing.join(", ")
                ),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending longitude order
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.entries.iter().map(|(&k, &v)| (k, v))
    }
}

impl Default for ShiftTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Western-hemisphere corrections in the positional form.
///
/// For a base sequence ordered from the largest longitude down to 0°, this
/// is the negated base reversed with the shared 0° entry dropped, i.e. the
/// corrections for -step, -2·step, ...
pub fn mirror_shift_sequence(base: &[f64]) -> Vec<f64> {
    base.iter().rev().skip(1).map(|&s| -s + 0.0).collect()
}

/// Corrections for `grid_values` from the standard table
pub fn compute_longitude_shift(grid_values: &[f64]) -> Result<Vec<f64>> {
    ShiftTable::standard().shifts_for(grid_values)
}

/// Distance of each meridian label from `lon_0`, the key its shift is
/// looked up by. Parallel labels are skipped.
pub fn meridian_offsets(labels: &[GraticuleLabel], lon_0: f64) -> Vec<f64> {
    labels
        .iter()
        .filter(|l| l.axis == Axis::Longitude)
        .map(|l| wrap_longitude(l.value - lon_0))
        .collect()
}

/// Apply `lon = lon - shift` to every meridian label of a map centred on
/// Greenwich.
///
/// Parallel labels pass through unchanged.
pub fn apply_longitude_shift(
    labels: &[GraticuleLabel],
    table: &ShiftTable,
) -> Result<Vec<GraticuleLabel>> {
    apply_longitude_shift_about(labels, table, 0.0)
}

/// Apply `lon = lon - shift(value - lon_0)` to every meridian label, pulling
/// each one toward the central meridian `lon_0`
pub fn apply_longitude_shift_about(
    labels: &[GraticuleLabel],
    table: &ShiftTable,
    lon_0: f64,
) -> Result<Vec<GraticuleLabel>> {
    labels
        .iter()
        .map(|label| {
            let mut label = label.clone();
            if label.axis == Axis::Longitude {
                label.lon -= table.get(wrap_longitude(label.value - lon_0))?;
            }
            Ok(label)
        })
        .collect()
}

fn grid_key(value: f64) -> Result<i32> {
    let rounded = value.round();
    if !value.is_finite() || (value - rounded).abs() > KEY_TOLERANCE || rounded.abs() > 180.0 {
        return Err(MapError::Alignment {
            message: format!("grid value {} is not a whole-degree longitude", value),
        });
    }
    Ok(rounded as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scenario_values() {
        let table = ShiftTable::standard();
        assert_eq!(table.get(160.0).unwrap(), 10.0);
        assert_eq!(table.get(-160.0).unwrap(), -10.0);
        assert_eq!(table.get(0.0).unwrap(), 0.0);
        assert_eq!(table.get(60.0).unwrap(), 5.0);
        assert_eq!(table.get(-40.0).unwrap(), -2.0);
        assert_eq!(table.len(), 17);
    }

    #[test]
    fn test_symmetry() {
        let table = ShiftTable::standard();
        for (lon, shift) in table.iter().filter(|&(lon, _)| lon != 0) {
            assert_eq!(shift, -table.get(-lon as f64).unwrap());
        }
        assert_eq!(table.get(0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_no_negative_zero() {
        let table = ShiftTable::standard();
        assert!(table.get(-20.0).unwrap().is_sign_positive());
        assert!(mirror_shift_sequence(&BASE_SHIFTS)[0].is_sign_positive());
    }

    #[test]
    fn test_mirror_shift_sequence() {
        let mirrored = mirror_shift_sequence(&BASE_SHIFTS);
        assert_eq!(mirrored, vec![0.0, -2.0, -5.0, -8.0, -8.0, -9.0, -10.0, -10.0]);

        // Agrees with the keyed table for -20 ... -160
        let keyed = ShiftTable::standard()
            .shifts_for(&[-20.0, -40.0, -60.0, -80.0, -100.0, -120.0, -140.0, -160.0])
            .unwrap();
        assert_eq!(mirrored, keyed);
    }

    #[test]
    fn test_compute_longitude_shift_follows_input_order() {
        let shifts = compute_longitude_shift(&[-160.0, 160.0, 0.0, 160.0, -160.0]).unwrap();
        assert_eq!(shifts, vec![-10.0, 10.0, 0.0, 10.0, -10.0]);
    }

    #[test]
    fn test_missing_grid_value_is_an_alignment_error() {
        let err = compute_longitude_shift(&[160.0, 150.0]).unwrap_err();
        assert!(matches!(err, MapError::Alignment { .. }));

        assert!(compute_longitude_shift(&[20.5]).is_err());
        assert!(compute_longitude_shift(&[f64::NAN]).is_err());
        assert!(compute_longitude_shift(&[200.0]).is_err());
    }

    #[test]
    fn test_validate_covers_lists_missing_values_once() {
        let table = ShiftTable::standard();
        assert!(table.validate_covers(&[160.0, -160.0, 0.0]).is_ok());

        let err = table.validate_covers(&[150.0, 150.0, 30.0]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Alignment error: no longitude shift for grid values: 150, 30"
        );
    }

    #[test]
    fn test_from_base() {
        let table = ShiftTable::from_base(&BASE_LONGITUDES, &BASE_SHIFTS).unwrap();
        assert_eq!(table, ShiftTable::standard());

        let custom = ShiftTable::from_base(&[150, 120, 90, 60, 30, 0], &[9.0, 8.0, 6.0, 3.0, 1.0, 0.0])
            .unwrap();
        assert_eq!(custom.get(-90.0).unwrap(), -6.0);
        assert_eq!(custom.len(), 11);

        assert!(ShiftTable::from_base(&[160, 140], &[10.0]).is_err());
        assert!(ShiftTable::from_base(&[160, 160], &[10.0, 9.0]).is_err());
        assert!(ShiftTable::from_base(&[-20], &[1.0]).is_err());
        assert!(ShiftTable::from_base(&[20], &[f64::NAN]).is_err());
    }

    #[test]
    fn test_apply_longitude_shift() {
        let labels = vec![
            GraticuleLabel::new(Axis::Longitude, 160.0, 160.0, 90.0),
            GraticuleLabel::new(Axis::Longitude, -140.0, -140.0, -90.0),
            GraticuleLabel::new(Axis::Latitude, 40.0, 180.0, 40.0),
        ];
        let shifted = apply_longitude_shift(&labels, &ShiftTable::standard()).unwrap();
        assert_eq!(shifted[0].lon, 150.0);
        assert_eq!(shifted[1].lon, -130.0);
        assert_eq!(shifted[2].lon, 180.0);
        assert_eq!(shifted[0].text, "160°E");
    }

    #[test]
    fn test_shift_pulls_toward_central_meridian() {
        // 130°W is 160° east of lon_0 = 70°E, so it moves 10° back west
        let labels = vec![
            GraticuleLabel::new(Axis::Longitude, -130.0, -130.0, 90.0),
            GraticuleLabel::new(Axis::Longitude, -90.0, -90.0, -90.0),
            GraticuleLabel::new(Axis::Longitude, 70.0, 70.0, 90.0),
        ];
        let table = ShiftTable::standard();
        assert_eq!(meridian_offsets(&labels, 70.0), vec![160.0, -160.0, 0.0]);

        let shifted = apply_longitude_shift_about(&labels, &table, 70.0).unwrap();
        assert_eq!(shifted[0].lon, -140.0);
        assert_eq!(shifted[1].lon, -80.0);
        assert_eq!(shifted[2].lon, 70.0);

        // Values are not on the table's own grid, only their offsets are
        assert!(apply_longitude_shift(&labels, &table).is_err());
    }
}
