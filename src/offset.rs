//! Lateral offset paths on either side of the camera path.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{CorridorError, Result};
use crate::heading::Heading;

pub const DEFAULT_DISTANCE: f64 = 1.0;
pub const DEFAULT_SPACING_THRESHOLD: f64 = 1.0;

/// Standoff distance and minimum spacing between kept offset points
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OffsetConfig {
    pub distance: f64,
    pub spacing_threshold: f64,
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            distance: DEFAULT_DISTANCE,
            spacing_threshold: DEFAULT_SPACING_THRESHOLD,
        }
    }
}

impl OffsetConfig {
    pub fn new(distance: f64, spacing_threshold: f64) -> Result<Self> {
        let config = Self {
            distance,
            spacing_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.distance.is_finite() || self.distance <= 0.0 {
            return Err(CorridorError::InvalidParameter(format!(
                "distance must be positive, got {}",
                self.distance
            )));
        }
        if !self.spacing_threshold.is_finite() || self.spacing_threshold < 0.0 {
            return Err(CorridorError::InvalidParameter(format!(
                "spacing threshold must be non-negative, got {}",
                self.spacing_threshold
            )));
        }
        Ok(())
    }
}

/// Left and right offset sequences. Always the same length.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetPaths {
    pub left: Vec<Point3<f64>>,
    pub right: Vec<Point3<f64>>,
}

impl OffsetPaths {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

/// Points `distance` to the left and right of `position`, perpendicular to
/// the horizontal bearing `azimuth`. Height is unchanged.
pub fn offset_pair(position: &Point3<f64>, azimuth: f64, distance: f64) -> (Point3<f64>, Point3<f64>) {
    let (sin_az, cos_az) = azimuth.sin_cos();
    let dx = distance * sin_az;
    let dy = distance * cos_az;

    let left = Point3::new(position.x - dx, position.y + dy, position.z);
    let right = Point3::new(position.x + dx, position.y - dy, position.z);
    (left, right)
}

/// Project offset pairs for every segment start and thin them by spacing.
///
/// The first pair is always kept. A later pair is kept only when both its
/// points are at least `spacing_threshold` from the last kept pair; rejected
/// pairs are never compared against.
pub fn lateral_offsets(
    positions: &[Point3<f64>],
    headings: &[Heading],
    config: &OffsetConfig,
) -> Result<OffsetPaths> {
    config.validate()?;

    let segments = positions.len().saturating_sub(1);
    if headings.len() < segments {
        return Err(CorridorError::InvalidInput(format!(
            "{} headings for {} segments",
            headings.len(),
            segments
        )));
    }

    let candidates = positions
        .iter()
        .zip(headings)
        .take(segments)
        .map(|(p, h)| offset_pair(p, h.azimuth_rad, config.distance));

    let (paths, _) = candidates.fold(
        (OffsetPaths::default(), None::<(Point3<f64>, Point3<f64>)>),
        |(mut paths, last), (left, right)| {
            let accept = match &last {
                None => true,
                Some((last_left, last_right)) => {
                    nalgebra::distance(&left, last_left) >= config.spacing_threshold
                        && nalgebra::distance(&right, last_right) >= config.spacing_threshold
                }
            };

            if accept {
                paths.left.push(left);
                paths.right.push(right);
                (paths, Some((left, right)))
            } else {
                (paths, last)
            }
        },
    );

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heading::{trajectory_headings, DegeneratePolicy};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    fn line_x(n: usize, step: f64) -> Vec<Point3<f64>> {
        (0..n).map(|i| Point3::new(i as f64 * step, 0.0, 0.0)).collect()
    }

    fn offsets_for(positions: &[Point3<f64>], config: OffsetConfig) -> OffsetPaths {
        let headings = trajectory_headings(positions, DegeneratePolicy::Reject).unwrap();
        lateral_offsets(positions, &headings, &config).unwrap()
    }

    #[test]
    fn test_straight_line_scenario() {
        let positions = line_x(3, 1.0);
        let paths = offsets_for(&positions, OffsetConfig::default());

        assert_eq!(paths.len(), 2);
        assert_abs_diff_eq!(paths.left[0], Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(paths.left[1], Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(paths.right[0], Point3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(paths.right[1], Point3::new(1.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_offset_pair_is_symmetric() {
        let p = Point3::new(3.0, -2.0, 7.5);
        for azimuth in [0.0, 0.3, FRAC_PI_2, 2.5, -1.1] {
            let (left, right) = offset_pair(&p, azimuth, 2.5);
            assert_relative_eq!(nalgebra::distance(&p, &left), 2.5, epsilon = 1e-12);
            assert_relative_eq!(nalgebra::distance(&p, &right), 2.5, epsilon = 1e-12);
            assert_abs_diff_eq!(left - p, -(right - p), epsilon = 1e-12);
            assert_eq!(left.z, p.z);
            assert_eq!(right.z, p.z);
        }
    }

    #[test]
    fn test_left_is_left_of_travel() {
        // Travelling +y, left should be -x
        let (left, right) = offset_pair(&Point3::origin(), FRAC_PI_2, 1.0);
        assert_relative_eq!(left.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(right.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dense_samples_are_thinned() {
        // 0.25 spacing: every 4th candidate reaches the 1.0 threshold
        let positions = line_x(13, 0.25);
        let paths = offsets_for(&positions, OffsetConfig::default());

        let xs: Vec<f64> = paths.left.iter().map(|p| p.x).collect();
        assert_eq!(xs.len(), 3);
        assert_relative_eq!(xs[0], 0.0);
        assert_relative_eq!(xs[1], 1.0);
        assert_relative_eq!(xs[2], 2.0);
    }

    #[test]
    fn test_compares_against_last_accepted_not_last_candidate() {
        // Candidates at x = 0, 0.6, 1.2: 0.6 is rejected, 1.2 is 1.2 from the
        // accepted origin even though it is only 0.6 from the rejected one.
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.6, 0.0, 0.0),
            Point3::new(1.2, 0.0, 0.0),
            Point3::new(1.3, 0.0, 0.0),
        ];
        let paths = offsets_for(&positions, OffsetConfig::default());
        assert_eq!(paths.len(), 2);
        assert_relative_eq!(paths.left[1].x, 1.2);
    }

    #[test]
    fn test_both_sides_must_pass() {
        // Second candidate: left moves ~0.13 from the kept left point while
        // right moves ~1.01, so the whole pair is dropped.
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let az = std::f64::consts::FRAC_PI_6;
        let headings = vec![
            Heading::between(&Point3::origin(), &Point3::new(1.0, 0.0, 0.0)).unwrap(),
            Heading::between(&Point3::origin(), &Point3::new(az.cos(), az.sin(), 0.0)).unwrap(),
        ];

        let (left, right) = offset_pair(&positions[1], headings[1].azimuth_rad, 1.0);
        assert!(nalgebra::distance(&left, &Point3::new(0.0, 1.0, 0.0)) < 1.0);
        assert!(nalgebra::distance(&right, &Point3::new(0.0, -1.0, 0.0)) >= 1.0);

        let paths = lateral_offsets(&positions, &headings, &OffsetConfig::default()).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths.right.len(), 1);
    }

    #[test]
    fn test_spacing_invariant_for_thresholds() {
        let positions: Vec<Point3<f64>> = (0..200)
            .map(|i| {
                let t = i as f64 * 0.05;
                Point3::new(5.0 * t.cos(), 5.0 * t.sin(), 0.1 * t)
            })
            .collect();
        let headings = trajectory_headings(&positions, DegeneratePolicy::Reject).unwrap();

        for threshold in [0.0, 0.1, 0.5, 1.0, 3.0] {
            let config = OffsetConfig::new(1.5, threshold).unwrap();
            let paths = lateral_offsets(&positions, &headings, &config).unwrap();

            assert!(!paths.is_empty());
            assert!(paths.len() <= positions.len() - 1);
            assert_eq!(paths.left.len(), paths.right.len());
            for side in [&paths.left, &paths.right] {
                for pair in side.windows(2) {
                    assert!(nalgebra::distance(&pair[0], &pair[1]) >= threshold);
                }
            }
        }
    }

    #[test]
    fn test_zero_threshold_keeps_every_candidate() {
        let positions = line_x(6, 0.1);
        let paths = offsets_for(&positions, OffsetConfig::new(1.0, 0.0).unwrap());
        assert_eq!(paths.len(), 5);
    }

    #[test]
    fn test_degenerate_inputs() {
        let config = OffsetConfig::default();
        assert!(lateral_offsets(&[], &[], &config).unwrap().is_empty());
        assert!(lateral_offsets(&[Point3::origin()], &[], &config)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_missing_headings_rejected() {
        let positions = line_x(4, 1.0);
        let headings = trajectory_headings(&positions[..2], DegeneratePolicy::Reject).unwrap();
        let err = lateral_offsets(&positions, &headings, &OffsetConfig::default()).unwrap_err();
        assert!(matches!(err, CorridorError::InvalidInput(_)));
    }

    #[test]
    fn test_config_validation() {
        assert!(OffsetConfig::new(0.0, 1.0).is_err());
        assert!(OffsetConfig::new(-1.0, 1.0).is_err());
        assert!(OffsetConfig::new(1.0, -0.1).is_err());
        assert!(OffsetConfig::new(f64::NAN, 1.0).is_err());
        assert!(OffsetConfig::new(2.0, 0.0).is_ok());
    }
}
