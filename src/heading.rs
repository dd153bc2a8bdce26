//! Per-segment heading of a camera path.
//!
//! Azimuth is the horizontal bearing `atan2(dy, dx)`; elevation is the angle
//! above the horizontal plane `asin(dz / |D|)`.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{CorridorError, Result};

/// What to do with a zero-length segment (repeated position)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Borrow the heading of the nearest valid segment
    #[default]
    ReusePrevious,
    /// Fail with a geometry domain error
    Reject,
}

/// Direction and angles of one segment between consecutive positions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub direction: Vector3<f64>,
    pub normalized: Vector3<f64>,
    pub azimuth_rad: f64,
    pub elevation_rad: f64,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    /// Set when the segment had zero length and the angles were borrowed
    pub degenerate: bool,
}

impl Heading {
    /// Heading from `a` to `b`. `None` when the two points coincide.
    pub fn between(a: &Point3<f64>, b: &Point3<f64>) -> Option<Self> {
        let direction = b - a;
        let magnitude = direction.norm();
        if magnitude == 0.0 || !magnitude.is_finite() {
            return None;
        }

        let azimuth_rad = direction.y.atan2(direction.x);
        // Clamp guards against rounding pushing the ratio past +/-1
        let elevation_rad = (direction.z / magnitude).clamp(-1.0, 1.0).asin();

        Some(Heading {
            direction,
            normalized: direction / magnitude,
            azimuth_rad,
            elevation_rad,
            azimuth_deg: azimuth_rad.to_degrees(),
            elevation_deg: elevation_rad.to_degrees(),
            degenerate: false,
        })
    }

    fn borrowed_from(valid: &Heading) -> Self {
        Heading {
            direction: Vector3::zeros(),
            degenerate: true,
            ..valid.clone()
        }
    }
}

/// One heading per consecutive position pair, in index order.
///
/// Fewer than two positions yields an empty vector.
pub fn trajectory_headings(
    positions: &[Point3<f64>],
    policy: DegeneratePolicy,
) -> Result<Vec<Heading>> {
    let raw: Vec<Option<Heading>> = positions
        .windows(2)
        .map(|pair| Heading::between(&pair[0], &pair[1]))
        .collect();

    match policy {
        DegeneratePolicy::Reject => raw
            .into_iter()
            .enumerate()
            .map(|(segment, h)| h.ok_or(CorridorError::GeometryDomain { segment }))
            .collect(),
        DegeneratePolicy::ReusePrevious => fill_degenerate(raw),
    }
}

fn fill_degenerate(raw: Vec<Option<Heading>>) -> Result<Vec<Heading>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    // A leading run of zero-length segments takes the first valid heading
    let mut last_valid = raw
        .iter()
        .flatten()
        .next()
        .cloned()
        .ok_or(CorridorError::GeometryDomain { segment: 0 })?;

    let mut degenerate = 0usize;
    let headings: Vec<Heading> = raw
        .into_iter()
        .map(|h| match h {
            Some(h) => {
                last_valid = h.clone();
                h
            }
            None => {
                degenerate += 1;
                Heading::borrowed_from(&last_valid)
            }
        })
        .collect();

    if degenerate > 0 {
        log::warn!(
            "{} of {} segments have zero length, reusing neighbouring headings",
            degenerate,
            headings.len()
        );
    }

    Ok(headings)
}
