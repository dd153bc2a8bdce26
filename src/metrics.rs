use nalgebra::Point3;
use serde::Serialize;

/// Euclidean distance of each consecutive pair, in order
pub fn segment_distances(points: &[Point3<f64>]) -> impl Iterator<Item = f64> + '_ {
    points
        .windows(2)
        .map(|pair| nalgebra::distance(&pair[0], &pair[1]))
}

/// Cumulative path length. Zero for fewer than two points.
pub fn total_length(points: &[Point3<f64>]) -> f64 {
    segment_distances(points).sum()
}

/// Point count and length of one polyline
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PathSummary {
    pub points: usize,
    pub length: f64,
}

impl PathSummary {
    pub fn of(points: &[Point3<f64>]) -> Self {
        PathSummary {
            points: points.len(),
            length: total_length(points),
        }
    }
}
