//! Plain-text and JSON reports.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{CorridorError, Result};
use crate::pipeline::BatchSummary;

pub const TRAJECTORY_HEADER: &str = "Camera Trajectory Points:";
pub const LEFT_HEADER: &str = "Left Points:";
pub const RIGHT_HEADER: &str = "Right Points:";
pub const LEFT_DISTANCES_HEADER: &str = "Distances between consecutive furthest left points:";
pub const RIGHT_DISTANCES_HEADER: &str = "Distances between consecutive furthest right points:";

/// Trajectory, left and right points, one `x y z` row each
pub fn write_points<W: Write>(
    out: &mut W,
    trajectory: &[Point3<f64>],
    left: &[Point3<f64>],
    right: &[Point3<f64>],
) -> std::io::Result<()> {
    writeln!(out, "{}", TRAJECTORY_HEADER)?;
    write_rows(out, trajectory)?;

    writeln!(out, "\n{}", LEFT_HEADER)?;
    write_rows(out, left)?;

    writeln!(out, "\n{}", RIGHT_HEADER)?;
    write_rows(out, right)
}

fn write_rows<W: Write>(out: &mut W, points: &[Point3<f64>]) -> std::io::Result<()> {
    for p in points {
        writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
    }
    Ok(())
}

/// Left and right segment distances, one value per line
pub fn write_distances<W: Write>(out: &mut W, left: &[f64], right: &[f64]) -> std::io::Result<()> {
    writeln!(out, "{}", LEFT_DISTANCES_HEADER)?;
    for d in left {
        writeln!(out, "{}", d)?;
    }

    writeln!(out, "\n{}", RIGHT_DISTANCES_HEADER)?;
    for d in right {
        writeln!(out, "{}", d)?;
    }
    Ok(())
}

pub fn write_points_report(
    path: &Path,
    trajectory: &[Point3<f64>],
    left: &[Point3<f64>],
    right: &[Point3<f64>],
) -> Result<()> {
    with_file(path, |out| write_points(out, trajectory, left, right))
}

pub fn write_distances_report(path: &Path, left: &[f64], right: &[f64]) -> Result<()> {
    with_file(path, |out| write_distances(out, left, right))
}

/// Pretty-printed JSON summary of a batch run
pub fn write_summary_json(path: &Path, summary: &BatchSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| CorridorError::InvalidInput(format!("summary serialization: {}", e)))?;
    with_file(path, |out| writeln!(out, "{}", json))
}

fn with_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).map_err(|e| CorridorError::io(path, e))?;
    let mut out = BufWriter::new(file);
    write(&mut out)
        .and_then(|_| out.flush())
        .map_err(|e| CorridorError::io(path, e))
}
