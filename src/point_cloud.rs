//! Point cloud overlays.
//!
//! Only x/y/z are kept. Clouds are drawn next to the corridor and never feed
//! the geometry pipeline.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::Point3;
use pcd_rs::DynReader;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{CorridorError, Result};

/// Load a point cloud. `.ply` and `.pcd` files go through their parsers;
/// anything else (`.xyz`, `.pts`, `.txt`) is read as ASCII `x y z ...` rows.
pub fn load_point_cloud(path: &Path) -> Result<Vec<Point3<f64>>> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let points = match extension.as_str() {
        "pcd" => read_pcd(path)?,
        "ply" => {
            let file = File::open(path).map_err(|e| CorridorError::io(path, e))?;
            read_ply(&mut BufReader::new(file), path)?
        }
        _ => {
            let file = File::open(path).map_err(|e| CorridorError::io(path, e))?;
            read_xyz(BufReader::new(file), path)?
        }
    };

    log::info!("Loaded {} points from: {}", points.len(), path.display());
    Ok(points)
}

fn read_ply<R: BufRead>(reader: &mut R, path: &Path) -> Result<Vec<Point3<f64>>> {
    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(reader).map_err(|e| CorridorError::PointCloud {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let vertices = match ply.payload.get("vertex") {
        Some(v) => v,
        None => {
            return Err(CorridorError::PointCloud {
                path: path.to_path_buf(),
                message: "no vertex element".to_string(),
            })
        }
    };

    vertices
        .iter()
        .enumerate()
        .map(|(i, vertex)| {
            let coord = |key: &str| {
                vertex.get(key).and_then(property_as_f64).ok_or_else(|| {
                    CorridorError::PointCloud {
                        path: path.to_path_buf(),
                        message: format!("vertex {} has no numeric '{}'", i, key),
                    }
                })
            };
            Ok(Point3::new(coord("x")?, coord("y")?, coord("z")?))
        })
        .collect()
}

fn read_pcd(path: &Path) -> Result<Vec<Point3<f64>>> {
    let cloud_err = |message: String| CorridorError::PointCloud {
        path: path.to_path_buf(),
        message,
    };

    let reader = DynReader::open(path).map_err(|e| cloud_err(e.to_string()))?;
    reader
        .enumerate()
        .map(|(i, record)| {
            let record = record.map_err(|e| cloud_err(e.to_string()))?;
            // x/y/z are the leading fields, stored as either F4 or F8
            record
                .to_xyz::<f64>()
                .or_else(|| {
                    record
                        .to_xyz::<f32>()
                        .map(|[x, y, z]| [x as f64, y as f64, z as f64])
                })
                .map(|[x, y, z]| Point3::new(x, y, z))
                .ok_or_else(|| cloud_err(format!("point {} has no numeric x/y/z", i)))
        })
        .collect()
}

fn property_as_f64(property: &Property) -> Option<f64> {
    match *property {
        Property::Float(v) => Some(v as f64),
        Property::Double(v) => Some(v),
        Property::Int(v) => Some(v as f64),
        Property::UInt(v) => Some(v as f64),
        Property::Short(v) => Some(v as f64),
        Property::UShort(v) => Some(v as f64),
        Property::Char(v) => Some(v as f64),
        Property::UChar(v) => Some(v as f64),
        _ => None,
    }
}

fn read_xyz<R: BufRead>(reader: R, path: &Path) -> Result<Vec<Point3<f64>>> {
    let mut points = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CorridorError::io(path, e))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();

        // .pts files open with a bare point count
        if points.is_empty() && tokens.len() == 1 && tokens[0].parse::<usize>().is_ok() {
            continue;
        }

        let coords: Vec<f64> = tokens
            .iter()
            .take(3)
            .map(|t| t.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| CorridorError::PointCloud {
                path: path.to_path_buf(),
                message: format!("line {} is not numeric", idx + 1),
            })?;

        if coords.len() < 3 {
            return Err(CorridorError::PointCloud {
                path: path.to_path_buf(),
                message: format!("line {} has fewer than 3 coordinates", idx + 1),
            });
        }
        points.push(Point3::new(coords[0], coords[1], coords[2]));
    }

    Ok(points)
}
