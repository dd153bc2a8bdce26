//! Pose trajectory loading
//!
//! Reads whitespace-delimited pose logs of the form
//! `timestamp x y z qx qy qz qw [extra...]` into a time-ordered [`Trajectory`].

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use nalgebra::{Point3, Quaternion};
use serde::{Deserialize, Serialize};

use crate::error::{CorridorError, Result};

/// Number of leading fields kept from every pose line
pub const POSE_FIELDS: usize = 8;

/// One timestamped 6-DoF camera pose
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    pub timestamp: f64,
    pub position: Point3<f64>,
    /// Stored as (w, x, y, z). Carried through, not used for offsets.
    pub orientation: Quaternion<f64>,
}

impl PoseSample {
    /// Build a sample from the 8 leading fields of a pose line (file order)
    fn from_fields(fields: &[f64; POSE_FIELDS]) -> Self {
        let [timestamp, x, y, z, qx, qy, qz, qw] = *fields;
        PoseSample {
            timestamp,
            position: Point3::new(x, y, z),
            orientation: Quaternion::new(qw, qx, qy, qz),
        }
    }
}

/// Time-ordered camera trajectory. Immutable once loaded.
#[derive(Clone, Debug)]
pub struct Trajectory {
    source: Option<PathBuf>,
    samples: Vec<PoseSample>,
    positions: Vec<Point3<f64>>,
}

impl Trajectory {
    /// Build a trajectory from samples in any order; sorts stably by timestamp
    pub fn from_samples(mut samples: Vec<PoseSample>, source: Option<PathBuf>) -> Self {
        samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        let positions = samples.iter().map(|s| s.position).collect();
        Trajectory {
            source,
            samples,
            positions,
        }
    }

    pub fn samples(&self) -> &[PoseSample] {
        &self.samples
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn timestamps(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.timestamp)
    }

    /// File the trajectory was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Load a trajectory from a pose file (`.gz` files are decompressed on the fly)
pub fn read_trajectory(path: &Path) -> Result<Trajectory> {
    let file = File::open(path).map_err(|e| CorridorError::io(path, e))?;
    let reader: Box<dyn Read> = if path.extension().map(|e| e == "gz").unwrap_or(false) {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let samples = parse_samples(BufReader::new(reader), Some(path))?;
    let trajectory = Trajectory::from_samples(samples, Some(path.to_path_buf()));

    log::info!(
        "Loaded {} timestamps and poses from: {}",
        trajectory.len(),
        path.display()
    );
    Ok(trajectory)
}

/// Parse an in-memory pose stream. Nothing is logged for unnamed sources.
pub fn parse_trajectory<R: BufRead>(reader: R) -> Result<Trajectory> {
    let samples = parse_samples(reader, None)?;
    Ok(Trajectory::from_samples(samples, None))
}

fn parse_samples<R: BufRead>(reader: R, path: Option<&Path>) -> Result<Vec<PoseSample>> {
    let mut samples = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| match path {
            Some(p) => CorridorError::io(p, e),
            None => CorridorError::io("<stream>", e),
        })?;
        if let Some(fields) = parse_line(&line, idx + 1)? {
            samples.push(PoseSample::from_fields(&fields));
        }
    }

    Ok(samples)
}

/// Parse one pose line. `Ok(None)` for comments and blank lines.
fn parse_line(line: &str, line_no: usize) -> Result<Option<[f64; POSE_FIELDS]>> {
    if line.starts_with('#') || line.trim().is_empty() {
        return Ok(None);
    }

    // Every field must be a finite number, even the ones past the 8th
    let values = line
        .split_whitespace()
        .map(|token| match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(_) => Err(CorridorError::Parse {
                line: line_no,
                message: format!("'{}' is not a finite number", token),
            }),
            Err(_) => Err(CorridorError::Parse {
                line: line_no,
                message: format!("'{}' is not a number", token),
            }),
        })
        .collect::<Result<Vec<f64>>>()?;

    if values.len() < POSE_FIELDS {
        return Err(CorridorError::ShortLine {
            line: line_no,
            found: values.len(),
        });
    }

    let mut fields = [0.0; POSE_FIELDS];
    fields.copy_from_slice(&values[..POSE_FIELDS]);
    Ok(Some(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    #[test]
    fn test_parse_reorders_quaternion() {
        let input = "1.0 2.0 3.0 4.0 0.1 0.2 0.3 0.9\n";
        let traj = parse_trajectory(input.as_bytes()).unwrap();

        assert_eq!(traj.len(), 1);
        let sample = &traj.samples()[0];
        assert_eq!(sample.position, Point3::new(2.0, 3.0, 4.0));
        assert_relative_eq!(sample.orientation.w, 0.9);
        assert_relative_eq!(sample.orientation.i, 0.1);
        assert_relative_eq!(sample.orientation.j, 0.2);
        assert_relative_eq!(sample.orientation.k, 0.3);
    }

    #[test]
    fn test_sorted_by_timestamp() {
        let input = "\
3.0 3 0 0 0 0 0 1
1.0 1 0 0 0 0 0 1
2.0 2 0 0 0 0 0 1
";
        let traj = parse_trajectory(input.as_bytes()).unwrap();
        let ts: Vec<f64> = traj.timestamps().collect();
        assert_eq!(ts, vec![1.0, 2.0, 3.0]);
        assert_eq!(traj.positions()[0].x, 1.0);
        assert_eq!(traj.positions()[2].x, 3.0);
    }

    #[test]
    fn test_sort_is_stable_for_equal_timestamps() {
        let input = "\
1.0 5 0 0 0 0 0 1
0.5 9 0 0 0 0 0 1
1.0 6 0 0 0 0 0 1
";
        let traj = parse_trajectory(input.as_bytes()).unwrap();
        let xs: Vec<f64> = traj.positions().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![9.0, 5.0, 6.0]);
    }

    #[test]
    fn test_comments_and_extra_fields() {
        let input = "\
# timestamp tx ty tz qx qy qz qw
0.0 0 0 0 0 0 0 1 99 98
1.0 1 1 1 0 0 0 1
";
        let traj = parse_trajectory(input.as_bytes()).unwrap();
        assert_eq!(traj.len(), 2);
        assert!(traj.source().is_none());
    }

    #[test]
    fn test_short_line_is_parse_error() {
        let input = "\
# header
0.0 0 0 0 0 0 0 1
1.0 1 1 1 0
";
        let err = parse_trajectory(input.as_bytes()).unwrap_err();
        assert!(err.is_parse_error());
        match err {
            CorridorError::ShortLine { line, found } => {
                assert_eq!(line, 3);
                assert_eq!(found, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_field() {
        let input = "0.0 0 0 zero 0 0 0 1\n";
        let err = parse_trajectory(input.as_bytes()).unwrap_err();
        assert!(matches!(err, CorridorError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_non_finite_field_rejected() {
        let input = "\
0 0 0 0 0 0 0 1
1 nan 0 0 0 0 0 1
2 2 0 0 0 0 0 1
";
        match parse_trajectory(input.as_bytes()).unwrap_err() {
            CorridorError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("finite"));
            }
            other => panic!("unexpected error: {other}"),
        }

        for token in ["inf", "-inf", "NaN", "1e400"] {
            let input = format!("0 0 0 {} 0 0 0 1\n", token);
            let err = parse_trajectory(input.as_bytes()).unwrap_err();
            assert!(matches!(err, CorridorError::Parse { line: 1, .. }), "{token}");
        }
    }

    #[test]
    fn test_load_count_logged_for_named_files_only() {
        install_capture_logger();

        let path = std::env::temp_dir().join(format!("corridor_traj_log_{}.txt", std::process::id()));
        std::fs::write(&path, "0 0 0 0 0 0 0 1\n1 1 0 0 0 0 0 1\n").unwrap();
        let traj = read_trajectory(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(traj.len(), 2);

        let expected = format!("Loaded 2 timestamps and poses from: {}", path.display());
        assert!(captured_on_this_thread().contains(&expected));

        parse_trajectory("0 0 0 0 0 0 0 1\n".as_bytes()).unwrap();
        let loaded: Vec<String> = captured_on_this_thread()
            .into_iter()
            .filter(|m| m.starts_with("Loaded"))
            .collect();
        assert_eq!(loaded, vec![expected]);
    }

    // Records messages per thread so parallel tests don't see each other's logs
    struct CaptureLogger;

    static CAPTURED: Mutex<Vec<(ThreadId, String)>> = Mutex::new(Vec::new());
    static LOGGER: CaptureLogger = CaptureLogger;

    impl log::Log for CaptureLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut captured) = CAPTURED.lock() {
                captured.push((thread::current().id(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    fn install_capture_logger() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Info);
    }

    fn captured_on_this_thread() -> Vec<String> {
        let me = thread::current().id();
        CAPTURED
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == me)
            .map(|(_, m)| m.clone())
            .collect()
    }

    #[test]
    fn test_non_numeric_trailing_field_rejected() {
        let input = "0.0 0 0 0 0 0 0 1 label\n";
        assert!(parse_trajectory(input.as_bytes()).is_err());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let input = "0.0 0 0 0 0 0 0 1\n\n   \n1.0 1 0 0 0 0 0 1\n";
        let traj = parse_trajectory(input.as_bytes()).unwrap();
        assert_eq!(traj.len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_trajectory(Path::new("/nonexistent/traj.txt")).unwrap_err();
        assert!(matches!(err, CorridorError::Io { .. }));
    }
}
