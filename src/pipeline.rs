//! End-to-end corridor analysis for one file or a batch of files.
//!
//! Files are processed in input order; a failure in one file is recorded in
//! its outcome and does not stop the rest of the batch.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::heading::{trajectory_headings, Heading};
use crate::metrics::{segment_distances, total_length, PathSummary};
use crate::offset::{lateral_offsets, OffsetPaths};
use crate::trajectory::{read_trajectory, Trajectory};

/// Everything derived from one trajectory
#[derive(Clone, Debug)]
pub struct CorridorAnalysis {
    pub trajectory: Trajectory,
    pub headings: Vec<Heading>,
    pub offsets: OffsetPaths,
    pub trajectory_length: f64,
}

impl CorridorAnalysis {
    pub fn from_trajectory(trajectory: Trajectory, config: &AnalysisConfig) -> Result<Self> {
        let positions = trajectory.positions();
        let trajectory_length = total_length(positions);
        let headings = trajectory_headings(positions, config.degenerate_policy)?;
        let offsets = lateral_offsets(positions, &headings, &config.offset())?;

        Ok(CorridorAnalysis {
            trajectory,
            headings,
            offsets,
            trajectory_length,
        })
    }

    pub fn left_distances(&self) -> Vec<f64> {
        segment_distances(&self.offsets.left).collect()
    }

    pub fn right_distances(&self) -> Vec<f64> {
        segment_distances(&self.offsets.right).collect()
    }

    pub fn degenerate_segments(&self) -> usize {
        self.headings.iter().filter(|h| h.degenerate).count()
    }
}

/// Load and analyse a single pose file
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<CorridorAnalysis> {
    let trajectory = read_trajectory(path)?;
    CorridorAnalysis::from_trajectory(trajectory, config)
}

/// Result of one file in a batch
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<CorridorAnalysis>,
}

impl FileOutcome {
    /// Analyse one file, logging (not propagating) a failure
    pub fn analyze(path: &Path, config: &AnalysisConfig) -> Self {
        let result = analyze_file(path, config);
        if let Err(e) = &result {
            log::error!("Skipping {}: {}", path.display(), e);
        }
        FileOutcome {
            path: path.to_path_buf(),
            result,
        }
    }
}

/// Analyse every file in order, isolating per-file failures
pub fn analyze_batch<P: AsRef<Path>>(paths: &[P], config: &AnalysisConfig) -> Vec<FileOutcome> {
    paths
        .iter()
        .map(|p| FileOutcome::analyze(p.as_ref(), config))
        .collect()
}

/// Like [`analyze_batch`], but writes the progress line and the trajectory
/// length of each file to `out` as that file is processed.
pub fn analyze_batch_verbose<P, W>(
    paths: &[P],
    config: &AnalysisConfig,
    out: &mut W,
) -> io::Result<Vec<FileOutcome>>
where
    P: AsRef<Path>,
    W: Write,
{
    let mut outcomes = Vec::with_capacity(paths.len());
    for p in paths {
        let path = p.as_ref();
        writeln!(out, "Processing trajectory file: {}", path.display())?;
        let outcome = FileOutcome::analyze(path, config);
        if let Ok(analysis) = &outcome.result {
            writeln!(
                out,
                "Total camera trajectory length for {}: {:.2} meters",
                path.display(),
                analysis.trajectory_length
            )?;
        }
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

#[derive(Clone, Debug, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub samples: usize,
    pub trajectory_length: f64,
    pub left: PathSummary,
    pub right: PathSummary,
    pub degenerate_segments: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileSummary {
    pub fn from_outcome(outcome: &FileOutcome) -> Self {
        let path = outcome.path.display().to_string();
        match &outcome.result {
            Ok(analysis) => FileSummary {
                path,
                samples: analysis.trajectory.len(),
                trajectory_length: analysis.trajectory_length,
                left: PathSummary::of(&analysis.offsets.left),
                right: PathSummary::of(&analysis.offsets.right),
                degenerate_segments: analysis.degenerate_segments(),
                error: None,
            },
            Err(e) => FileSummary {
                path,
                samples: 0,
                trajectory_length: 0.0,
                left: PathSummary::default(),
                right: PathSummary::default(),
                degenerate_segments: 0,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Serializable overview of a batch run
#[derive(Clone, Debug, Serialize)]
pub struct BatchSummary {
    pub config: AnalysisConfig,
    pub files: Vec<FileSummary>,
}

impl BatchSummary {
    pub fn new(config: &AnalysisConfig, outcomes: &[FileOutcome]) -> Self {
        BatchSummary {
            config: *config,
            files: outcomes.iter().map(FileSummary::from_outcome).collect(),
        }
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_some()).count()
    }
}
