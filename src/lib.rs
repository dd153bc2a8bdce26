//! Lateral corridor extraction from recorded camera trajectories.
//!
//! A pose log is loaded into a time-ordered [`trajectory::Trajectory`], each
//! segment gets a [`heading::Heading`], and left/right offset points are
//! projected perpendicular to the direction of travel and thinned by a
//! minimum spacing rule. Lengths are reported for the camera path and both
//! offset paths.

pub mod config;
pub mod error;
pub mod heading;
pub mod metrics;
pub mod offset;
pub mod pipeline;
pub mod point_cloud;
pub mod render;
pub mod report;
pub mod trajectory;

pub use config::AnalysisConfig;
pub use error::{CorridorError, Result};
pub use heading::{trajectory_headings, DegeneratePolicy, Heading};
pub use metrics::{segment_distances, total_length, PathSummary};
pub use offset::{lateral_offsets, offset_pair, OffsetConfig, OffsetPaths};
pub use pipeline::{
    analyze_batch, analyze_batch_verbose, analyze_file, BatchSummary, CorridorAnalysis, FileOutcome,
};
pub use trajectory::{parse_trajectory, read_trajectory, PoseSample, Trajectory};
