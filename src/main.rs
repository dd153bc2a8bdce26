use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use camera_corridor::point_cloud::load_point_cloud;
use camera_corridor::render::{render_outcomes, CorridorRenderer, DisplayFlags, RerunRenderer};
use camera_corridor::report::{write_distances_report, write_points_report, write_summary_json};
use camera_corridor::{
    analyze_batch_verbose, AnalysisConfig, BatchSummary, DegeneratePolicy, FileOutcome,
};

#[derive(Parser, Debug)]
#[command(name = "camera_corridor")]
#[command(
    about = "Process one or more camera trajectory files with optional point cloud data",
    long_about = None
)]
struct Args {
    /// Camera trajectory files (timestamp x y z qx qy qz qw per line)
    #[arg(value_name = "TRAJECTORY", required = true)]
    trajectory_files: Vec<PathBuf>,

    /// Point cloud files drawn as an overlay (.ply, .pcd or ASCII x y z)
    #[arg(long, num_args = 1..)]
    point_clouds: Vec<PathBuf>,

    /// Offset distance in meters for the left and right points [default: 1.0]
    #[arg(long)]
    distance: Option<f64>,

    /// Minimum spacing between kept offset points [default: 1.0]
    #[arg(long)]
    spacing: Option<f64>,

    /// Handling of zero-length segments [default: reuse]
    #[arg(long, value_enum)]
    degenerate: Option<PolicyArg>,

    /// Plot both left and right points along with the trajectory
    #[arg(long)]
    plot: bool,

    /// Plot the left points along with the trajectory
    #[arg(long)]
    left: bool,

    /// Plot the right points along with the trajectory
    #[arg(long)]
    right: bool,

    /// Directory for per-trajectory point and distance reports
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Write a JSON summary of the run
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Save the visualization to an .rrd file instead of opening a viewer
    #[arg(long, conflicts_with = "no_render")]
    save: Option<String>,

    /// Skip visualization entirely
    #[arg(long)]
    no_render: bool,

    /// JSON config file; command-line values take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Reuse,
    Reject,
}

impl From<PolicyArg> for DegeneratePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Reuse => DegeneratePolicy::ReusePrevious,
            PolicyArg::Reject => DegeneratePolicy::Reject,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let base = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    let config = base.with_overrides(args.distance, args.spacing, args.degenerate.map(Into::into));
    config.validate()?;

    let outcomes = analyze_batch_verbose(&args.trajectory_files, &config, &mut io::stdout().lock())
        .context("writing progress to stdout")?;

    if let Some(dir) = &args.report_dir {
        write_reports(dir, &outcomes)?;
    }

    let summary = BatchSummary::new(&config, &outcomes);
    if let Some(path) = &args.summary {
        write_summary_json(path, &summary)?;
    }

    if !args.no_render {
        let clouds: Vec<_> = args
            .point_clouds
            .iter()
            .filter_map(|path| match load_point_cloud(path) {
                Ok(points) => Some(points),
                Err(e) => {
                    log::warn!("Ignoring point cloud: {}", e);
                    None
                }
            })
            .collect();

        let mut renderer: Box<dyn CorridorRenderer> = match &args.save {
            Some(path) => Box::new(RerunRenderer::save(path)?),
            None => Box::new(RerunRenderer::spawn()?),
        };
        let flags = DisplayFlags {
            plot: args.plot,
            left: args.left,
            right: args.right,
        };
        render_outcomes(renderer.as_mut(), &outcomes, &clouds, flags)?;
    }

    if summary.failed() > 0 {
        anyhow::bail!(
            "{} of {} trajectory files failed",
            summary.failed(),
            summary.files.len()
        );
    }
    Ok(())
}

fn write_reports(dir: &Path, outcomes: &[FileOutcome]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    for (idx, outcome) in outcomes.iter().enumerate() {
        let analysis = match &outcome.result {
            Ok(a) => a,
            Err(_) => continue,
        };
        let stem = outcome
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "trajectory".to_string());

        let points_path = dir.join(format!("{}_{}_points.txt", idx + 1, stem));
        write_points_report(
            &points_path,
            analysis.trajectory.positions(),
            &analysis.offsets.left,
            &analysis.offsets.right,
        )?;

        let distances_path = dir.join(format!("{}_{}_distances.txt", idx + 1, stem));
        write_distances_report(
            &distances_path,
            &analysis.left_distances(),
            &analysis.right_distances(),
        )?;

        log::info!("Reports written: {}, {}", points_path.display(), distances_path.display());
    }
    Ok(())
}
