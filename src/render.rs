use glam::Vec3;
use nalgebra::Point3;
use rerun::{LineStrips3D, Points3D, RecordingStream, RecordingStreamBuilder};

use crate::error::{CorridorError, Result};
use crate::pipeline::{CorridorAnalysis, FileOutcome};

const APP_ID: &str = "camera_corridor";

/// Which offset paths to draw. `plot` turns on both sides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayFlags {
    pub plot: bool,
    pub left: bool,
    pub right: bool,
}

impl DisplayFlags {
    pub fn show_left(&self) -> bool {
        self.left || self.plot
    }

    pub fn show_right(&self) -> bool {
        self.right || self.plot
    }
}

/// Sink for corridor geometry. Injected into the driver so the pipeline
/// stays free of any display dependency.
pub trait CorridorRenderer {
    fn draw_trajectory(&mut self, index: usize, color: [u8; 4], positions: &[Point3<f64>]) -> Result<()>;
    fn draw_offsets(&mut self, index: usize, side: Side, points: &[Point3<f64>]) -> Result<()>;
    fn draw_point_cloud(&mut self, index: usize, points: &[Point3<f64>]) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn name(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn color(&self) -> [u8; 4] {
        match self {
            Side::Left => [255, 0, 0, 255],
            Side::Right => [0, 128, 0, 255],
        }
    }
}

/// Draw every successful analysis (in input order) plus the cloud overlays.
///
/// Trajectory colours are sampled from viridis at `index / total` so that
/// each input keeps the same colour regardless of which files failed.
pub fn render_outcomes(
    renderer: &mut dyn CorridorRenderer,
    outcomes: &[FileOutcome],
    clouds: &[Vec<Point3<f64>>],
    flags: DisplayFlags,
) -> Result<()> {
    let total = outcomes.len();
    for (index, outcome) in outcomes.iter().enumerate() {
        if let Ok(analysis) = &outcome.result {
            let color = viridis(index as f32 / total as f32);
            render_analysis(renderer, index, color, analysis, flags)?;
        }
    }

    for (index, cloud) in clouds.iter().enumerate() {
        renderer.draw_point_cloud(index, cloud)?;
    }
    Ok(())
}

fn render_analysis(
    renderer: &mut dyn CorridorRenderer,
    index: usize,
    color: [u8; 4],
    analysis: &CorridorAnalysis,
    flags: DisplayFlags,
) -> Result<()> {
    renderer.draw_trajectory(index, color, analysis.trajectory.positions())?;
    if flags.show_left() {
        renderer.draw_offsets(index, Side::Left, &analysis.offsets.left)?;
    }
    if flags.show_right() {
        renderer.draw_offsets(index, Side::Right, &analysis.offsets.right)?;
    }
    Ok(())
}

const VIRIDIS: [[f32; 3]; 11] = [
    [0.267, 0.004, 0.329],
    [0.282, 0.140, 0.457],
    [0.253, 0.265, 0.529],
    [0.206, 0.371, 0.553],
    [0.163, 0.471, 0.558],
    [0.127, 0.566, 0.550],
    [0.134, 0.658, 0.517],
    [0.266, 0.749, 0.440],
    [0.477, 0.821, 0.318],
    [0.741, 0.873, 0.150],
    [0.993, 0.906, 0.144],
];

/// Sample the viridis colour map at `t` in [0, 1]
pub fn viridis(t: f32) -> [u8; 4] {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let n = VIRIDIS.len() - 1;
    let idx = ((t * n as f32).floor() as usize).min(n - 1);
    let frac = t * n as f32 - idx as f32;

    let rgb = Vec3::from(VIRIDIS[idx]).lerp(Vec3::from(VIRIDIS[idx + 1]), frac) * 255.0;
    [rgb.x.round() as u8, rgb.y.round() as u8, rgb.z.round() as u8, 255]
}

fn to_f32(points: &[Point3<f64>]) -> Vec<[f32; 3]> {
    points
        .iter()
        .map(|p| [p.x as f32, p.y as f32, p.z as f32])
        .collect()
}

/// Rerun-backed renderer: spawns a viewer or records to an `.rrd` file
pub struct RerunRenderer {
    rec: RecordingStream,
}

impl RerunRenderer {
    /// Open a live viewer
    pub fn spawn() -> Result<Self> {
        let rec = RecordingStreamBuilder::new(APP_ID)
            .spawn()
            .map_err(|e| CorridorError::Render(format!("Failed to spawn Rerun viewer: {}", e)))?;
        Ok(RerunRenderer { rec })
    }

    /// Record to a file for later viewing
    pub fn save(output_path: &str) -> Result<Self> {
        let rec = RecordingStreamBuilder::new(APP_ID)
            .save(output_path)
            .map_err(|e| CorridorError::Render(format!("Failed to create Rerun recording: {}", e)))?;

        log::info!("Rerun recording initialized to: {}", output_path);
        Ok(RerunRenderer { rec })
    }

    fn log<A: rerun::AsComponents>(&self, path: &str, archetype: &A) -> Result<()> {
        self.rec
            .log(path, archetype)
            .map_err(|e| CorridorError::Render(e.to_string()))
    }
}

impl CorridorRenderer for RerunRenderer {
    fn draw_trajectory(&mut self, index: usize, color: [u8; 4], positions: &[Point3<f64>]) -> Result<()> {
        let [r, g, b, _] = color;
        self.log(
            &format!("world/trajectory_{}/path", index + 1),
            &LineStrips3D::new([to_f32(positions)])
                .with_colors([rerun::Color::from_rgb(r, g, b)])
                .with_labels([format!("Trajectory {}", index + 1)]),
        )
    }

    fn draw_offsets(&mut self, index: usize, side: Side, points: &[Point3<f64>]) -> Result<()> {
        let [r, g, b, _] = side.color();
        let label = match side {
            Side::Left => format!("Left Points {}", index + 1),
            Side::Right => format!("Right Points {}", index + 1),
        };
        self.log(
            &format!("world/trajectory_{}/{}", index + 1, side.name()),
            &Points3D::new(to_f32(points))
                .with_colors([rerun::Color::from_rgb(r, g, b)])
                .with_radii([0.05_f32])
                .with_labels([label]),
        )
    }

    fn draw_point_cloud(&mut self, index: usize, points: &[Point3<f64>]) -> Result<()> {
        self.log(
            &format!("world/point_cloud_{}", index + 1),
            &Points3D::new(to_f32(points))
                .with_colors([rerun::Color::from_rgb(160, 160, 160)])
                .with_radii([0.01_f32]),
        )
    }
}
