use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CorridorError, Result};
use crate::heading::DegeneratePolicy;
use crate::offset::{OffsetConfig, DEFAULT_DISTANCE, DEFAULT_SPACING_THRESHOLD};

/// Parameters shared by every trajectory in a run
///
/// Loadable from JSON; missing keys fall back to defaults:
/// ```json
/// { "distance": 2.0, "spacing_threshold": 0.5, "degenerate_policy": "reject" }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub distance: f64,
    pub spacing_threshold: f64,
    pub degenerate_policy: DegeneratePolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            distance: DEFAULT_DISTANCE,
            spacing_threshold: DEFAULT_SPACING_THRESHOLD,
            degenerate_policy: DegeneratePolicy::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse only. Values are checked by [`validate`](Self::validate) once
    /// command-line overrides have been merged in.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CorridorError::Config(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| CorridorError::io(path, e))?;
        Self::from_json_str(&json)
            .map_err(|e| CorridorError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply command-line overrides on top of this config
    pub fn with_overrides(
        mut self,
        distance: Option<f64>,
        spacing_threshold: Option<f64>,
        degenerate_policy: Option<DegeneratePolicy>,
    ) -> Self {
        if let Some(d) = distance {
            self.distance = d;
        }
        if let Some(s) = spacing_threshold {
            self.spacing_threshold = s;
        }
        if let Some(p) = degenerate_policy {
            self.degenerate_policy = p;
        }
        self
    }

    pub fn offset(&self) -> OffsetConfig {
        OffsetConfig {
            distance: self.distance,
            spacing_threshold: self.spacing_threshold,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.offset().validate()
    }
}
