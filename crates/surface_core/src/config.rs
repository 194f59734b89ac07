//! Solver and cell-graph configuration.
//!
//! All configs are Bevy resources with serde support, so they can live in an
//! app's world or be read from a JSON file:
//!
//! ```ignore
//! // Defaults
//! app.init_resource::<SolverConfig>();
//!
//! // From disk
//! let config = SurfaceConfig::load(Path::new("surface.json"))?;
//! app.insert_resource(config.solver);
//! ```

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Which cell the solver collapses next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeuristicKind {
    /// Largest remaining possibility set first.
    #[default]
    MostPossibilities,
    /// Smallest remaining possibility set (above one) first.
    FewestPossibilities,
}

/// How cells with open side slots are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BorderPolicy {
    /// Open sides impose no constraint.
    #[default]
    Open,
    /// Every cell with an open side is pinned to the fallback rule.
    PinFallback,
    /// An open side must look like the fallback rule's facing side, as if a
    /// fallback tile sat across it.
    MatchFallbackEdge,
}

/// Configuration for [`crate::wfc::Solver`].
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Contradiction resets allowed before giving up with `Unsolvable`.
    /// `None` means unbounded. Default: 256
    pub max_resets: Option<usize>,
    /// State-machine steps allowed before giving up with `Exhausted`.
    /// `None` means unbounded. Default: None
    pub max_steps: Option<usize>,
    /// Default: MostPossibilities
    pub heuristic: HeuristicKind,
    /// Default: Open
    pub border: BorderPolicy,
    /// Seed used by [`crate::wfc::solve`]. Default: 0
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_resets: Some(256),
            max_steps: None,
            heuristic: HeuristicKind::default(),
            border: BorderPolicy::default(),
            seed: 0,
        }
    }
}

impl SolverConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_heuristic(mut self, heuristic: HeuristicKind) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_border(mut self, border: BorderPolicy) -> Self {
        self.border = border;
        self
    }
}

/// Where a cell's corner labels come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameSource {
    /// Best fit of the face's UVs to texture axes.
    #[default]
    Uv,
    /// Face vertex order: vertex 0 is bottom-left, then counter-clockwise.
    FaceOrder,
}

/// Configuration for [`crate::cells::CellGraph`] construction.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellGraphConfig {
    /// Default: Uv
    pub frame: FrameSource,
    /// Position quantization step for edge matching. Default: 1e-4
    pub quantum: f32,
}

impl Default for CellGraphConfig {
    fn default() -> Self {
        Self {
            frame: FrameSource::default(),
            quantum: 1e-4,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Both configs in one file. Missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub solver: SolverConfig,
    pub cells: CellGraphConfig,
}

impl SurfaceConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
