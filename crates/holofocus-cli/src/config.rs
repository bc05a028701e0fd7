//! TOML configuration deserialisation for refocusing jobs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use holofocus_core::OpticalOptions;
use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    /// Wavelength and pixel pitch; missing entries use the library defaults.
    #[serde(default)]
    pub optics: OpticalOptions,
    pub profile: ProfileConfig,
    pub hologram: HologramConfig,
    #[serde(default)]
    pub compute: ComputeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where to evaluate the field.
#[derive(Debug, Deserialize)]
pub struct ProfileConfig {
    /// Transverse point `[x, y]` in pixels. Length is checked by the solver.
    pub center: Vec<f64>,
    pub depths: DepthSpec,
}

/// Depth specification: a bare list, an explicit list, or a linear range.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DepthSpec {
    Range { range: [f64; 2], points: usize },
    Values { values: Vec<f64> },
    List(Vec<f64>),
    Single(f64),
}

impl DepthSpec {
    /// Expand into the depth list, in evaluation order.
    ///
    /// A range includes both end points; a one-point range is its start.
    pub fn expand(&self) -> Vec<f64> {
        match self {
            Self::Range { range, points } => {
                let [start, end] = *range;
                (0..*points)
                    .map(|i| start + (end - start) * i as f64 / (*points - 1).max(1) as f64)
                    .collect()
            }
            Self::Values { values } | Self::List(values) => values.clone(),
            Self::Single(z) => vec![*z],
        }
    }
}

/// Hologram source.
#[derive(Debug, Deserialize)]
pub struct HologramConfig {
    /// Plain-text matrix, one row per line. Relative paths are resolved
    /// against the directory holding the job file.
    pub path: PathBuf,
}

/// Compute settings.
#[derive(Debug, Deserialize)]
pub struct ComputeConfig {
    /// Compute backend: "auto", "cpu", or "serial". Default: "auto".
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Worker threads for the CPU backend (default: Rayon's global pool).
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub precision: Precision,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            threads: None,
            precision: Precision::default(),
        }
    }
}

/// Floating-point width used for the whole computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    F64,
    F32,
}

fn default_backend() -> String {
    "auto".into()
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the profile as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_csv: bool,
    /// Whether to also save the profile as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_csv: true,
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

impl JobConfig {
    /// Hologram path, resolved against `base_dir` when relative.
    pub fn hologram_path(&self, base_dir: &Path) -> PathBuf {
        if self.hologram.path.is_absolute() {
            self.hologram.path.clone()
        } else {
            base_dir.join(&self.hologram.path)
        }
    }
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading job file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("parsing job file {}", path.display()))
}

pub fn parse_config(content: &str) -> anyhow::Result<JobConfig> {
    Ok(toml::from_str(content)?)
}
