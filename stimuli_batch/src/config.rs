// The sweep is configured by constants, not a command line. Defaults reproduce the
// published stimulus set; a few `DOT_STIMULI_*` environment variables can override
// them for one-off runs.

use anyhow::{Context, Result, anyhow, bail};
use dot_stimuli::StimulusSpec;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_PREFIX: &str = "DOT_STIMULI_";

/// Hard-coded parameters of one stimulus sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub image_width: u32,
    pub image_height: u32,
    /// Repetitions per grid size.
    pub batch_size: u32,
    /// CIE L* of background and dots.
    pub lightness: f64,
    /// Target hue rotation in degrees.
    pub color_difference: f64,
    pub dot_radius: f64,
    pub jitter: u32,
    /// Grid side lengths to sweep; 2 means a 2x2 array of 4 dots.
    pub grid_sizes: Vec<u32>,
    pub output_root: PathBuf,
    /// Base seed. `None` draws a fresh one per run.
    pub seed: Option<u64>,
    /// Worker count. `None` uses one per CPU.
    pub workers: Option<usize>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            image_width: 1024,
            image_height: 768,
            batch_size: 20,
            lightness: 50.0,
            color_difference: 60.0,
            dot_radius: 60.0,
            jitter: 10,
            grid_sizes: vec![2, 3, 4],
            output_root: PathBuf::from("dot_arrays"),
            seed: None,
            workers: None,
        }
    }
}

impl SweepConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup` (keyed by full variable name) on top of the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(value) = parse(&get, "WIDTH")? {
            config.image_width = value;
        }
        if let Some(value) = parse(&get, "HEIGHT")? {
            config.image_height = value;
        }
        if let Some(value) = parse(&get, "BATCH_SIZE")? {
            config.batch_size = value;
        }
        if let Some(value) = parse(&get, "LIGHTNESS")? {
            config.lightness = value;
        }
        if let Some(value) = parse(&get, "COLOR_DIFF")? {
            config.color_difference = value;
        }
        if let Some(value) = parse(&get, "DOT_RADIUS")? {
            config.dot_radius = value;
        }
        if let Some(value) = parse(&get, "JITTER")? {
            config.jitter = value;
        }
        if let Some(raw) = get("GRID_SIZES") {
            config.grid_sizes = raw
                .split(',')
                .map(|size| size.trim().parse::<u32>())
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("{ENV_PREFIX}GRID_SIZES={raw}"))?;
        }
        if let Some(raw) = get("OUTPUT") {
            config.output_root = PathBuf::from(raw);
        }
        if let Some(value) = parse(&get, "SEED")? {
            config.seed = Some(value);
        }
        if let Some(value) = parse(&get, "WORKERS")? {
            config.workers = Some(value);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_sizes.is_empty() {
            bail!("no grid sizes to sweep");
        }
        if self.grid_sizes.contains(&0) {
            bail!("grid sizes must be at least 1, got {:?}", self.grid_sizes);
        }
        if self.workers == Some(0) {
            bail!("worker count must be at least 1");
        }
        Ok(())
    }

    /// The generator input for one stimulus at the given grid size.
    pub fn spec(&self, array_size: u32) -> StimulusSpec {
        StimulusSpec {
            array_size,
            color_difference: self.color_difference,
            lightness: self.lightness,
            dot_radius: self.dot_radius,
            jitter: self.jitter,
            width: self.image_width,
            height: self.image_height,
            target_index: None,
        }
    }
}

fn parse<T, F>(get: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| anyhow!("{ENV_PREFIX}{name}={raw}: {err}")),
    }
}
