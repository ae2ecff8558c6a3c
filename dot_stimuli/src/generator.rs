// THEORY:
// The `generator` module is the top-level API of the crate. One call to `compose` turns
// a `StimulusSpec` into a `StimulusTriplet`:
//
// - the stimulus: a neutral gray background at the spec's lightness, every dot in the
//   distractor color except one, which carries the hue-rotated target color;
// - the target map: black, with a single white disc where the target is;
// - the distractor map: black, with white discs everywhere except the target.
//
// The generator does no color math and no geometry of its own. It asks `hue_rotation`
// for the two colors, `lab` for their device values, `lattice` for the dot centers, and
// then rasterizes. Randomness is always injected, so a seeded source reproduces a
// triplet exactly. Draw order is fixed: distractor a*, distractor b*, lattice jitter,
// target index.
//
// Persistence is deliberately absent. Naming and saving the three canvases is the
// batch driver's job.

use crate::core_modules::canvas::Canvas;
use crate::core_modules::hue_rotation::{rotate, sample_distractor};
use crate::core_modules::lab::lab::{DeviceColor, PerceptualColor};
use crate::core_modules::lattice::{self, DotCoordinate};
use log::{debug, warn};
use rand::Rng;

pub use crate::error::{StimulusError, StimulusResult};

/// Everything needed to produce one stimulus triplet.
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusSpec {
    /// Side length of the square dot grid; the stimulus holds `array_size²` dots.
    pub array_size: u32,
    /// Hue difference between distractor and target, in degrees.
    pub color_difference: f64,
    /// CIE L* shared by background, distractors and target.
    pub lightness: f64,
    /// Dot radius in pixels.
    pub dot_radius: f64,
    /// Per-axis jitter bound in pixels (inclusive).
    pub jitter: u32,
    pub width: u32,
    pub height: u32,
    /// `None` samples the target uniformly; `Some` pins it.
    pub target_index: Option<usize>,
}

impl StimulusSpec {
    pub fn dot_count(&self) -> usize {
        lattice::dot_count(self.array_size)
    }

    /// Rejects configurations that would produce an empty or meaningless stimulus.
    pub fn validate(&self) -> StimulusResult<()> {
        if self.array_size == 0 {
            return Err(invalid("array_size must be at least 1"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(invalid(format!(
                "canvas must not be empty, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.dot_radius.is_finite() || self.dot_radius < 0.0 {
            return Err(invalid(format!(
                "dot_radius must be a non-negative number, got {}",
                self.dot_radius
            )));
        }
        if !self.lightness.is_finite() {
            return Err(invalid("lightness must be finite"));
        }
        if !self.color_difference.is_finite() {
            return Err(invalid("color_difference must be finite"));
        }
        if let Some(index) = self.target_index {
            if index >= self.dot_count() {
                return Err(invalid(format!(
                    "target_index {index} is out of range for {} dots",
                    self.dot_count()
                )));
            }
        }
        Ok(())
    }
}

/// The three canvases of one stimulus plus the values they were drawn from.
#[derive(Debug, Clone)]
pub struct StimulusTriplet {
    pub stimulus: Canvas,
    pub target_map: Canvas,
    pub distractor_map: Canvas,
    pub target_index: usize,
    pub coordinates: Vec<DotCoordinate>,
    pub distractor_color: PerceptualColor,
    pub target_color: PerceptualColor,
    pub distractor_device_color: DeviceColor,
    pub target_device_color: DeviceColor,
}

/// Builds the stimulus, target map and distractor map for `spec`.
pub fn compose<R: Rng + ?Sized>(spec: &StimulusSpec, rng: &mut R) -> StimulusResult<StimulusTriplet> {
    spec.validate()?;
    warn_on_suspicious(spec);

    let background = PerceptualColor::neutral(spec.lightness).to_device_color();
    let mut stimulus = Canvas::new(spec.width, spec.height, background);
    let mut target_map = Canvas::new(spec.width, spec.height, DeviceColor::BLACK);
    let mut distractor_map = Canvas::new(spec.width, spec.height, DeviceColor::BLACK);

    let distractor_color = sample_distractor(spec.lightness, rng);
    let target_color = rotate(distractor_color, spec.color_difference);
    let distractor_device_color = distractor_color.to_device_color();
    let target_device_color = target_color.to_device_color();

    let coordinates = lattice::layout(
        spec.array_size,
        spec.dot_radius,
        spec.jitter,
        spec.width as f64,
        spec.height as f64,
        rng,
    )?;

    let target_index = match spec.target_index {
        Some(index) => index,
        None => rng.random_range(0..coordinates.len()),
    };

    for (index, &center) in coordinates.iter().enumerate() {
        if index == target_index {
            stimulus.fill_circle(center, spec.dot_radius, target_device_color);
            target_map.fill_circle(center, spec.dot_radius, DeviceColor::WHITE);
        } else {
            stimulus.fill_circle(center, spec.dot_radius, distractor_device_color);
            distractor_map.fill_circle(center, spec.dot_radius, DeviceColor::WHITE);
        }
    }

    debug!(
        "composed {}x{} stimulus: target {} at ({}, {}), distractor {:?} -> {:?}, target {:?} -> {:?}",
        spec.array_size,
        spec.array_size,
        target_index,
        coordinates[target_index].x,
        coordinates[target_index].y,
        distractor_color,
        distractor_device_color,
        target_color,
        target_device_color,
    );

    Ok(StimulusTriplet {
        stimulus,
        target_map,
        distractor_map,
        target_index,
        coordinates,
        distractor_color,
        target_color,
        distractor_device_color,
        target_device_color,
    })
}

fn warn_on_suspicious(spec: &StimulusSpec) {
    if spec.color_difference.rem_euclid(360.0) == 0.0 {
        warn!(
            "color_difference {} leaves the target identical to the distractors",
            spec.color_difference
        );
    }

    let spacing = lattice::spacing(spec.array_size, spec.dot_radius, spec.height as f64);
    if spec.jitter as f64 * 2.0 + spec.dot_radius * 2.0 > spacing {
        warn!(
            "jitter {} with radius {} may overlap dots spaced {} apart",
            spec.jitter, spec.dot_radius, spacing
        );
    }
}

fn invalid(message: impl Into<String>) -> StimulusError {
    StimulusError::InvalidArgument(message.into())
}
