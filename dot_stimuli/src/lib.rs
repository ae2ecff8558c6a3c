// THEORY:
// This file is the entry point for the `dot_stimuli` library crate. It exposes the
// `generator` module as the high-level interface: hand it a `StimulusSpec` and a
// random source, get back a `StimulusTriplet` (stimulus, target map, distractor map).
//
// The `core_modules` hold the pieces the generator is assembled from. Each is usable
// on its own, but data only ever flows one way: color math and lattice geometry are
// computed first, and the generator merely rasterizes what they produce.

pub mod core_modules;
pub mod error;
pub mod generator;

pub use core_modules::canvas::Canvas;
pub use core_modules::lab::lab::{DeviceColor, PerceptualColor};
pub use core_modules::lattice::DotCoordinate;
pub use error::{StimulusError, StimulusResult};
pub use generator::{StimulusSpec, StimulusTriplet, compose};
