// THEORY:
// The lattice generator places `array_size x array_size` dot centers on a square grid
// centered in the canvas, then nudges each center by an independent integer jitter on
// each axis. The jitter breaks the perfect regularity of the grid so observers cannot
// rely on exact positions, while the grid keeps dots from piling onto each other.
//
// Key properties:
// 1.  **Height-driven spacing**: `spacing = floor((height - dot_radius) / array_size)`.
//     Canvas width only moves the center, so wide canvases get a square block of dots
//     in the middle.
// 2.  **Row-major order**: coordinates are emitted row by row, left to right. The target
//     index is sampled against this exact order, so the order is part of the contract.
// 3.  **No clamping**: jitter is not checked against spacing or canvas edges. Overlapping
//     or clipped dots are the caller's choice.

use crate::error::{StimulusError, StimulusResult};
use rand::Rng;

/// A dot center in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotCoordinate {
    pub x: f64,
    pub y: f64,
}

impl DotCoordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Number of dots in an `array_size x array_size` grid, computed without `u32` overflow.
pub fn dot_count(array_size: u32) -> usize {
    (array_size as usize).pow(2)
}

/// Distance in pixels between neighbouring lattice points.
pub fn spacing(array_size: u32, dot_radius: f64, height: f64) -> f64 {
    ((height - dot_radius) / array_size as f64).floor()
}

/// Produces `array_size²` jittered dot centers in row-major order.
///
/// Jitter offsets are drawn x first, then y, for each dot in turn.
pub fn layout<R: Rng + ?Sized>(
    array_size: u32,
    dot_radius: f64,
    jitter: u32,
    width: f64,
    height: f64,
    rng: &mut R,
) -> StimulusResult<Vec<DotCoordinate>> {
    if array_size == 0 {
        return Err(StimulusError::InvalidArgument(
            "array_size must be at least 1".to_string(),
        ));
    }

    let center_x = width / 2.0;
    let center_y = height / 2.0;
    let spacing = spacing(array_size, dot_radius, height);
    let shift = (array_size - 1) as f64 * 0.5;
    let origin_x = center_x - spacing * shift;
    let origin_y = center_y - spacing * shift;
    let bound = jitter as i64;

    let mut coordinates = Vec::with_capacity(dot_count(array_size));
    for row in 0..array_size {
        for col in 0..array_size {
            let jitter_x = rng.random_range(-bound..=bound) as f64;
            let jitter_y = rng.random_range(-bound..=bound) as f64;
            coordinates.push(DotCoordinate::new(
                origin_x + col as f64 * spacing + jitter_x,
                origin_y + row as f64 * spacing + jitter_y,
            ));
        }
    }

    Ok(coordinates)
}
