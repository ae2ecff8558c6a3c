// THEORY:
// Target and distractor colors must differ in hue only. Both share the same lightness
// (isoluminance); the target is the distractor rotated by a fixed angle around the
// achromatic axis of the a*b* plane, at the same chroma radius.
//
// The base angle is reconstructed with `atan(b / a)`, not `atan2`. That folds the
// plane onto a 180 degree range: a distractor in the left half-plane (a < 0) has its
// hue reflected through the origin before the rotation is added. Existing stimulus
// sets were generated this way, so the behavior is kept as-is. When `a` is exactly
// zero the base angle is not reconstructed at all and the rotation itself is used.

use crate::core_modules::lab::lab::{Lightness, PerceptualColor};
use rand::Rng;
use std::f64::consts::TAU;

/// Inclusive bound of the integer a* and b* values sampled for distractors.
pub const CHROMA_SAMPLE_BOUND: i32 = 128;

/// Euclidean distance of the color from the achromatic axis.
pub fn chroma_radius(color: &PerceptualColor) -> f64 {
    color.a.hypot(color.b)
}

/// Rotates the chroma of `color` by `degrees`, keeping lightness and radius.
pub fn rotate(color: PerceptualColor, degrees: f64) -> PerceptualColor {
    let radius = chroma_radius(&color);

    let angle = if color.a == 0.0 {
        degrees.to_radians()
    } else {
        ((color.b / color.a).atan() + degrees.to_radians()).rem_euclid(TAU)
    };

    PerceptualColor::new(color.lightness, radius * angle.cos(), radius * angle.sin())
}

/// Draws a distractor color: fixed lightness, a* and b* uniform integers in [-128, 128].
pub fn sample_distractor<R: Rng + ?Sized>(lightness: Lightness, rng: &mut R) -> PerceptualColor {
    let a = rng.random_range(-CHROMA_SAMPLE_BOUND..=CHROMA_SAMPLE_BOUND);
    let b = rng.random_range(-CHROMA_SAMPLE_BOUND..=CHROMA_SAMPLE_BOUND);
    PerceptualColor::new(lightness, a as f64, b as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TOLERANCE: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < TOLERANCE,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn sixty_degrees_from_the_positive_a_axis() {
        let rotated = rotate(PerceptualColor::new(50.0, 30.0, 0.0), 60.0);
        assert_eq!(rotated.lightness, 50.0);
        assert_close(rotated.a, 15.0);
        assert_close(rotated.b, 30.0 * 60f64.to_radians().sin());
        assert!((rotated.b - 25.98).abs() < 0.01);
    }

    #[test]
    fn achromatic_input_stays_achromatic() {
        let rotated = rotate(PerceptualColor::new(50.0, 0.0, 0.0), 90.0);
        assert_eq!(rotated.lightness, 50.0);
        assert_close(rotated.a, 0.0);
        assert_close(rotated.b, 0.0);
    }

    #[test]
    fn zero_a_uses_the_rotation_as_the_angle() {
        // b is discarded as a direction; only its magnitude survives.
        let rotated = rotate(PerceptualColor::new(60.0, 0.0, -40.0), 0.0);
        assert_close(rotated.a, 40.0);
        assert_close(rotated.b, 0.0);

        let rotated = rotate(PerceptualColor::new(60.0, 0.0, 40.0), 90.0);
        assert_close(rotated.a, 0.0);
        assert_close(rotated.b, 40.0);
    }

    #[test]
    fn zero_rotation_is_identity_in_the_right_half_plane() {
        for &(a, b) in &[(30.0, 10.0), (1.0, -128.0), (128.0, 128.0), (5.0, 0.0)] {
            let color = PerceptualColor::new(42.0, a, b);
            let rotated = rotate(color, 0.0);
            assert_close(rotated.a, a);
            assert_close(rotated.b, b);
        }
    }

    #[test]
    fn left_half_plane_is_reflected_through_the_origin() {
        // atan(b/a) cannot tell (-30, -10) from (30, 10).
        let rotated = rotate(PerceptualColor::new(50.0, -30.0, -10.0), 0.0);
        assert_close(rotated.a, 30.0);
        assert_close(rotated.b, 10.0);
    }

    #[test]
    fn preserves_lightness_and_radius() {
        let mut rng = StdRng::seed_from_u64(7);
        for step in 0..200 {
            let mut color = sample_distractor(37.5, &mut rng);
            if color.a == 0.0 {
                color.a = 1.0;
            }
            let degrees = step as f64 * 7.3 - 700.0;
            let rotated = rotate(color, degrees);

            assert_eq!(rotated.lightness, color.lightness);
            assert!((chroma_radius(&rotated) - chroma_radius(&color)).abs() < 1e-9);
        }
    }

    #[test]
    fn rotating_back_returns_to_the_start() {
        for &(a, b, degrees) in &[(30.0, 10.0, 60.0), (100.0, -50.0, 45.0), (12.0, 90.0, -20.0)] {
            let color = PerceptualColor::new(50.0, a, b);
            let there = rotate(color, degrees);
            let back = rotate(there, -degrees);
            assert_close(back.a, a);
            assert_close(back.b, b);
        }
    }

    #[test]
    fn sampled_distractors_stay_on_the_integer_grid() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1_000 {
            let color = sample_distractor(50.0, &mut rng);
            assert_eq!(color.lightness, 50.0);
            assert_eq!(color.a.fract(), 0.0);
            assert_eq!(color.b.fract(), 0.0);
            assert!((-128.0..=128.0).contains(&color.a));
            assert!((-128.0..=128.0).contains(&color.b));
        }
    }

    #[test]
    fn sampling_is_reproducible_for_a_seed() {
        let first = sample_distractor(50.0, &mut StdRng::seed_from_u64(3));
        let second = sample_distractor(50.0, &mut StdRng::seed_from_u64(3));
        assert_eq!(first, second);
    }
}
