// The drawing surface: an owned RGB raster that can be filled with discs and written
// to disk as PNG. It knows nothing about stimuli; the generator decides what goes where.

use crate::core_modules::lab::lab::DeviceColor;
use crate::core_modules::lattice::DotCoordinate;
use crate::error::StimulusResult;
use image::{ImageEncoder, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    /// Creates a canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: DeviceColor) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, background.into()),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Fills a disc centered on `center`. The center snaps to the nearest pixel and the
    /// radius rounds to whole pixels; a zero radius marks a single pixel. Anything
    /// outside the canvas is clipped.
    pub fn fill_circle(&mut self, center: DotCoordinate, radius: f64, color: DeviceColor) {
        let center = (center.x.round() as i32, center.y.round() as i32);
        draw_filled_circle_mut(&mut self.image, center, radius.round() as i32, color.into());
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<DeviceColor> {
        self.image.get_pixel_checked(x, y).map(|pixel| DeviceColor {
            red: pixel[0],
            green: pixel[1],
            blue: pixel[2],
        })
    }

    /// Number of pixels exactly equal to `color`.
    pub fn count(&self, color: DeviceColor) -> usize {
        let target = [color.red, color.green, color.blue];
        self.image.pixels().filter(|pixel| pixel.0 == target).count()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Writes the canvas as an 8-bit RGB PNG.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> StimulusResult<()> {
        let output = BufWriter::new(File::create(path)?);
        let encoder = image::codecs::png::PngEncoder::new(output);
        let (width, height) = self.image.dimensions();

        encoder.write_image(self.image.as_raw(), width, height, image::ExtendedColorType::Rgb8)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAY: DeviceColor = DeviceColor { red: 118, green: 118, blue: 118 };

    #[test]
    fn starts_filled_with_the_background() {
        let canvas = Canvas::new(40, 30, GRAY);
        assert_eq!(canvas.dimensions(), (40, 30));
        assert_eq!(canvas.count(GRAY), 40 * 30);
        assert_eq!(canvas.pixel(39, 29), Some(GRAY));
        assert_eq!(canvas.pixel(40, 0), None);
    }

    #[test]
    fn fills_a_disc_around_the_center() {
        let mut canvas = Canvas::new(100, 100, DeviceColor::BLACK);
        canvas.fill_circle(DotCoordinate::new(50.0, 50.0), 10.0, DeviceColor::WHITE);

        assert_eq!(canvas.pixel(50, 50), Some(DeviceColor::WHITE));
        assert_eq!(canvas.pixel(59, 50), Some(DeviceColor::WHITE));
        assert_eq!(canvas.pixel(50, 41), Some(DeviceColor::WHITE));
        assert_eq!(canvas.pixel(62, 50), Some(DeviceColor::BLACK));
        assert_eq!(canvas.pixel(58, 58), Some(DeviceColor::BLACK));

        // Roughly pi * r^2.
        let area = canvas.count(DeviceColor::WHITE);
        assert!((280..=380).contains(&area), "area {area}");
    }

    #[test]
    fn zero_radius_marks_a_single_pixel() {
        let mut canvas = Canvas::new(10, 10, DeviceColor::BLACK);
        canvas.fill_circle(DotCoordinate::new(4.4, 5.6), 0.0, DeviceColor::WHITE);
        assert_eq!(canvas.count(DeviceColor::WHITE), 1);
        assert_eq!(canvas.pixel(4, 6), Some(DeviceColor::WHITE));
    }

    #[test]
    fn discs_off_the_edge_are_clipped() {
        let mut canvas = Canvas::new(20, 20, DeviceColor::BLACK);
        canvas.fill_circle(DotCoordinate::new(0.0, 0.0), 5.0, DeviceColor::WHITE);
        canvas.fill_circle(DotCoordinate::new(-500.0, 900.0), 5.0, DeviceColor::WHITE);

        assert_eq!(canvas.pixel(0, 0), Some(DeviceColor::WHITE));
        let area = canvas.count(DeviceColor::WHITE);
        assert!(area > 0 && area < 60, "area {area}");
    }

    #[test]
    fn saves_a_png_that_reads_back_identically() {
        let dir = tempfile::tempdir().expect("Error creating temp dir.");
        let path = dir.path().join("disc.png");

        let mut canvas = Canvas::new(64, 48, GRAY);
        canvas.fill_circle(DotCoordinate::new(20.0, 20.0), 8.0, DeviceColor::WHITE);
        canvas.save(&path).expect("Error Saving File.");

        let reloaded = image::open(&path).expect("Error Opening File.").to_rgb8();
        assert_eq!(&reloaded, canvas.as_image());
    }

    #[test]
    fn saving_into_a_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("Error creating temp dir.");
        let canvas = Canvas::new(4, 4, GRAY);
        assert!(canvas.save(dir.path().join("missing").join("x.png")).is_err());
    }
}
