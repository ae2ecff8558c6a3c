// THEORY (Color-Space Conversion):
// The `lab` module owns the two color representations the generator works with and the
// single conversion between them.
//
// - `PerceptualColor` is a CIE L*a*b* triple. Lightness runs 0..100, the two chroma
//   axes are signed and unbounded. All color math (sampling, hue rotation) happens here
//   because equal distances in this space are roughly equal perceived differences.
// - `DeviceColor` is an 8-bit sRGB triple, the only thing a raster canvas understands.
//
// The conversion path is Lab (D50 reference white) -> XYZ -> Bradford adaptation to
// D65 -> linear sRGB -> sRGB companding -> 8-bit. Channels are clamped and then
// truncated, never rounded, so every device channel sits up to one step below the
// exact value. Out-of-gamut input is clipped, it never fails.

pub mod lab {
    use image::Rgb;

    pub type Lightness = f64;
    pub type ChromaAxis = f64;
    pub type Channel = u8;
    pub type Xyz = [f64; 3];

    /// D50 reference white, 2 degree observer.
    const D50_WHITE: Xyz = [0.96422, 1.0, 0.82521];

    // CIE epsilon (216/24389) and the slope of the linear segment of f(t).
    const CIE_EPSILON: f64 = 216.0 / 24389.0;
    const CIE_LINEAR_SLOPE: f64 = 7.787;

    /// Bradford chromatic adaptation from D50 to D65.
    const BRADFORD_D50_TO_D65: [[f64; 3]; 3] = [
        [0.9555766, -0.0230393, 0.0631636],
        [-0.0282895, 1.0099416, 0.0210077],
        [0.0122982, -0.0204830, 1.3299098],
    ];

    /// XYZ (D65) to linear sRGB.
    const XYZ_TO_LINEAR_SRGB: [[f64; 3]; 3] = [
        [3.24071, -1.53726, -0.498571],
        [-0.969258, 1.87599, 0.0415557],
        [0.0556352, -0.203996, 1.05707],
    ];

    /// A CIE L*a*b* color. Immutable value type.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct PerceptualColor {
        /// Lightness, nominally 0.0-100.0.
        pub lightness: Lightness,
        /// Green (negative) to red (positive) axis.
        pub a: ChromaAxis,
        /// Blue (negative) to yellow (positive) axis.
        pub b: ChromaAxis,
    }

    impl PerceptualColor {
        pub const fn new(lightness: Lightness, a: ChromaAxis, b: ChromaAxis) -> Self {
            Self { lightness, a, b }
        }

        /// The achromatic color at the given lightness, used for stimulus backgrounds.
        pub const fn neutral(lightness: Lightness) -> Self {
            Self::new(lightness, 0.0, 0.0)
        }

        pub fn to_device_color(&self) -> DeviceColor {
            to_device_color(*self)
        }
    }

    /// An 8-bit sRGB color, as written to a canvas.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DeviceColor {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
    }

    impl DeviceColor {
        /// Label color for marked dots in target and distractor maps.
        pub const WHITE: DeviceColor = DeviceColor { red: 255, green: 255, blue: 255 };
        /// Background of target and distractor maps.
        pub const BLACK: DeviceColor = DeviceColor { red: 0, green: 0, blue: 0 };
    }

    impl From<PerceptualColor> for DeviceColor {
        fn from(color: PerceptualColor) -> Self {
            to_device_color(color)
        }
    }

    impl From<DeviceColor> for Rgb<Channel> {
        fn from(color: DeviceColor) -> Self {
            Rgb([color.red, color.green, color.blue])
        }
    }

    /// Converts a Lab color to a displayable sRGB triple.
    pub fn to_device_color(color: PerceptualColor) -> DeviceColor {
        let xyz_d65 = multiply(&BRADFORD_D50_TO_D65, lab_to_xyz(color));
        let [red, green, blue] = multiply(&XYZ_TO_LINEAR_SRGB, xyz_d65);

        DeviceColor {
            red: encode_channel(red),
            green: encode_channel(green),
            blue: encode_channel(blue),
        }
    }

    /// Lab -> XYZ relative to the D50 white.
    fn lab_to_xyz(color: PerceptualColor) -> Xyz {
        let fy = (color.lightness + 16.0) / 116.0;
        let fx = color.a / 500.0 + fy;
        let fz = fy - color.b / 200.0;

        [
            D50_WHITE[0] * lab_f_inverse(fx),
            D50_WHITE[1] * lab_f_inverse(fy),
            D50_WHITE[2] * lab_f_inverse(fz),
        ]
    }

    #[inline]
    fn lab_f_inverse(t: f64) -> f64 {
        let cubed = t * t * t;
        if cubed > CIE_EPSILON {
            cubed
        } else {
            (t - 16.0 / 116.0) / CIE_LINEAR_SLOPE
        }
    }

    #[inline]
    fn multiply(matrix: &[[f64; 3]; 3], vector: Xyz) -> Xyz {
        let mut out = [0.0; 3];
        for (row, value) in matrix.iter().zip(out.iter_mut()) {
            *value = row[0] * vector[0] + row[1] * vector[1] + row[2] * vector[2];
        }
        out
    }

    /// sRGB transfer function, linear light -> gamma encoded (both 0..1).
    #[inline]
    fn compand(linear: f64) -> f64 {
        if linear <= 0.0031308 {
            linear * 12.92
        } else {
            1.055 * linear.powf(1.0 / 2.4) - 0.055
        }
    }

    #[inline]
    fn encode_channel(linear: f64) -> Channel {
        let scaled = compand(linear) * 255.0;
        if scaled.is_nan() {
            return 0;
        }
        // `as` truncates toward zero once the value is inside the channel range.
        scaled.clamp(0.0, 255.0) as Channel
    }

}
