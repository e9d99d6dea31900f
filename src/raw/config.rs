//! RAW development settings
//!
//! The service develops every RAW file with the same [`ProcessingConfig::FIXED`]
//! so that identical uploads always produce identical JPEGs. The type stays a
//! plain value so tests can inject variations.

/// White balance source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WhiteBalance {
    /// Use the multipliers recorded by the camera
    Camera,
    /// Leave sensor channels unscaled
    Neutral,
}

/// Output colour space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Camera-native RGB, no matrix applied
    Raw,
    /// sRGB (D65)
    Srgb,
}

/// Transfer curve applied after colour conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gamma {
    /// Inverse exponent of the power segment (2.222 → x^0.45)
    pub power: f64,
    /// Slope of the linear toe segment
    pub slope: f64,
}

/// Parameters handed to the RAW decoder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingConfig {
    pub white_balance: WhiteBalance,
    /// Scale exposure from the image histogram instead of `brightness`
    pub auto_brightness: bool,
    pub color_space: ColorSpace,
    pub gamma: Gamma,
    /// Linear exposure multiplier applied before the gamma curve
    pub brightness: f32,
    pub output_bits_per_sample: u8,
}

impl ProcessingConfig {
    /// The configuration every request is developed with.
    pub const FIXED: ProcessingConfig = ProcessingConfig {
        white_balance: WhiteBalance::Camera,
        auto_brightness: false,
        color_space: ColorSpace::Srgb,
        gamma: Gamma {
            power: 2.222,
            slope: 4.5,
        },
        brightness: 1.0,
        output_bits_per_sample: 8,
    };

    pub fn uses_camera_white_balance(&self) -> bool {
        self.white_balance == WhiteBalance::Camera
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self::FIXED
    }
}
