//! RAW developer built on rawloader and bayer
//!
//! Pipeline: decode → crop → black/white levels → demosaic → white balance →
//! camera-to-sRGB matrix → exposure → gamma → 8-bit → orientation.

use std::io::Cursor;
use std::path::Path;

use bayer::{BayerDepth, Demosaic, RasterDepth, RasterMut, CFA as BayerPattern};
use image::{imageops, RgbImage};
use rawloader::{RawImage, RawImageData};
use rayon::prelude::*;
use tracing::{debug, warn};

use super::color::{self, Matrix3, IDENTITY};
use super::config::{ColorSpace, ProcessingConfig};
use super::decoder::{DecodedImage, RawDecoder};
use super::gamma::GammaCurve;

/// rawloader colour indices
const RED: usize = 0;
const GREEN: usize = 1;
const BLUE: usize = 2;

/// Fraction of pixels allowed to clip when auto brightness is enabled
const AUTO_BRIGHT_CLIP: f32 = 0.01;

const AUTO_BRIGHT_BINS: usize = 4096;

/// Camera orientation recorded in the RAW metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl From<&rawloader::Orientation> for Orientation {
    fn from(o: &rawloader::Orientation) -> Self {
        match o {
            rawloader::Orientation::HorizontalFlip => Self::FlipHorizontal,
            rawloader::Orientation::Rotate180 => Self::Rotate180,
            rawloader::Orientation::VerticalFlip => Self::FlipVertical,
            rawloader::Orientation::Transpose => Self::Transpose,
            rawloader::Orientation::Rotate90 => Self::Rotate90,
            rawloader::Orientation::Transverse => Self::Transverse,
            rawloader::Orientation::Rotate270 => Self::Rotate270,
            _ => Self::Normal,
        }
    }
}

/// Cropped, level-normalised sensor data plus the metadata needed to develop it
#[derive(Debug, Clone)]
pub struct SensorFrame {
    pub width: usize,
    pub height: usize,
    /// 1 for CFA sensors, 3 for already-demosaiced (linear DNG) data
    pub components: usize,
    /// Samples scaled so black is 0 and the sensor's white level is 65535
    pub samples: Vec<u16>,
    /// Colour of the 2x2 CFA tile at the crop origin, indexed `[row][col]`
    pub pattern: [[usize; 2]; 2],
    pub wb_coeffs: [f32; 4],
    pub xyz_to_cam: [[f32; 3]; 4],
    pub orientation: Orientation,
}

/// Production RAW decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct RawloaderDecoder;

impl RawDecoder for RawloaderDecoder {
    fn decode(&self, path: &Path, config: &ProcessingConfig) -> Result<DecodedImage, String> {
        if config.output_bits_per_sample != 8 {
            return Err(format!(
                "unsupported output depth: {} bits per sample",
                config.output_bits_per_sample
            ));
        }

        let raw = rawloader::decode_file(path).map_err(|e| e.to_string())?;
        debug!(
            make = %raw.clean_make,
            model = %raw.clean_model,
            width = raw.width,
            height = raw.height,
            cpp = raw.cpp,
            "Decoded sensor data"
        );

        let frame = SensorFrame::from_rawloader(&raw)?;
        develop_frame(&frame, config)
    }
}

impl SensorFrame {
    pub fn from_rawloader(raw: &RawImage) -> Result<Self, String> {
        let [top, right, bottom, left] = raw.crops;
        let width = raw.width.saturating_sub(left + right);
        let height = raw.height.saturating_sub(top + bottom);
        if width < 2 || height < 2 {
            return Err(format!("sensor area {}x{} is too small", width, height));
        }

        let components = raw.cpp;
        if components != 1 && components != 3 {
            return Err(format!(
                "unsupported sensor layout with {} components per pixel",
                components
            ));
        }

        let total = raw.width * raw.height * components;
        let available = match &raw.data {
            RawImageData::Integer(values) => values.len(),
            RawImageData::Float(values) => values.len(),
        };
        if available < total {
            return Err(format!(
                "truncated sensor data: expected {} samples, found {}",
                total, available
            ));
        }

        let levels: [(f32, f32); 4] = std::array::from_fn(|c| {
            let black = raw.blacklevels[c] as f32;
            let range = (raw.whitelevels[c] as f32 - black).max(1.0);
            (black, range)
        });

        let normalize = |index: usize, channel: usize| -> u16 {
            let v = match &raw.data {
                RawImageData::Integer(values) => {
                    let (black, range) = levels[channel];
                    (values[index] as f32 - black) / range
                }
                RawImageData::Float(values) => values[index],
            };
            (v.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16
        };

        let mut samples = vec![0u16; width * height * components];
        samples
            .par_chunks_mut(width * components)
            .enumerate()
            .for_each(|(y, row)| {
                let sy = top + y;
                for x in 0..width {
                    let sx = left + x;
                    if components == 1 {
                        let channel = raw.cfa.color_at(sy, sx);
                        row[x] = normalize(sy * raw.width + sx, channel.min(3));
                    } else {
                        for c in 0..3 {
                            row[x * 3 + c] = normalize((sy * raw.width + sx) * 3 + c, c);
                        }
                    }
                }
            });

        let pattern = if components == 1 {
            bayer_tile(|r, c| raw.cfa.color_at(top + r, left + c))?
        } else {
            [[RED, GREEN], [GREEN, BLUE]]
        };

        Ok(Self {
            width,
            height,
            components,
            samples,
            pattern,
            wb_coeffs: raw.wb_coeffs,
            xyz_to_cam: raw.xyz_to_cam,
            orientation: Orientation::from(&raw.orientation),
        })
    }
}

/// Verify the CFA repeats every 2x2 pixels and return the tile.
///
/// A fourth colour (emerald / second green) is folded into green.
pub fn bayer_tile(color_at: impl Fn(usize, usize) -> usize) -> Result<[[usize; 2]; 2], String> {
    let fold = |c: usize| if c == 3 { GREEN } else { c };
    for r in 0..6 {
        for c in 0..6 {
            if fold(color_at(r, c)) != fold(color_at(r % 2, c % 2)) {
                return Err("unsupported non-Bayer colour filter array".to_string());
            }
        }
    }
    Ok([
        [fold(color_at(0, 0)), fold(color_at(0, 1))],
        [fold(color_at(1, 0)), fold(color_at(1, 1))],
    ])
}

fn bayer_pattern(tile: [[usize; 2]; 2]) -> Result<BayerPattern, String> {
    match tile {
        [[RED, GREEN], [GREEN, BLUE]] => Ok(BayerPattern::RGGB),
        [[BLUE, GREEN], [GREEN, RED]] => Ok(BayerPattern::BGGR),
        [[GREEN, RED], [BLUE, GREEN]] => Ok(BayerPattern::GRBG),
        [[GREEN, BLUE], [RED, GREEN]] => Ok(BayerPattern::GBRG),
        other => Err(format!("unsupported Bayer tile {:?}", other)),
    }
}

/// Interleaved 16-bit linear RGB in camera space
pub struct LinearImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u16>,
}

/// Reconstruct full RGB from a CFA frame; three-component frames pass through.
pub fn demosaic(frame: &SensorFrame) -> Result<LinearImage, String> {
    if frame.components == 3 {
        return Ok(LinearImage {
            width: frame.width,
            height: frame.height,
            data: frame.samples.clone(),
        });
    }

    let pattern = bayer_pattern(frame.pattern)?;
    let input: Vec<u8> = frame.samples.iter().flat_map(|v| v.to_le_bytes()).collect();
    let mut output = vec![0u8; frame.width * frame.height * 3 * 2];

    {
        let mut raster = RasterMut::new(frame.width, frame.height, RasterDepth::Depth16, &mut output);
        bayer::run_demosaic(
            &mut Cursor::new(&input[..]),
            BayerDepth::Depth16LE,
            pattern,
            Demosaic::Cubic,
            &mut raster,
        )
        .map_err(|e| format!("demosaic failed: {:?}", e))?;
    }

    // Raster rows hold native-endian u16 values
    let data = output
        .chunks_exact(2)
        .map(|b| u16::from_ne_bytes([b[0], b[1]]))
        .collect();

    Ok(LinearImage {
        width: frame.width,
        height: frame.height,
        data,
    })
}

/// White balance multipliers normalised to green
pub fn white_balance(frame: &SensorFrame, config: &ProcessingConfig) -> [f32; 3] {
    if !config.uses_camera_white_balance() {
        return [1.0; 3];
    }

    let [r, g, b, _] = frame.wb_coeffs;
    if [r, g, b].iter().all(|v| v.is_finite() && *v > 0.0) {
        [r / g, 1.0, b / g]
    } else {
        warn!("Camera white balance unavailable, using neutral multipliers");
        [1.0; 3]
    }
}

fn color_matrix(frame: &SensorFrame, config: &ProcessingConfig) -> Matrix3 {
    match config.color_space {
        ColorSpace::Raw => IDENTITY,
        ColorSpace::Srgb => color::camera_to_srgb(&frame.xyz_to_cam).unwrap_or_else(|| {
            warn!("No usable camera colour matrix, leaving camera RGB unconverted");
            IDENTITY
        }),
    }
}

#[inline]
fn to_output_linear(px: &[u16], wb: &[f32; 3], matrix: &Matrix3) -> [f32; 3] {
    let camera = [
        (px[0] as f32 / u16::MAX as f32 * wb[0]).min(1.0),
        (px[1] as f32 / u16::MAX as f32 * wb[1]).min(1.0),
        (px[2] as f32 / u16::MAX as f32 * wb[2]).min(1.0),
    ];
    color::apply(matrix, camera)
}

/// Exposure factor that maps the brightest 99% of pixels into range.
fn auto_exposure(linear: &LinearImage, wb: &[f32; 3], matrix: &Matrix3) -> f32 {
    let mut histogram = vec![0usize; AUTO_BRIGHT_BINS];
    for px in linear.data.chunks_exact(3) {
        let rgb = to_output_linear(px, wb, matrix);
        let peak = rgb[0].max(rgb[1]).max(rgb[2]).clamp(0.0, 1.0);
        histogram[(peak * (AUTO_BRIGHT_BINS - 1) as f32) as usize] += 1;
    }

    let pixels = linear.data.len() / 3;
    let allowed = (pixels as f32 * AUTO_BRIGHT_CLIP) as usize;
    let mut seen = 0;
    for (bin, count) in histogram.iter().enumerate().rev() {
        seen += count;
        if seen > allowed {
            let white = (bin + 1) as f32 / AUTO_BRIGHT_BINS as f32;
            return 1.0 / white;
        }
    }
    1.0
}

/// Apply white balance, colour, exposure and gamma; quantise to 8 bits.
pub fn develop(linear: &LinearImage, frame: &SensorFrame, config: &ProcessingConfig) -> RgbImage {
    let wb = white_balance(frame, config);
    let matrix = color_matrix(frame, config);
    let mut exposure = config.brightness;
    if config.auto_brightness {
        exposure *= auto_exposure(linear, &wb, &matrix);
    }
    let curve = GammaCurve::new(config.gamma).lookup_table();

    let mut out = vec![0u8; linear.data.len()];
    out.par_chunks_exact_mut(3)
        .zip(linear.data.par_chunks_exact(3))
        .for_each(|(dst, px)| {
            let rgb = to_output_linear(px, &wb, &matrix);
            for (d, v) in dst.iter_mut().zip(rgb) {
                let index = ((v * exposure).clamp(0.0, 1.0) * u16::MAX as f32).round() as usize;
                *d = (curve[index] * 255.0).round() as u8;
            }
        });

    RgbImage::from_raw(linear.width as u32, linear.height as u32, out)
        .unwrap_or_else(|| RgbImage::new(linear.width as u32, linear.height as u32))
}

pub fn orient(image: RgbImage, orientation: Orientation) -> RgbImage {
    match orientation {
        Orientation::Normal => image,
        Orientation::FlipHorizontal => imageops::flip_horizontal(&image),
        Orientation::Rotate180 => imageops::rotate180(&image),
        Orientation::FlipVertical => imageops::flip_vertical(&image),
        Orientation::Transpose => imageops::flip_horizontal(&imageops::rotate90(&image)),
        Orientation::Rotate90 => imageops::rotate90(&image),
        Orientation::Transverse => imageops::flip_horizontal(&imageops::rotate270(&image)),
        Orientation::Rotate270 => imageops::rotate270(&image),
    }
}

/// Run every develop stage after sensor extraction.
pub fn develop_frame(frame: &SensorFrame, config: &ProcessingConfig) -> Result<DecodedImage, String> {
    let linear = demosaic(frame)?;
    let developed = orient(develop(&linear, frame, config), frame.orientation);
    let (width, height) = developed.dimensions();
    DecodedImage::new(width, height, developed.into_raw())
}
