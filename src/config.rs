//! Pipeline configuration.
//!
//! Everything here is externally supplied (typically from the
//! host's config file); every field has a sensible default so
//! a bare `{}` deserializes into a working setup.

use std::time::Duration;

use serde_derive::*;

use crate::{
    color::ColorMap,
    encode::{BmpEncoder, ImageEncoder, Packed16Encoder},
    stats::DisplayRange,
};

/// Output strategy: a headered bitmap at an integer upscale,
/// or the native-resolution packed RGB565 stream buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum OutputFormat {
    Bmp { scale: u32 },
    Packed16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Display window low bound, celsius.
    pub display_min: f32,
    /// Display window high bound, celsius.
    pub display_max: f32,
    pub emissivity: f32,
    pub refresh_rate_hz: u8,
    /// Outlier clamp threshold, celsius.
    pub filter_level: f32,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub color_map: ColorMap,
    pub output: OutputFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            display_min: 0.0,
            display_max: 300.0,
            emissivity: crate::calibrate::DEFAULT_EMISSIVITY,
            refresh_rate_hz: 2,
            filter_level: 10.0,
            retry_attempts: 3,
            retry_delay_ms: 10,
            color_map: ColorMap::Ironbow,
            output: OutputFormat::Bmp { scale: 10 },
        }
    }
}

impl PipelineConfig {
    pub fn display_range(&self) -> DisplayRange {
        DisplayRange::new(self.display_min, self.display_max)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn encoder(&self) -> ImageEncoder {
        match self.output {
            OutputFormat::Bmp { scale } => ImageEncoder::Bmp(BmpEncoder::new(scale, self.color_map)),
            OutputFormat::Packed16 => ImageEncoder::Packed16(Packed16Encoder::new(self.color_map)),
        }
    }
}
