//! Per-tick statistics over the conditioned field.

use std::cmp::Ordering;

use serde_derive::*;

use crate::{
    errors::PipelineError,
    frame::{TemperatureField, PIXEL_COUNT},
};

/// Sensor-plausible window, from the device datasheet. Raw
/// extremes outside it flag the whole frame invalid.
pub const SENSOR_FLOOR_CELSIUS: f32 = -40.0;
pub const SENSOR_CEILING_CELSIUS: f32 = 300.0;

/// Narrowest display window the color scale will spread over.
const MIN_SPAN_CELSIUS: f32 = 1.0;

/// Configured temperature window used to normalize colors,
/// independent of the scene's raw extremes.
///
/// Invariant: `high > low`. A degenerate configuration is
/// repaired at construction by raising `high`, so the color
/// normalization denominator can never reach zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    low: f32,
    high: f32,
}

impl DisplayRange {
    pub fn new(low: f32, high: f32) -> Self {
        let high = if high - low < MIN_SPAN_CELSIUS {
            low + MIN_SPAN_CELSIUS
        } else {
            high
        };
        DisplayRange { low, high }
    }

    pub fn low(&self) -> f32 {
        self.low
    }

    pub fn high(&self) -> f32 {
        self.high
    }

    pub fn span(&self) -> f32 {
        (self.high - self.low).max(MIN_SPAN_CELSIUS)
    }

    /// Position of `t` within the window. Not clamped here;
    /// the color mapper clamps to [0, 1] silently.
    pub fn normalize(&self, t: f32) -> f32 {
        (t - self.low) / self.span()
    }
}

/// Summary of one conditioned frame, in celsius.
///
/// `min`/`max` are clamped into the display range: when the
/// scene exceeds the configured window the reported extremes
/// reflect the window, which keeps the color gradient stable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameStatistics {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub median: f32,
}

pub struct StatisticsEngine {
    range: DisplayRange,
}

impl StatisticsEngine {
    pub fn new(range: DisplayRange) -> Self {
        StatisticsEngine { range }
    }

    /// Min, max, mean and median over all 768 values.
    ///
    /// The median is the ascending-sorted element at index 384
    /// (upper middle of the even-length sequence), not the
    /// interpolated average of 383/384.
    pub fn compute(&self, field: &TemperatureField) -> Result<FrameStatistics, PipelineError> {
        let values = field.values();

        let mut min = values[0];
        let mut max = values[0];
        let mut sum = 0.0f64;
        for &v in values {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
            sum += v as f64;
        }
        let mean = (sum / values.len() as f64) as f32;

        if min < SENSOR_FLOOR_CELSIUS || max > SENSOR_CEILING_CELSIUS {
            return Err(PipelineError::FrameInvalid { min, max });
        }

        Ok(FrameStatistics {
            min: min.max(self.range.low),
            max: max.min(self.range.high),
            mean,
            median: median(values),
        })
    }
}

/// Ascending-sorted element at the upper-middle index.
fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted[PIXEL_COUNT / 2]
}
