//! Signal conditioning: bad-pixel substitution and a 1-D
//! outlier clamp over the flattened field.
//!
//! Conditioning never fails; it always leaves a fully finite
//! field behind. Order matters: defective pixels are repaired
//! before any statistics are taken, and the outlier clamp runs
//! on the repaired data.

use crate::frame::{TemperatureField, SENSOR_COLS, SENSOR_ROWS};

pub struct SignalConditioner {
    /// Both neighbor differences must exceed this before a
    /// pixel is treated as a read glitch.
    level: f32,
    /// Substitute for readings that carry no information
    /// (non-finite, or a defect with no usable neighbor).
    sentinel: f32,
}

impl SignalConditioner {
    pub fn new(level: f32, sentinel: f32) -> Self {
        SignalConditioner { level, sentinel }
    }

    /// Run all passes in place.
    pub fn condition(&self, field: &mut TemperatureField, broken: &[usize]) {
        self.coerce_non_finite(field);
        self.substitute_bad_pixels(field, broken);
        self.clamp_outliers(field);
    }

    /// NaN and infinity must never reach the color mapper.
    fn coerce_non_finite(&self, field: &mut TemperatureField) {
        for v in field.values_mut() {
            if !v.is_finite() {
                *v = self.sentinel;
            }
        }
    }

    /// Replace each factory-flagged pixel with the mean of its
    /// in-grid orthogonal neighbors, skipping neighbors that
    /// are themselves flagged.
    fn substitute_bad_pixels(&self, field: &mut TemperatureField, broken: &[usize]) {
        for &idx in broken {
            if idx >= field.values().len() {
                continue;
            }
            let row = idx / SENSOR_COLS;
            let col = idx % SENSOR_COLS;

            let mut sum = 0.0f32;
            let mut count = 0u32;
            let mut consider = |r: isize, c: isize| {
                if r < 0 || c < 0 || r >= SENSOR_ROWS as isize || c >= SENSOR_COLS as isize {
                    return;
                }
                let n = r as usize * SENSOR_COLS + c as usize;
                if broken.contains(&n) {
                    return;
                }
                sum += field.values()[n];
                count += 1;
            };
            consider(row as isize - 1, col as isize);
            consider(row as isize + 1, col as isize);
            consider(row as isize, col as isize - 1);
            consider(row as isize, col as isize + 1);

            field.values_mut()[idx] = if count > 0 {
                sum / count as f32
            } else {
                self.sentinel
            };
        }
    }

    /// Local despeckle over the flattened sequence: a value is
    /// replaced by the average of its two neighbors only when
    /// it differs from BOTH by more than the level threshold.
    /// A consistent gradient (a real hot edge) differs from
    /// only one side and is left alone.
    ///
    /// Boundary indices use the two values ahead/behind and
    /// write the correction to their own index.
    fn clamp_outliers(&self, field: &mut TemperatureField) {
        let v = field.values_mut();
        let last = v.len() - 1;

        if (v[0] - v[1]).abs() > self.level && (v[0] - v[2]).abs() > self.level {
            v[0] = (v[1] + v[2]) / 2.0;
        }

        for i in 1..last {
            if (v[i] - v[i - 1]).abs() > self.level && (v[i] - v[i + 1]).abs() > self.level {
                v[i] = (v[i - 1] + v[i + 1]) / 2.0;
            }
        }

        if (v[last] - v[last - 1]).abs() > self.level && (v[last] - v[last - 2]).abs() > self.level
        {
            v[last] = (v[last - 1] + v[last - 2]) / 2.0;
        }
    }
}
