//! Sensor geometry and the fixed-size buffers that move
//! through the pipeline.
//!
//! The sensor is a 32x24 infrared array. A raw frame is 834
//! sixteen-bit words: 832 words of pixel RAM followed by the
//! control word and the subpage word. Calibrated output is a
//! 768-entry temperature grid in celsius, row major.

use ndarray::Array2;

pub const SENSOR_COLS: usize = 32;
pub const SENSOR_ROWS: usize = 24;
pub const PIXEL_COUNT: usize = SENSOR_COLS * SENSOR_ROWS;

/// 832 pixel RAM words + control word + subpage word.
pub const FRAME_WORDS: usize = 834;
/// Factory EEPROM size in words.
pub const EEPROM_WORDS: usize = 832;

/// One unprocessed frame as read off the register bus.
///
/// Produced fresh by [`FrameSource`][crate::bus::FrameSource]
/// every tick and consumed immediately; never retained.
#[derive(Clone)]
pub struct RawFrame {
    words: [u16; FRAME_WORDS],
}

impl RawFrame {
    pub fn zeroed() -> Self {
        RawFrame {
            words: [0; FRAME_WORDS],
        }
    }

    pub fn words(&self) -> &[u16; FRAME_WORDS] {
        &self.words
    }

    pub fn words_mut(&mut self) -> &mut [u16; FRAME_WORDS] {
        &mut self.words
    }

    /// Subpage indicator captured with the frame.
    pub fn subpage(&self) -> u16 {
        self.words[FRAME_WORDS - 1]
    }
}

/// Factory EEPROM contents, dumped once at startup and handed
/// to the calibration extraction boundary.
#[derive(Clone)]
pub struct EepromDump {
    words: [u16; EEPROM_WORDS],
}

impl EepromDump {
    pub fn zeroed() -> Self {
        EepromDump {
            words: [0; EEPROM_WORDS],
        }
    }

    pub fn words(&self) -> &[u16; EEPROM_WORDS] {
        &self.words
    }

    pub fn words_mut(&mut self) -> &mut [u16; EEPROM_WORDS] {
        &mut self.words
    }
}

/// Calibrated per-pixel temperatures in celsius.
///
/// Always 24 rows x 32 columns; the shape is fixed at
/// construction and never changes. After conditioning every
/// entry is finite (non-finite readings are coerced to the
/// display-range sentinel before any consumer sees them).
#[derive(Clone, Debug)]
pub struct TemperatureField {
    grid: Array2<f32>,
}

impl TemperatureField {
    pub fn zeroed() -> Self {
        TemperatureField {
            grid: Array2::zeros((SENSOR_ROWS, SENSOR_COLS)),
        }
    }

    /// Build a field from a flat row-major vector of exactly
    /// [`PIXEL_COUNT`] values.
    pub fn from_values(values: Vec<f32>) -> Self {
        assert_eq!(values.len(), PIXEL_COUNT);
        TemperatureField {
            grid: Array2::from_shape_vec((SENSOR_ROWS, SENSOR_COLS), values)
                .expect("shape matches PIXEL_COUNT"),
        }
    }

    /// Flattened row-major view of the 768 values.
    pub fn values(&self) -> &[f32] {
        self.grid.as_slice().expect("field is contiguous row-major")
    }

    pub fn values_mut(&mut self) -> &mut [f32] {
        self.grid
            .as_slice_mut()
            .expect("field is contiguous row-major")
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.grid[(row, col)]
    }

    /// Spot reading at the middle of the array (row 12, col 16).
    pub fn center(&self) -> f32 {
        self.grid[(SENSOR_ROWS / 2, SENSOR_COLS / 2)]
    }
}
