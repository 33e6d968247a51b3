//! Synthetic sensor for development and tests: a bus that
//! fabricates raw frames for a simple scene, and a compensator
//! that decodes them with an affine counts-to-celsius model.
//!
//! The scene is a warm background with a hot spot orbiting the
//! array center. Every few frames a single-pixel read glitch
//! is injected, which the conditioning pass is expected to
//! remove. Two pixels are declared factory-defective and
//! always read saturated.

use crate::{
    bus::{SensorBus, CONTROL_REGISTER, EEPROM_START_ADDRESS, RAM_START_ADDRESS, STATUS_REGISTER},
    calibrate::{Compensator, ExtractParameters},
    errors::{BusError, PipelineError},
    frame::{EepromDump, RawFrame, TemperatureField, PIXEL_COUNT, SENSOR_COLS, SENSOR_ROWS},
};

/// Counts per degree in the synthetic word encoding.
const COUNTS_PER_CELSIUS: f32 = 64.0;
/// Offset keeping sub-zero temperatures in unsigned words.
const OFFSET_CELSIUS: f32 = 40.0;

/// EEPROM slots carrying the synthetic defect list.
const BROKEN_PIXEL_SLOTS: [usize; 2] = [10, 11];
const BROKEN_PIXELS: [u16; 2] = [27, 400];

fn encode_word(celsius: f32) -> u16 {
    ((celsius + OFFSET_CELSIUS) * COUNTS_PER_CELSIUS)
        .max(0.0)
        .min(u16::MAX as f32) as u16
}

fn decode_word(word: u16) -> f32 {
    word as f32 / COUNTS_PER_CELSIUS - OFFSET_CELSIUS
}

/// Register bus over a fabricated scene.
pub struct SyntheticBus {
    tick: u32,
    control: u16,
}

impl SyntheticBus {
    pub fn new() -> Self {
        SyntheticBus {
            tick: 0,
            control: 0x1901, // typical power-on control word
        }
    }

    /// Scene temperature at one pixel for the current tick.
    fn scene(&self, row: usize, col: usize) -> f32 {
        let phase = self.tick as f32 * 0.35;
        let cx = SENSOR_COLS as f32 / 2.0 + 8.0 * phase.cos();
        let cy = SENSOR_ROWS as f32 / 2.0 + 5.0 * phase.sin();
        let dx = col as f32 - cx;
        let dy = row as f32 - cy;
        20.0 + 45.0 * (-(dx * dx + dy * dy) / 18.0).exp()
    }

    fn frame_word(&self, index: usize) -> u16 {
        for &broken in BROKEN_PIXELS.iter() {
            if index == broken as usize {
                return u16::MAX;
            }
        }

        let mut t = self.scene(index / SENSOR_COLS, index % SENSOR_COLS);
        // Single-pixel read glitch every seventh frame.
        if self.tick % 7 == 3 && index == (self.tick as usize * 31) % 768 {
            t += 90.0;
        }
        encode_word(t)
    }
}

impl Default for SyntheticBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorBus for SyntheticBus {
    fn read_words(&mut self, start_address: u16, buf: &mut [u16]) -> Result<(), BusError> {
        match start_address {
            RAM_START_ADDRESS => {
                self.tick = self.tick.wrapping_add(1);
                for (i, word) in buf.iter_mut().enumerate() {
                    *word = self.frame_word(i);
                }
            }
            EEPROM_START_ADDRESS => {
                for (i, word) in buf.iter_mut().enumerate() {
                    *word = (i as u16).wrapping_mul(0x2B5C).wrapping_add(9);
                }
                for (slot, &pixel) in BROKEN_PIXEL_SLOTS.iter().zip(BROKEN_PIXELS.iter()) {
                    if *slot < buf.len() {
                        buf[*slot] = pixel;
                    }
                }
            }
            CONTROL_REGISTER => {
                for word in buf.iter_mut() {
                    *word = self.control;
                }
            }
            STATUS_REGISTER => {
                for word in buf.iter_mut() {
                    *word = self.tick as u16 & 0x0001;
                }
            }
            other => {
                return Err(BusError::Read {
                    address: other,
                    count: buf.len(),
                })
            }
        }
        Ok(())
    }

    fn write_word(&mut self, address: u16, word: u16) -> Result<(), BusError> {
        if address == CONTROL_REGISTER {
            self.control = word;
            Ok(())
        } else {
            Err(BusError::Write { address })
        }
    }
}

/// Affine decode of the synthetic word encoding, carrying the
/// defect list read out of the synthetic EEPROM.
pub struct SyntheticCompensator {
    broken: Vec<usize>,
}

impl ExtractParameters for SyntheticCompensator {
    fn extract(eeprom: &EepromDump) -> Result<Self, PipelineError> {
        let words = eeprom.words();
        if words.iter().all(|&w| w == 0) {
            return Err(PipelineError::CalibrationExtractionFailed(
                "EEPROM dump is blank".into(),
            ));
        }
        let broken = BROKEN_PIXEL_SLOTS
            .iter()
            .map(|&slot| words[slot] as usize)
            .filter(|&idx| idx < PIXEL_COUNT)
            .collect();
        Ok(SyntheticCompensator { broken })
    }
}

impl Compensator for SyntheticCompensator {
    fn ambient_temperature(&self, _frame: &RawFrame) -> f32 {
        25.0
    }

    fn compensate_into(
        &self,
        frame: &RawFrame,
        _emissivity: f32,
        _reflected: f32,
        out: &mut TemperatureField,
    ) {
        let words = frame.words();
        for (value, &word) in out.values_mut().iter_mut().zip(words.iter()) {
            *value = decode_word(word);
        }
    }

    fn broken_pixels(&self) -> &[usize] {
        &self.broken
    }
}
