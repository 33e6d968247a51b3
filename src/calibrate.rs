//! Boundary to the vendor calibration and compensation
//! routine.
//!
//! The ADC-to-temperature math (gain, offset, emissivity
//! correction against factory coefficients) is a supplied pure
//! function and is deliberately not reimplemented here. The
//! two decisions this crate owns at the boundary are the
//! default emissivity and the reflected-temperature rule.

use crate::{
    errors::PipelineError,
    frame::{EepromDump, RawFrame, TemperatureField},
};

pub const DEFAULT_EMISSIVITY: f32 = 0.95;

/// Empirical offset between ambient and reflected temperature.
pub const REFLECTED_OFFSET_CELSIUS: f32 = 8.0;

/// Reflected-temperature estimate fed into the compensation
/// routine: ambient minus a fixed 8 C.
pub fn reflected_temperature(ambient: f32) -> f32 {
    ambient - REFLECTED_OFFSET_CELSIUS
}

/// One-time derivation of calibration parameters from the
/// factory EEPROM. Failure is fatal: the pipeline must not
/// start ticking without parameters.
pub trait ExtractParameters: Sized {
    fn extract(eeprom: &EepromDump) -> Result<Self, PipelineError>;
}

/// The extracted calibration parameters, viewed as the pure
/// conversion they enable. Immutable for the process lifetime.
pub trait Compensator {
    /// Ambient (die) temperature derived from the frame.
    fn ambient_temperature(&self, frame: &RawFrame) -> f32;

    /// Convert one raw frame into calibrated celsius values,
    /// writing all 768 entries of `out`.
    fn compensate_into(
        &self,
        frame: &RawFrame,
        emissivity: f32,
        reflected: f32,
        out: &mut TemperatureField,
    );

    /// Flat indices of factory-flagged defective pixels.
    fn broken_pixels(&self) -> &[usize] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflected_is_ambient_minus_eight() {
        assert_eq!(reflected_temperature(25.0), 17.0);
        assert_eq!(reflected_temperature(-10.0), -18.0);
    }
}
