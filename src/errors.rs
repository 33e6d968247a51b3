//! Error taxonomy for the pipeline.
//!
//! All per-tick failures are local to that tick and self-heal
//! on the next one; only calibration extraction is fatal. A
//! never-published snapshot is `None`, not an error.

use thiserror::Error;

/// A failed register-bus transaction, reported by a
/// [`SensorBus`][crate::bus::SensorBus] implementation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BusError {
    #[error("register read of {count} words at {address:#06x} failed")]
    Read { address: u16, count: usize },

    #[error("register write at {address:#06x} failed")]
    Write { address: u16 },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Frame burst read still failing after the retry bound.
    /// Non-fatal: the tick is aborted and the previously
    /// published image keeps being served.
    #[error("frame acquisition failed after {attempts} attempts: {source}")]
    AcquisitionFailed {
        attempts: u32,
        #[source]
        source: BusError,
    },

    /// Startup-fatal: the pipeline must not begin ticking.
    #[error("calibration parameter extraction failed: {0}")]
    CalibrationExtractionFailed(String),

    /// Raw frame extremes outside the sensor-plausible window.
    /// Telemetry for the tick is suppressed; rendering still
    /// proceeds from the conditioned field.
    #[error("frame rejected: extremes {min:.1}..{max:.1} C outside sensor limits")]
    FrameInvalid { min: f32, max: f32 },

    #[error("image encoding failed: {0}")]
    Encode(#[from] std::io::Error),
}

impl From<BusError> for PipelineError {
    /// A bus failure outside the acquisition retry loop only
    /// happens during startup (EEPROM dump, refresh-rate
    /// programming), where it is fatal.
    fn from(err: BusError) -> Self {
        PipelineError::CalibrationExtractionFailed(err.to_string())
    }
}
