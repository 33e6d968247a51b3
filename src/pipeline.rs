//! The per-tick pipeline: acquire, compensate, condition,
//! summarize, render, publish.
//!
//! One pipeline instance owns all state; there are no ambient
//! globals. The host scheduler drives [`ThermalPipeline::tick`]
//! at a fixed interval, and the transport layer serves
//! snapshots from the handle returned by
//! [`ThermalPipeline::published`]. Each tick is independent:
//! a failed one leaves the previously published image in
//! place and the next tick starts fresh.

use std::{sync::Arc, time::SystemTime};

use log::{debug, warn};

use crate::{
    bus::{read_eeprom, set_refresh_rate, FrameSource, SensorBus},
    calibrate::{reflected_temperature, Compensator, ExtractParameters},
    condition::SignalConditioner,
    config::PipelineConfig,
    encode::ImageEncoder,
    errors::PipelineError,
    frame::TemperatureField,
    publish::PublishedFrame,
    stats::{DisplayRange, FrameStatistics, StatisticsEngine},
};

/// What one successful tick offers the host.
///
/// `statistics` is `None` when the frame was rendered but its
/// raw extremes were implausible, so telemetry publication is
/// suppressed for the tick.
#[derive(Debug, Clone, Copy)]
pub struct TickOutcome {
    pub statistics: Option<FrameStatistics>,
    pub published_at: SystemTime,
}

pub struct ThermalPipeline<B, C> {
    source: FrameSource<B>,
    compensator: C,
    conditioner: SignalConditioner,
    stats: StatisticsEngine,
    encoder: ImageEncoder,
    range: DisplayRange,
    emissivity: f32,
    field: TemperatureField,
    published: Arc<PublishedFrame>,
}

impl<B: SensorBus, C: Compensator> ThermalPipeline<B, C> {
    /// Startup: dump the factory EEPROM, derive calibration
    /// parameters, program the refresh rate. Any failure here
    /// is fatal: the pipeline must not begin ticking.
    pub fn initialize(mut bus: B, config: &PipelineConfig) -> Result<Self, PipelineError>
    where
        C: ExtractParameters,
    {
        let eeprom = read_eeprom(&mut bus)?;
        let compensator = C::extract(&eeprom)?;
        set_refresh_rate(&mut bus, config.refresh_rate_hz)?;
        Ok(Self::from_parts(bus, compensator, config))
    }

    /// Assemble a pipeline around already-extracted parameters.
    pub fn from_parts(bus: B, compensator: C, config: &PipelineConfig) -> Self {
        let range = config.display_range();
        ThermalPipeline {
            source: FrameSource::new(bus, config.retry_attempts, config.retry_delay()),
            compensator,
            // The sentinel for unusable readings is the display
            // high bound: errors render hot, not cold.
            conditioner: SignalConditioner::new(config.filter_level, range.high()),
            stats: StatisticsEngine::new(range),
            encoder: config.encoder(),
            range,
            emissivity: config.emissivity,
            field: TemperatureField::zeroed(),
            published: Arc::new(PublishedFrame::new()),
        }
    }

    /// Handle for concurrent consumers. Clones are cheap and
    /// all observe the same single most-recent image.
    pub fn published(&self) -> Arc<PublishedFrame> {
        Arc::clone(&self.published)
    }

    /// Last conditioned field, for hosts that want the raw
    /// grid (e.g. a spot temperature at the array center).
    pub fn field(&self) -> &TemperatureField {
        &self.field
    }

    /// Run one full pass of the pipeline.
    pub fn tick(&mut self) -> Result<TickOutcome, PipelineError> {
        let frame = self.source.acquire()?;

        let ambient = self.compensator.ambient_temperature(&frame);
        let reflected = reflected_temperature(ambient);
        self.compensator
            .compensate_into(&frame, self.emissivity, reflected, &mut self.field);

        self.conditioner
            .condition(&mut self.field, self.compensator.broken_pixels());

        let subpage = frame.subpage();
        let statistics = match self.stats.compute(&self.field) {
            Ok(stats) => Some(stats),
            Err(err @ PipelineError::FrameInvalid { .. }) => {
                warn!("{}; telemetry suppressed for this tick", err);
                None
            }
            Err(err) => return Err(err),
        };

        let image = self.encoder.encode(&self.field, &self.range)?;
        let published_at = self.published.publish(image);

        if let Some(stats) = &statistics {
            debug!(
                "tick published: subpage {}, ambient {:.1} C, spot {:.1} C, scene {:.1}..{:.1} C (mean {:.1}, median {:.1})",
                subpage, ambient, self.field.center(), stats.min, stats.max, stats.mean, stats.median
            );
        }

        Ok(TickOutcome {
            statistics,
            published_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::OutputFormat,
        errors::BusError,
        sim::{SyntheticBus, SyntheticCompensator},
    };

    fn config() -> PipelineConfig {
        PipelineConfig {
            display_min: 10.0,
            display_max: 70.0,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn tick_publishes_image_and_statistics() {
        let mut pipeline: ThermalPipeline<_, SyntheticCompensator> =
            ThermalPipeline::initialize(SyntheticBus::new(), &config()).unwrap();
        let published = pipeline.published();
        assert!(published.snapshot().is_none());

        let outcome = pipeline.tick().unwrap();
        let stats = outcome.statistics.expect("synthetic frames are plausible");
        assert!(stats.min >= 10.0);
        assert!(stats.max <= 70.0);
        assert!(stats.mean > 10.0 && stats.mean < 70.0);

        let snapshot = published.snapshot().expect("tick published");
        assert_eq!(snapshot.image.bytes().len(), snapshot.image.expected_len());
        assert_eq!(snapshot.published_at, outcome.published_at);
    }

    #[test]
    fn broken_pixels_never_reach_the_statistics() {
        // Defective pixels read saturated (~984 C decoded); if
        // substitution failed the plausibility check would flag
        // the frame and suppress the statistics.
        let mut pipeline: ThermalPipeline<_, SyntheticCompensator> =
            ThermalPipeline::initialize(SyntheticBus::new(), &config()).unwrap();
        for _ in 0..10 {
            let outcome = pipeline.tick().unwrap();
            assert!(outcome.statistics.is_some());
        }
    }

    /// Delegates to the synthetic bus until poisoned, then
    /// fails every RAM burst.
    struct PoisonableBus {
        inner: SyntheticBus,
        poisoned: bool,
    }

    impl SensorBus for PoisonableBus {
        fn read_words(&mut self, start_address: u16, buf: &mut [u16]) -> Result<(), BusError> {
            if self.poisoned && start_address == crate::bus::RAM_START_ADDRESS {
                return Err(BusError::Read {
                    address: start_address,
                    count: buf.len(),
                });
            }
            self.inner.read_words(start_address, buf)
        }

        fn write_word(&mut self, address: u16, word: u16) -> Result<(), BusError> {
            self.inner.write_word(address, word)
        }
    }

    #[test]
    fn failed_acquisition_keeps_previous_image() {
        let bus = PoisonableBus {
            inner: SyntheticBus::new(),
            poisoned: false,
        };
        let mut config = config();
        config.retry_delay_ms = 0;
        config.output = OutputFormat::Packed16;

        let mut pipeline: ThermalPipeline<_, SyntheticCompensator> =
            ThermalPipeline::initialize(bus, &config).unwrap();
        let published = pipeline.published();

        let first = pipeline.tick().unwrap();
        pipeline.source.bus_mut().poisoned = true;

        match pipeline.tick() {
            Err(PipelineError::AcquisitionFailed { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected AcquisitionFailed, got {:?}", other.map(|_| ())),
        }

        // The consumer still sees the last good frame.
        let snapshot = published.snapshot().expect("previous image retained");
        assert_eq!(snapshot.published_at, first.published_at);
    }
}
