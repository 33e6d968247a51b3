//! Library to acquire, condition, and render frames from
//! 32x24 thermal infrared arrays.
//!
//! The pipeline runs the same sequence every tick: read a raw
//! frame off the register bus (with bounded retry), convert it
//! to calibrated celsius values through the vendor
//! compensation boundary, repair factory-defective pixels and
//! single-pixel read glitches, derive summary statistics, map
//! temperatures to an ironbow false-color scale, and encode
//! the result as either a standalone bitmap or a packed RGB565
//! stream buffer. The encoded image is published behind a
//! short critical section so any number of concurrent request
//! handlers can take tear-free snapshots while the producer
//! keeps ticking.
//!
//! # Usage
//!
//! Supply a [`SensorBus`][bus::SensorBus] for the register
//! transport and a [`Compensator`][calibrate::Compensator] /
//! [`ExtractParameters`][calibrate::ExtractParameters] pair
//! for the vendor calibration math, then drive the pipeline
//! from the host scheduler:
//!
//! ```rust
//! use thermal_grid::{
//!     sim::{SyntheticBus, SyntheticCompensator},
//!     PipelineConfig, ThermalPipeline,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = PipelineConfig::default();
//! let mut pipeline: ThermalPipeline<_, SyntheticCompensator> =
//!     ThermalPipeline::initialize(SyntheticBus::new(), &config)?;
//!
//! let published = pipeline.published();
//! pipeline.tick()?;
//!
//! let snapshot = published.snapshot().expect("one tick completed");
//! assert_eq!(snapshot.image.format().content_type(), "image/bmp");
//! # Ok(())
//! # }
//! ```
//!
//! A tick that fails to acquire a frame leaves the previously
//! published image in place; consumers polling during a run of
//! bus errors keep receiving the last good image.

pub mod bus;
pub mod calibrate;
pub mod color;
pub mod condition;
pub mod config;
pub mod encode;
pub mod errors;
pub mod frame;
pub mod pipeline;
pub mod publish;
pub mod sim;
pub mod stats;

pub mod cli;

pub use crate::config::{OutputFormat, PipelineConfig};
pub use crate::errors::{BusError, PipelineError};
pub use crate::pipeline::{ThermalPipeline, TickOutcome};
pub use crate::publish::{PublishedFrame, Snapshot};
