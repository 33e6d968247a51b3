mod args;

use std::{fs, fs::File, io::BufReader};

use anyhow::{Context, Result};
use thermal_grid::{
    color::ColorMap,
    sim::{SyntheticBus, SyntheticCompensator},
    OutputFormat, PipelineConfig, ThermalPipeline,
};

use args::Args;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::from_cmd_line()?;

    let mut config: PipelineConfig = match &args.config {
        Some(path) => serde_json::from_reader(BufReader::new(
            File::open(path).with_context(|| format!("opening config {}", path.display()))?,
        ))?,
        None => PipelineConfig::default(),
    };

    if let Some(min) = args.min {
        config.display_min = min;
    }
    if let Some(max) = args.max {
        config.display_max = max;
    }
    if args.lookup {
        config.color_map = ColorMap::Lookup;
    }
    if args.packed {
        config.output = OutputFormat::Packed16;
    } else if let Some(scale) = args.scale {
        config.output = OutputFormat::Bmp { scale };
    }

    let mut pipeline: ThermalPipeline<_, SyntheticCompensator> =
        ThermalPipeline::initialize(SyntheticBus::new(), &config)?;
    let published = pipeline.published();

    for tick in 1..=args.ticks {
        match pipeline.tick() {
            Ok(outcome) => match outcome.statistics {
                Some(stats) => eprintln!(
                    "tick {}: {:.1}..{:.1} C (mean {:.1}, median {:.1})",
                    tick, stats.min, stats.max, stats.mean, stats.median
                ),
                None => eprintln!("tick {}: frame invalid, telemetry suppressed", tick),
            },
            Err(err) => eprintln!("tick {}: {}", tick, err),
        }
    }

    let snapshot = published
        .snapshot()
        .context("no frame was published; all ticks failed")?;
    fs::write(&args.output, snapshot.image.bytes())
        .with_context(|| format!("writing {}", args.output.display()))?;

    eprintln!(
        "Wrote {} ({} bytes, {}x{}, {})",
        args.output.display(),
        snapshot.image.bytes().len(),
        snapshot.image.width(),
        snapshot.image.height(),
        snapshot.image.format().content_type()
    );
    Ok(())
}
