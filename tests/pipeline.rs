//! End-to-end pipeline behavior, including the producer /
//! consumer boundary under real threads.

use std::{sync::Arc, thread};

use thermal_grid::{
    encode::PixelFormat,
    sim::{SyntheticBus, SyntheticCompensator},
    OutputFormat, PipelineConfig, PublishedFrame, ThermalPipeline,
};

fn pipeline(config: &PipelineConfig) -> ThermalPipeline<SyntheticBus, SyntheticCompensator> {
    ThermalPipeline::initialize(SyntheticBus::new(), config).expect("synthetic init")
}

#[test]
fn bitmap_snapshot_is_complete_and_correctly_sized() {
    let config = PipelineConfig {
        display_min: 10.0,
        display_max: 70.0,
        ..PipelineConfig::default()
    };
    let mut pipeline = pipeline(&config);
    let published = pipeline.published();

    pipeline.tick().unwrap();
    let snapshot = published.snapshot().unwrap();

    assert_eq!(snapshot.image.format(), PixelFormat::Bmp24);
    assert_eq!(snapshot.image.format().content_type(), "image/bmp");
    assert_eq!(snapshot.image.width(), 320);
    assert_eq!(snapshot.image.height(), 240);
    assert_eq!(snapshot.image.bytes().len(), 230_454);
    assert_eq!(&snapshot.image.bytes()[0..2], b"BM");
}

#[test]
fn statistics_stay_within_the_display_window_across_ticks() {
    let config = PipelineConfig {
        display_min: 15.0,
        display_max: 60.0,
        output: OutputFormat::Packed16,
        ..PipelineConfig::default()
    };
    let mut pipeline = pipeline(&config);

    for _ in 0..25 {
        let outcome = pipeline.tick().unwrap();
        let stats = outcome.statistics.expect("synthetic frames are plausible");
        assert!(stats.min >= 15.0);
        assert!(stats.max <= 60.0);
        assert!(stats.min <= stats.median && stats.median <= stats.max);
    }
}

#[test]
fn concurrent_snapshots_never_observe_a_torn_buffer() {
    let config = PipelineConfig {
        display_min: 10.0,
        display_max: 70.0,
        output: OutputFormat::Packed16,
        ..PipelineConfig::default()
    };
    let mut pipeline = pipeline(&config);
    let published: Arc<PublishedFrame> = pipeline.published();

    // Publish one frame up front so every consumer poll has
    // something to validate.
    pipeline.tick().expect("synthetic tick");

    let producer = thread::spawn(move || {
        for _ in 0..100 {
            pipeline.tick().expect("synthetic tick");
        }
    });

    let consumers: Vec<_> = (0..2)
        .map(|_| {
            let published = Arc::clone(&published);
            thread::spawn(move || {
                let mut seen = 0usize;
                for _ in 0..5_000 {
                    if let Some(snapshot) = published.snapshot() {
                        // A torn or partially-written image would
                        // not match its declared format/dimensions.
                        assert_eq!(
                            snapshot.image.bytes().len(),
                            snapshot.image.expected_len()
                        );
                        assert_eq!(snapshot.image.format(), PixelFormat::Packed16);
                        seen += 1;
                    }
                }
                seen
            })
        })
        .collect();

    producer.join().expect("producer panicked");
    for consumer in consumers {
        let seen = consumer.join().expect("consumer panicked");
        assert_eq!(seen, 5_000);
    }

    let last = published.snapshot().expect("frames were published");
    assert_eq!(last.image.bytes().len(), 32 * 24 * 2);
}

#[test]
fn lookup_palette_feeds_the_bitmap_encoder() {
    use thermal_grid::color::ColorMap;
    let config = PipelineConfig {
        display_min: 10.0,
        display_max: 70.0,
        color_map: ColorMap::Lookup,
        output: OutputFormat::Bmp { scale: 1 },
        ..PipelineConfig::default()
    };
    let mut pipeline = pipeline(&config);
    let published = pipeline.published();

    pipeline.tick().unwrap();
    let snapshot = published.snapshot().unwrap();
    assert_eq!(snapshot.image.width(), 32);
    assert_eq!(snapshot.image.bytes().len(), 54 + 96 * 24);
}
