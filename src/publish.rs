//! Concurrency boundary between the periodic producer and
//! on-demand consumers.
//!
//! The producer replaces the current image once per tick; any
//! number of request handlers may take a snapshot at any time.
//! The image lives behind an `Arc`, so the mutex is held only
//! for the pointer swap or clone, never while encoding or
//! serving bytes, so a consumer can never observe a partially
//! written buffer.

use std::{
    sync::{Arc, Mutex},
    time::SystemTime,
};

use crate::encode::EncodedImage;

/// The most recent encoded image plus its freshness timestamp.
#[derive(Clone)]
pub struct Snapshot {
    pub image: Arc<EncodedImage>,
    pub published_at: SystemTime,
}

/// Holder for the single most-recent frame.
#[derive(Default)]
pub struct PublishedFrame {
    current: Mutex<Option<Snapshot>>,
}

impl PublishedFrame {
    pub fn new() -> Self {
        PublishedFrame {
            current: Mutex::new(None),
        }
    }

    /// Producer side: atomically replace the served image.
    /// The previous image stays alive for consumers that still
    /// hold a snapshot of it.
    pub fn publish(&self, image: EncodedImage) -> SystemTime {
        let published_at = SystemTime::now();
        let snapshot = Snapshot {
            image: Arc::new(image),
            published_at,
        };
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = Some(snapshot);
        published_at
    }

    /// Consumer side: the latest frame, or `None` if nothing
    /// has ever been published. Never blocks longer than the
    /// pointer clone.
    pub fn snapshot(&self) -> Option<Snapshot> {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::ColorMap,
        encode::Packed16Encoder,
        frame::{TemperatureField, PIXEL_COUNT},
        stats::DisplayRange,
    };

    fn sample_image() -> EncodedImage {
        let field = TemperatureField::from_values(vec![20.0; PIXEL_COUNT]);
        Packed16Encoder::new(ColorMap::Lookup)
            .encode(&field, &DisplayRange::new(0.0, 100.0))
            .unwrap()
    }

    #[test]
    fn snapshot_before_first_publish_is_not_ready() {
        let frame = PublishedFrame::new();
        assert!(frame.snapshot().is_none());
    }

    #[test]
    fn snapshot_returns_latest_publication() {
        let frame = PublishedFrame::new();
        let t1 = frame.publish(sample_image());
        let first = frame.snapshot().expect("published");
        assert_eq!(first.published_at, t1);

        let t2 = frame.publish(sample_image());
        let second = frame.snapshot().expect("published");
        assert_eq!(second.published_at, t2);
        // The earlier snapshot stays usable.
        assert_eq!(first.image.bytes().len(), second.image.bytes().len());
    }
}
