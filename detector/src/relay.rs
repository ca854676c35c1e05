use frame_gate_common::frame::TimestampedFrame;
use tracing::{debug, info, warn};

use crate::detector::{ChangeDetector, Decision};
use crate::error::DetectError;
use crate::traits::{FrameSink, FrameSource};

/// Per-relay counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub received: u64,
    pub seeded: u64,
    pub unchanged: u64,
    pub forwarded: u64,
    /// Frames the detector failed on (decode or size mismatch).
    pub rejected: u64,
    pub publish_failures: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error("failed to publish frame {seq} to {sink}: {source}")]
    Publish {
        sink: String,
        seq: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Runs every incoming frame through a detector and publishes the changed ones.
pub struct Relay<K> {
    detector: ChangeDetector,
    sink: K,
    stats: RelayStats,
}

impl<K: FrameSink> Relay<K> {
    pub fn new(detector: ChangeDetector, sink: K) -> Self {
        Self {
            detector,
            sink,
            stats: RelayStats::default(),
        }
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Process one frame, publishing it if the detector accepts it.
    ///
    /// A failed publish is reported but the detector has already taken the
    /// frame as its new reference.
    pub async fn handle(&mut self, frame: TimestampedFrame) -> Result<Decision, RelayError> {
        self.stats.received += 1;

        let decision = match self.detector.process(frame.image.clone()) {
            Ok(d) => d,
            Err(e) => {
                self.stats.rejected += 1;
                return Err(e.into());
            }
        };

        match &decision {
            Decision::FirstFrame => self.stats.seeded += 1,
            Decision::Unchanged { fraction } => {
                self.stats.unchanged += 1;
                debug!(seq = frame.seq, %fraction, "no significant change");
            }
            Decision::Changed { fraction, .. } => {
                if let Err(e) = self.sink.publish(&frame).await {
                    self.stats.publish_failures += 1;
                    return Err(RelayError::Publish {
                        sink: self.sink.name().to_string(),
                        seq: frame.seq,
                        source: Box::new(e),
                    });
                }
                self.stats.forwarded += 1;
                info!(
                    seq = frame.seq,
                    %fraction,
                    sink = self.sink.name(),
                    "detected change and forwarded frame"
                );
            }
        }

        Ok(decision)
    }

    /// Drain `source`, logging and skipping frames that fail.
    pub async fn run<S: FrameSource>(&mut self, source: &mut S) {
        while let Some(frame) = source.next_frame().await {
            let seq = frame.seq;
            if let Err(e) = self.handle(frame).await {
                warn!(error = %e, seq, "frame not forwarded");
            }

            if self.stats.received % 100 == 0 {
                debug!(
                    received = self.stats.received,
                    forwarded = self.stats.forwarded,
                    rejected = self.stats.rejected,
                    "frames processed"
                );
            }
        }
        info!(stats = ?self.stats, "frame source exhausted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::lit_pixels;
    use frame_gate_common::frame::CompressedFrame;
    use std::collections::VecDeque;

    struct VecSource(VecDeque<TimestampedFrame>);

    impl VecSource {
        fn new(frames: Vec<CompressedFrame>) -> Self {
            Self(
                frames
                    .into_iter()
                    .enumerate()
                    .map(|(i, image)| TimestampedFrame::new(image, 1_000 + i as i64, i as u64))
                    .collect(),
            )
        }
    }

    impl FrameSource for VecSource {
        async fn next_frame(&mut self) -> Option<TimestampedFrame> {
            self.0.pop_front()
        }
    }

    #[derive(Default)]
    struct VecSink {
        published: Vec<TimestampedFrame>,
        fail: bool,
    }

    impl FrameSink for VecSink {
        type Error = std::io::Error;

        async fn publish(&mut self, frame: &TimestampedFrame) -> Result<(), Self::Error> {
            if self.fail {
                return Err(std::io::Error::other("sink down"));
            }
            self.published.push(frame.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "vec"
        }
    }

    #[tokio::test]
    async fn forwards_only_changed_frames() {
        let mut source = VecSource::new(vec![
            lit_pixels(0),  // seeds
            lit_pixels(10), // 10%
            lit_pixels(50), // 50% -> forwarded
            lit_pixels(50), // identical to new reference
            lit_pixels(0),  // 50% back -> forwarded
        ]);
        let mut relay = Relay::new(ChangeDetector::default(), VecSink::default());
        relay.run(&mut source).await;

        let seqs: Vec<u64> = relay.sink().published.iter().map(|f| f.seq).collect();
        assert_eq!(seqs, vec![2, 4]);
        assert_eq!(
            relay.stats(),
            RelayStats {
                received: 5,
                seeded: 1,
                unchanged: 2,
                forwarded: 2,
                rejected: 0,
                publish_failures: 0,
            }
        );
    }

    #[tokio::test]
    async fn forwarded_payload_is_unmodified() {
        let changed = lit_pixels(80);
        let mut source = VecSource::new(vec![lit_pixels(0), changed.clone()]);
        let mut relay = Relay::new(ChangeDetector::default(), VecSink::default());
        relay.run(&mut source).await;

        let published = &relay.sink().published;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].image.as_bytes(), changed.as_bytes());
        assert_eq!(published[0].captured_at_ms, 1_001);
    }

    #[tokio::test]
    async fn bad_frames_are_skipped() {
        let mut source = VecSource::new(vec![
            lit_pixels(0),
            CompressedFrame::from(b"garbage".to_vec()),
            lit_pixels(40),
        ]);
        let mut relay = Relay::new(ChangeDetector::default(), VecSink::default());
        relay.run(&mut source).await;

        assert_eq!(relay.stats().rejected, 1);
        assert_eq!(relay.stats().forwarded, 1);
        assert_eq!(relay.sink().published[0].seq, 2);
    }

    #[tokio::test]
    async fn publish_failure_is_reported() {
        let sink = VecSink {
            fail: true,
            ..Default::default()
        };
        let mut relay = Relay::new(ChangeDetector::default(), sink);
        relay
            .handle(TimestampedFrame::new(lit_pixels(0), 0, 0))
            .await
            .unwrap();
        let err = relay
            .handle(TimestampedFrame::new(lit_pixels(90), 1, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Publish { seq: 1, .. }));
        assert_eq!(relay.stats().publish_failures, 1);
        assert_eq!(relay.stats().forwarded, 0);
        // The detector still moved on to the accepted frame.
        assert_eq!(relay.detector().reference(), Some(&lit_pixels(90)));
    }
}
