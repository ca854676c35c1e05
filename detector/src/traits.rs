use std::future::Future;

use frame_gate_common::frame::TimestampedFrame;

/// Where frames come from, in arrival order.
pub trait FrameSource {
    /// Next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> impl Future<Output = Option<TimestampedFrame>>;
}

/// Where changed frames go.
pub trait FrameSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Publish one frame. The image bytes must be sent unmodified.
    fn publish(
        &mut self,
        frame: &TimestampedFrame,
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}
