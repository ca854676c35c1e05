//! Change detection for a stream of compressed still images.
//!
//! A [`ChangeDetector`] keeps the last accepted frame as its reference and
//! decides, frame by frame, whether a new image differs enough to be worth
//! forwarding. [`relay::Relay`] wires a detector between a [`FrameSource`]
//! and a [`FrameSink`].

pub mod classify;
pub mod detector;
pub mod diff;
pub mod error;
pub mod luma;
pub mod relay;
pub mod shared;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use classify::{classify, ChangeFraction, Classification};
pub use detector::{ChangeDetector, Decision, DetectorState};
pub use diff::{difference, ChangeMask};
pub use error::{DecodeError, DetectError, FrameRole};
pub use luma::{decode, LumaGrid};
pub use relay::{Relay, RelayError, RelayStats};
pub use shared::SharedDetector;
pub use traits::{FrameSink, FrameSource};

pub use frame_gate_common::config::DetectorConfig;
pub use frame_gate_common::frame::{CompressedFrame, TimestampedFrame};
