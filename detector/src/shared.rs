use std::sync::{Arc, Mutex, PoisonError};

use frame_gate_common::frame::CompressedFrame;

use crate::detector::{ChangeDetector, Decision, DetectorState};
use crate::error::DetectError;

/// Cloneable handle for callers that deliver frames from several threads.
///
/// The lock is held for the whole of `process`, so decoding the reference,
/// comparing and replacing it happen as one step.
#[derive(Clone)]
pub struct SharedDetector {
    inner: Arc<Mutex<ChangeDetector>>,
}

impl SharedDetector {
    pub fn new(detector: ChangeDetector) -> Self {
        Self {
            inner: Arc::new(Mutex::new(detector)),
        }
    }

    pub fn process(&self, frame: CompressedFrame) -> Result<Decision, DetectError> {
        // The reference is only written at the end of a successful call, so a
        // panic elsewhere cannot leave it half-updated.
        let mut detector = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        detector.process(frame)
    }

    pub fn state(&self) -> DetectorState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }

    pub fn reference(&self) -> Option<CompressedFrame> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reference()
            .cloned()
    }
}

impl From<ChangeDetector> for SharedDetector {
    fn from(detector: ChangeDetector) -> Self {
        Self::new(detector)
    }
}
