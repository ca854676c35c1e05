use frame_gate_common::config::DetectorConfig;
use frame_gate_common::frame::CompressedFrame;
use tracing::{debug, info};

use crate::classify::{classify, ChangeFraction};
use crate::diff::difference;
use crate::error::{DetectError, FrameRole};
use crate::luma::decode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// No frame seen yet.
    NoReference,
    /// A reference frame is stored.
    HasReference,
}

/// Outcome of feeding one frame to the detector.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The frame seeded the reference. Nothing to forward.
    FirstFrame,
    /// Not different enough from the reference, which stays as it was.
    Unchanged { fraction: ChangeFraction },
    /// The frame replaced the reference and should be forwarded.
    Changed {
        fraction: ChangeFraction,
        frame: CompressedFrame,
    },
}

impl Decision {
    pub fn is_changed(&self) -> bool {
        matches!(self, Decision::Changed { .. })
    }

    /// Change fraction against the reference, `None` for the first frame.
    pub fn fraction(&self) -> Option<ChangeFraction> {
        match self {
            Decision::FirstFrame => None,
            Decision::Unchanged { fraction } | Decision::Changed { fraction, .. } => {
                Some(*fraction)
            }
        }
    }
}

/// Compares each frame against the last accepted one.
///
/// The reference is stored compressed and decoded again for every comparison.
/// It is only replaced after a successful accept, so errors never touch it.
pub struct ChangeDetector {
    config: DetectorConfig,
    reference: Option<CompressedFrame>,
}

impl ChangeDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            reference: None,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn state(&self) -> DetectorState {
        match self.reference {
            None => DetectorState::NoReference,
            Some(_) => DetectorState::HasReference,
        }
    }

    /// The last accepted frame.
    pub fn reference(&self) -> Option<&CompressedFrame> {
        self.reference.as_ref()
    }

    pub fn process(&mut self, current: CompressedFrame) -> Result<Decision, DetectError> {
        let Some(reference) = &self.reference else {
            info!(bytes = current.len(), "first frame, seeding reference");
            self.reference = Some(current);
            return Ok(Decision::FirstFrame);
        };

        let current_grid = decode(current.as_bytes()).map_err(|source| DetectError::Decode {
            role: FrameRole::Current,
            source,
        })?;
        let reference_grid =
            decode(reference.as_bytes()).map_err(|source| DetectError::Decode {
                role: FrameRole::Reference,
                source,
            })?;

        let mask = difference(&current_grid, &reference_grid, self.config.diff_threshold)?;
        let verdict = classify(&mask, self.config.accept_fraction)?;

        debug!(
            fraction = %verdict.fraction,
            changed = verdict.fraction.changed(),
            total = verdict.fraction.total(),
            threshold = self.config.accept_fraction,
            accepted = verdict.accepted,
            "frame comparison"
        );

        if !verdict.accepted {
            return Ok(Decision::Unchanged {
                fraction: verdict.fraction,
            });
        }

        self.reference = Some(current.clone());
        Ok(Decision::Changed {
            fraction: verdict.fraction,
            frame: current,
        })
    }
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}
