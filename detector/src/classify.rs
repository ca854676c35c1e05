use std::fmt;

use crate::diff::ChangeMask;
use crate::error::DetectError;

/// Share of changed pixels, kept as an exact ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeFraction {
    changed: u64,
    total: u64,
}

impl ChangeFraction {
    /// `total` must be non-zero and at least `changed`.
    pub fn new(changed: u64, total: u64) -> Result<Self, DetectError> {
        if total == 0 {
            return Err(DetectError::EmptyFrame);
        }
        debug_assert!(changed <= total);
        Ok(Self { changed, total })
    }

    pub fn changed(&self) -> u64 {
        self.changed
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn value(&self) -> f64 {
        self.changed as f64 / self.total as f64
    }

    pub fn is_zero(&self) -> bool {
        self.changed == 0
    }

    pub fn is_complete(&self) -> bool {
        self.changed == self.total
    }
}

impl fmt::Display for ChangeFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.value())
    }
}

/// Classifier verdict for one mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub fraction: ChangeFraction,
    pub accepted: bool,
}

/// Accept the frame if the changed share is strictly above `accept_fraction`.
pub fn classify(mask: &ChangeMask, accept_fraction: f64) -> Result<Classification, DetectError> {
    let fraction = ChangeFraction::new(mask.count_changed() as u64, mask.len() as u64)?;
    Ok(Classification {
        fraction,
        accepted: fraction.value() > accept_fraction,
    })
}
