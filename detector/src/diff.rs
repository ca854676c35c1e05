use crate::error::DetectError;
use crate::luma::LumaGrid;

/// Per-pixel "changed" flags for two grids of the same size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeMask {
    width: u32,
    height: u32,
    changed: Vec<bool>,
}

impl ChangeMask {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of pixels covered by the mask.
    pub fn len(&self) -> usize {
        self.changed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Number of pixels flagged as changed.
    pub fn count_changed(&self) -> usize {
        self.changed.iter().filter(|&&c| c).count()
    }

    /// Whether the pixel at `(x, y)` changed, or `None` if out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<bool> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.changed
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

/// Flag every pixel whose absolute intensity delta strictly exceeds `threshold`.
pub fn difference(
    current: &LumaGrid,
    reference: &LumaGrid,
    threshold: u8,
) -> Result<ChangeMask, DetectError> {
    if current.dimensions() != reference.dimensions() {
        return Err(DetectError::DimensionMismatch {
            current: current.dimensions(),
            reference: reference.dimensions(),
        });
    }

    let changed = current
        .pixels()
        .iter()
        .zip(reference.pixels())
        .map(|(&a, &b)| a.abs_diff(b) > threshold)
        .collect();

    Ok(ChangeMask {
        width: current.width(),
        height: current.height(),
        changed,
    })
}
