use std::fmt;

/// Which side of a comparison a frame was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRole {
    Current,
    Reference,
}

impl fmt::Display for FrameRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameRole::Current => f.write_str("current"),
            FrameRole::Reference => f.write_str("reference"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("compressed frame is empty")]
    Empty,
    #[error("malformed image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("failed to decode {role} frame: {source}")]
    Decode {
        role: FrameRole,
        #[source]
        source: DecodeError,
    },
    #[error("frame is {current:?} but reference is {reference:?}")]
    DimensionMismatch {
        current: (u32, u32),
        reference: (u32, u32),
    },
    #[error("cannot classify a zero-size frame")]
    EmptyFrame,
}
