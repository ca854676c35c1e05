use bytes::Bytes;
use chrono::{DateTime, Utc};

/// One encoded still image, exactly as received.
///
/// Cloning is cheap: the bytes are reference counted, so the detector can keep
/// a frame as its reference while the same payload is forwarded downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedFrame(Bytes);

impl CompressedFrame {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for CompressedFrame {
    fn from(data: Vec<u8>) -> Self {
        Self(Bytes::from(data))
    }
}

impl From<Bytes> for CompressedFrame {
    fn from(data: Bytes) -> Self {
        Self(data)
    }
}

impl AsRef<[u8]> for CompressedFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A camera frame with timestamp metadata.
///
/// Binary wire format (Kafka message payload):
///   [0..8]   captured_at_ms  (i64 big-endian, Unix millis)
///   [8..16]  seq             (u64 big-endian, sequence number)
///   [16..]   image           (raw compressed image bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedFrame {
    pub image: CompressedFrame,
    pub captured_at_ms: i64,
    pub seq: u64,
}

const HEADER_SIZE: usize = 16; // 8 bytes timestamp + 8 bytes seq

impl TimestampedFrame {
    pub fn new(image: impl Into<CompressedFrame>, captured_at_ms: i64, seq: u64) -> Self {
        Self {
            image: image.into(),
            captured_at_ms,
            seq,
        }
    }

    /// Capture time, or `None` if the timestamp is out of chrono's range.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.captured_at_ms)
    }

    /// Milliseconds between capture and `now`; negative if the producer clock runs ahead.
    /// Saturates for timestamps far outside the representable range.
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp_millis().saturating_sub(self.captured_at_ms)
    }

    pub fn serialize(&self) -> Vec<u8> {
        let image = self.image.as_bytes();
        let mut buf = Vec::with_capacity(HEADER_SIZE + image.len());
        buf.extend_from_slice(&self.captured_at_ms.to_be_bytes());
        buf.extend_from_slice(&self.seq.to_be_bytes());
        buf.extend_from_slice(image);
        buf
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() < HEADER_SIZE {
            return Err(FrameError::TooShort {
                got: data.len(),
                expected: HEADER_SIZE,
            });
        }
        let (ts, rest) = data.split_at(8);
        let (seq, image) = rest.split_at(8);
        let mut ts_buf = [0u8; 8];
        ts_buf.copy_from_slice(ts);
        let mut seq_buf = [0u8; 8];
        seq_buf.copy_from_slice(seq);
        Ok(Self {
            image: CompressedFrame::new(Bytes::copy_from_slice(image)),
            captured_at_ms: i64::from_be_bytes(ts_buf),
            seq: u64::from_be_bytes(seq_buf),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame payload too short: got {got} bytes, expected at least {expected}")]
    TooShort { got: usize, expected: usize },
}
