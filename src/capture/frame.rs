//! Encoded video frame broadcast to subscribers
//!
//! This is the unit of fan-out: one `VideoFrame` per encoded camera frame,
//! cheap to clone because the payload is reference-counted `Bytes`.

use std::time::Duration;

use bytes::Bytes;

/// An encoded video sample
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Encoded H.264 data in Annex B format (zero-copy via reference counting)
    pub data: Bytes,

    /// Presentation duration of this frame
    pub duration: Duration,

    /// Whether this is a keyframe (IDR/I frame)
    pub keyframe: bool,
}

impl VideoFrame {
    /// Create a new frame
    pub fn new(data: Bytes, duration: Duration, keyframe: bool) -> Self {
        Self {
            data,
            duration,
            keyframe,
        }
    }

    /// Encoded payload size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_payload() {
        let frame = VideoFrame::new(Bytes::from_static(&[0, 0, 0, 1, 0x67]), Duration::from_millis(33), true);
        let clone = frame.clone();

        // Bytes clones share the underlying allocation
        assert_eq!(frame.data.as_ptr(), clone.data.as_ptr());
        assert_eq!(clone.size(), 5);
        assert!(clone.keyframe);
    }
}
