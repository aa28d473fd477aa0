//! Ordered accumulator of captured frames awaiting batch dispatch.

use crate::types::FramePayload;
use std::collections::VecDeque;

/// FIFO frame queue with an atomic full-batch drain.
///
/// Push never rejects: if capture outpaces the verify cadence (a slow
/// network stall, for instance) the queue transiently exceeds the batch
/// size and drains oldest-first once dispatching catches up.
#[derive(Default)]
pub struct FrameBuffer {
    frames: VecDeque<FramePayload>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: FramePayload) {
        self.frames.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Remove and return the oldest `n` frames, or `None` (no mutation)
    /// if fewer than `n` are buffered. The only path frames leave by.
    pub fn try_drain_full(&mut self, n: usize) -> Option<Vec<FramePayload>> {
        if n == 0 || self.frames.len() < n {
            return None;
        }
        Some(self.frames.drain(..n).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(sequence: u32) -> FramePayload {
        FramePayload {
            data: vec![0xFF, 0xD8, sequence as u8],
            sequence,
            captured_at: std::time::Instant::now(),
        }
    }

    #[test]
    fn test_drain_below_batch_size_is_noop() {
        let mut buf = FrameBuffer::new();
        for i in 0..4 {
            buf.push(frame(i));
        }
        assert!(buf.try_drain_full(5).is_none());
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn test_drain_removes_exactly_n() {
        let mut buf = FrameBuffer::new();
        for i in 0..7 {
            buf.push(frame(i));
        }
        let batch = buf.try_drain_full(5).unwrap();
        assert_eq!(batch.len(), 5);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_drain_is_oldest_first() {
        let mut buf = FrameBuffer::new();
        for i in 0..6 {
            buf.push(frame(i));
        }
        let batch = buf.try_drain_full(5).unwrap();
        let sequences: Vec<u32> = batch.iter().map(|f| f.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3, 4]);
        // The newest frame stays behind for the next batch.
        assert_eq!(buf.frames[0].sequence, 5);
    }

    #[test]
    fn test_transient_overfill_tolerated() {
        let mut buf = FrameBuffer::new();
        for i in 0..13 {
            buf.push(frame(i));
        }
        assert_eq!(buf.len(), 13);
        assert_eq!(buf.try_drain_full(5).unwrap().len(), 5);
        assert_eq!(buf.try_drain_full(5).unwrap().len(), 5);
        assert!(buf.try_drain_full(5).is_none());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_zero_n_never_drains() {
        let mut buf = FrameBuffer::new();
        buf.push(frame(0));
        assert!(buf.try_drain_full(0).is_none());
        assert_eq!(buf.len(), 1);
    }
}
