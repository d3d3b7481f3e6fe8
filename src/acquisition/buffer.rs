use std::collections::VecDeque;
use crate::acquisition::parser::ReadingFrame;
use crate::acquisition::AcquisitionError;
/// Fixed-capacity FIFO history for a single channel.
#[derive(Clone, Debug)]
pub struct ChannelBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
}
impl ChannelBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }
    /// Appends to the tail, evicting the oldest sample when full.
    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }
    /// Contents oldest-to-newest.
    pub fn snapshot(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }
}
/// Owned copy of every channel's history at one instant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistorySnapshot {
    pub channels: Vec<Vec<f64>>, // channel -> samples
}
impl HistorySnapshot {
    /// Length of the shortest channel; rows past it are not aligned in time.
    pub fn aligned_len(&self) -> usize {
        self.channels.iter().map(Vec::len).min().unwrap_or(0)
    }
    /// Row-major view of the aligned part of the history.
    pub fn aligned_rows(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        (0..self.aligned_len()).map(move |i| self.channels.iter().map(|c| c[i]).collect())
    }
}
/// Per-channel histories that advance together, one frame at a time.
#[derive(Clone, Debug)]
pub struct SensorHistory {
    per_channel: Vec<ChannelBuffer>,
}
impl SensorHistory {
    pub fn new(channel_count: usize, capacity: usize) -> Self {
        Self {
            per_channel: (0..channel_count)
                .map(|_| ChannelBuffer::with_capacity(capacity))
                .collect(),
        }
    }
    pub fn channel_count(&self) -> usize {
        self.per_channel.len()
    }
    pub fn channel(&self, index: usize) -> Option<&ChannelBuffer> {
        self.per_channel.get(index)
    }
    /// Pushes one value into every channel. The frame is checked before any
    /// buffer is touched so the channels never drift out of step.
    pub fn apply(&mut self, frame: &ReadingFrame) -> Result<(), AcquisitionError> {
        if frame.values().len() != self.per_channel.len() {
            return Err(AcquisitionError::FrameMismatch {
                expected: self.per_channel.len(),
                actual: frame.values().len(),
            });
        }
        for (buffer, &value) in self.per_channel.iter_mut().zip(frame.values()) {
            buffer.push(value);
        }
        Ok(())
    }
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            channels: self.per_channel.iter().map(ChannelBuffer::snapshot).collect(),
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn buffer_keeps_most_recent_values_in_order() {
        let mut buffer = ChannelBuffer::with_capacity(50);
        for i in 0..137 {
            buffer.push(i as f64);
            assert!(buffer.snapshot().len() <= 50);
        }
        let expected: Vec<f64> = (87..137).map(|i| i as f64).collect();
        assert_eq!(buffer.snapshot(), expected);
    }
    #[test]
    fn buffer_below_capacity_keeps_everything() {
        let mut buffer = ChannelBuffer::with_capacity(5);
        buffer.push(1.5);
        buffer.push(-2.0);
        assert_eq!(buffer.snapshot(), vec![1.5, -2.0]);
        // snapshot does not drain
        assert_eq!(buffer.snapshot(), vec![1.5, -2.0]);
    }
    #[test]
    fn history_rejects_short_frame_without_mutation() {
        let mut history = SensorHistory::new(4, 10);
        history
            .apply(&ReadingFrame::new(vec![1.0, 2.0, 3.0, 4.0]))
            .unwrap();
        let err = history
            .apply(&ReadingFrame::new(vec![5.0, 6.0]))
            .unwrap_err();
        assert!(err.is_fatal());
        for ch in 0..4 {
            assert_eq!(history.channel(ch).unwrap().snapshot(), vec![ch as f64 + 1.0]);
        }
    }
    #[test]
    fn aligned_rows_stop_at_shortest_channel() {
        let snapshot = HistorySnapshot {
            channels: vec![
                (0..10).map(f64::from).collect(),
                (10..20).map(f64::from).collect(),
                (20..27).map(f64::from).collect(),
                (30..40).map(f64::from).collect(),
            ],
        };
        assert_eq!(snapshot.aligned_len(), 7);
        let rows: Vec<Vec<f64>> = snapshot.aligned_rows().collect();
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0], vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(rows[6], vec![6.0, 16.0, 26.0, 36.0]);
    }
    #[test]
    fn empty_history_has_no_rows() {
        let history = SensorHistory::new(4, 50);
        assert_eq!(history.snapshot().aligned_len(), 0);
        assert_eq!(HistorySnapshot::default().aligned_rows().count(), 0);
    }
}
