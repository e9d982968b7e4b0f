//! Channel sizing for worker/aggregator communication

/// Buffer configuration for the channels a run creates.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Completion-event buffer (workers -> metrics aggregator).
    ///
    /// The effective capacity is never below the worker count, so a
    /// momentarily slow aggregator does not usually block sends.
    /// Blocking under sustained saturation is accepted backpressure,
    /// never a drop.
    pub completion_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            completion_buffer: 1024,
        }
    }
}

impl ChannelConfig {
    /// Set the completion-event buffer size.
    pub fn with_completion_buffer(mut self, size: usize) -> Self {
        self.completion_buffer = size;
        self
    }

    /// Effective completion-channel capacity for a given pool size.
    pub(crate) fn completion_capacity(&self, worker_count: usize) -> usize {
        self.completion_buffer.max(worker_count).max(1)
    }
}
