//! Tracks how many cars have exhausted their trip quota.

/// Completion count for the whole fleet.
///
/// Lives inside the zone state so it is only touched under the zone lock; the
/// last exit of a car and its finish are therefore observed together.
#[derive(Debug)]
pub struct CompletionCounter {
    finished: usize,
    total: usize,
}

impl CompletionCounter {
    pub fn new(total: usize) -> Self {
        Self { finished: 0, total }
    }

    /// Count one car as done.
    pub fn record_finish(&mut self) {
        debug_assert!(
            self.finished < self.total,
            "more cars finished than were started: total={}",
            self.total
        );
        self.finished += 1;
    }

    pub fn finished(&self) -> usize {
        self.finished
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// True once every car has finished.
    pub fn is_complete(&self) -> bool {
        self.finished == self.total
    }
}
