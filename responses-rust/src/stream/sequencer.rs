use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out strictly increasing sequence numbers for one stream.
///
/// Each emission session owns its own sequencer. Increments never get lost
/// under concurrent callers, but callers must still present events in the
/// order they intend to emit them.
#[derive(Debug)]
pub struct Sequencer {
    next: AtomicU64,
}

impl Sequencer {
    #[must_use]
    pub fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    /// Returns the current number and advances by one.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// The number the next call to [`Self::next`] will return.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(0)
    }
}
