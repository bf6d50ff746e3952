//! Policies for picking the next executor of a group

use std::sync::atomic::{AtomicUsize, Ordering};

/// Picks the index of the next executor out of `len` members.
///
/// Implementations must return an index below `len`; `len` is never zero.
pub trait ExecutorChooser: Send + Sync + 'static {
    /// Index of the executor to hand out next.
    fn next_index(&self, len: usize) -> usize;
}

/// Cycles through members in order.
#[derive(Debug, Default)]
pub struct RoundRobinChooser {
    idx: AtomicUsize,
}

impl ExecutorChooser for RoundRobinChooser {
    fn next_index(&self, len: usize) -> usize {
        self.idx.fetch_add(1, Ordering::Relaxed) % len
    }
}

/// Round-robin using a bit mask; only valid for power-of-two group sizes.
#[derive(Debug, Default)]
pub struct PowerOfTwoChooser {
    idx: AtomicUsize,
}

impl ExecutorChooser for PowerOfTwoChooser {
    fn next_index(&self, len: usize) -> usize {
        debug_assert!(len.is_power_of_two());
        self.idx.fetch_add(1, Ordering::Relaxed) & (len - 1)
    }
}

/// The chooser used when a group is not given one explicitly.
pub fn default_chooser(len: usize) -> Box<dyn ExecutorChooser> {
    if len.is_power_of_two() {
        Box::new(PowerOfTwoChooser::default())
    } else {
        Box::new(RoundRobinChooser::default())
    }
}
