//! Progress notifications from a running sweep
//!
//! Observers are told how many rows are done each time a chunk completes.
//! They see counts only and cannot change the results.

use std::sync::mpsc::{self, Receiver, Sender};

/// Rows completed so far out of the batch total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completed fraction in [0, 1]; an empty batch is complete
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Receives progress from the workers of a sweep
///
/// Called from worker threads in parallel mode, so it must not block.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: Progress);
}

impl<F> ProgressObserver for F
where
    F: Fn(Progress) + Send + Sync,
{
    fn on_progress(&self, progress: Progress) {
        self(progress)
    }
}

/// Forwards progress into a channel
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: Sender<Progress>,
}

impl ChannelObserver {
    /// An observer and the receiving end of its channel
    pub fn new() -> (Self, Receiver<Progress>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_progress(&self, progress: Progress) {
        // A dropped receiver only means nobody is listening
        let _ = self.sender.send(progress);
    }
}
