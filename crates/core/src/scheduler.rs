//! Frame scheduling abstraction.
//!
//! A host's "call me before the next repaint" primitive is modelled as a
//! [`FrameScheduler`]: request a frame, get a handle, cancel it by handle.
//! Browsers back it with `requestAnimationFrame`; tests use
//! [`ManualScheduler`] and fire frames with explicit timestamps.

/// Identifies one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Source of display-refresh callbacks.
pub trait FrameScheduler {
    /// Requests one callback before the next repaint.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancels a pending callback. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: FrameHandle);
}

/// Scheduler driven by hand: requests queue up until [`fire`](Self::fire).
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Vec<FrameHandle>,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles still waiting to be fired.
    pub fn pending(&self) -> &[FrameHandle] {
        &self.pending
    }

    /// Number of successful cancellations so far.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }

    /// Removes and returns every pending handle, oldest first.
    ///
    /// The caller delivers them to whoever requested them.
    pub fn fire(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}
