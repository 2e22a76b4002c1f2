//! Per-frame callback facility seen by the controller.

use std::collections::VecDeque;

use crate::error::PerfError;
use crate::ids::{FrameRequestId, LoopToken};

/// Host facility that calls back once on the next frame.
///
/// Implementations deliver the token back to `PerformanceController::on_frame`
/// together with the frame timestamp.
pub trait FrameScheduler {
    fn request_frame(&mut self, token: LoopToken) -> Result<FrameRequestId, PerfError>;

    /// Cancelling an id that already fired must be harmless.
    fn cancel_frame(&mut self, id: FrameRequestId);
}

/// Queue-backed scheduler for headless drivers: the owner drains due
/// requests with `take_due` and feeds them to the controller.
#[derive(Debug, Default)]
pub struct QueuedScheduler {
    next_id: i32,
    queue: VecDeque<(FrameRequestId, LoopToken)>,
}

impl QueuedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Requests registered so far, oldest first; the queue is emptied.
    pub fn take_due(&mut self) -> Vec<(FrameRequestId, LoopToken)> {
        self.queue.drain(..).collect()
    }
}

impl FrameScheduler for QueuedScheduler {
    fn request_frame(&mut self, token: LoopToken) -> Result<FrameRequestId, PerfError> {
        self.next_id = self.next_id.wrapping_add(1);
        let id = FrameRequestId(self.next_id);
        self.queue.push_back((id, token));
        Ok(id)
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        self.queue.retain(|(queued, _)| *queued != id);
    }
}
