//! Identifiers for the sampling loop.

use serde::{Deserialize, Serialize};

/// Generation of a monitoring loop. Frame callbacks carry the token they were
/// scheduled under; a callback whose token is no longer current is stale.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LoopToken(pub u64);

/// Host-assigned handle of one pending frame request (e.g. a `requestAnimationFrame` id).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FrameRequestId(pub i32);

/// Monotonic allocator for LoopToken.
#[derive(Default, Debug)]
pub struct TokenAllocator {
    next: u64,
}

impl TokenAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self) -> LoopToken {
        let token = LoopToken(self.next);
        self.next = self.next.wrapping_add(1);
        token
    }
}
