//! Size budget tracking
//!
//! A byte ceiling shared by every content-producing step of one assembly.
//! Each assembly owns its own `Budget`; nothing here is global.

use serde::Serialize;

/// Running byte budget for a single document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Budget {
    total: usize,
    consumed: usize,
}

impl Budget {
    /// Create a fresh budget with nothing consumed
    pub fn new(total: usize) -> Self {
        Self { total, consumed: 0 }
    }

    /// Bytes still available
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.consumed)
    }

    /// Bytes reserved so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Reserve up to `n` bytes, returning how many were actually granted
    pub fn reserve(&mut self, n: usize) -> usize {
        let granted = n.min(self.remaining());
        self.consumed += granted;
        granted
    }
}
