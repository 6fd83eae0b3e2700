//! Memory accounting for the buffers one rewrite owns.
//!
//! Every buffer that grows with input is a [`LimitedString`] charged against a
//! shared [`MemoryGovernor`]. Growth is checked before allocating, so breaching
//! the ceiling fails the rewrite instead of allocating past it.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::MemoryLimitExceeded;
use crate::options::ResourceBudget;

#[derive(Debug)]
struct Usage {
    used: Cell<usize>,
    peak: Cell<usize>,
    limit: Option<usize>,
}

/// Shared byte counter; clones observe the same usage.
#[derive(Clone, Debug)]
pub struct MemoryGovernor {
    usage: Rc<Usage>,
}

impl MemoryGovernor {
    pub fn new(budget: Option<&ResourceBudget>) -> Self {
        Self {
            usage: Rc::new(Usage {
                used: Cell::new(0),
                peak: Cell::new(0),
                limit: budget.map(|b| b.max_allowed_memory_usage),
            }),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn used(&self) -> usize {
        self.usage.used.get()
    }

    /// Highest usage observed so far.
    pub fn peak(&self) -> usize {
        self.usage.peak.get()
    }

    pub fn limit(&self) -> Option<usize> {
        self.usage.limit
    }

    fn would_fit(&self, additional: usize) -> bool {
        self.usage
            .limit
            .is_none_or(|limit| self.used().checked_add(additional).is_some_and(|total| total <= limit))
    }

    fn charge(&self, additional: usize) -> Result<(), MemoryLimitExceeded> {
        if !self.would_fit(additional) {
            let err = MemoryLimitExceeded {
                requested: additional,
                used: self.used(),
                limit: self.usage.limit.unwrap_or(usize::MAX),
            };
            log::debug!(target: "rewriter.memory", "{err}");
            return Err(err);
        }
        let used = self.used() + additional;
        self.usage.used.set(used);
        if used > self.peak() {
            self.usage.peak.set(used);
        }
        Ok(())
    }

    /// The allocator may hand out more than was charged; count what is held.
    fn settle(&self, charged: usize, actual: usize) {
        if actual > charged {
            let used = self.used() + (actual - charged);
            self.usage.used.set(used);
            self.usage.peak.set(self.peak().max(used));
        }
    }

    fn release(&self, bytes: usize) {
        self.usage.used.set(self.used().saturating_sub(bytes));
    }
}

/// A `String` whose capacity is charged to a [`MemoryGovernor`].
#[derive(Debug)]
pub struct LimitedString {
    buf: String,
    governor: MemoryGovernor,
}

impl LimitedString {
    pub fn new(governor: &MemoryGovernor) -> Self {
        Self {
            buf: String::new(),
            governor: governor.clone(),
        }
    }

    pub fn with_capacity(governor: &MemoryGovernor, capacity: usize) -> Result<Self, MemoryLimitExceeded> {
        let mut s = Self::new(governor);
        s.reserve(capacity)?;
        Ok(s)
    }

    /// Adopt an existing string, charging its capacity.
    pub fn adopt(governor: &MemoryGovernor, buf: String) -> Result<Self, MemoryLimitExceeded> {
        governor.charge(buf.capacity())?;
        Ok(Self {
            buf,
            governor: governor.clone(),
        })
    }

    /// Make room for `additional` more bytes. Capacity doubles while the
    /// budget allows and falls back to an exact fit near the ceiling.
    pub fn reserve(&mut self, additional: usize) -> Result<(), MemoryLimitExceeded> {
        let needed = self.buf.len().saturating_add(additional);
        let capacity = self.buf.capacity();
        if needed <= capacity {
            return Ok(());
        }
        let doubled = needed.max(capacity.saturating_mul(2));
        let target = if self.governor.would_fit(doubled - capacity) {
            doubled
        } else {
            needed
        };
        self.governor.charge(target - capacity)?;
        self.buf.reserve_exact(target - self.buf.len());
        self.governor.settle(target, self.buf.capacity());
        Ok(())
    }

    pub fn push_str(&mut self, s: &str) -> Result<(), MemoryLimitExceeded> {
        self.reserve(s.len())?;
        self.buf.push_str(s);
        Ok(())
    }

    pub fn push(&mut self, ch: char) -> Result<(), MemoryLimitExceeded> {
        self.reserve(ch.len_utf8())?;
        self.buf.push(ch);
        Ok(())
    }

    /// Drop the first `n` bytes, keeping capacity.
    pub fn consume(&mut self, n: usize) {
        self.buf.drain(..n);
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn last_byte(&self) -> Option<u8> {
        self.buf.as_bytes().last().copied()
    }

    /// Release the accounting and hand back the contents.
    pub fn into_string(mut self) -> String {
        self.governor.release(self.buf.capacity());
        std::mem::take(&mut self.buf)
    }
}

impl Drop for LimitedString {
    fn drop(&mut self) {
        self.governor.release(self.buf.capacity());
    }
}
