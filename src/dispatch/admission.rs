//! Admission control for team leaders.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};

/// Number of requests currently admitted by this process.
#[derive(Debug, Default)]
pub struct InflightCounter {
    current: AtomicUsize,
}

/// Holds one admitted slot; releases it exactly once on drop.
///
/// An unlimited admission holds no slot and releases nothing.
#[must_use]
pub struct InflightPermit<'a> {
    counter: Option<&'a AtomicUsize>,
}

impl InflightCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    /// Admits one request against `limit`. A limit of `0` is unlimited and leaves
    /// the counter untouched.
    ///
    /// A rejected request leaves the counter where it was.
    pub fn admit(&self, limit: u32) -> Result<InflightPermit<'_>> {
        if limit == 0 {
            return Ok(InflightPermit { counter: None });
        }

        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        if now > limit as usize {
            self.current.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::ResourceExhausted);
        }

        Ok(InflightPermit {
            counter: Some(&self.current),
        })
    }
}

impl Drop for InflightPermit<'_> {
    fn drop(&mut self) {
        if let Some(counter) = self.counter.take() {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
