//! Stale-response guard
//!
//! Every reload of a collection takes a ticket before it goes out. A
//! response is applied only if no newer request for the same collection has
//! already been applied, so a slow response can never overwrite a fresher
//! one.

use std::sync::atomic::{AtomicU64, Ordering};

/// Position of one request in its collection's sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Issues monotonically increasing tickets
#[derive(Debug, Default)]
pub struct RequestSequence {
    issued: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if no request was issued after this one
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }
}

/// Highest ticket whose response has been applied.
///
/// Lives next to the data it protects, under the same lock.
#[derive(Debug, Default, Clone, Copy)]
pub struct Applied(u64);

impl Applied {
    /// Record `ticket` as applied unless something newer already was
    pub fn accept(&mut self, ticket: Ticket) -> bool {
        if ticket.0 > self.0 {
            self.0 = ticket.0;
            true
        } else {
            false
        }
    }
}
