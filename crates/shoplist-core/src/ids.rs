//! # Id Minting
//!
//! Ids are creation timestamps in milliseconds, so creation order and id
//! order agree.
//!
//! ## Same-Tick Creations
//! ```text
//! t = 1700000000000 ms   mint() → 1700000000000
//! t = 1700000000000 ms   mint() → 1700000000001   (bumped, no collision)
//! t = 1700000000005 ms   mint() → 1700000000005
//! ```
//!
//! The guarantee holds per minter. Two handles on the same database mint
//! overlapping runs, so the gateway checks a minted id against the stored
//! rows before using it and calls [`IdMinter::skip_past`] when it is taken.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::types::EntityId;

/// Hands out strictly increasing timestamp ids.
#[derive(Debug, Default)]
pub struct IdMinter {
    last: AtomicI64,
}

impl IdMinter {
    /// Creates a minter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id: the current time in milliseconds, or one past
    /// the previous id when the clock has not moved.
    pub fn mint(&self) -> EntityId {
        self.mint_at(Utc::now().timestamp_millis())
    }

    /// Mints against an explicit clock reading.
    pub fn mint_at(&self, now_millis: i64) -> EntityId {
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = now_millis.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(observed) => last = observed,
            }
        }
    }

    /// Moves the minter so the next id is greater than `id`.
    pub fn skip_past(&self, id: EntityId) {
        self.last.fetch_max(id, Ordering::AcqRel);
    }
}
