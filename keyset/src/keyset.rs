//! Backend-agnostic form of the keyset continuation predicate.
//!
//! ```text
//! ascending:  value > cursor.value OR (value = cursor.value AND id > anchor_id)
//! descending: value < cursor.value OR (value = cursor.value AND id < anchor_id)
//! ```
//!
//! Backends that cannot push the predicate down to the store (caches, test
//! doubles) evaluate it with [`Keyset::admits`]; query-building backends
//! compile the same predicate into their native language.

use std::cmp::Ordering;

use crate::field::SortField;
use crate::page::PageRequest;
use crate::sort::{SortDirection, SortKey};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyset {
    position: Option<SortKey>,
    direction: SortDirection,
}

impl Keyset {
    pub fn new(position: Option<SortKey>, direction: SortDirection) -> Self {
        Self {
            position,
            direction,
        }
    }

    /// Resolves the request's cursor; fails on a malformed cursor unless the
    /// request opted into restarting.
    pub fn from_request<F: SortField>(request: &PageRequest<F>) -> Result<Self> {
        Ok(Self::new(request.position()?, request.direction))
    }

    pub fn position(&self) -> Option<&SortKey> {
        self.position.as_ref()
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Whether `key` lies strictly after the cursor position in page order.
    pub fn admits(&self, key: &SortKey) -> bool {
        match &self.position {
            None => true,
            Some(position) => key.cmp_directed(position, self.direction) == Ordering::Greater,
        }
    }

    /// Page order: by value, then id, both in the requested direction.
    pub fn compare(&self, a: &SortKey, b: &SortKey) -> Ordering {
        a.cmp_directed(b, self.direction)
    }
}
