//! Keyset (cursor) pagination shared by every storage backend.
//!
//! A backend adapter applies its filters, restricts the scan to rows strictly
//! after the request's [`SortKey`] position, fetches `limit + 1` rows in
//! `(value, id)` order and hands them to [`PageAssembler`]. Everything that
//! decides what a page looks like lives here so that SQL, search-index and
//! cache backends cannot drift apart.

pub mod assemble;
pub mod config;
pub mod cursor;
pub mod domain;
pub mod field;
pub mod keyset;
pub mod memory;
pub mod page;
pub mod sort;

pub use assemble::PageAssembler;
pub use config::PaginationConfig;
pub use field::{Bindings, Descriptor, Registry, SortField, Sortable};
pub use keyset::Keyset;
pub use page::{CursorPolicy, PageRequest, PageResponse};
pub use sort::{SortDirection, SortKey, SortValue, ValueKind};

/// Unique, totally ordered row identifier used to break sort-value ties.
pub type Id = u64;

/// Error type for pagination operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid cursor: {reason}")]
    InvalidCursor { reason: String },
    #[error("Sort field `{field}` is not registered for the {backend} backend")]
    UnsupportedSortField {
        backend: &'static str,
        field: &'static str,
    },
    #[error("Backend fetch failed: {source}")]
    Backend {
        #[from]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub fn invalid_cursor(reason: impl Into<String>) -> Self {
        Error::InvalidCursor {
            reason: reason.into(),
        }
    }

    /// Wraps a native store error. The error is propagated unchanged, never retried.
    pub fn backend<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Backend {
            source: Box::new(source),
        }
    }

    pub fn is_invalid_cursor(&self) -> bool {
        matches!(self, Error::InvalidCursor { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
