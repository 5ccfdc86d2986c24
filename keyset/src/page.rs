use serde::{Serialize, Serializer};

use crate::cursor;
use crate::field::SortField;
use crate::sort::{SortDirection, SortKey};
use crate::{Error, Id, Result};

/// What to do with a cursor that cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorPolicy {
    /// Fail the request with [`Error::InvalidCursor`].
    #[default]
    Reject,
    /// Serve the first page instead.
    Restart,
}

/// Parameters of one page of a keyset-paginated listing.
///
/// A cursor is only honoured together with its anchor id; either one on its
/// own is ignored and the first page is served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<F> {
    /// Opaque cursor taken from a previous [`PageResponse::next_cursor`]
    pub cursor: Option<String>,
    /// Id of the last row of the previous page
    pub anchor_id: Option<Id>,
    /// Maximum number of items on the page, at least 1
    pub limit: u32,
    pub sort_by: F,
    pub direction: SortDirection,
    pub on_invalid_cursor: CursorPolicy,
}

impl<F: SortField> PageRequest<F> {
    /// Request for the first page.
    pub fn first(sort_by: F, direction: SortDirection, limit: u32) -> Self {
        Self {
            cursor: None,
            anchor_id: None,
            limit: limit.max(1),
            sort_by,
            direction,
            on_invalid_cursor: CursorPolicy::Reject,
        }
    }

    pub fn asc(sort_by: F, limit: u32) -> Self {
        Self::first(sort_by, SortDirection::Ascending, limit)
    }

    pub fn desc(sort_by: F, limit: u32) -> Self {
        Self::first(sort_by, SortDirection::Descending, limit)
    }

    /// Continue after the row identified by `cursor` and `anchor_id`.
    pub fn after(mut self, cursor: impl Into<String>, anchor_id: Id) -> Self {
        self.cursor = Some(cursor.into());
        self.anchor_id = Some(anchor_id);
        self
    }

    pub fn after_opt(mut self, cursor: Option<String>, anchor_id: Option<Id>) -> Self {
        self.cursor = cursor;
        self.anchor_id = anchor_id;
        self
    }

    /// Opt into serving the first page when the cursor is malformed.
    pub fn restart_on_invalid_cursor(mut self) -> Self {
        self.on_invalid_cursor = CursorPolicy::Restart;
        self
    }

    /// Request for the page following `response`, if there is one.
    pub fn next<T>(&self, response: &PageResponse<T, F>) -> Option<Self> {
        match (&response.next_cursor, response.next_anchor_id) {
            (Some(cursor), Some(anchor_id)) if response.has_next => {
                Some(self.clone().after(cursor.clone(), anchor_id))
            }
            _ => None,
        }
    }

    /// Number of rows a backend must fetch: one more than the page holds.
    pub fn fetch_size(&self) -> usize {
        self.limit.max(1) as usize + 1
    }

    pub fn has_cursor(&self) -> bool {
        self.anchor_id.is_some()
            && self
                .cursor
                .as_deref()
                .is_some_and(|cursor| !cursor.trim().is_empty())
    }

    /// Decodes the position the page continues after, `None` for the first page.
    pub fn position(&self) -> Result<Option<SortKey>> {
        let (Some(token), Some(anchor_id)) = (self.cursor.as_deref(), self.anchor_id) else {
            return Ok(None);
        };
        if token.trim().is_empty() {
            return Ok(None);
        }

        let decoded = cursor::decode(self.sort_by, token).and_then(|key| {
            if key.id == anchor_id {
                Ok(key)
            } else {
                Err(Error::invalid_cursor(format!(
                    "cursor points at row {} but anchor id is {}",
                    key.id, anchor_id
                )))
            }
        });

        match decoded {
            Ok(key) => Ok(Some(key)),
            Err(err) if err.is_invalid_cursor() && self.on_invalid_cursor == CursorPolicy::Restart => {
                tracing::warn!(
                    sort_by = self.sort_by.name(),
                    error = %err,
                    "ignoring invalid cursor, serving first page"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// One page of results plus the token to request the next one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    rename_all = "camelCase",
    bound(serialize = "T: Serialize, F: SortField")
)]
pub struct PageResponse<T, F> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub next_anchor_id: Option<Id>,
    pub has_next: bool,
    /// Rows matching the listing's filters, counted independently of the page
    pub total_count: u64,
    #[serde(serialize_with = "serialize_sort_field")]
    pub sort_by: F,
    pub direction: SortDirection,
}

impl<T, F: SortField> PageResponse<T, F> {
    pub fn empty(sort_by: F, direction: SortDirection, total_count: u64) -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            next_anchor_id: None,
            has_next: false,
            total_count,
            sort_by,
            direction,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Converts the items, keeping the page position untouched.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U, F> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            next_anchor_id: self.next_anchor_id,
            has_next: self.has_next,
            total_count: self.total_count,
            sort_by: self.sort_by,
            direction: self.direction,
        }
    }
}

fn serialize_sort_field<F: SortField, S: Serializer>(
    field: &F,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(field.name())
}
