//! Page assembly.
//!
//! Every backend fetches `limit + 1` rows already ordered by `(value, id)` and
//! hands them here. The extra row only signals that another page exists; it is
//! never returned.

use crate::cursor;
use crate::field::{SortField, Sortable};
use crate::page::{PageRequest, PageResponse};
use crate::sort::SortKey;

pub struct PageAssembler<'a, F> {
    request: &'a PageRequest<F>,
}

impl<'a, F: SortField> PageAssembler<'a, F> {
    pub fn new(request: &'a PageRequest<F>) -> Self {
        Self { request }
    }

    /// Builds a page from rows that know their own sort key.
    pub fn assemble<R, T>(
        &self,
        batch: Vec<R>,
        total_count: u64,
        map: impl FnMut(R) -> T,
    ) -> PageResponse<T, F>
    where
        R: Sortable<F>,
    {
        let sort_by = self.request.sort_by;
        self.assemble_with(batch, total_count, |row| row.sort_key(sort_by), map)
    }

    /// Builds a page, extracting the sort key of a row with `key`.
    ///
    /// `batch` must be ordered in page order and hold at most `limit + 1` rows.
    /// `total_count` is reported as given, including on an empty page.
    pub fn assemble_with<R, T>(
        &self,
        mut batch: Vec<R>,
        total_count: u64,
        key: impl Fn(&R) -> SortKey,
        map: impl FnMut(R) -> T,
    ) -> PageResponse<T, F> {
        let request = self.request;

        if batch.is_empty() {
            return PageResponse::empty(request.sort_by, request.direction, total_count);
        }

        let limit = request.limit.max(1) as usize;
        let has_next = batch.len() > limit;
        batch.truncate(limit);

        // The last row kept, not the over-fetched one, is where the next page resumes.
        let next = if has_next { batch.last().map(&key) } else { None };

        PageResponse {
            next_cursor: next
                .as_ref()
                .map(|position| cursor::encode(request.sort_by, position)),
            next_anchor_id: next.map(|position| position.id),
            has_next,
            items: batch.into_iter().map(map).collect(),
            total_count,
            sort_by: request.sort_by,
            direction: request.direction,
        }
    }
}
