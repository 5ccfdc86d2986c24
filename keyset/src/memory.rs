//! In-memory adapter: materialize, filter by the keyset, sort, assemble.
//!
//! Used by cache-backed stores whose native iteration order is not the
//! requested page order, and directly by callers holding rows in memory.

use crate::assemble::PageAssembler;
use crate::field::{SortField, Sortable};
use crate::keyset::Keyset;
use crate::page::{PageRequest, PageResponse};
use crate::sort::SortKey;
use crate::Result;

/// Paginates an already filtered candidate set.
///
/// `total_count` is the number of candidates, independent of the cursor.
pub fn paginate<R, F>(
    candidates: impl IntoIterator<Item = R>,
    request: &PageRequest<F>,
) -> Result<PageResponse<R, F>>
where
    R: Sortable<F>,
    F: SortField,
{
    let sort_by = request.sort_by;
    paginate_by(candidates, request, |row: &R| row.sort_key(sort_by))
}

/// Like [`paginate`], reading each row's position with `key`.
pub fn paginate_by<R, F>(
    candidates: impl IntoIterator<Item = R>,
    request: &PageRequest<F>,
    key: impl Fn(&R) -> SortKey,
) -> Result<PageResponse<R, F>>
where
    F: SortField,
{
    let keyset = Keyset::from_request(request)?;

    let candidates: Vec<R> = candidates.into_iter().collect();
    let total_count = candidates.len() as u64;

    let mut batch: Vec<_> = candidates
        .into_iter()
        .map(|row| (key(&row), row))
        .filter(|(key, _)| keyset.admits(key))
        .collect();
    batch.sort_by(|(a, _), (b, _)| keyset.compare(a, b));
    batch.truncate(request.fetch_size());

    tracing::debug!(
        sort_by = request.sort_by.name(),
        direction = ?request.direction,
        candidates = total_count,
        fetched = batch.len(),
        "paginated in-memory rows"
    );

    Ok(PageAssembler::new(request).assemble_with(
        batch,
        total_count,
        |(key, _)| key.clone(),
        |(_, row)| row,
    ))
}
