mod fixtures;

pub use fixtures::{catalog, content, tie_scenario};

use anyhow::{anyhow, ensure};
use keyset::domain::{ContentModel, ContentQuery, ContentSortField, ContentType};
use keyset::{Id, Keyset, PageRequest, PageResponse, SortDirection, SortField, Sortable};

pub type ContentPage = PageResponse<ContentModel, ContentSortField>;

/// A content listing backed by some store.
pub trait ContentBackend {
    /// Stores `rows` as they are, ids included.
    fn seed(&mut self, rows: &[ContentModel]) -> anyhow::Result<()>;

    fn page(
        &self,
        query: &ContentQuery,
        request: &PageRequest<ContentSortField>,
    ) -> keyset::Result<ContentPage>;
}

pub trait TestSuiteRunner: Clone {
    type Backend: ContentBackend;

    /// A backend holding no rows.
    fn create(&self) -> anyhow::Result<Self::Backend>;
}

fn seeded<R: TestSuiteRunner>(r: &R, rows: &[ContentModel]) -> anyhow::Result<R::Backend> {
    let mut backend = r.create()?;
    backend.seed(rows)?;
    Ok(backend)
}

fn ids(page: &ContentPage) -> Vec<Id> {
    page.items.iter().map(|c| c.id).collect()
}

/// Follows `next` links from `request` until the last page.
pub fn walk<B: ContentBackend>(
    backend: &B,
    query: &ContentQuery,
    request: PageRequest<ContentSortField>,
) -> anyhow::Result<Vec<ContentPage>> {
    let mut pages = Vec::new();
    let mut next = Some(request);

    while let Some(request) = next.take() {
        let page = backend.page(query, &request)?;
        next = request.next(&page);
        pages.push(page);
        ensure!(pages.len() <= 1_000, "pagination does not terminate");
    }
    Ok(pages)
}

/// Ids of `rows` in `(value, id)` page order.
fn expected_order(
    rows: &[ContentModel],
    sort_by: ContentSortField,
    direction: SortDirection,
) -> Vec<Id> {
    let keyset = Keyset::new(None, direction);
    let mut keys: Vec<_> = rows.iter().map(|row| row.sort_key(sort_by)).collect();
    keys.sort_by(|a, b| keyset.compare(a, b));
    keys.into_iter().map(|key| key.id).collect()
}

pub fn test_empty_dataset<R: TestSuiteRunner>(r: &R) -> anyhow::Result<()> {
    println!("  Testing empty dataset...");

    let backend = r.create()?;
    let page = backend.page(
        &ContentQuery::default(),
        &PageRequest::desc(ContentSortField::CreatedAt, 10),
    )?;

    ensure!(page.is_empty(), "expected no items, got {:?}", ids(&page));
    ensure!(!page.has_next);
    ensure!(page.next_cursor.is_none() && page.next_anchor_id.is_none());
    ensure!(page.total_count == 0);
    Ok(())
}

pub fn test_tie_scenario<R: TestSuiteRunner>(r: &R) -> anyhow::Result<()> {
    println!("  Testing [1, 2, 2, 3, 4] tie scenario...");

    let backend = seeded(r, &tie_scenario())?;
    let pages = walk(
        &backend,
        &ContentQuery::default(),
        PageRequest::asc(ContentSortField::WatcherCount, 2),
    )?;

    let got: Vec<_> = pages.iter().map(ids).collect();
    ensure!(
        got == vec![vec![1, 2], vec![3, 4], vec![5]],
        "unexpected pages {got:?}"
    );
    ensure!(pages[0].next_anchor_id == Some(2));
    ensure!(pages[1].next_anchor_id == Some(4));
    ensure!(!pages[2].has_next && pages[2].next_cursor.is_none());
    ensure!(pages.iter().all(|p| p.total_count == 5));
    Ok(())
}

pub fn test_no_skip_no_duplicate<R: TestSuiteRunner>(r: &R) -> anyhow::Result<()> {
    println!("  Testing every row is visited exactly once...");

    let rows = catalog();
    let backend = seeded(r, &rows)?;

    for &sort_by in ContentSortField::ALL {
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let pages = walk(
                &backend,
                &ContentQuery::default(),
                PageRequest::first(sort_by, direction, 5),
            )?;

            let visited: Vec<Id> = pages.iter().flat_map(ids).collect();
            let expected = expected_order(&rows, sort_by, direction);
            ensure!(
                visited == expected,
                "{} {:?}: visited {visited:?}, expected {expected:?}",
                sort_by.name(),
                direction
            );

            let (last, rest) = pages
                .split_last()
                .ok_or_else(|| anyhow!("no pages returned"))?;
            ensure!(rest.iter().all(|p| p.has_next && p.len() == 5));
            ensure!(!last.has_next && last.next_cursor.is_none());
            ensure!(pages.iter().all(|p| p.sort_by == sort_by && p.direction == direction));
        }
    }
    Ok(())
}

pub fn test_tie_break_on_id<R: TestSuiteRunner>(r: &R) -> anyhow::Result<()> {
    println!("  Testing equal sort values break ties on id...");

    let rows: Vec<_> = [8, 3, 11, 1, 6, 2, 9].into_iter().map(|id| content(id, 7)).collect();
    let backend = seeded(r, &rows)?;

    let asc = walk(
        &backend,
        &ContentQuery::default(),
        PageRequest::asc(ContentSortField::WatcherCount, 3),
    )?;
    let asc: Vec<Id> = asc.iter().flat_map(ids).collect();
    ensure!(asc == vec![1, 2, 3, 6, 8, 9, 11], "ascending {asc:?}");

    let desc = walk(
        &backend,
        &ContentQuery::default(),
        PageRequest::desc(ContentSortField::WatcherCount, 3),
    )?;
    let desc: Vec<Id> = desc.iter().flat_map(ids).collect();
    ensure!(desc == vec![11, 9, 8, 6, 3, 2, 1], "descending {desc:?}");
    Ok(())
}

pub fn test_page_boundary<R: TestSuiteRunner>(r: &R) -> anyhow::Result<()> {
    println!("  Testing limit vs limit + 1 remaining rows...");

    let rows: Vec<_> = (1..=4).map(|id| content(id, id as i64)).collect();
    let request = PageRequest::asc(ContentSortField::WatcherCount, 4);

    let exact = seeded(r, &rows)?.page(&ContentQuery::default(), &request)?;
    ensure!(exact.len() == 4);
    ensure!(!exact.has_next, "exactly `limit` rows must not report a next page");
    ensure!(exact.next_cursor.is_none());

    let mut more = rows.clone();
    more.push(content(5, 5));
    let backend = seeded(r, &more)?;
    let first = backend.page(&ContentQuery::default(), &request)?;
    ensure!(ids(&first) == vec![1, 2, 3, 4]);
    ensure!(first.has_next && first.next_anchor_id == Some(4));

    let second = backend.page(
        &ContentQuery::default(),
        &request.next(&first).ok_or_else(|| anyhow!("missing next request"))?,
    )?;
    ensure!(ids(&second) == vec![5]);
    ensure!(!second.has_next);
    Ok(())
}

pub fn test_idempotent<R: TestSuiteRunner>(r: &R) -> anyhow::Result<()> {
    println!("  Testing repeated requests return the same page...");

    let backend = seeded(r, &catalog())?;
    let first = backend.page(
        &ContentQuery::default(),
        &PageRequest::desc(ContentSortField::Rate, 4),
    )?;
    let request = PageRequest::desc(ContentSortField::Rate, 4)
        .next(&first)
        .ok_or_else(|| anyhow!("missing next request"))?;

    let a = backend.page(&ContentQuery::default(), &request)?;
    let b = backend.page(&ContentQuery::default(), &request)?;
    ensure!(a == b, "pages differ: {:?} vs {:?}", ids(&a), ids(&b));
    Ok(())
}

pub fn test_malformed_cursor<R: TestSuiteRunner>(r: &R) -> anyhow::Result<()> {
    println!("  Testing malformed cursors...");

    let backend = seeded(r, &tie_scenario())?;
    let request = PageRequest::asc(ContentSortField::WatcherCount, 2).after("not-a-cursor", 3);

    match backend.page(&ContentQuery::default(), &request) {
        Err(err) if err.is_invalid_cursor() => {}
        Err(err) => return Err(anyhow!("expected InvalidCursor, got {err}")),
        Ok(page) => return Err(anyhow!("expected InvalidCursor, got page {:?}", ids(&page))),
    }

    let restarted = backend.page(&ContentQuery::default(), &request.restart_on_invalid_cursor())?;
    ensure!(ids(&restarted) == vec![1, 2], "restart served {:?}", ids(&restarted));
    Ok(())
}

pub fn test_cursor_bound_to_field<R: TestSuiteRunner>(r: &R) -> anyhow::Result<()> {
    println!("  Testing cursors are bound to their sort field and anchor...");

    let backend = seeded(r, &tie_scenario())?;
    let first = backend.page(
        &ContentQuery::default(),
        &PageRequest::asc(ContentSortField::WatcherCount, 2),
    )?;
    let cursor = first
        .next_cursor
        .clone()
        .ok_or_else(|| anyhow!("missing cursor"))?;

    let other_field = PageRequest::asc(ContentSortField::CreatedAt, 2).after(cursor.clone(), 2);
    let err = backend
        .page(&ContentQuery::default(), &other_field)
        .err()
        .ok_or_else(|| anyhow!("cursor accepted for another sort field"))?;
    ensure!(err.is_invalid_cursor());

    let wrong_anchor = PageRequest::asc(ContentSortField::WatcherCount, 2).after(cursor, 5);
    let err = backend
        .page(&ContentQuery::default(), &wrong_anchor)
        .err()
        .ok_or_else(|| anyhow!("cursor accepted with a mismatched anchor"))?;
    ensure!(err.is_invalid_cursor());
    Ok(())
}

pub fn test_filters_and_total_count<R: TestSuiteRunner>(r: &R) -> anyhow::Result<()> {
    println!("  Testing filters and total count...");

    let rows = catalog();
    let backend = seeded(r, &rows)?;

    let movies = ContentQuery {
        type_equal: Some(ContentType::Movie),
        keyword_like: None,
    };
    let pages = walk(
        &backend,
        &movies,
        PageRequest::desc(ContentSortField::CreatedAt, 3),
    )?;
    let expected: Vec<_> = rows.iter().filter(|c| movies.matches(c)).cloned().collect();
    let visited: Vec<Id> = pages.iter().flat_map(ids).collect();
    ensure!(
        visited == expected_order(&expected, ContentSortField::CreatedAt, SortDirection::Descending),
        "movies visited {visited:?}"
    );
    ensure!(pages
        .iter()
        .all(|p| p.total_count == expected.len() as u64));

    let dune = ContentQuery {
        type_equal: None,
        keyword_like: Some("  dune ".to_string()),
    };
    let page = backend.page(&dune, &PageRequest::asc(ContentSortField::WatcherCount, 10))?;
    let mut found = ids(&page);
    found.sort();
    ensure!(found == vec![4, 9, 13], "keyword matched {found:?}");
    ensure!(page.total_count == 3);

    let blank = ContentQuery {
        type_equal: None,
        keyword_like: Some("   ".to_string()),
    };
    let page = backend.page(&blank, &PageRequest::asc(ContentSortField::WatcherCount, 1))?;
    ensure!(page.total_count == rows.len() as u64, "blank keyword must not filter");
    Ok(())
}

pub fn test_past_last_page_keeps_total<R: TestSuiteRunner>(r: &R) -> anyhow::Result<()> {
    println!("  Testing an exhausted listing still reports its total...");

    let backend = seeded(r, &tie_scenario())?;
    let pages = walk(
        &backend,
        &ContentQuery::default(),
        PageRequest::asc(ContentSortField::Popularity, 5),
    )?;
    ensure!(pages.len() == 1);

    let last = pages[0]
        .items
        .last()
        .ok_or_else(|| anyhow!("empty page"))?;
    let key = last.sort_key(ContentSortField::Popularity);
    let after_last = PageRequest::asc(ContentSortField::Popularity, 5)
        .after(keyset::cursor::encode(ContentSortField::Popularity, &key), key.id);

    let page = backend.page(&ContentQuery::default(), &after_last)?;
    ensure!(page.is_empty() && !page.has_next);
    ensure!(page.total_count == 5, "total count was {}", page.total_count);
    Ok(())
}

pub fn run_all_tests<R: TestSuiteRunner + Clone>(runner: R) -> anyhow::Result<()> {
    println!("Running all test cases...");

    test_empty_dataset(&runner)?;
    test_tie_scenario(&runner)?;
    test_no_skip_no_duplicate(&runner)?;
    test_tie_break_on_id(&runner)?;
    test_page_boundary(&runner)?;
    test_idempotent(&runner)?;
    test_malformed_cursor(&runner)?;
    test_cursor_bound_to_field(&runner)?;
    test_filters_and_total_count(&runner)?;
    test_past_last_page_keeps_total(&runner)?;

    println!("All tests passed!");
    Ok(())
}
