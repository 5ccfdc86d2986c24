mod common;

use anyhow::Result;
use common::FakeIndex;
use keyset::domain::{ContentModel, ContentQuery, ContentSortField};
use keyset::PageRequest;
use keyset_search::ContentSearch;
use keyset_test_suite::{run_all_tests, ContentBackend, ContentPage, TestSuiteRunner};

struct SearchBackend {
    search: ContentSearch<FakeIndex>,
}

impl ContentBackend for SearchBackend {
    fn seed(&mut self, rows: &[ContentModel]) -> Result<()> {
        for row in rows {
            self.search.index_content(row)?;
        }
        Ok(())
    }

    fn page(
        &self,
        query: &ContentQuery,
        request: &PageRequest<ContentSortField>,
    ) -> keyset::Result<ContentPage> {
        self.search.find_contents(query, request)
    }
}

#[derive(Clone)]
struct SearchTestRunner;

impl TestSuiteRunner for SearchTestRunner {
    type Backend = SearchBackend;

    fn create(&self) -> Result<Self::Backend> {
        Ok(SearchBackend {
            search: ContentSearch::new(FakeIndex::default(), "contents")?,
        })
    }
}

#[test]
fn test_all_search() -> Result<()> {
    run_all_tests(SearchTestRunner)?;

    Ok(())
}
