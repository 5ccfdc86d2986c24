use anyhow::Result;
use keyset::domain::{ContentModel, ContentQuery, ContentSortField};
use keyset::{memory, PageRequest};
use keyset_test_suite::{run_all_tests, ContentBackend, ContentPage, TestSuiteRunner};

/// Rows held in a plain vector and paginated by the in-memory adapter.
#[derive(Clone, Default)]
struct MemoryBackend {
    rows: Vec<ContentModel>,
}

impl ContentBackend for MemoryBackend {
    fn seed(&mut self, rows: &[ContentModel]) -> Result<()> {
        self.rows.extend_from_slice(rows);
        Ok(())
    }

    fn page(
        &self,
        query: &ContentQuery,
        request: &PageRequest<ContentSortField>,
    ) -> keyset::Result<ContentPage> {
        memory::paginate(self.rows.iter().filter(|c| query.matches(c)).cloned(), request)
    }
}

#[derive(Clone)]
struct MemoryTestRunner;

impl TestSuiteRunner for MemoryTestRunner {
    type Backend = MemoryBackend;

    fn create(&self) -> Result<Self::Backend> {
        Ok(MemoryBackend::default())
    }
}

#[test]
fn test_all_memory() -> Result<()> {
    run_all_tests(MemoryTestRunner)?;

    Ok(())
}
