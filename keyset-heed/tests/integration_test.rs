use std::sync::Arc;

use anyhow::Result;
use keyset::domain::{ContentModel, ContentQuery, ContentSortField};
use keyset::PageRequest;
use keyset_heed::HeedCache;
use keyset_test_suite::{run_all_tests, ContentBackend, ContentPage, TestSuiteRunner};
use tempfile::TempDir;

struct HeedBackend {
    cache: HeedCache,
    // Keeps the environment directory alive as long as the cache.
    _dir: TempDir,
}

impl ContentBackend for HeedBackend {
    fn seed(&mut self, rows: &[ContentModel]) -> Result<()> {
        let mut txn = self.cache.write_txn()?;
        for row in rows {
            txn.put(row.clone())?;
        }
        txn.commit()?;
        Ok(())
    }

    fn page(
        &self,
        query: &ContentQuery,
        request: &PageRequest<ContentSortField>,
    ) -> keyset::Result<ContentPage> {
        self.cache.find_contents(query, request)
    }
}

#[derive(Clone)]
struct HeedTestRunner {
    root: Arc<TempDir>,
}

impl TestSuiteRunner for HeedTestRunner {
    type Backend = HeedBackend;

    fn create(&self) -> Result<Self::Backend> {
        let dir = TempDir::new_in(self.root.path())?;
        let cache = HeedCache::open(dir.path().join("cache"), Some(64 * 1024 * 1024))?;
        Ok(HeedBackend { cache, _dir: dir })
    }
}

#[test]
fn test_all_heed() -> Result<()> {
    let runner = HeedTestRunner {
        root: Arc::new(TempDir::new()?),
    };

    run_all_tests(runner)?;

    Ok(())
}
