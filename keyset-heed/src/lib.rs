//! LMDB row cache with keyset pagination, using the heed crate.
//!
//! # Storage Layout
//!
//! A single `rows` database maps `namespace 0x00 partition id` keys (see
//! [`key`]) to the row serialized as JSON. A listing reads one partition with
//! a prefix scan, which yields rows in id order only; page order is restored
//! in memory by [`keyset::memory::paginate_by`].

mod cached;
pub mod key;

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions, RwTxn};
use keyset::domain::{
    ContentModel, ContentQuery, ContentSortField, WatchingSession, WatchingSessionQuery,
    WatchingSessionSortField,
};
use keyset::{
    memory, Bindings, Error, Id, PageRequest, PageResponse, Registry, Result, SortField, SortKey,
    SortValue, Sortable,
};
use snowflaked::Generator;

pub use cached::Cached;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("row id generator lock is poisoned")]
    IdGeneratorPoisoned,
}

/// Reads a sort value straight off a cached row.
pub type Accessor<T> = fn(&T) -> SortValue;

pub struct HeedBindings;

impl Bindings<ContentSortField> for HeedBindings {
    type Binding = Accessor<ContentModel>;
    const BACKEND: &'static str = "heed";

    fn binding(&self, field: ContentSortField) -> Option<Accessor<ContentModel>> {
        let accessor: Accessor<ContentModel> = match field {
            ContentSortField::CreatedAt => |c: &ContentModel| SortValue::Timestamp(c.created_at),
            ContentSortField::WatcherCount => |c: &ContentModel| SortValue::Integer(c.watcher_count),
            ContentSortField::Rate => |c: &ContentModel| SortValue::Float(c.average_rating),
            ContentSortField::Popularity => |c: &ContentModel| SortValue::Float(c.popularity_score),
        };
        Some(accessor)
    }
}

impl Bindings<WatchingSessionSortField> for HeedBindings {
    type Binding = Accessor<WatchingSession>;
    const BACKEND: &'static str = "heed";

    fn binding(&self, field: WatchingSessionSortField) -> Option<Accessor<WatchingSession>> {
        let accessor: Accessor<WatchingSession> = match field {
            WatchingSessionSortField::CreatedAt => |s: &WatchingSession| SortValue::Timestamp(s.created_at),
        };
        Some(accessor)
    }
}

const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Rows cached in LMDB, listed per partition.
pub struct HeedCache {
    env: Env,
    rows: Database<Bytes, Str>,
    id_generator: Mutex<Generator>,
    contents: Registry<ContentSortField, Accessor<ContentModel>>,
    watching: Registry<WatchingSessionSortField, Accessor<WatchingSession>>,
}

impl HeedCache {
    /// Opens the row cache stored under `path`, creating the directory and the
    /// `rows` database on first use. `map_size` caps the cache file in bytes and
    /// falls back to 1 GiB.
    pub fn open<P: AsRef<Path>>(path: P, map_size: Option<usize>) -> Result<Self> {
        let contents = Registry::build(&HeedBindings)?;
        let watching = Registry::build(&HeedBindings)?;

        let path = path.as_ref();
        fs::create_dir_all(path).map_err(Error::backend)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size.unwrap_or(DEFAULT_MAP_SIZE))
                .max_dbs(1)
                .open(path)
        }
        .map_err(Error::backend)?;

        let mut wtxn = env.write_txn().map_err(Error::backend)?;
        let rows: Database<Bytes, Str> = env
            .create_database(&mut wtxn, Some("rows"))
            .map_err(Error::backend)?;
        wtxn.commit().map_err(Error::backend)?;

        Ok(Self {
            env,
            rows,
            // Node id 0: one process writes to a cache directory.
            id_generator: Mutex::new(Generator::new(0)),
            contents,
            watching,
        })
    }

    /// Begins a read-write transaction.
    pub fn write_txn(&self) -> Result<Txn<'_>> {
        let txn = self.env.write_txn().map_err(Error::backend)?;
        Ok(Txn { txn, cache: self })
    }

    /// Id for a row stored without one.
    fn next_id(&self) -> Result<Id> {
        let mut generator = self
            .id_generator
            .lock()
            .map_err(|_| Error::backend(CacheError::IdGeneratorPoisoned))?;
        Ok(generator.generate())
    }

    /// Stores `row` in its own transaction, returning its id.
    pub fn put<T: Cached>(&self, row: T) -> Result<Id> {
        let mut txn = self.write_txn()?;
        let id = txn.put(row)?;
        txn.commit()?;
        Ok(id)
    }

    pub fn remove<T: Cached>(&self, partition: Id, id: Id) -> Result<bool> {
        let mut txn = self.write_txn()?;
        let removed = txn.remove::<T>(partition, id)?;
        txn.commit()?;
        Ok(removed)
    }

    /// Every row of `partition`, in id order.
    pub fn scan<T: Cached>(&self, partition: Id) -> Result<Vec<T>> {
        let rtxn = self.env.read_txn().map_err(Error::backend)?;
        let prefix = key::make_prefix(T::NAMESPACE, partition);
        let iter = self
            .rows
            .prefix_iter(&rtxn, &prefix)
            .map_err(Error::backend)?;

        let mut rows = Vec::new();
        for result in iter {
            let (raw_key, data_json) = result.map_err(Error::backend)?;

            match serde_json::from_str::<T>(data_json) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    tracing::warn!(
                        namespace = %String::from_utf8_lossy(T::NAMESPACE),
                        key = ?key::parse_row_key(raw_key),
                        error = %e,
                        "skipping undecodable cached row"
                    );
                }
            }
        }

        Ok(rows)
    }

    pub fn find_contents(
        &self,
        query: &ContentQuery,
        request: &PageRequest<ContentSortField>,
    ) -> Result<PageResponse<ContentModel, ContentSortField>> {
        let rows = self.scan::<ContentModel>(0)?;
        find_page(
            &self.contents,
            rows.into_iter().filter(|c| query.matches(c)),
            request,
        )
    }

    /// Sessions watching `content_id`, optionally filtered by watcher name.
    pub fn find_watching_sessions(
        &self,
        content_id: Id,
        query: &WatchingSessionQuery,
        request: &PageRequest<WatchingSessionSortField>,
    ) -> Result<PageResponse<WatchingSession, WatchingSessionSortField>> {
        let rows = self.scan::<WatchingSession>(content_id)?;
        find_page(
            &self.watching,
            rows.into_iter().filter(|s| query.matches(s)),
            request,
        )
    }
}

/// A read-write transaction over the cache.
pub struct Txn<'env> {
    txn: RwTxn<'env>,
    cache: &'env HeedCache,
}

impl<'env> Txn<'env> {
    /// Inserts or replaces `row`. A row with id 0 gets a fresh snowflake id.
    pub fn put<T: Cached>(&mut self, mut row: T) -> Result<Id> {
        if row.id() == 0 {
            row.set_id(self.cache.next_id()?);
        }
        let id = row.id();

        let key = key::make_row_key(T::NAMESPACE, row.partition(), id);
        let data_json = serde_json::to_string(&row).map_err(Error::backend)?;

        self.cache
            .rows
            .put(&mut self.txn, &key, &data_json)
            .map_err(Error::backend)?;

        Ok(id)
    }

    pub fn remove<T: Cached>(&mut self, partition: Id, id: Id) -> Result<bool> {
        let key = key::make_row_key(T::NAMESPACE, partition, id);
        self.cache
            .rows
            .delete(&mut self.txn, &key)
            .map_err(Error::backend)
    }

    pub fn commit(self) -> Result<()> {
        self.txn.commit().map_err(Error::backend)
    }
}

fn find_page<T, F>(
    registry: &Registry<F, Accessor<T>>,
    candidates: impl Iterator<Item = T>,
    request: &PageRequest<F>,
) -> Result<PageResponse<T, F>>
where
    T: Cached + Sortable<F>,
    F: SortField,
{
    let accessor = *registry.descriptor(request.sort_by)?.binding();
    memory::paginate_by(candidates, request, |row: &T| SortKey {
        value: accessor(row),
        id: row.row_id(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn session(id: Id, content_id: Id, name: &str, minute: u32) -> WatchingSession {
        WatchingSession {
            id,
            content_id,
            watcher_id: 1000 + id,
            watcher_name: name.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 20, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_bindings_match_sortable() {
        let row = keyset_row();
        let registry: Registry<ContentSortField, Accessor<ContentModel>> =
            Registry::build(&HeedBindings).unwrap();

        for &field in ContentSortField::ALL {
            let accessor = *registry.descriptor(field).unwrap().binding();
            assert_eq!(accessor(&row), row.sort_value(field), "{}", field.name());
        }
    }

    fn keyset_row() -> ContentModel {
        ContentModel {
            id: 1,
            kind: keyset::domain::ContentType::Movie,
            title: "Alien".to_string(),
            description: String::new(),
            tags: vec!["scifi".to_string()],
            average_rating: 4.5,
            review_count: 10,
            watcher_count: 3,
            popularity_score: 9.25,
            created_at: Utc.with_ymd_and_hms(1979, 5, 25, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_undecodable_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HeedCache::open(dir.path(), None).unwrap();

        cache.put(session(1, 7, "ann", 1)).unwrap();
        {
            let mut wtxn = cache.env.write_txn().unwrap();
            let key = key::make_row_key(WatchingSession::NAMESPACE, 7, 2);
            cache.rows.put(&mut wtxn, &key, "{not json").unwrap();
            wtxn.commit().unwrap();
        }

        let rows = cache.scan::<WatchingSession>(7).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
    }

    #[test]
    fn test_snowflake_ids_for_new_rows() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HeedCache::open(dir.path(), None).unwrap();

        let a = cache.put(session(0, 7, "ann", 1)).unwrap();
        let b = cache.put(session(0, 7, "bob", 2)).unwrap();

        assert_ne!(a, 0);
        assert!(b > a);
        assert!(cache.remove::<WatchingSession>(7, a).unwrap());
        assert!(!cache.remove::<WatchingSession>(7, a).unwrap());
        assert_eq!(cache.scan::<WatchingSession>(7).unwrap().len(), 1);
    }

    #[test]
    fn test_poisoned_id_generator_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HeedCache::open(dir.path(), None).unwrap();

        std::thread::scope(|s| {
            let poisoner = s.spawn(|| {
                let _guard = cache.id_generator.lock().unwrap();
                panic!("poison the generator");
            });
            assert!(poisoner.join().is_err());
        });

        let err = cache.put(session(0, 7, "ann", 1)).unwrap_err();
        assert!(matches!(err, Error::Backend { .. }));
        assert!(err.to_string().contains("poisoned"));
        // Rows with their own id do not need the generator.
        assert_eq!(cache.put(session(5, 7, "bob", 2)).unwrap(), 5);
    }
}
