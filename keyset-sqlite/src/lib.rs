//! Keyset pagination over sqlite, reached through an r2d2 connection pool.

mod binding;
mod clause;
mod listing;
mod schema;

use std::path::Path;

use chrono::{DateTime, Utc};
use keyset::domain::{
    ContentModel, ConversationModel, DirectMessageModel, NotificationModel, PlaylistModel,
    ReviewModel, UserModel,
};
use keyset::{Error, Id, PageRequest, PageResponse, Result};
use r2d2::Pool;
use r2d2_sqlite::rusqlite::{params, Transaction};
use r2d2_sqlite::SqliteConnectionManager;

pub use binding::{to_sql, Registries, RegistryFor, SqlColumn, SqliteBindings};
pub use clause::KeysetClause;
pub use listing::{page, Filter, Listing};
pub use schema::{migrate, register_functions, SCHEMA};

use binding::timestamp_to_sql;

/// `NULL` lets sqlite assign the rowid.
fn id_or_auto(id: Id) -> Option<i64> {
    (id != 0).then_some(id as i64)
}

pub struct Txn<'conn>(Transaction<'conn>);

impl<'conn> Txn<'conn> {
    pub fn new(tx: Transaction<'conn>) -> Self {
        Self(tx)
    }

    fn inserted_id(&self) -> Id {
        self.0.last_insert_rowid() as Id
    }

    /// Inserts a content row; an id of 0 is assigned by the database.
    pub fn insert_content(&self, content: &ContentModel) -> Result<Id> {
        let tags = serde_json::to_string(&content.tags).map_err(Error::backend)?;

        self.0
            .execute(
                r#"
                INSERT INTO contents (
                    id, type, title, description, tags, average_rating,
                    review_count, watcher_count, popularity_score, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    id_or_auto(content.id),
                    content.kind.as_str(),
                    content.title,
                    content.description,
                    tags,
                    content.average_rating,
                    content.review_count,
                    content.watcher_count,
                    content.popularity_score,
                    timestamp_to_sql(&content.created_at),
                ],
            )
            .map_err(Error::backend)?;

        Ok(self.inserted_id())
    }

    pub fn insert_playlist(&self, playlist: &PlaylistModel) -> Result<Id> {
        self.0
            .execute(
                r#"
                INSERT INTO playlists (
                    id, owner_id, title, description, subscriber_count, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    id_or_auto(playlist.id),
                    playlist.owner_id as i64,
                    playlist.title,
                    playlist.description,
                    playlist.subscriber_count,
                    timestamp_to_sql(&playlist.created_at),
                    timestamp_to_sql(&playlist.updated_at),
                ],
            )
            .map_err(Error::backend)?;

        Ok(self.inserted_id())
    }

    pub fn subscribe(&self, playlist_id: Id, subscriber_id: Id) -> Result<()> {
        self.0
            .execute(
                "INSERT OR IGNORE INTO playlist_subscribers (playlist_id, subscriber_id) VALUES (?1, ?2)",
                params![playlist_id as i64, subscriber_id as i64],
            )
            .map_err(Error::backend)?;
        Ok(())
    }

    pub fn insert_review(&self, review: &ReviewModel) -> Result<Id> {
        self.0
            .execute(
                r#"
                INSERT INTO reviews (id, content_id, author_id, text, rating, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    id_or_auto(review.id),
                    review.content_id as i64,
                    review.author_id as i64,
                    review.text,
                    review.rating,
                    timestamp_to_sql(&review.created_at),
                ],
            )
            .map_err(Error::backend)?;

        Ok(self.inserted_id())
    }

    pub fn insert_user(&self, user: &UserModel) -> Result<Id> {
        self.0
            .execute(
                r#"
                INSERT INTO users (id, email, name, role, locked, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    id_or_auto(user.id),
                    user.email,
                    user.name,
                    user.role.as_str(),
                    user.locked,
                    timestamp_to_sql(&user.created_at),
                ],
            )
            .map_err(Error::backend)?;

        Ok(self.inserted_id())
    }

    pub fn insert_notification(&self, notification: &NotificationModel) -> Result<Id> {
        self.0
            .execute(
                r#"
                INSERT INTO notifications (id, receiver_id, title, content, level, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    id_or_auto(notification.id),
                    notification.receiver_id as i64,
                    notification.title,
                    notification.content,
                    notification.level.as_str(),
                    timestamp_to_sql(&notification.created_at),
                ],
            )
            .map_err(Error::backend)?;

        Ok(self.inserted_id())
    }

    pub fn insert_conversation(&self, conversation: &ConversationModel) -> Result<Id> {
        self.0
            .execute(
                "INSERT INTO conversations (id, created_at) VALUES (?1, ?2)",
                params![
                    id_or_auto(conversation.id),
                    timestamp_to_sql(&conversation.created_at),
                ],
            )
            .map_err(Error::backend)?;

        Ok(self.inserted_id())
    }

    /// Adds `participant_id` to a conversation with its read position.
    pub fn join_conversation(
        &self,
        conversation_id: Id,
        participant_id: Id,
        last_read_at: DateTime<Utc>,
    ) -> Result<()> {
        self.0
            .execute(
                r#"
                INSERT OR REPLACE INTO read_statuses (conversation_id, participant_id, last_read_at)
                VALUES (?1, ?2, ?3)
                "#,
                params![
                    conversation_id as i64,
                    participant_id as i64,
                    timestamp_to_sql(&last_read_at),
                ],
            )
            .map_err(Error::backend)?;
        Ok(())
    }

    pub fn insert_direct_message(&self, message: &DirectMessageModel) -> Result<Id> {
        self.0
            .execute(
                r#"
                INSERT INTO direct_messages (id, conversation_id, sender_id, content, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    id_or_auto(message.id),
                    message.conversation_id as i64,
                    message.sender_id as i64,
                    message.content,
                    timestamp_to_sql(&message.created_at),
                ],
            )
            .map_err(Error::backend)?;

        Ok(self.inserted_id())
    }

    /// Reads a page inside this transaction.
    pub fn list<L: Listing>(
        &self,
        registries: &Registries,
        listing: &L,
        request: &PageRequest<L::Field>,
    ) -> Result<PageResponse<L::Row, L::Field>>
    where
        Registries: RegistryFor<L::Field>,
    {
        listing::page(&self.0, registries.registry(), listing, request)
    }

    pub fn commit(self) -> Result<()> {
        self.0.commit().map_err(Error::backend)
    }
}

/// Pooled sqlite database with the listing schema applied.
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
    registries: Registries,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|c| register_functions(c));
        let pool = Pool::new(manager).map_err(Error::backend)?;
        Self::from_pool(pool)
    }

    /// In-memory database. Every sqlite connection to `:memory:` is a separate
    /// database, so the pool holds exactly one.
    pub fn memory() -> Result<Self> {
        let pool = Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory().with_init(|c| register_functions(c)))
            .map_err(Error::backend)?;
        Self::from_pool(pool)
    }

    /// Migrates the schema and validates that every sort field has a column.
    ///
    /// The pool's manager must call [`register_functions`] on each new
    /// connection, as [`SqliteStore::open`] does.
    pub fn from_pool(pool: Pool<SqliteConnectionManager>) -> Result<Self> {
        let registries = Registries::build()?;
        {
            let conn = pool.get().map_err(Error::backend)?;
            migrate(&conn)?;
        }
        Ok(Self { pool, registries })
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Runs `f` in a transaction, committing when it succeeds.
    pub fn write<R>(&self, f: impl FnOnce(&Txn<'_>) -> Result<R>) -> Result<R> {
        let mut conn = self.pool.get().map_err(Error::backend)?;
        let txn = Txn::new(conn.transaction().map_err(Error::backend)?);
        let ret = f(&txn)?;
        txn.commit()?;
        Ok(ret)
    }

    pub fn list<L: Listing>(
        &self,
        listing: &L,
        request: &PageRequest<L::Field>,
    ) -> Result<PageResponse<L::Row, L::Field>>
    where
        Registries: RegistryFor<L::Field>,
    {
        let conn = self.pool.get().map_err(Error::backend)?;
        listing::page(&conn, self.registries.registry(), listing, request)
    }
}
