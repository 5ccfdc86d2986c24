use r2d2_sqlite::rusqlite::{self, Connection};
use r2d2_sqlite::rusqlite::functions::{Context, FunctionFlags};

/// Tables backing the listings. Timestamps are stored as microseconds since
/// the Unix epoch so that they compare natively as integers.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS contents (
   id INTEGER PRIMARY KEY,
   type TEXT NOT NULL,
   title TEXT NOT NULL,
   description TEXT NOT NULL,
   tags TEXT NOT NULL DEFAULT '[]',
   average_rating REAL NOT NULL DEFAULT 0,
   review_count INTEGER NOT NULL DEFAULT 0,
   watcher_count INTEGER NOT NULL DEFAULT 0,
   popularity_score REAL NOT NULL DEFAULT 0,
   created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS contents_created_at ON contents (created_at, id);
CREATE INDEX IF NOT EXISTS contents_watcher_count ON contents (watcher_count, id);
CREATE INDEX IF NOT EXISTS contents_average_rating ON contents (average_rating, id);
CREATE INDEX IF NOT EXISTS contents_popularity_score ON contents (popularity_score, id);

CREATE TABLE IF NOT EXISTS playlists (
   id INTEGER PRIMARY KEY,
   owner_id INTEGER NOT NULL,
   title TEXT NOT NULL,
   description TEXT NOT NULL,
   subscriber_count INTEGER NOT NULL DEFAULT 0,
   created_at INTEGER NOT NULL,
   updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS playlists_updated_at ON playlists (updated_at, id);
CREATE INDEX IF NOT EXISTS playlists_subscriber_count ON playlists (subscriber_count, id);

CREATE TABLE IF NOT EXISTS playlist_subscribers (
   playlist_id INTEGER NOT NULL,
   subscriber_id INTEGER NOT NULL,
   PRIMARY KEY (playlist_id, subscriber_id)
);

CREATE TABLE IF NOT EXISTS reviews (
   id INTEGER PRIMARY KEY,
   content_id INTEGER NOT NULL,
   author_id INTEGER NOT NULL,
   text TEXT NOT NULL,
   rating REAL NOT NULL,
   created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS reviews_content_created_at ON reviews (content_id, created_at, id);

CREATE TABLE IF NOT EXISTS users (
   id INTEGER PRIMARY KEY,
   email TEXT NOT NULL UNIQUE,
   name TEXT NOT NULL,
   role TEXT NOT NULL,
   locked INTEGER NOT NULL DEFAULT 0,
   created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS notifications (
   id INTEGER PRIMARY KEY,
   receiver_id INTEGER NOT NULL,
   title TEXT NOT NULL,
   content TEXT NOT NULL,
   level TEXT NOT NULL,
   created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS notifications_receiver_created_at ON notifications (receiver_id, created_at, id);

CREATE TABLE IF NOT EXISTS conversations (
   id INTEGER PRIMARY KEY,
   created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS conversations_created_at ON conversations (created_at, id);

-- One row per participant of a conversation.
CREATE TABLE IF NOT EXISTS read_statuses (
   conversation_id INTEGER NOT NULL,
   participant_id INTEGER NOT NULL,
   last_read_at INTEGER NOT NULL,
   PRIMARY KEY (conversation_id, participant_id)
);
CREATE INDEX IF NOT EXISTS read_statuses_participant ON read_statuses (participant_id, conversation_id);

CREATE TABLE IF NOT EXISTS direct_messages (
   id INTEGER PRIMARY KEY,
   conversation_id INTEGER NOT NULL,
   sender_id INTEGER NOT NULL,
   content TEXT NOT NULL,
   created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS direct_messages_conversation_created_at ON direct_messages (conversation_id, created_at, id);
"#;

pub fn migrate(conn: &Connection) -> Result<(), keyset::Error> {
    conn.execute_batch(SCHEMA).map_err(keyset::Error::backend)
}

/// Registers `unicode_lower(text)`, the full Unicode lowercase used by keyword
/// filters. sqlite's own `lower()` folds ASCII only. Every connection that runs
/// a listing needs it.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx: &Context<'_>| {
            let text = ctx.get::<Option<String>>(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_lower() {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();

        let (folded, ascii_only): (String, String) = conn
            .query_row("SELECT unicode_lower('Été ÅNGSTRÖM'), lower('Été')", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(folded, "été ångström");
        assert_eq!(ascii_only, "Été");

        let null: Option<String> = conn
            .query_row("SELECT unicode_lower(NULL)", [], |row| row.get(0))
            .unwrap();
        assert_eq!(null, None);
    }
}
