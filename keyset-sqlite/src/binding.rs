//! Column bindings of every sortable attribute.

use chrono::{DateTime, Utc};
use keyset::domain::{
    ContentSortField, ConversationSortField, DirectMessageSortField, NotificationSortField,
    PlaylistSortField, ReviewSortField, UserSortField,
};
use keyset::{Bindings, Registry, SortField, SortValue};
use r2d2_sqlite::rusqlite;
use r2d2_sqlite::rusqlite::types::{Type, Value};

/// Qualified column a sort field compares on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlColumn(pub &'static str);

pub struct SqliteBindings;

impl Bindings<ContentSortField> for SqliteBindings {
    type Binding = SqlColumn;
    const BACKEND: &'static str = "sqlite";

    fn binding(&self, field: ContentSortField) -> Option<SqlColumn> {
        Some(SqlColumn(match field {
            ContentSortField::CreatedAt => "contents.created_at",
            ContentSortField::WatcherCount => "contents.watcher_count",
            ContentSortField::Rate => "contents.average_rating",
            ContentSortField::Popularity => "contents.popularity_score",
        }))
    }
}

impl Bindings<PlaylistSortField> for SqliteBindings {
    type Binding = SqlColumn;
    const BACKEND: &'static str = "sqlite";

    fn binding(&self, field: PlaylistSortField) -> Option<SqlColumn> {
        Some(SqlColumn(match field {
            PlaylistSortField::UpdatedAt => "playlists.updated_at",
            PlaylistSortField::SubscriberCount => "playlists.subscriber_count",
        }))
    }
}

impl Bindings<ReviewSortField> for SqliteBindings {
    type Binding = SqlColumn;
    const BACKEND: &'static str = "sqlite";

    fn binding(&self, field: ReviewSortField) -> Option<SqlColumn> {
        Some(SqlColumn(match field {
            ReviewSortField::CreatedAt => "reviews.created_at",
            ReviewSortField::Rating => "reviews.rating",
        }))
    }
}

impl Bindings<UserSortField> for SqliteBindings {
    type Binding = SqlColumn;
    const BACKEND: &'static str = "sqlite";

    fn binding(&self, field: UserSortField) -> Option<SqlColumn> {
        Some(SqlColumn(match field {
            UserSortField::Name => "users.name",
            UserSortField::Email => "users.email",
            UserSortField::CreatedAt => "users.created_at",
            UserSortField::IsLocked => "users.locked",
            UserSortField::Role => "users.role",
        }))
    }
}

impl Bindings<NotificationSortField> for SqliteBindings {
    type Binding = SqlColumn;
    const BACKEND: &'static str = "sqlite";

    fn binding(&self, field: NotificationSortField) -> Option<SqlColumn> {
        match field {
            NotificationSortField::CreatedAt => Some(SqlColumn("notifications.created_at")),
        }
    }
}

impl Bindings<ConversationSortField> for SqliteBindings {
    type Binding = SqlColumn;
    const BACKEND: &'static str = "sqlite";

    fn binding(&self, field: ConversationSortField) -> Option<SqlColumn> {
        match field {
            ConversationSortField::CreatedAt => Some(SqlColumn("conversations.created_at")),
        }
    }
}

impl Bindings<DirectMessageSortField> for SqliteBindings {
    type Binding = SqlColumn;
    const BACKEND: &'static str = "sqlite";

    fn binding(&self, field: DirectMessageSortField) -> Option<SqlColumn> {
        match field {
            DirectMessageSortField::CreatedAt => Some(SqlColumn("direct_messages.created_at")),
        }
    }
}

/// Registries of every listing served from sqlite, validated together.
#[derive(Debug, Clone)]
pub struct Registries {
    content: Registry<ContentSortField, SqlColumn>,
    playlist: Registry<PlaylistSortField, SqlColumn>,
    review: Registry<ReviewSortField, SqlColumn>,
    user: Registry<UserSortField, SqlColumn>,
    notification: Registry<NotificationSortField, SqlColumn>,
    conversation: Registry<ConversationSortField, SqlColumn>,
    direct_message: Registry<DirectMessageSortField, SqlColumn>,
}

impl Registries {
    pub fn build() -> keyset::Result<Self> {
        Ok(Self {
            content: Registry::build(&SqliteBindings)?,
            playlist: Registry::build(&SqliteBindings)?,
            review: Registry::build(&SqliteBindings)?,
            user: Registry::build(&SqliteBindings)?,
            notification: Registry::build(&SqliteBindings)?,
            conversation: Registry::build(&SqliteBindings)?,
            direct_message: Registry::build(&SqliteBindings)?,
        })
    }
}

/// Access to the registry of one sort field type.
pub trait RegistryFor<F: SortField> {
    fn registry(&self) -> &Registry<F, SqlColumn>;
}

macro_rules! registry_for {
    ($field:ty, $slot:ident) => {
        impl RegistryFor<$field> for Registries {
            fn registry(&self) -> &Registry<$field, SqlColumn> {
                &self.$slot
            }
        }
    };
}

registry_for!(ContentSortField, content);
registry_for!(PlaylistSortField, playlist);
registry_for!(ReviewSortField, review);
registry_for!(UserSortField, user);
registry_for!(NotificationSortField, notification);
registry_for!(ConversationSortField, conversation);
registry_for!(DirectMessageSortField, direct_message);

/// Native column representation of a sort value.
pub fn to_sql(value: &SortValue) -> Value {
    match value {
        SortValue::Timestamp(ts) => Value::Integer(timestamp_to_sql(ts)),
        SortValue::Integer(v) => Value::Integer(*v),
        SortValue::Float(v) => Value::Real(*v),
        SortValue::Bool(v) => Value::Integer(i64::from(*v)),
        SortValue::Text(v) => Value::Text(v.clone()),
    }
}

pub fn timestamp_to_sql(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

pub fn timestamp_from_sql(idx: usize, micros: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| column_error(idx, Type::Integer, format!("timestamp out of range: {micros}")))
}

pub(crate) fn column_error(
    idx: usize,
    ty: Type,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, err.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_every_field_is_bound() {
        Registries::build().unwrap();
    }

    #[test]
    fn test_native_representation() {
        let ts = Utc.timestamp_opt(1_700_000_000, 123_456_000).unwrap();

        assert_eq!(
            to_sql(&SortValue::Timestamp(ts)),
            Value::Integer(1_700_000_000_123_456)
        );
        assert_eq!(to_sql(&SortValue::Bool(true)), Value::Integer(1));
        assert_eq!(to_sql(&SortValue::Float(4.5)), Value::Real(4.5));
        assert_eq!(timestamp_from_sql(0, timestamp_to_sql(&ts)).unwrap(), ts);
    }
}
