use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::{SortField, Sortable};
use crate::sort::{SortValue, ValueKind};
use crate::Id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistModel {
    pub id: Id,
    pub owner_id: Id,
    pub title: String,
    pub description: String,
    pub subscriber_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaylistSortField {
    UpdatedAt,
    SubscriberCount,
}

impl SortField for PlaylistSortField {
    const ALL: &'static [Self] = &[
        PlaylistSortField::UpdatedAt,
        PlaylistSortField::SubscriberCount,
    ];
    const DEFAULT: Self = PlaylistSortField::UpdatedAt;

    fn name(self) -> &'static str {
        match self {
            PlaylistSortField::UpdatedAt => "updatedAt",
            PlaylistSortField::SubscriberCount => "subscriberCount",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            PlaylistSortField::UpdatedAt => ValueKind::Timestamp,
            PlaylistSortField::SubscriberCount => ValueKind::Integer,
        }
    }
}

impl Sortable<PlaylistSortField> for PlaylistModel {
    fn row_id(&self) -> Id {
        self.id
    }

    fn sort_value(&self, field: PlaylistSortField) -> SortValue {
        match field {
            PlaylistSortField::UpdatedAt => SortValue::Timestamp(self.updated_at),
            PlaylistSortField::SubscriberCount => SortValue::Integer(self.subscriber_count),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistQuery {
    /// Case-insensitive match against title or description
    pub keyword_like: Option<String>,
    pub owner_id_equal: Option<Id>,
    /// Only playlists this user subscribes to
    pub subscriber_id_equal: Option<Id>,
}

impl PlaylistQuery {
    pub fn keyword(&self) -> Option<&str> {
        super::keyword(&self.keyword_like)
    }
}
