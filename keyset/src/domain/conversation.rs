use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::{SortField, Sortable};
use crate::sort::{SortValue, ValueKind};
use crate::Id;

/// A direct-message thread. Participants are tracked by their read status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationModel {
    pub id: Id,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationSortField {
    CreatedAt,
}

impl SortField for ConversationSortField {
    const ALL: &'static [Self] = &[ConversationSortField::CreatedAt];
    const DEFAULT: Self = ConversationSortField::CreatedAt;

    fn name(self) -> &'static str {
        "createdAt"
    }

    fn kind(self) -> ValueKind {
        ValueKind::Timestamp
    }
}

impl Sortable<ConversationSortField> for ConversationModel {
    fn row_id(&self) -> Id {
        self.id
    }

    fn sort_value(&self, _field: ConversationSortField) -> SortValue {
        SortValue::Timestamp(self.created_at)
    }
}

/// Conversations one user takes part in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationQuery {
    pub participant_id: Id,
    /// Case-insensitive match against the other participant's name
    pub keyword_like: Option<String>,
}

impl ConversationQuery {
    pub fn new(participant_id: Id) -> Self {
        Self {
            participant_id,
            keyword_like: None,
        }
    }

    pub fn keyword(&self) -> Option<&str> {
        super::keyword(&self.keyword_like)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessageModel {
    pub id: Id,
    pub conversation_id: Id,
    pub sender_id: Id,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectMessageSortField {
    CreatedAt,
}

impl SortField for DirectMessageSortField {
    const ALL: &'static [Self] = &[DirectMessageSortField::CreatedAt];
    const DEFAULT: Self = DirectMessageSortField::CreatedAt;

    fn name(self) -> &'static str {
        "createdAt"
    }

    fn kind(self) -> ValueKind {
        ValueKind::Timestamp
    }
}

impl Sortable<DirectMessageSortField> for DirectMessageModel {
    fn row_id(&self) -> Id {
        self.id
    }

    fn sort_value(&self, _field: DirectMessageSortField) -> SortValue {
        SortValue::Timestamp(self.created_at)
    }
}

/// Messages of one conversation, visible only to its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectMessageQuery {
    pub conversation_id: Id,
    /// The reader; a non-participant sees an empty listing
    pub viewer_id: Id,
}
