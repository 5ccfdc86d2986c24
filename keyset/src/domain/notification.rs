use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::{SortField, Sortable};
use crate::sort::{SortValue, ValueKind};
use crate::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARNING",
            NotificationLevel::Error => "ERROR",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "INFO" => Some(NotificationLevel::Info),
            "WARNING" => Some(NotificationLevel::Warning),
            "ERROR" => Some(NotificationLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationModel {
    pub id: Id,
    pub receiver_id: Id,
    pub title: String,
    pub content: String,
    pub level: NotificationLevel,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationSortField {
    CreatedAt,
}

impl SortField for NotificationSortField {
    const ALL: &'static [Self] = &[NotificationSortField::CreatedAt];
    const DEFAULT: Self = NotificationSortField::CreatedAt;

    fn name(self) -> &'static str {
        "createdAt"
    }

    fn kind(self) -> ValueKind {
        ValueKind::Timestamp
    }
}

impl Sortable<NotificationSortField> for NotificationModel {
    fn row_id(&self) -> Id {
        self.id
    }

    fn sort_value(&self, _field: NotificationSortField) -> SortValue {
        SortValue::Timestamp(self.created_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationQuery {
    pub receiver_id_equal: Option<Id>,
}
