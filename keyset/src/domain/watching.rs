use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::{SortField, Sortable};
use crate::sort::{SortValue, ValueKind};
use crate::Id;

/// A user currently watching a piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchingSession {
    pub id: Id,
    pub content_id: Id,
    pub watcher_id: Id,
    pub watcher_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchingSessionSortField {
    CreatedAt,
}

impl SortField for WatchingSessionSortField {
    const ALL: &'static [Self] = &[WatchingSessionSortField::CreatedAt];
    const DEFAULT: Self = WatchingSessionSortField::CreatedAt;

    fn name(self) -> &'static str {
        "createdAt"
    }

    fn kind(self) -> ValueKind {
        ValueKind::Timestamp
    }
}

impl Sortable<WatchingSessionSortField> for WatchingSession {
    fn row_id(&self) -> Id {
        self.id
    }

    fn sort_value(&self, _field: WatchingSessionSortField) -> SortValue {
        SortValue::Timestamp(self.created_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchingSessionQuery {
    /// Case-insensitive match against the watcher's display name
    pub watcher_name_like: Option<String>,
}

impl WatchingSessionQuery {
    pub fn matches(&self, session: &WatchingSession) -> bool {
        match super::keyword(&self.watcher_name_like) {
            Some(keyword) => super::contains_ignore_case(&session.watcher_name, keyword),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(name: &str) -> WatchingSession {
        WatchingSession {
            id: 1,
            content_id: 2,
            watcher_id: 3,
            watcher_name: name.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_blank_filter_matches_all() {
        let query = WatchingSessionQuery {
            watcher_name_like: Some("   ".to_string()),
        };
        assert!(query.matches(&session("anyone")));
    }

    #[test]
    fn test_name_filter_ignores_case() {
        let query = WatchingSessionQuery {
            watcher_name_like: Some(" ALI ".to_string()),
        };
        assert!(query.matches(&session("Alice")));
        assert!(!query.matches(&session("Bob")));
    }
}
