//! Media-catalog entities and the attributes their listings sort by.
//!
//! The sort field enums here are the only sort options visible to callers;
//! every backend registers a native binding for each variant.

mod content;
mod conversation;
mod notification;
mod playlist;
mod review;
mod user;
mod watching;

pub use content::{ContentModel, ContentQuery, ContentSortField, ContentType};
pub use conversation::{
    ConversationModel, ConversationQuery, ConversationSortField, DirectMessageModel,
    DirectMessageQuery, DirectMessageSortField,
};
pub use notification::{NotificationLevel, NotificationModel, NotificationQuery, NotificationSortField};
pub use playlist::{PlaylistModel, PlaylistQuery, PlaylistSortField};
pub use review::{ReviewModel, ReviewQuery, ReviewSortField};
pub use user::{Role, UserModel, UserQuery, UserSortField};
pub use watching::{WatchingSession, WatchingSessionQuery, WatchingSessionSortField};

/// Trimmed search keyword, `None` when blank.
pub(crate) fn keyword(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|k| !k.is_empty())
}

/// Case-insensitive substring match used by in-memory filters.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
