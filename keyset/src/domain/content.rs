use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::{SortField, Sortable};
use crate::sort::{SortValue, ValueKind};
use crate::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    Movie,
    TvSeries,
    Sport,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::TvSeries => "tvSeries",
            ContentType::Sport => "sport",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "movie" => Some(ContentType::Movie),
            "tvSeries" => Some(ContentType::TvSeries),
            "sport" => Some(ContentType::Sport),
            _ => None,
        }
    }
}

/// A catalog entry: movie, series or sport event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentModel {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub average_rating: f64,
    pub review_count: i64,
    pub watcher_count: i64,
    pub popularity_score: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentSortField {
    CreatedAt,
    WatcherCount,
    /// Average review rating
    Rate,
    Popularity,
}

impl SortField for ContentSortField {
    const ALL: &'static [Self] = &[
        ContentSortField::CreatedAt,
        ContentSortField::WatcherCount,
        ContentSortField::Rate,
        ContentSortField::Popularity,
    ];
    const DEFAULT: Self = ContentSortField::CreatedAt;

    fn name(self) -> &'static str {
        match self {
            ContentSortField::CreatedAt => "createdAt",
            ContentSortField::WatcherCount => "watcherCount",
            ContentSortField::Rate => "rate",
            ContentSortField::Popularity => "popularity",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            ContentSortField::CreatedAt => ValueKind::Timestamp,
            ContentSortField::WatcherCount => ValueKind::Integer,
            ContentSortField::Rate | ContentSortField::Popularity => ValueKind::Float,
        }
    }
}

impl Sortable<ContentSortField> for ContentModel {
    fn row_id(&self) -> Id {
        self.id
    }

    fn sort_value(&self, field: ContentSortField) -> SortValue {
        match field {
            ContentSortField::CreatedAt => SortValue::Timestamp(self.created_at),
            ContentSortField::WatcherCount => SortValue::Integer(self.watcher_count),
            ContentSortField::Rate => SortValue::Float(self.average_rating),
            ContentSortField::Popularity => SortValue::Float(self.popularity_score),
        }
    }
}

/// Filters of the content listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentQuery {
    pub type_equal: Option<ContentType>,
    /// Case-insensitive match against title or description
    pub keyword_like: Option<String>,
}

impl ContentQuery {
    pub fn keyword(&self) -> Option<&str> {
        super::keyword(&self.keyword_like)
    }

    pub fn matches(&self, content: &ContentModel) -> bool {
        if self.type_equal.is_some_and(|kind| kind != content.kind) {
            return false;
        }
        match self.keyword() {
            Some(keyword) => {
                super::contains_ignore_case(&content.title, keyword)
                    || super::contains_ignore_case(&content.description, keyword)
            }
            None => true,
        }
    }
}
