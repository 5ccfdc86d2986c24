//! Indexed form of a content row.

use chrono::{DateTime, Utc};
use keyset::domain::{ContentModel, ContentType};
use keyset::Id;
use serde::{Deserialize, Serialize};

/// Date layout the index is mapped with; fixed width, millisecond precision.
pub const DATE_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format(DATE_LAYOUT).to_string()
}

mod es_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub content_id: Id,
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
    #[serde(with = "es_date")]
    pub created_at: DateTime<Utc>,
}

impl From<&ContentModel> for ContentDocument {
    fn from(content: &ContentModel) -> Self {
        Self {
            content_id: content.id,
            kind: content.kind,
            title: content.title.clone(),
            description: content.description.clone(),
            tags: content.tags.clone(),
            average_rating: content.average_rating,
            review_count: content.review_count,
            watcher_count: content.watcher_count,
            popularity_score: content.popularity_score,
            created_at: content.created_at,
        }
    }
}

impl From<ContentDocument> for ContentModel {
    fn from(doc: ContentDocument) -> Self {
        Self {
            id: doc.content_id,
            kind: doc.kind,
            title: doc.title,
            description: doc.description,
            tags: doc.tags,
            average_rating: doc.average_rating,
            review_count: doc.review_count,
            watcher_count: doc.watcher_count,
            popularity_score: doc.popularity_score,
            created_at: doc.created_at,
        }
    }
}

/// Index mapping matching [`ContentDocument`].
pub fn content_mapping() -> serde_json::Value {
    serde_json::json!({
        "properties": {
            "contentId": { "type": "long" },
            "type": { "type": "keyword" },
            "title": { "type": "text" },
            "description": { "type": "text" },
            "tags": { "type": "keyword" },
            "averageRating": { "type": "double" },
            "reviewCount": { "type": "long" },
            "watcherCount": { "type": "long" },
            "popularityScore": { "type": "double" },
            "createdAt": { "type": "date", "format": "strict_date_optional_time" }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_document_json_shape() {
        let content = ContentModel {
            id: 42,
            kind: ContentType::TvSeries,
            title: "Severance".to_string(),
            description: "Office".to_string(),
            tags: vec!["drama".to_string()],
            average_rating: 4.5,
            review_count: 3,
            watcher_count: 7,
            popularity_score: 12.5,
            created_at: Utc.timestamp_opt(1_705_314_600, 123_000_000).unwrap(),
        };

        let json = serde_json::to_value(ContentDocument::from(&content)).unwrap();
        assert_eq!(json["contentId"], 42);
        assert_eq!(json["type"], "tvSeries");
        assert_eq!(json["createdAt"], "2024-01-15T10:30:00.123Z");

        let back: ContentDocument = serde_json::from_value(json).unwrap();
        assert_eq!(ContentModel::from(back), content);
    }

    #[test]
    fn test_dates_are_fixed_width() {
        let early = Utc.timestamp_opt(0, 0).unwrap();
        assert_eq!(format_date(&early), "1970-01-01T00:00:00.000Z");
    }
}
