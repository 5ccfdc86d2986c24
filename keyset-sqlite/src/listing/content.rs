use keyset::domain::{ContentModel, ContentQuery, ContentSortField, ContentType};
use r2d2_sqlite::rusqlite::types::{Type, Value};
use r2d2_sqlite::rusqlite::{self, Row};

use super::{Filter, Listing};
use crate::binding::{column_error, timestamp_from_sql};

impl Listing for ContentQuery {
    type Field = ContentSortField;
    type Row = ContentModel;

    const TABLE: &'static str = "contents";
    const COLUMNS: &'static str = "contents.id, contents.type, contents.title, \
        contents.description, contents.tags, contents.average_rating, contents.review_count, \
        contents.watcher_count, contents.popularity_score, contents.created_at";

    fn filter(&self) -> Filter {
        let mut filter = Filter::default();
        if let Some(kind) = self.type_equal {
            filter.and("contents.type = ?", [Value::Text(kind.as_str().into())]);
        }
        if let Some(keyword) = self.keyword() {
            filter.and_contains(&["contents.title", "contents.description"], keyword);
        }
        filter
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<ContentModel> {
        let kind: String = row.get(1)?;
        let tags: String = row.get(4)?;

        Ok(ContentModel {
            id: row.get::<_, i64>(0)? as u64,
            kind: ContentType::parse(&kind)
                .ok_or_else(|| column_error(1, Type::Text, format!("unknown content type {kind}")))?,
            title: row.get(2)?,
            description: row.get(3)?,
            tags: serde_json::from_str(&tags).map_err(|e| column_error(4, Type::Text, e))?,
            average_rating: row.get(5)?,
            review_count: row.get(6)?,
            watcher_count: row.get(7)?,
            popularity_score: row.get(8)?,
            created_at: timestamp_from_sql(9, row.get(9)?)?,
        })
    }
}
