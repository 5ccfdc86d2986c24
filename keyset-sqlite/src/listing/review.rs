use keyset::domain::{ReviewModel, ReviewQuery, ReviewSortField};
use r2d2_sqlite::rusqlite::{self, Row};

use super::{id_param, Filter, Listing};
use crate::binding::timestamp_from_sql;

impl Listing for ReviewQuery {
    type Field = ReviewSortField;
    type Row = ReviewModel;

    const TABLE: &'static str = "reviews";
    const COLUMNS: &'static str = "reviews.id, reviews.content_id, reviews.author_id, \
        reviews.text, reviews.rating, reviews.created_at";

    fn filter(&self) -> Filter {
        let mut filter = Filter::default();
        if let Some(content_id) = self.content_id_equal {
            filter.and("reviews.content_id = ?", [id_param(content_id)]);
        }
        filter
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<ReviewModel> {
        Ok(ReviewModel {
            id: row.get::<_, i64>(0)? as u64,
            content_id: row.get::<_, i64>(1)? as u64,
            author_id: row.get::<_, i64>(2)? as u64,
            text: row.get(3)?,
            rating: row.get(4)?,
            created_at: timestamp_from_sql(5, row.get(5)?)?,
        })
    }
}
