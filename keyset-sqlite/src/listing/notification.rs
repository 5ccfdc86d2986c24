use keyset::domain::{NotificationLevel, NotificationModel, NotificationQuery, NotificationSortField};
use r2d2_sqlite::rusqlite::types::Type;
use r2d2_sqlite::rusqlite::{self, Row};

use super::{id_param, Filter, Listing};
use crate::binding::{column_error, timestamp_from_sql};

impl Listing for NotificationQuery {
    type Field = NotificationSortField;
    type Row = NotificationModel;

    const TABLE: &'static str = "notifications";
    const COLUMNS: &'static str = "notifications.id, notifications.receiver_id, \
        notifications.title, notifications.content, notifications.level, notifications.created_at";

    fn filter(&self) -> Filter {
        let mut filter = Filter::default();
        if let Some(receiver_id) = self.receiver_id_equal {
            filter.and("notifications.receiver_id = ?", [id_param(receiver_id)]);
        }
        filter
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<NotificationModel> {
        let level: String = row.get(4)?;

        Ok(NotificationModel {
            id: row.get::<_, i64>(0)? as u64,
            receiver_id: row.get::<_, i64>(1)? as u64,
            title: row.get(2)?,
            content: row.get(3)?,
            level: NotificationLevel::parse(&level)
                .ok_or_else(|| column_error(4, Type::Text, format!("unknown level {level}")))?,
            created_at: timestamp_from_sql(5, row.get(5)?)?,
        })
    }
}
