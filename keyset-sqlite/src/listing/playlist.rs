use keyset::domain::{PlaylistModel, PlaylistQuery, PlaylistSortField};
use r2d2_sqlite::rusqlite::{self, Row};

use super::{id_param, Filter, Listing};
use crate::binding::timestamp_from_sql;

impl Listing for PlaylistQuery {
    type Field = PlaylistSortField;
    type Row = PlaylistModel;

    const TABLE: &'static str = "playlists";
    const COLUMNS: &'static str = "playlists.id, playlists.owner_id, playlists.title, \
        playlists.description, playlists.subscriber_count, playlists.created_at, \
        playlists.updated_at";

    fn filter(&self) -> Filter {
        let mut filter = Filter::default();
        if let Some(keyword) = self.keyword() {
            filter.and_contains(&["playlists.title", "playlists.description"], keyword);
        }
        if let Some(owner_id) = self.owner_id_equal {
            filter.and("playlists.owner_id = ?", [id_param(owner_id)]);
        }
        if let Some(subscriber_id) = self.subscriber_id_equal {
            filter.and(
                "EXISTS (SELECT 1 FROM playlist_subscribers ps \
                 WHERE ps.playlist_id = playlists.id AND ps.subscriber_id = ?)",
                [id_param(subscriber_id)],
            );
        }
        filter
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<PlaylistModel> {
        Ok(PlaylistModel {
            id: row.get::<_, i64>(0)? as u64,
            owner_id: row.get::<_, i64>(1)? as u64,
            title: row.get(2)?,
            description: row.get(3)?,
            subscriber_count: row.get(4)?,
            created_at: timestamp_from_sql(5, row.get(5)?)?,
            updated_at: timestamp_from_sql(6, row.get(6)?)?,
        })
    }
}
