use keyset::domain::{
    ConversationModel, ConversationQuery, ConversationSortField, DirectMessageModel,
    DirectMessageQuery, DirectMessageSortField,
};
use r2d2_sqlite::rusqlite::{self, Row};

use super::{contains, id_param, Filter, Listing};
use crate::binding::timestamp_from_sql;

impl Listing for ConversationQuery {
    type Field = ConversationSortField;
    type Row = ConversationModel;

    const TABLE: &'static str = "conversations";
    const COLUMNS: &'static str = "conversations.id, conversations.created_at";

    fn filter(&self) -> Filter {
        let mut filter = Filter::default();
        filter.and(
            "EXISTS (SELECT 1 FROM read_statuses mine \
             WHERE mine.conversation_id = conversations.id AND mine.participant_id = ?)",
            [id_param(self.participant_id)],
        );

        // Someone else must take part, and match the keyword when one is given.
        let mut other = String::from(
            "EXISTS (SELECT 1 FROM read_statuses other \
             JOIN users other_user ON other_user.id = other.participant_id \
             WHERE other.conversation_id = conversations.id AND other.participant_id <> ?",
        );
        let mut params = vec![id_param(self.participant_id)];
        if let Some(keyword) = self.keyword() {
            let (condition, keyword_params) = contains(&["other_user.name"], keyword);
            other.push_str(" AND ");
            other.push_str(&condition);
            params.extend(keyword_params);
        }
        other.push(')');
        filter.and(other, params);

        filter
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<ConversationModel> {
        Ok(ConversationModel {
            id: row.get::<_, i64>(0)? as u64,
            created_at: timestamp_from_sql(1, row.get(1)?)?,
        })
    }
}

impl Listing for DirectMessageQuery {
    type Field = DirectMessageSortField;
    type Row = DirectMessageModel;

    const TABLE: &'static str = "direct_messages";
    const COLUMNS: &'static str = "direct_messages.id, direct_messages.conversation_id, \
        direct_messages.sender_id, direct_messages.content, direct_messages.created_at";

    fn filter(&self) -> Filter {
        let mut filter = Filter::default();
        filter.and(
            "direct_messages.conversation_id = ?",
            [id_param(self.conversation_id)],
        );
        filter.and(
            "EXISTS (SELECT 1 FROM read_statuses rs \
             WHERE rs.conversation_id = direct_messages.conversation_id AND rs.participant_id = ?)",
            [id_param(self.viewer_id)],
        );
        filter
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<DirectMessageModel> {
        Ok(DirectMessageModel {
            id: row.get::<_, i64>(0)? as u64,
            conversation_id: row.get::<_, i64>(1)? as u64,
            sender_id: row.get::<_, i64>(2)? as u64,
            content: row.get(3)?,
            created_at: timestamp_from_sql(4, row.get(4)?)?,
        })
    }
}
