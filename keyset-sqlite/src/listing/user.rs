use keyset::domain::{Role, UserModel, UserQuery, UserSortField};
use r2d2_sqlite::rusqlite::types::{Type, Value};
use r2d2_sqlite::rusqlite::{self, Row};

use super::{Filter, Listing};
use crate::binding::{column_error, timestamp_from_sql};

impl Listing for UserQuery {
    type Field = UserSortField;
    type Row = UserModel;

    const TABLE: &'static str = "users";
    const COLUMNS: &'static str =
        "users.id, users.email, users.name, users.role, users.locked, users.created_at";

    fn filter(&self) -> Filter {
        let mut filter = Filter::default();
        if let Some(email) = self.email_keyword() {
            filter.and_contains(&["users.email"], email);
        }
        if let Some(role) = self.role_equal {
            filter.and("users.role = ?", [Value::Text(role.as_str().into())]);
        }
        if let Some(locked) = self.is_locked {
            filter.and("users.locked = ?", [Value::Integer(i64::from(locked))]);
        }
        filter
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<UserModel> {
        let role: String = row.get(3)?;

        Ok(UserModel {
            id: row.get::<_, i64>(0)? as u64,
            email: row.get(1)?,
            name: row.get(2)?,
            role: Role::parse(&role)
                .ok_or_else(|| column_error(3, Type::Text, format!("unknown role {role}")))?,
            locked: row.get(4)?,
            created_at: timestamp_from_sql(5, row.get(5)?)?,
        })
    }
}
