//! Compiles a [`Keyset`] into a row-value predicate and ORDER BY clause.

use keyset::{Error, Keyset, Result, SortDirection};
use r2d2_sqlite::rusqlite::types::Value;

use crate::binding::{to_sql, SqlColumn};

#[derive(Debug, Clone, PartialEq)]
pub struct KeysetClause {
    /// `(col, id) > (?, ?)` style predicate, absent on the first page
    pub predicate: Option<String>,
    pub params: Vec<Value>,
    pub order_by: String,
}

impl KeysetClause {
    pub fn compile(keyset: &Keyset, column: SqlColumn, id_column: &str) -> Result<Self> {
        let SqlColumn(column) = column;
        let dir = keyset.direction();

        let (predicate, params) = match keyset.position() {
            Some(position) => {
                // Row ids are INTEGER columns; anything wider names no row.
                let anchor = i64::try_from(position.id).map_err(|_| {
                    Error::invalid_cursor(format!("anchor id {} out of range", position.id))
                })?;
                let op = match dir {
                    SortDirection::Ascending => ">",
                    SortDirection::Descending => "<",
                };
                (
                    Some(format!("({column}, {id_column}) {op} (?, ?)")),
                    vec![to_sql(&position.value), Value::Integer(anchor)],
                )
            }
            None => (None, Vec::new()),
        };

        Ok(Self {
            predicate,
            params,
            order_by: format!(
                "{column} {dir}, {id_column} {dir}",
                dir = dir.as_sql()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyset::SortKey;

    #[test]
    fn test_first_page_has_no_predicate() {
        let keyset = Keyset::new(None, SortDirection::Descending);
        let clause =
            KeysetClause::compile(&keyset, SqlColumn("contents.watcher_count"), "contents.id")
                .unwrap();

        assert_eq!(clause.predicate, None);
        assert!(clause.params.is_empty());
        assert_eq!(
            clause.order_by,
            "contents.watcher_count DESC, contents.id DESC"
        );
    }

    #[test]
    fn test_predicate_follows_direction() {
        let position = SortKey::new(7i64, 42);

        let asc = Keyset::new(Some(position.clone()), SortDirection::Ascending);
        let clause = KeysetClause::compile(&asc, SqlColumn("t.c"), "t.id").unwrap();
        assert_eq!(clause.predicate.as_deref(), Some("(t.c, t.id) > (?, ?)"));
        assert_eq!(clause.params, vec![Value::Integer(7), Value::Integer(42)]);
        assert_eq!(clause.order_by, "t.c ASC, t.id ASC");

        let desc = Keyset::new(Some(position), SortDirection::Descending);
        let clause = KeysetClause::compile(&desc, SqlColumn("t.c"), "t.id").unwrap();
        assert_eq!(clause.predicate.as_deref(), Some("(t.c, t.id) < (?, ?)"));
    }

    #[test]
    fn test_anchor_beyond_integer_range() {
        let keyset = Keyset::new(Some(SortKey::new(1i64, u64::MAX)), SortDirection::Ascending);
        let err = KeysetClause::compile(&keyset, SqlColumn("t.c"), "t.id").unwrap_err();
        assert!(err.is_invalid_cursor());
    }
}
