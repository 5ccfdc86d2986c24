//! Paginated listings over sqlite tables.

mod content;
mod conversation;
mod notification;
mod playlist;
mod review;
mod user;

use keyset::{
    Error, Keyset, PageAssembler, PageRequest, PageResponse, Registry, Result, SortField, Sortable,
};
use r2d2_sqlite::rusqlite::types::Value;
use r2d2_sqlite::rusqlite::{self, params_from_iter, Connection};

use crate::binding::SqlColumn;
use crate::clause::KeysetClause;

/// A filter struct that knows which table it lists and how to read rows back.
pub trait Listing {
    type Field: SortField;
    type Row: Sortable<Self::Field>;

    const TABLE: &'static str;
    /// Select list, in the order [`Listing::read_row`] reads it
    const COLUMNS: &'static str;

    fn filter(&self) -> Filter;

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self::Row>;
}

/// Conjunction of WHERE conditions with their positional parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl Filter {
    pub fn and(&mut self, condition: impl Into<String>, params: impl IntoIterator<Item = Value>) {
        self.conditions.push(condition.into());
        self.params.extend(params);
    }

    /// Case-insensitive substring match on any of `columns`.
    pub fn and_contains(&mut self, columns: &[&str], keyword: &str) {
        let (condition, params) = contains(columns, keyword);
        self.and(condition, params);
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }
}

/// `unicode_lower` is registered by [`crate::register_functions`].
fn contains(columns: &[&str], keyword: &str) -> (String, Vec<Value>) {
    let needle = keyword.to_lowercase();
    let condition = columns
        .iter()
        .map(|column| format!("instr(unicode_lower({column}), ?) > 0"))
        .collect::<Vec<_>>()
        .join(" OR ");
    let params = columns.iter().map(|_| Value::Text(needle.clone())).collect();
    (format!("({condition})"), params)
}

fn id_param(id: keyset::Id) -> Value {
    Value::Integer(id as i64)
}

fn count(conn: &Connection, table: &str, filter: &Filter) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}{}", table, filter.where_clause());
    let count: i64 = conn
        .query_row(&sql, params_from_iter(filter.params.iter()), |row| row.get(0))
        .map_err(Error::backend)?;
    Ok(count as u64)
}

/// Fetches one page of `listing`: filters, keyset predicate, `limit + 1` rows.
pub fn page<L: Listing>(
    conn: &Connection,
    registry: &Registry<L::Field, SqlColumn>,
    listing: &L,
    request: &PageRequest<L::Field>,
) -> Result<PageResponse<L::Row, L::Field>> {
    let descriptor = registry.descriptor(request.sort_by)?;
    let keyset = Keyset::from_request(request)?;
    let id_column = format!("{}.id", L::TABLE);
    let clause = KeysetClause::compile(&keyset, *descriptor.binding(), &id_column)?;

    let filter = listing.filter();
    let total_count = count(conn, L::TABLE, &filter)?;

    let mut scoped = filter;
    if let Some(predicate) = clause.predicate {
        scoped.and(predicate, clause.params);
    }
    scoped.params.push(Value::Integer(request.fetch_size() as i64));

    let sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT ?",
        L::COLUMNS,
        L::TABLE,
        scoped.where_clause(),
        clause.order_by
    );

    let mut stmt = conn.prepare(&sql).map_err(Error::backend)?;
    let batch = stmt
        .query_map(params_from_iter(scoped.params.iter()), L::read_row)
        .map_err(Error::backend)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Error::backend)?;

    tracing::debug!(
        table = L::TABLE,
        sort_by = request.sort_by.name(),
        direction = ?request.direction,
        limit = request.limit,
        cursor = keyset.position().is_some(),
        fetched = batch.len(),
        "fetched sqlite page"
    );

    Ok(PageAssembler::new(request).assemble(batch, total_count, |row| row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_where_clause() {
        let mut filter = Filter::default();
        assert_eq!(filter.where_clause(), "");

        filter.and("t.kind = ?", [Value::Text("movie".into())]);
        filter.and_contains(&["t.title", "t.description"], "DÜNE");

        assert_eq!(
            filter.where_clause(),
            " WHERE t.kind = ? AND (instr(unicode_lower(t.title), ?) > 0 \
             OR instr(unicode_lower(t.description), ?) > 0)"
        );
        assert_eq!(
            filter.params,
            vec![
                Value::Text("movie".into()),
                Value::Text("düne".into()),
                Value::Text("düne".into()),
            ]
        );
    }
}
