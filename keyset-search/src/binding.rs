use keyset::domain::ContentSortField;
use keyset::{Bindings, SortValue};
use serde_json::{json, Value};

use crate::document::format_date;

/// Tie-break field of every content sort.
pub const CONTENT_ID_FIELD: &str = "contentId";

/// Indexed field a sort field orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBinding {
    pub field: &'static str,
    /// Format the index renders sort values in, for date fields
    pub format: Option<&'static str>,
}

impl SearchBinding {
    pub const fn plain(field: &'static str) -> Self {
        Self { field, format: None }
    }

    pub const fn date(field: &'static str) -> Self {
        Self {
            field,
            format: Some("strict_date_optional_time"),
        }
    }
}

pub struct SearchBindings;

impl Bindings<ContentSortField> for SearchBindings {
    type Binding = SearchBinding;
    const BACKEND: &'static str = "search";

    fn binding(&self, field: ContentSortField) -> Option<SearchBinding> {
        Some(match field {
            ContentSortField::CreatedAt => SearchBinding::date("createdAt"),
            ContentSortField::WatcherCount => SearchBinding::plain("watcherCount"),
            ContentSortField::Rate => SearchBinding::plain("averageRating"),
            ContentSortField::Popularity => SearchBinding::plain("popularityScore"),
        })
    }
}

/// A sort value in the form the index compares it in `search_after`.
pub fn search_after_value(value: &SortValue) -> Value {
    match value {
        SortValue::Timestamp(ts) => Value::String(format_date(ts)),
        SortValue::Integer(v) => json!(v),
        SortValue::Float(v) => json!(v),
        SortValue::Bool(v) => json!(v),
        SortValue::Text(v) => json!(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use keyset::Registry;

    #[test]
    fn test_every_field_is_bound() {
        let registry = Registry::build(&SearchBindings).unwrap();
        assert_eq!(
            registry
                .descriptor(ContentSortField::Rate)
                .unwrap()
                .binding()
                .field,
            "averageRating"
        );
    }

    #[test]
    fn test_search_after_values() {
        let ts = Utc.timestamp_opt(1_705_314_600, 0).unwrap();

        assert_eq!(
            search_after_value(&SortValue::Timestamp(ts)),
            json!("2024-01-15T10:30:00.000Z")
        );
        assert_eq!(search_after_value(&SortValue::Integer(12)), json!(12));
        assert_eq!(search_after_value(&SortValue::Float(85.5)), json!(85.5));
    }
}
