//! Search request bodies.

use keyset::domain::ContentQuery;
use keyset::Keyset;
use serde_json::{json, Map, Value};

use crate::binding::{search_after_value, SearchBinding, CONTENT_ID_FIELD};

fn order(keyset: &Keyset) -> &'static str {
    if keyset.direction().is_ascending() {
        "asc"
    } else {
        "desc"
    }
}

fn content_filter(query: &ContentQuery) -> Value {
    let mut filter = Vec::new();
    let mut must = Vec::new();

    if let Some(kind) = query.type_equal {
        filter.push(json!({ "term": { "type": kind.as_str() } }));
    }
    if let Some(keyword) = query.keyword() {
        must.push(json!({
            "multi_match": {
                "query": keyword,
                "fields": ["title", "description"],
                "type": "phrase_prefix"
            }
        }));
    }

    json!({ "bool": { "filter": filter, "must": must } })
}

/// Body fetching `size` content documents strictly after the keyset position.
pub fn content_search(
    query: &ContentQuery,
    binding: &SearchBinding,
    keyset: &Keyset,
    size: usize,
) -> Value {
    let order = order(keyset);

    let mut sort_spec = Map::new();
    sort_spec.insert("order".into(), json!(order));
    if let Some(format) = binding.format {
        sort_spec.insert("format".into(), json!(format));
    }

    let mut body = json!({
        "query": content_filter(query),
        "sort": [
            { binding.field: sort_spec },
            { CONTENT_ID_FIELD: { "order": order } }
        ],
        "size": size,
        "track_total_hits": true
    });

    if let Some(position) = keyset.position() {
        body["search_after"] = json!([search_after_value(&position.value), position.id]);
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::SearchBindings;
    use chrono::{TimeZone, Utc};
    use keyset::domain::{ContentSortField, ContentType};
    use keyset::{Bindings, SortDirection, SortKey};

    fn binding(field: ContentSortField) -> SearchBinding {
        SearchBindings.binding(field).unwrap()
    }

    #[test]
    fn test_first_page_body() {
        let keyset = Keyset::new(None, SortDirection::Descending);
        let body = content_search(
            &ContentQuery::default(),
            &binding(ContentSortField::Popularity),
            &keyset,
            21,
        );

        assert_eq!(
            body,
            json!({
                "query": { "bool": { "filter": [], "must": [] } },
                "sort": [
                    { "popularityScore": { "order": "desc" } },
                    { "contentId": { "order": "desc" } }
                ],
                "size": 21,
                "track_total_hits": true
            })
        );
    }

    #[test]
    fn test_continuation_body() {
        let ts = Utc.timestamp_opt(1_705_314_600, 0).unwrap();
        let keyset = Keyset::new(Some(SortKey::new(ts, 99)), SortDirection::Ascending);
        let query = ContentQuery {
            type_equal: Some(ContentType::Movie),
            keyword_like: Some(" inception ".to_string()),
        };

        let body = content_search(&query, &binding(ContentSortField::CreatedAt), &keyset, 3);

        assert_eq!(
            body["sort"][0],
            json!({ "createdAt": { "order": "asc", "format": "strict_date_optional_time" } })
        );
        assert_eq!(body["search_after"], json!(["2024-01-15T10:30:00.000Z", 99]));
        assert_eq!(
            body["query"]["bool"]["filter"],
            json!([{ "term": { "type": "movie" } }])
        );
        assert_eq!(
            body["query"]["bool"]["must"][0]["multi_match"]["query"],
            "inception"
        );
    }
}
