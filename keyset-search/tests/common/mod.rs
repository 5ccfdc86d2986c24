//! In-process stand-in for a search cluster.
//!
//! Understands the subset of the query DSL the content listing sends: a bool
//! query of `term` filters and `multi_match` clauses, field sorts,
//! `search_after`, `size` and `track_total_hits`. Phrase prefix matching is
//! approximated by a case-insensitive substring test.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io;
use std::sync::Mutex;

use keyset_search::{Hit, Hits, SearchIndex, SearchResponse, TotalHits};
use serde_json::{json, Value};

#[derive(Default)]
pub struct FakeIndex {
    indices: Mutex<BTreeMap<String, BTreeMap<String, Value>>>,
    requests: Mutex<Vec<Value>>,
}

impl FakeIndex {
    /// Bodies of every search received so far.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg.into())
}

fn matches_clause(doc: &Value, clause: &Value) -> io::Result<bool> {
    if let Some(term) = clause.get("term").and_then(Value::as_object) {
        return Ok(term.iter().all(|(field, value)| doc.get(field) == Some(value)));
    }
    if let Some(multi) = clause.get("multi_match") {
        let needle = multi["query"]
            .as_str()
            .ok_or_else(|| invalid("multi_match without query"))?
            .to_lowercase();
        let fields = multi["fields"]
            .as_array()
            .ok_or_else(|| invalid("multi_match without fields"))?;
        return Ok(fields.iter().filter_map(Value::as_str).any(|field| {
            doc.get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        }));
    }
    Err(invalid(format!("unsupported clause {clause}")))
}

fn matches(doc: &Value, query: &Value) -> io::Result<bool> {
    let bool_query = &query["bool"];
    for key in ["filter", "must"] {
        if let Some(clauses) = bool_query.get(key).and_then(Value::as_array) {
            for clause in clauses {
                if !matches_clause(doc, clause)? {
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}

/// Orders two sort values of the same field; missing values sort first.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => {
                    let x = x.as_f64().unwrap_or(f64::NAN);
                    let y = y.as_f64().unwrap_or(f64::NAN);
                    x.total_cmp(&y)
                }
            },
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

struct SortSpec {
    field: String,
    descending: bool,
}

fn sort_specs(body: &Value) -> io::Result<Vec<SortSpec>> {
    let Some(sorts) = body.get("sort").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    sorts
        .iter()
        .map(|sort| {
            let (field, spec) = sort
                .as_object()
                .and_then(|o| o.iter().next())
                .ok_or_else(|| invalid(format!("bad sort {sort}")))?;
            Ok(SortSpec {
                field: field.clone(),
                descending: spec["order"] == "desc",
            })
        })
        .collect()
}

fn compare_keys(a: &[Value], b: &[Value], specs: &[SortSpec]) -> Ordering {
    for ((x, y), spec) in a.iter().zip(b).zip(specs) {
        let ord = compare_values(x, y);
        let ord = if spec.descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

impl SearchIndex for FakeIndex {
    type Error = io::Error;

    fn search(&self, index: &str, body: &Value) -> io::Result<SearchResponse> {
        self.requests.lock().unwrap().push(body.clone());

        let indices = self.indices.lock().unwrap();
        let empty = BTreeMap::new();
        let docs = indices.get(index).unwrap_or(&empty);

        let query = body.get("query").cloned().unwrap_or_else(|| json!({}));
        let specs = sort_specs(body)?;
        let size = body["size"].as_u64().unwrap_or(10) as usize;

        let mut matching = Vec::new();
        for (id, doc) in docs {
            if matches(doc, &query)? {
                let key: Vec<Value> = specs
                    .iter()
                    .map(|spec| doc.get(&spec.field).cloned().unwrap_or(Value::Null))
                    .collect();
                matching.push((id.clone(), key, doc.clone()));
            }
        }
        let total = matching.len() as u64;

        if let Some(after) = body.get("search_after").and_then(Value::as_array) {
            if after.len() != specs.len() {
                return Err(invalid("search_after must have one value per sort"));
            }
            matching.retain(|(_, key, _)| compare_keys(key, after, &specs) == Ordering::Greater);
        }
        matching.sort_by(|(_, a, _), (_, b, _)| compare_keys(a, b, &specs));
        matching.truncate(size);

        let tracked = body["track_total_hits"] == true;
        Ok(SearchResponse {
            hits: Hits {
                total: tracked.then(|| TotalHits {
                    value: total,
                    relation: Some("eq".to_string()),
                }),
                hits: matching
                    .into_iter()
                    .map(|(id, sort, source)| Hit {
                        id: Some(id),
                        source,
                        sort,
                    })
                    .collect(),
            },
        })
    }

    fn index_document(&self, index: &str, id: &str, document: &Value) -> io::Result<()> {
        self.indices
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .insert(id.to_string(), document.clone());
        Ok(())
    }
}
