//! Keyset pagination over a search index using `search_after`.
//!
//! The index client is abstracted behind [`SearchIndex`]; requests and
//! responses use the Elasticsearch JSON shape.

mod binding;
pub mod body;
mod document;

use keyset::domain::{ContentModel, ContentQuery, ContentSortField};
use keyset::{Error, Keyset, PageAssembler, PageRequest, PageResponse, Registry, Result, SortField};
use serde::Deserialize;
use serde_json::Value;

pub use binding::{search_after_value, SearchBinding, SearchBindings, CONTENT_ID_FIELD};
pub use document::{content_mapping, format_date, ContentDocument, DATE_LAYOUT};

/// A search response the content listing cannot use.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("search response carries no total hit count")]
    MissingTotalHits,
}

/// Client of a search cluster.
pub trait SearchIndex {
    type Error: std::error::Error + Send + Sync + 'static;

    fn search(&self, index: &str, body: &Value) -> std::result::Result<SearchResponse, Self::Error>;

    /// Creates or replaces the document with `id`.
    fn index_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
    ) -> std::result::Result<(), Self::Error>;
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    pub hits: Hits,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Hits {
    /// Absent when the request did not track total hits
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TotalHits {
    pub value: u64,
    #[serde(default)]
    pub relation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "_source")]
    pub source: Value,
    #[serde(default)]
    pub sort: Vec<Value>,
}

/// Content listing served from a search index.
pub struct ContentSearch<I> {
    index: I,
    name: String,
    registry: Registry<ContentSortField, SearchBinding>,
}

impl<I: SearchIndex> ContentSearch<I> {
    pub fn new(index: I, name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            index,
            name: name.into(),
            registry: Registry::build(&SearchBindings)?,
        })
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn index_content(&self, content: &ContentModel) -> Result<()> {
        let document =
            serde_json::to_value(ContentDocument::from(content)).map_err(Error::backend)?;
        self.index
            .index_document(&self.name, &content.id.to_string(), &document)
            .map_err(Error::backend)
    }

    pub fn find_contents(
        &self,
        query: &ContentQuery,
        request: &PageRequest<ContentSortField>,
    ) -> Result<PageResponse<ContentModel, ContentSortField>> {
        let descriptor = self.registry.descriptor(request.sort_by)?;
        let keyset = Keyset::from_request(request)?;
        let body = body::content_search(query, descriptor.binding(), &keyset, request.fetch_size());

        let response = self
            .index
            .search(&self.name, &body)
            .map_err(Error::backend)?;

        let total_count = response
            .hits
            .total
            .as_ref()
            .map(|total| total.value)
            .ok_or_else(|| Error::backend(ResponseError::MissingTotalHits))?;

        let batch = response
            .hits
            .hits
            .into_iter()
            .take(request.fetch_size())
            .map(|hit| {
                serde_json::from_value::<ContentDocument>(hit.source)
                    .map(ContentModel::from)
                    .map_err(Error::backend)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            index = %self.name,
            sort_by = request.sort_by.name(),
            direction = ?request.direction,
            limit = request.limit,
            cursor = keyset.position().is_some(),
            fetched = batch.len(),
            "fetched search page"
        );

        Ok(PageAssembler::new(request).assemble(batch, total_count, |row| row))
    }
}
