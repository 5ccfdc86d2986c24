//! Page size limits applied by callers before a request reaches a backend.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::field::SortField;
use crate::page::PageRequest;
use crate::sort::SortDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size when the caller does not ask for one
    pub default_limit: u32,
    /// Largest page size a caller may ask for
    pub max_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl PaginationConfig {
    /// Loads settings from an optional file, overridden by `KEYSET_*`
    /// environment variables (e.g. `KEYSET_MAX_LIMIT=50`).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder
            .add_source(Environment::with_prefix("KEYSET").try_parsing(true))
            .build()?
            .try_deserialize::<Self>()?
            .validate()
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_limit == 0 {
            return Err(ConfigError::Message("max_limit must be at least 1".into()));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::Message(format!(
                "default_limit must be within 1..={}, got {}",
                self.max_limit, self.default_limit
            )));
        }
        Ok(self)
    }

    /// Bounds a requested page size to `[1, max_limit]`.
    pub fn clamp_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }

    /// First-page request with defaults applied for anything the caller left out.
    pub fn request<F: SortField>(
        &self,
        sort_by: Option<F>,
        direction: Option<SortDirection>,
        limit: Option<u32>,
    ) -> PageRequest<F> {
        PageRequest::first(
            sort_by.unwrap_or(F::DEFAULT),
            direction.unwrap_or_default(),
            self.clamp_limit(limit),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentSortField;
    use std::io::Write;

    #[test]
    fn test_clamp_limit() {
        let config = PaginationConfig::default();

        assert_eq!(config.clamp_limit(None), 20);
        assert_eq!(config.clamp_limit(Some(0)), 1);
        assert_eq!(config.clamp_limit(Some(55)), 55);
        assert_eq!(config.clamp_limit(Some(10_000)), 100);
    }

    #[test]
    fn test_request_defaults() {
        let request = PaginationConfig::default().request::<ContentSortField>(None, None, None);

        assert_eq!(request.sort_by, ContentSortField::CreatedAt);
        assert_eq!(request.direction, SortDirection::Descending);
        assert_eq!(request.limit, 20);
        assert!(!request.has_cursor());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "default_limit = 10\nmax_limit = 30").unwrap();

        let config = PaginationConfig::load(Some(file.path())).unwrap();
        assert_eq!(
            config,
            PaginationConfig {
                default_limit: 10,
                max_limit: 30
            }
        );
    }

    #[test]
    fn test_rejects_default_above_max() {
        let config = PaginationConfig {
            default_limit: 200,
            max_limit: 100,
        };
        assert!(config.validate().is_err());
    }
}
