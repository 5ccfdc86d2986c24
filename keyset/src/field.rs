//! Sort field registry.
//!
//! Every entity exposes one domain-level enum of sortable attributes
//! ([`SortField`]). Each backend maps that same enum to its native comparison
//! binding once, through [`Bindings`], and a [`Registry`] built at startup
//! proves the mapping is complete.

use std::fmt;
use std::hash::Hash;

use crate::sort::{SortKey, SortValue, ValueKind};
use crate::{Error, Id, Result};

/// Domain-level enumeration of the attributes an entity can be sorted by.
pub trait SortField: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Every variant, used to validate backend registrations.
    const ALL: &'static [Self];

    /// Sort field used when the caller does not pick one.
    const DEFAULT: Self;

    /// Stable lower camel case name, also echoed in page responses.
    fn name(self) -> &'static str;

    fn kind(self) -> ValueKind;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.name().eq_ignore_ascii_case(name))
    }
}

/// A row that can be positioned in the `(value, id)` order of a sort field.
pub trait Sortable<F: SortField> {
    /// Unique id of the row.
    fn row_id(&self) -> Id;

    /// Current value of `field` on this row.
    fn sort_value(&self, field: F) -> SortValue;

    fn sort_key(&self, field: F) -> SortKey {
        SortKey {
            value: self.sort_value(field),
            id: self.row_id(),
        }
    }
}

/// Backend-native comparison bindings for the sort fields of one entity.
pub trait Bindings<F: SortField> {
    type Binding: Clone;

    /// Backend name reported by [`Error::UnsupportedSortField`].
    const BACKEND: &'static str;

    fn binding(&self, field: F) -> Option<Self::Binding>;
}

/// Everything a backend needs to paginate by one sort field.
#[derive(Debug, Clone)]
pub struct Descriptor<F, B> {
    field: F,
    binding: B,
}

impl<F: SortField, B> Descriptor<F, B> {
    pub fn field(&self) -> F {
        self.field
    }

    pub fn kind(&self) -> ValueKind {
        self.field.kind()
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn serialize(&self, value: &SortValue) -> String {
        value.encode()
    }

    pub fn deserialize(&self, raw: &str) -> Result<SortValue> {
        self.kind().decode(raw)
    }
}

/// Validated mapping from every domain sort field to its descriptor on one backend.
#[derive(Debug, Clone)]
pub struct Registry<F, B> {
    backend: &'static str,
    descriptors: Vec<Descriptor<F, B>>,
}

impl<F: SortField, B: Clone> Registry<F, B> {
    /// Resolves a binding for every variant of `F`.
    ///
    /// A variant without a binding is a configuration error and fails the
    /// whole build instead of surfacing later as a per-request miss.
    pub fn build<S>(bindings: &S) -> Result<Self>
    where
        S: Bindings<F, Binding = B>,
    {
        let descriptors = F::ALL
            .iter()
            .map(|&field| {
                bindings
                    .binding(field)
                    .map(|binding| Descriptor { field, binding })
                    .ok_or(Error::UnsupportedSortField {
                        backend: S::BACKEND,
                        field: field.name(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            backend: S::BACKEND,
            descriptors,
        })
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub fn descriptor(&self, field: F) -> Result<&Descriptor<F, B>> {
        self.descriptors
            .iter()
            .find(|d| d.field == field)
            .ok_or(Error::UnsupportedSortField {
                backend: self.backend,
                field: field.name(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum ToyField {
        Score,
        Label,
    }

    impl SortField for ToyField {
        const ALL: &'static [Self] = &[ToyField::Score, ToyField::Label];
        const DEFAULT: Self = ToyField::Score;

        fn name(self) -> &'static str {
            match self {
                ToyField::Score => "score",
                ToyField::Label => "label",
            }
        }

        fn kind(self) -> ValueKind {
            match self {
                ToyField::Score => ValueKind::Integer,
                ToyField::Label => ValueKind::Text,
            }
        }
    }

    struct Complete;

    impl Bindings<ToyField> for Complete {
        type Binding = &'static str;
        const BACKEND: &'static str = "complete";

        fn binding(&self, field: ToyField) -> Option<&'static str> {
            Some(match field {
                ToyField::Score => "score_col",
                ToyField::Label => "label_col",
            })
        }
    }

    struct Partial;

    impl Bindings<ToyField> for Partial {
        type Binding = &'static str;
        const BACKEND: &'static str = "partial";

        fn binding(&self, field: ToyField) -> Option<&'static str> {
            match field {
                ToyField::Score => Some("score_col"),
                ToyField::Label => None,
            }
        }
    }

    #[test]
    fn test_registry_resolves_every_field() {
        let registry = Registry::build(&Complete).unwrap();

        assert_eq!(registry.backend(), "complete");
        assert_eq!(
            *registry.descriptor(ToyField::Label).unwrap().binding(),
            "label_col"
        );
        assert_eq!(
            registry.descriptor(ToyField::Score).unwrap().kind(),
            ValueKind::Integer
        );
    }

    #[test]
    fn test_missing_binding_fails_build() {
        let err = Registry::build(&Partial).unwrap_err();

        match err {
            Error::UnsupportedSortField { backend, field } => {
                assert_eq!(backend, "partial");
                assert_eq!(field, "label");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(ToyField::from_name("SCORE"), Some(ToyField::Score));
        assert_eq!(ToyField::from_name("missing"), None);
    }
}
