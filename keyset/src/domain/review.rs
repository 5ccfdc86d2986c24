use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::{SortField, Sortable};
use crate::sort::{SortValue, ValueKind};
use crate::Id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewModel {
    pub id: Id,
    pub content_id: Id,
    pub author_id: Id,
    pub text: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewSortField {
    CreatedAt,
    Rating,
}

impl SortField for ReviewSortField {
    const ALL: &'static [Self] = &[ReviewSortField::CreatedAt, ReviewSortField::Rating];
    const DEFAULT: Self = ReviewSortField::CreatedAt;

    fn name(self) -> &'static str {
        match self {
            ReviewSortField::CreatedAt => "createdAt",
            ReviewSortField::Rating => "rating",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            ReviewSortField::CreatedAt => ValueKind::Timestamp,
            ReviewSortField::Rating => ValueKind::Float,
        }
    }
}

impl Sortable<ReviewSortField> for ReviewModel {
    fn row_id(&self) -> Id {
        self.id
    }

    fn sort_value(&self, field: ReviewSortField) -> SortValue {
        match field {
            ReviewSortField::CreatedAt => SortValue::Timestamp(self.created_at),
            ReviewSortField::Rating => SortValue::Float(self.rating),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewQuery {
    pub content_id_equal: Option<Id>,
}
