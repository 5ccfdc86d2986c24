use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::{SortField, Sortable};
use crate::sort::{SortValue, ValueKind};
use crate::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserModel {
    pub id: Id,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserSortField {
    Name,
    Email,
    CreatedAt,
    IsLocked,
    /// Sorted by the role's name
    Role,
}

impl SortField for UserSortField {
    const ALL: &'static [Self] = &[
        UserSortField::Name,
        UserSortField::Email,
        UserSortField::CreatedAt,
        UserSortField::IsLocked,
        UserSortField::Role,
    ];
    const DEFAULT: Self = UserSortField::CreatedAt;

    fn name(self) -> &'static str {
        match self {
            UserSortField::Name => "name",
            UserSortField::Email => "email",
            UserSortField::CreatedAt => "createdAt",
            UserSortField::IsLocked => "isLocked",
            UserSortField::Role => "role",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            UserSortField::Name | UserSortField::Email | UserSortField::Role => ValueKind::Text,
            UserSortField::CreatedAt => ValueKind::Timestamp,
            UserSortField::IsLocked => ValueKind::Bool,
        }
    }
}

impl Sortable<UserSortField> for UserModel {
    fn row_id(&self) -> Id {
        self.id
    }

    fn sort_value(&self, field: UserSortField) -> SortValue {
        match field {
            UserSortField::Name => SortValue::Text(self.name.clone()),
            UserSortField::Email => SortValue::Text(self.email.clone()),
            UserSortField::CreatedAt => SortValue::Timestamp(self.created_at),
            UserSortField::IsLocked => SortValue::Bool(self.locked),
            UserSortField::Role => SortValue::Text(self.role.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    /// Case-insensitive match against the email address
    pub email_like: Option<String>,
    pub role_equal: Option<Role>,
    pub is_locked: Option<bool>,
}

impl UserQuery {
    pub fn email_keyword(&self) -> Option<&str> {
        super::keyword(&self.email_like)
    }
}
