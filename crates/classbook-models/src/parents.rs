//! Parent profiles.
//!
//! A parent is backed by a user account with the `parent` role and linked to
//! one or more students. The link carries the relationship.

use crate::ids::{ClassId, ParentId, StudentId, UserId};
use crate::value_types::Email;
use classbook_core::{PaginationMeta, PaginationParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "parent_relationship", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Father,
    Mother,
    #[default]
    Guardian,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Parent {
    pub id: ParentId,
    pub user_id: UserId,
    pub full_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub occupation: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A student as seen from a parent's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ParentChild {
    pub student_id: StudentId,
    pub student_number: String,
    pub full_name: String,
    pub class_id: Option<ClassId>,
    pub class_name: Option<String>,
    pub relationship: Relationship,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParentWithChildren {
    #[serde(flatten)]
    pub parent: Parent,
    pub children: Vec<ParentChild>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateParentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub email: Email,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub occupation: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateParentDto {
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub occupation: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LinkChildDto {
    pub student_id: StudentId,
    /// Defaults to `guardian`.
    #[serde(default)]
    pub relationship: Relationship,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ParentFilterParams {
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedParentsResponse {
    pub data: Vec<Parent>,
    pub meta: PaginationMeta,
}
