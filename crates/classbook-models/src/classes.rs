//! Class sections.

use crate::ids::{ClassId, TeacherId};
use classbook_core::serde::optional_from_str;
use classbook_core::{PaginationMeta, PaginationParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::terms::validate_academic_year;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Class {
    pub id: ClassId,
    /// e.g. "X IPA 1"; unique per academic year.
    pub name: String,
    pub grade_level: i16,
    pub academic_year: String,
    pub homeroom_teacher_id: Option<TeacherId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A class with its homeroom teacher's name and roster size.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassWithStats {
    pub id: ClassId,
    pub name: String,
    pub grade_level: i16,
    pub academic_year: String,
    pub homeroom_teacher_id: Option<TeacherId>,
    pub homeroom_teacher_name: Option<String>,
    pub student_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[validate(length(min = 1, max = 50))]
    #[schema(example = "X IPA 1")]
    pub name: String,
    #[validate(range(min = 1, max = 12))]
    pub grade_level: i16,
    #[validate(custom(function = "validate_academic_year"))]
    pub academic_year: String,
    pub homeroom_teacher_id: Option<TeacherId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClassDto {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 12))]
    pub grade_level: Option<i16>,
    pub homeroom_teacher_id: Option<TeacherId>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ClassFilterParams {
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "optional_from_str")]
    pub grade_level: Option<i16>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedClassesResponse {
    pub data: Vec<ClassWithStats>,
    pub meta: PaginationMeta,
}
