//! Academic terms.
//!
//! A term (semester) is the scope inside which timetable slots are compared:
//! two slots in different terms never conflict.

use crate::ids::TermId;
use classbook_core::serde::optional_from_str;
use classbook_core::{PaginationMeta, PaginationParams};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Term {
    pub id: TermId,
    /// e.g. "Odd Semester"
    pub name: String,
    /// e.g. "2025/2026"
    pub academic_year: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// At most one term is active at a time.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTermDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(custom(function = "validate_academic_year"))]
    #[schema(example = "2025/2026")]
    pub academic_year: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTermDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct TermFilterParams {
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "optional_from_str")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedTermsResponse {
    pub data: Vec<Term>,
    pub meta: PaginationMeta,
}

/// Accepts `YYYY/YYYY` where the second year follows the first.
pub fn validate_academic_year(value: &str) -> Result<(), ValidationError> {
    let parsed = value
        .split_once('/')
        .filter(|(a, b)| a.len() == 4 && b.len() == 4)
        .and_then(|(a, b)| Some((a.parse::<u16>().ok()?, b.parse::<u16>().ok()?)));

    match parsed {
        Some((first, second)) if second == first + 1 => Ok(()),
        _ => Err(ValidationError::new("academic_year")
            .with_message("academic year must look like 2025/2026".into())),
    }
}
