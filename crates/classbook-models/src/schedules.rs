//! Timetable slots.
//!
//! Times travel as `"HH:MM"` strings and are stored as minute offsets in the
//! `start_minute`/`end_minute` columns.

use crate::ids::{ClassId, ScheduleId, SubjectId, TeacherId, TermId};
use crate::value_types::{TimeOfDay, TimeRange, ValueTypeError};
use classbook_core::serde::optional_from_str;
use classbook_core::{PaginationMeta, PaginationParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// First and last valid `day_of_week` (Monday..Saturday).
pub const FIRST_SCHOOL_DAY: i16 = 1;
pub const LAST_SCHOOL_DAY: i16 = 6;

/// A stored slot together with the names of the class, teacher and subject
/// it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScheduleSlot {
    pub id: ScheduleId,
    pub term_id: TermId,
    pub class_id: ClassId,
    pub class_name: String,
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub subject_id: SubjectId,
    pub subject_name: String,
    /// 1 = Monday .. 6 = Saturday
    pub day_of_week: i16,
    #[sqlx(rename = "start_minute")]
    pub start_time: TimeOfDay,
    #[sqlx(rename = "end_minute")]
    pub end_time: TimeOfDay,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateScheduleDto {
    pub class_id: ClassId,
    pub teacher_id: TeacherId,
    pub subject_id: SubjectId,
    pub term_id: TermId,
    #[validate(range(min = 1, max = 6))]
    #[schema(minimum = 1, maximum = 6, example = 1)]
    pub day_of_week: i16,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl CreateScheduleDto {
    pub fn time_range(&self) -> Result<TimeRange, ValueTypeError> {
        TimeRange::new(self.start_time, self.end_time)
    }
}

/// Class and term of a slot are fixed once created; everything else may move.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateScheduleDto {
    pub teacher_id: Option<TeacherId>,
    pub subject_id: Option<SubjectId>,
    #[validate(range(min = 1, max = 6))]
    pub day_of_week: Option<i16>,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
}

/// Dry-run request. `exclude_id` lets a client pre-check a move of an
/// existing slot without it colliding with itself.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ValidateScheduleDto {
    pub class_id: ClassId,
    pub teacher_id: TeacherId,
    pub term_id: TermId,
    #[validate(range(min = 1, max = 6))]
    pub day_of_week: i16,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub exclude_id: Option<ScheduleId>,
}

impl ValidateScheduleDto {
    pub fn time_range(&self) -> Result<TimeRange, ValueTypeError> {
        TimeRange::new(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BulkCreateScheduleDto {
    /// Items are validated and written one by one, in order.
    #[validate(length(min = 1, max = 50))]
    pub items: Vec<CreateScheduleDto>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct ScheduleFilterParams {
    #[serde(default, deserialize_with = "optional_from_str")]
    pub term_id: Option<TermId>,
    #[serde(default, deserialize_with = "optional_from_str")]
    pub class_id: Option<ClassId>,
    #[serde(default, deserialize_with = "optional_from_str")]
    pub teacher_id: Option<TeacherId>,
    #[serde(default, deserialize_with = "optional_from_str")]
    pub day_of_week: Option<i16>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct WeeklyScheduleQuery {
    pub term_id: TermId,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedSchedulesResponse {
    pub data: Vec<ScheduleSlot>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto(day: i16, start: &str, end: &str) -> CreateScheduleDto {
        CreateScheduleDto {
            class_id: ClassId::from_u128(10),
            teacher_id: TeacherId::from_u128(5),
            subject_id: SubjectId::from_u128(1),
            term_id: TermId::from_u128(1),
            day_of_week: day,
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
        }
    }

    #[test]
    fn test_day_of_week_range() {
        assert!(create_dto(1, "07:00", "08:00").validate().is_ok());
        assert!(create_dto(6, "07:00", "08:00").validate().is_ok());
        assert!(create_dto(0, "07:00", "08:00").validate().is_err());
        assert!(create_dto(7, "07:00", "08:00").validate().is_err());
    }

    #[test]
    fn test_time_range_rejects_reversed() {
        assert!(create_dto(1, "07:00", "08:00").time_range().is_ok());
        assert!(create_dto(1, "08:00", "08:00").time_range().is_err());
        assert!(create_dto(1, "09:00", "08:00").time_range().is_err());
    }

    #[test]
    fn test_create_dto_deserializes_hh_mm() {
        let dto: CreateScheduleDto = serde_json::from_value(serde_json::json!({
            "class_id": "00000000-0000-0000-0000-00000000000a",
            "teacher_id": "00000000-0000-0000-0000-000000000005",
            "subject_id": "00000000-0000-0000-0000-000000000001",
            "term_id": "00000000-0000-0000-0000-000000000001",
            "day_of_week": 1,
            "start_time": "07:00",
            "end_time": "08:30"
        }))
        .unwrap();
        assert_eq!(dto.start_time.minutes(), 420);
        assert_eq!(dto.end_time.minutes(), 510);
    }

    #[test]
    fn test_create_dto_rejects_bad_time_string() {
        let result: Result<CreateScheduleDto, _> = serde_json::from_value(serde_json::json!({
            "class_id": "00000000-0000-0000-0000-00000000000a",
            "teacher_id": "00000000-0000-0000-0000-000000000005",
            "subject_id": "00000000-0000-0000-0000-000000000001",
            "term_id": "00000000-0000-0000-0000-000000000001",
            "day_of_week": 1,
            "start_time": "7:00",
            "end_time": "08:30"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_bulk_item_count_bounds() {
        let empty = BulkCreateScheduleDto { items: vec![] };
        assert!(empty.validate().is_err());

        let too_many = BulkCreateScheduleDto {
            items: (0..51).map(|_| create_dto(1, "07:00", "08:00")).collect(),
        };
        assert!(too_many.validate().is_err());

        let fifty = BulkCreateScheduleDto {
            items: (0..50).map(|_| create_dto(1, "07:00", "08:00")).collect(),
        };
        assert!(fifty.validate().is_ok());
    }
}
