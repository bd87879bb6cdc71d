//! Attendance records taken against timetable slots.

use crate::ids::{AttendanceId, ClassId, ScheduleId, StudentId, TermId, UserId};
use classbook_core::serde::optional_from_str;
use classbook_core::{PaginationMeta, PaginationParams};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "attendance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Excused,
    Sick,
    Absent,
}

/// One student's attendance for one slot on one date.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Attendance {
    pub id: AttendanceId,
    pub schedule_id: ScheduleId,
    pub student_id: StudentId,
    pub student_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub recorded_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecordAttendanceDto {
    pub schedule_id: ScheduleId,
    pub student_id: StudentId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[validate(length(max = 255))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AttendanceEntry {
    pub student_id: StudentId,
    pub status: AttendanceStatus,
    #[validate(length(max = 255))]
    pub note: Option<String>,
}

/// Roll call for one slot on one date.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BulkAttendanceDto {
    pub schedule_id: ScheduleId,
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 100))]
    #[validate(nested)]
    pub entries: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAttendanceDto {
    pub status: Option<AttendanceStatus>,
    #[validate(length(max = 255))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct AttendanceFilterParams {
    #[serde(default, deserialize_with = "optional_from_str")]
    pub schedule_id: Option<ScheduleId>,
    #[serde(default, deserialize_with = "optional_from_str")]
    pub student_id: Option<StudentId>,
    #[serde(default, deserialize_with = "optional_from_str")]
    pub class_id: Option<ClassId>,
    pub status: Option<AttendanceStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedAttendanceResponse {
    pub data: Vec<Attendance>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkAttendanceItemResult {
    pub student_id: StudentId,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<Attendance>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkAttendanceResponse {
    pub total: usize,
    pub recorded: usize,
    pub failed: usize,
    pub results: Vec<BulkAttendanceItemResult>,
}

/// Per-status record counts for one student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceCounts {
    pub present: i64,
    pub excused: i64,
    pub sick: i64,
    pub absent: i64,
}

impl AttendanceCounts {
    pub fn total(&self) -> i64 {
        self.present + self.excused + self.sick + self.absent
    }

    /// Share of `present` records as a percentage with two decimals, `0`
    /// when nothing was recorded.
    pub fn presence_percentage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let raw = self.present as f64 / total as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecap {
    pub student_id: StudentId,
    pub student_name: String,
    pub total: i64,
    pub present: i64,
    pub excused: i64,
    pub sick: i64,
    pub absent: i64,
    pub presence_percentage: f64,
}

impl AttendanceRecap {
    pub fn new(student_id: StudentId, student_name: String, counts: AttendanceCounts) -> Self {
        Self {
            student_id,
            student_name,
            total: counts.total(),
            present: counts.present,
            excused: counts.excused,
            sick: counts.sick,
            absent: counts.absent,
            presence_percentage: counts.presence_percentage(),
        }
    }
}

/// Filters for one student's recap. Date bounds are inclusive.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct StudentRecapQuery {
    #[serde(default, deserialize_with = "optional_from_str")]
    pub term_id: Option<TermId>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ClassRecapQuery {
    pub term_id: TermId,
}

/// `/me` variant: a parent may name which child to show.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct MyAttendanceQuery {
    pub term_id: TermId,
    #[serde(default, deserialize_with = "optional_from_str")]
    pub student_id: Option<StudentId>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClassAttendanceRecap {
    pub class_id: ClassId,
    pub class_name: String,
    pub term_id: TermId,
    pub student_count: usize,
    pub students: Vec<AttendanceRecap>,
}
