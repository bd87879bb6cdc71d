//! Schedule DTOs from `classbook-models` plus the response shapes that only
//! the HTTP layer needs.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use classbook_models::TermId;
use classbook_scheduling::{ConflictReport, WeeklySchedule};

pub use classbook_models::schedules::*;

/// Outcome of one item of a bulk create, in request order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkScheduleItemResult {
    pub index: usize,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<ConflictReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleSlot>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkScheduleResponse {
    pub total: usize,
    pub created: usize,
    pub failed: usize,
    pub results: Vec<BulkScheduleItemResult>,
}

/// A class or teacher timetable for one term, keyed by day name.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeeklyTimetableResponse {
    /// `class` or `teacher`
    pub owner_type: String,
    pub owner_id: Uuid,
    pub term_id: TermId,
    pub total_slots: usize,
    /// `{"Monday": [slot, ...], "Wednesday": [...]}` in day order
    #[schema(value_type = Object)]
    pub schedule: WeeklySchedule,
}
