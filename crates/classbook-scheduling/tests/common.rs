#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use classbook_models::schedules::ScheduleSlot;
use classbook_models::{ClassId, ScheduleId, SubjectId, TeacherId, TermId, TimeOfDay, TimeRange};
use classbook_scheduling::ProposedSlot;

pub fn time(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

pub fn range(start: &str, end: &str) -> TimeRange {
    TimeRange::new(time(start), time(end)).unwrap()
}

pub struct SlotSpec {
    pub id: u128,
    pub term: u128,
    pub class: u128,
    pub teacher: u128,
    pub day: i16,
    pub start: &'static str,
    pub end: &'static str,
}

pub fn slot(spec: SlotSpec) -> ScheduleSlot {
    let at = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
    ScheduleSlot {
        id: ScheduleId::from_u128(spec.id),
        term_id: TermId::from_u128(spec.term),
        class_id: ClassId::from_u128(spec.class),
        class_name: format!("Class {}", spec.class),
        teacher_id: TeacherId::from_u128(spec.teacher),
        teacher_name: format!("Teacher {}", spec.teacher),
        subject_id: SubjectId::from_u128(1),
        subject_name: "Mathematics".to_string(),
        day_of_week: spec.day,
        start_time: time(spec.start),
        end_time: time(spec.end),
        created_at: at,
        updated_at: at,
    }
}

pub fn proposed(term: u128, class: u128, teacher: u128, day: i16, start: &str, end: &str) -> ProposedSlot {
    ProposedSlot::new(
        TermId::from_u128(term),
        ClassId::from_u128(class),
        TeacherId::from_u128(teacher),
        day,
        range(start, end),
    )
}

/// Existing slot {term=1, class=10, teacher=5, Monday, 07:00-08:30}.
pub fn monday_math() -> ScheduleSlot {
    slot(SlotSpec {
        id: 100,
        term: 1,
        class: 10,
        teacher: 5,
        day: 1,
        start: "07:00",
        end: "08:30",
    })
}
