//! Conflict classification.

use std::fmt;

use classbook_models::ScheduleId;
use classbook_models::schedules::ScheduleSlot;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::day::day_name;
use crate::proposed::ProposedSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    /// The teacher is already booked at that time.
    Teacher,
    /// The class already has a lesson at that time.
    Class,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Class => "class",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reason a proposed slot cannot be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub blocking_slot_id: ScheduleId,
    pub message: String,
    pub blocking_slot: ScheduleSlot,
}

impl Conflict {
    fn new(kind: ConflictKind, slot: &ScheduleSlot) -> Self {
        let when = format!(
            "{} {}-{}",
            day_name(slot.day_of_week),
            slot.start_time,
            slot.end_time
        );
        let message = match kind {
            ConflictKind::Teacher => format!(
                "Teacher {} already teaches {} in class {} on {}",
                slot.teacher_name, slot.subject_name, slot.class_name, when
            ),
            ConflictKind::Class => format!(
                "Class {} already has {} with {} on {}",
                slot.class_name, slot.subject_name, slot.teacher_name, when
            ),
        };

        Self {
            kind,
            blocking_slot_id: slot.id,
            message,
            blocking_slot: slot.clone(),
        }
    }
}

/// Outcome of a conflict check. Finding conflicts is a normal result, not
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub conflicts: Vec<Conflict>,
}

impl ConflictReport {
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: ConflictKind) -> usize {
        self.conflicts.iter().filter(|c| c.kind == kind).count()
    }

    /// One-line summary for error responses and logs.
    pub fn summary(&self) -> String {
        match self.conflicts.as_slice() {
            [] => "No schedule conflicts".to_string(),
            [only] => only.message.clone(),
            all => format!("Schedule has {} conflicts", all.len()),
        }
    }
}

/// Classifies `candidates` against `proposed`.
///
/// Slots outside the proposed slot's scope (other term, other day, the
/// excluded id, or a non-overlapping range) are skipped, so the result is the same
/// whether the caller hands over the narrow store query result or a whole
/// term. Each remaining slot yields a teacher conflict, a class conflict,
/// both, or nothing, in candidate order.
pub fn detect_conflicts<'a, I>(proposed: &ProposedSlot, candidates: I) -> ConflictReport
where
    I: IntoIterator<Item = &'a ScheduleSlot>,
{
    let mut conflicts = Vec::new();

    for slot in candidates.into_iter().filter(|s| proposed.is_candidate(s)) {
        if slot.teacher_id == proposed.teacher_id {
            conflicts.push(Conflict::new(ConflictKind::Teacher, slot));
        }
        if slot.class_id == proposed.class_id {
            conflicts.push(Conflict::new(ConflictKind::Class, slot));
        }
    }

    ConflictReport {
        has_conflict: !conflicts.is_empty(),
        conflicts,
    }
}

/// A pair of stored slots that violate the no-double-booking rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotClash {
    pub first: ScheduleId,
    pub second: ScheduleId,
    pub kind: ConflictKind,
    pub message: String,
}

/// Finds every clashing pair among the slots of one term.
///
/// Used to audit data written before conflicts were checked, or by hand.
/// Each unordered pair is reported once per kind.
pub fn audit_term(slots: &[ScheduleSlot]) -> Vec<SlotClash> {
    let mut clashes = Vec::new();

    for (i, slot) in slots.iter().enumerate() {
        let Ok(range) = classbook_models::TimeRange::new(slot.start_time, slot.end_time) else {
            continue;
        };
        let proposed = ProposedSlot::new(
            slot.term_id,
            slot.class_id,
            slot.teacher_id,
            slot.day_of_week,
            range,
        )
        .excluding(slot.id);

        let report = detect_conflicts(&proposed, &slots[i + 1..]);
        clashes.extend(report.conflicts.into_iter().map(|c| SlotClash {
            first: slot.id,
            second: c.blocking_slot_id,
            kind: c.kind,
            message: c.message,
        }));
    }

    clashes
}
