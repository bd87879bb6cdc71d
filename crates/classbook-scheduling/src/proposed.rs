use classbook_models::schedules::ScheduleSlot;
use classbook_models::{ClassId, ScheduleId, TeacherId, TermId, TimeRange};

/// A proposed booking, checked against what is already stored.
///
/// The range is a [`TimeRange`], so it is never empty or reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposedSlot {
    pub term_id: TermId,
    pub class_id: ClassId,
    pub teacher_id: TeacherId,
    pub day_of_week: i16,
    pub range: TimeRange,
    /// The slot being moved, skipped during the search.
    pub exclude_id: Option<ScheduleId>,
}

impl ProposedSlot {
    pub fn new(
        term_id: TermId,
        class_id: ClassId,
        teacher_id: TeacherId,
        day_of_week: i16,
        range: TimeRange,
    ) -> Self {
        Self {
            term_id,
            class_id,
            teacher_id,
            day_of_week,
            range,
            exclude_id: None,
        }
    }

    pub fn excluding(mut self, id: ScheduleId) -> Self {
        self.exclude_id = Some(id);
        self
    }

    /// The store filter: same term, same day, not the excluded slot, and
    /// `stored.start < proposed.end && stored.end > proposed.start`.
    ///
    /// Compares the stored bounds directly instead of building a
    /// `TimeRange`, so a malformed stored row is still matched on the same
    /// predicate the SQL query applies.
    pub fn is_candidate(&self, slot: &ScheduleSlot) -> bool {
        slot.term_id == self.term_id
            && slot.day_of_week == self.day_of_week
            && self.exclude_id != Some(slot.id)
            && slot.start_time < self.range.end()
            && slot.end_time > self.range.start()
    }

    /// Key of the `(term, day)` scope the proposed slot writes into.
    pub fn scope(&self) -> (TermId, i16) {
        (self.term_id, self.day_of_week)
    }
}
