//! Weekly timetable views.

use classbook_models::schedules::ScheduleSlot;
use classbook_models::{ClassId, TeacherId};
use serde::ser::{Serialize, SerializeMap, Serializer};
use uuid::Uuid;

use crate::day::day_name;

/// Whose timetable to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOwner {
    Class(ClassId),
    Teacher(TeacherId),
}

impl ScheduleOwner {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Class(_) => "class",
            Self::Teacher(_) => "teacher",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Class(id) => id.into_inner(),
            Self::Teacher(id) => id.into_inner(),
        }
    }
}

/// Slots grouped under day names.
///
/// Serializes as a JSON object whose keys keep the order the days were
/// first seen in, e.g. `{"Monday": [...], "Wednesday": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: Vec<(&'static str, Vec<ScheduleSlot>)>,
}

impl WeeklySchedule {
    pub fn get(&self, day: &str) -> Option<&[ScheduleSlot]> {
        self.days
            .iter()
            .find(|(name, _)| *name == day)
            .map(|(_, slots)| slots.as_slice())
    }

    pub fn day_names(&self) -> Vec<&'static str> {
        self.days.iter().map(|(name, _)| *name).collect()
    }

    pub fn total_slots(&self) -> usize {
        self.days.iter().map(|(_, slots)| slots.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[ScheduleSlot])> {
        self.days.iter().map(|(name, slots)| (*name, slots.as_slice()))
    }
}

impl Serialize for WeeklySchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (name, slots) in &self.days {
            map.serialize_entry(name, slots)?;
        }
        map.end()
    }
}

/// Groups slots by day name, keeping input order within each day.
///
/// Expects slots ordered by `(day_of_week, start_time)` as the store returns
/// them. Every out-of-range day lands under the same "Unknown" key.
pub fn group_by_day<I>(slots: I) -> WeeklySchedule
where
    I: IntoIterator<Item = ScheduleSlot>,
{
    let mut days: Vec<(&'static str, Vec<ScheduleSlot>)> = Vec::new();

    for slot in slots {
        let name = day_name(slot.day_of_week);
        match days.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, bucket)) => bucket.push(slot),
            None => days.push((name, vec![slot])),
        }
    }

    WeeklySchedule { days }
}
