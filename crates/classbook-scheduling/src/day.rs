//! Day-of-week naming.

use classbook_models::schedules::{FIRST_SCHOOL_DAY, LAST_SCHOOL_DAY};

/// Label for any `day_of_week` outside Monday..Saturday.
pub const UNKNOWN_DAY: &str = "Unknown";

const DAY_NAMES: [&str; 6] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub fn is_school_day(day_of_week: i16) -> bool {
    (FIRST_SCHOOL_DAY..=LAST_SCHOOL_DAY).contains(&day_of_week)
}

/// 1 → "Monday" .. 6 → "Saturday". Never fails: anything else is
/// [`UNKNOWN_DAY`].
pub fn day_name(day_of_week: i16) -> &'static str {
    if is_school_day(day_of_week) {
        DAY_NAMES[(day_of_week - FIRST_SCHOOL_DAY) as usize]
    } else {
        UNKNOWN_DAY
    }
}
