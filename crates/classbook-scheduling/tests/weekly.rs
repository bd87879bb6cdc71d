mod common;

use classbook_models::{ClassId, ScheduleId, TeacherId};
use classbook_scheduling::{ScheduleOwner, UNKNOWN_DAY, group_by_day};
use common::{SlotSpec, slot};

fn on(id: u128, day: i16, start: &'static str, end: &'static str) -> classbook_models::schedules::ScheduleSlot {
    slot(SlotSpec {
        id,
        term: 1,
        class: 10,
        teacher: 5,
        day,
        start,
        end,
    })
}

#[test]
fn groups_days_one_one_three() {
    let weekly = group_by_day(vec![
        on(1, 1, "07:00", "08:00"),
        on(2, 1, "09:00", "10:00"),
        on(3, 3, "07:00", "08:00"),
    ]);

    assert_eq!(weekly.day_names(), vec!["Monday", "Wednesday"]);
    let monday: Vec<_> = weekly.get("Monday").unwrap().iter().map(|s| s.id).collect();
    assert_eq!(monday, vec![ScheduleId::from_u128(1), ScheduleId::from_u128(2)]);
    assert_eq!(weekly.get("Wednesday").unwrap().len(), 1);
    assert!(weekly.get("Tuesday").is_none());
    assert_eq!(weekly.total_slots(), 3);
}

#[test]
fn out_of_range_days_share_the_unknown_key() {
    let weekly = group_by_day(vec![
        on(1, 0, "07:00", "08:00"),
        on(2, 2, "07:00", "08:00"),
        on(3, 9, "07:00", "08:00"),
    ]);

    assert_eq!(weekly.day_names(), vec![UNKNOWN_DAY, "Tuesday"]);
    assert_eq!(weekly.get(UNKNOWN_DAY).unwrap().len(), 2);
}

#[test]
fn empty_input_is_empty_schedule() {
    let weekly = group_by_day(Vec::new());
    assert!(weekly.is_empty());
    assert_eq!(serde_json::to_string(&weekly).unwrap(), "{}");
}

#[test]
fn serializes_as_object_in_day_order() {
    let weekly = group_by_day(vec![
        on(1, 2, "07:00", "08:00"),
        on(2, 5, "07:00", "08:00"),
    ]);
    let json = serde_json::to_string(&weekly).unwrap();

    let tuesday = json.find("\"Tuesday\"").unwrap();
    let friday = json.find("\"Friday\"").unwrap();
    assert!(json.starts_with('{'));
    assert!(tuesday < friday);
}

#[test]
fn owner_kind_and_id() {
    let class = ScheduleOwner::Class(ClassId::from_u128(3));
    let teacher = ScheduleOwner::Teacher(TeacherId::from_u128(4));
    assert_eq!(class.kind(), "class");
    assert_eq!(teacher.kind(), "teacher");
    assert_eq!(class.id(), ClassId::from_u128(3).into_inner());
}
