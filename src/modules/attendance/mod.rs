//! Attendance taken against timetable slots.
//!
//! A record ties one student to one slot on one calendar date. Only students
//! of the slot's class can be recorded.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
