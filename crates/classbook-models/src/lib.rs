//! # Classbook Models
//!
//! Domain entities, request/response DTOs and validated value types shared by
//! the HTTP service, the scheduling engine and the CLI.
//!
//! - [`ids`]: typed UUID identifiers
//! - [`value_types`]: `Email`, `TimeOfDay`, `TimeRange`
//! - [`schedules`]: timetable slots and their DTOs
//! - [`attendance`]: attendance records taken against slots, and recaps
//! - [`grades`]: subject grades, weighting, letter bands and report cards
//! - [`parents`]: parent profiles and their links to students
//! - [`terms`], [`classes`], [`subjects`], [`teachers`], [`students`]: the
//!   entities a slot references
//! - [`users`], [`roles`], [`auth`]: accounts and login

pub mod attendance;
pub mod auth;
pub mod classes;
pub mod grades;
pub mod ids;
pub mod parents;
pub mod roles;
pub mod schedules;
pub mod students;
pub mod subjects;
pub mod teachers;
pub mod terms;
pub mod users;
pub mod value_types;

pub use ids::*;
pub use roles::system_roles;
pub use value_types::{Email, TimeOfDay, TimeRange, ValueTypeError};
