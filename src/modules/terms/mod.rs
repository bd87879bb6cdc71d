//! Academic terms.
//!
//! A term scopes the timetable: two slots can only conflict when they belong
//! to the same term. Terms of one academic year never overlap in dates, and
//! at most one term is active.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
