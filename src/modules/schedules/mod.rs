//! Timetable slots.
//!
//! Every write goes through the conflict detector inside a transaction that
//! holds an advisory lock per `(term, day)` scope, so two concurrent writers
//! can never both book the same teacher or class.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
