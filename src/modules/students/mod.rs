//! Student profiles, each backed by a user account with the student role.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
