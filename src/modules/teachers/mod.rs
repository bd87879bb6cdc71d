//! Teacher profiles, each backed by a user account with a teaching role.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
