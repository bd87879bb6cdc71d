//! Parent profiles, each backed by a user account with the parent role and
//! linked to the students they are responsible for.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
