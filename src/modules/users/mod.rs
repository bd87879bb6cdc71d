//! User accounts. Admin only.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
