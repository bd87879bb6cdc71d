//! Login, token refresh and the caller's own account.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
