//! # Classbook API
//!
//! School timetable and attendance REST API built with Axum and PostgreSQL.
//!
//! The heart of the service is the timetable: weekly lesson slots binding a
//! class, a teacher and a subject to a day and a time range within a term.
//! Every write is checked so that no teacher and no class is ever booked
//! twice at overlapping times. The rules themselves live in the
//! `classbook-scheduling` crate; [`modules::schedules`] feeds them from the
//! database and serializes writers per term and day.
//!
//! ## Layout
//!
//! ```text
//! src/
//! ├── cli/             # create-admin, seed, clear-seed, check-conflicts
//! ├── middleware/      # JWT extractor and permission guards
//! ├── modules/
//! │   ├── auth/        # login, refresh, me, change-password
//! │   ├── users/       # account administration
//! │   ├── terms/       # academic terms
//! │   ├── subjects/
//! │   ├── classes/
//! │   ├── teachers/
//! │   ├── students/
//! │   ├── schedules/   # timetable with conflict checks
//! │   └── attendance/
//! ├── docs.rs          # OpenAPI
//! ├── logging.rs       # tracing setup and request logging
//! ├── metrics.rs       # Prometheus
//! └── router.rs
//! ```
//!
//! Each feature module has `controller.rs` (handlers), `service.rs` (queries
//! and business rules), `model.rs` (re-exported DTOs) and `router.rs`.
//!
//! ## Roles
//!
//! | Role | Can |
//! |------|-----|
//! | admin | everything |
//! | principal | read everything |
//! | teacher | read timetables, record attendance |
//! | homeroom_teacher | teacher, plus manage their students' attendance |
//! | student | read own timetable |
//!
//! The first admin is created with `classbook-cli create-admin`.

pub mod cli;
pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

pub use classbook_auth;
pub use classbook_config;
pub use classbook_core;
pub use classbook_db;
pub use classbook_models;
pub use classbook_scheduling;
