//! Class sections: a named group of students in one grade and academic year,
//! optionally led by a homeroom teacher.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
