//! Subject grades and report cards.
//!
//! A grade is one student's result in one subject for one term. The final
//! score is weighted from its three components and banded A to E; a report
//! card gathers a student's grades for a term with their attendance recap.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
