//! # Classbook Scheduling
//!
//! Timetable conflict detection.
//!
//! A [`ProposedSlot`] describes a write: the term and day it lives in, the
//! class and teacher it books, its [`TimeRange`](classbook_models::TimeRange)
//! and, when an existing slot is being moved, that slot's id. The store
//! returns the slots of the same term and day whose ranges overlap it;
//! [`detect_conflicts`] then reports every one of them that books the same
//! teacher or the same class.
//!
//! ```ignore
//! let proposed = ProposedSlot::new(term, class, teacher, 1, range).excluding(slot_id);
//! let candidates = store.fetch_overlapping(&proposed).await?;
//! let report = detect_conflicts(&proposed, &candidates);
//! if report.has_conflict { /* refuse the write */ }
//! ```
//!
//! Nothing in this crate touches the database. The HTTP layer runs the store
//! query and the write inside one transaction.

pub mod conflict;
pub mod day;
pub mod proposed;
pub mod weekly;

pub use conflict::{Conflict, ConflictKind, ConflictReport, SlotClash, audit_term, detect_conflicts};
pub use day::{UNKNOWN_DAY, day_name, is_school_day};
pub use proposed::ProposedSlot;
pub use weekly::{ScheduleOwner, WeeklySchedule, group_by_day};
