//! Subject grades and report cards.
//!
//! A grade holds three component scores for one student, subject and term.
//! The final score and its letter band are derived on every write:
//!
//! ```ignore
//! use classbook_models::grades::{final_score, GradeLetter};
//!
//! let score = final_score(80.0, 70.0, 90.0); // 80.0
//! assert_eq!(GradeLetter::from_score(score), GradeLetter::B);
//! ```

use crate::attendance::AttendanceRecap;
use crate::ids::{ClassId, GradeId, StudentId, SubjectId, TermId, UserId};
use classbook_core::serde::optional_from_str;
use classbook_core::{PaginationMeta, PaginationParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DAILY_WEIGHT: f64 = 0.4;
pub const MIDTERM_WEIGHT: f64 = 0.3;
pub const FINAL_EXAM_WEIGHT: f64 = 0.3;

/// Rounds to two decimals so band edges are not decided by float noise.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Weighted final score: 40% daily work, 30% midterm, 30% final exam.
pub fn final_score(daily: f64, midterm: f64, final_exam: f64) -> f64 {
    round2(daily * DAILY_WEIGHT + midterm * MIDTERM_WEIGHT + final_exam * FINAL_EXAM_WEIGHT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "grade_letter")]
pub enum GradeLetter {
    A,
    B,
    C,
    D,
    E,
}

impl GradeLetter {
    /// Band of a final score. Each band includes its lower bound.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Self::A,
            s if s >= 80.0 => Self::B,
            s if s >= 70.0 => Self::C,
            s if s >= 60.0 => Self::D,
            _ => Self::E,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }
}

/// Average of the final scores and the band of that average, or `None` for
/// a student with no grades yet.
pub fn summarize(final_scores: &[f64]) -> Option<(f64, GradeLetter)> {
    if final_scores.is_empty() {
        return None;
    }
    let average = round2(final_scores.iter().sum::<f64>() / final_scores.len() as f64);
    Some((average, GradeLetter::from_score(average)))
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Grade {
    pub id: GradeId,
    pub student_id: StudentId,
    pub student_name: String,
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub term_id: TermId,
    pub daily_score: f64,
    pub midterm_score: f64,
    pub final_exam_score: f64,
    pub final_score: f64,
    pub letter_grade: GradeLetter,
    pub note: Option<String>,
    pub recorded_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateGradeDto {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub term_id: TermId,
    #[validate(range(min = 0.0, max = 100.0))]
    #[schema(minimum = 0.0, maximum = 100.0, example = 85.0)]
    pub daily_score: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    #[schema(minimum = 0.0, maximum = 100.0, example = 78.0)]
    pub midterm_score: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    #[schema(minimum = 0.0, maximum = 100.0, example = 90.0)]
    pub final_exam_score: f64,
    #[validate(length(max = 255))]
    pub note: Option<String>,
}

impl CreateGradeDto {
    pub fn final_score(&self) -> f64 {
        final_score(self.daily_score, self.midterm_score, self.final_exam_score)
    }
}

/// Missing components keep their stored value; the final score is
/// recomputed from the merged set.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateGradeDto {
    #[validate(range(min = 0.0, max = 100.0))]
    pub daily_score: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub midterm_score: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub final_exam_score: Option<f64>,
    #[validate(length(max = 255))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct GradeFilterParams {
    #[serde(default, deserialize_with = "optional_from_str")]
    pub student_id: Option<StudentId>,
    #[serde(default, deserialize_with = "optional_from_str")]
    pub subject_id: Option<SubjectId>,
    #[serde(default, deserialize_with = "optional_from_str")]
    pub term_id: Option<TermId>,
    #[serde(default, deserialize_with = "optional_from_str")]
    pub class_id: Option<ClassId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedGradesResponse {
    pub data: Vec<Grade>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ReportCardQuery {
    pub term_id: TermId,
}

/// `/me` variant: a parent may name which child to show.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct MyReportCardQuery {
    pub term_id: TermId,
    #[serde(default, deserialize_with = "optional_from_str")]
    pub student_id: Option<StudentId>,
}

/// One student's term results.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportCard {
    pub student_id: StudentId,
    pub student_number: String,
    pub student_name: String,
    pub class_name: Option<String>,
    pub term_id: TermId,
    pub term_name: String,
    pub academic_year: String,
    pub grades: Vec<Grade>,
    pub subject_count: usize,
    pub average_score: Option<f64>,
    pub overall_grade: Option<GradeLetter>,
    pub attendance: AttendanceRecap,
}
