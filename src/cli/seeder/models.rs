use classbook_models::{ClassId, RoleId, StudentId, SubjectId, TeacherId};
use classbook_models::students::Gender;

/// Seeded rows carry these markers so `clear_seed` can find them again.
pub const SEED_EMAIL_DOMAIN: &str = "seed.classbook.test";
pub const SEED_PREFIX: &str = "Seed";
pub const SEED_SUBJECT_PREFIX: &str = "SEED-";

pub struct UserSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: RoleId,
}

pub struct TeacherSeed {
    pub employee_number: String,
    pub full_name: String,
}

pub struct StudentSeed {
    pub student_number: String,
    pub full_name: String,
    pub gender: Gender,
    pub class_id: ClassId,
}

/// One generated timetable slot, in period units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSeed {
    pub class_id: ClassId,
    pub teacher_id: TeacherId,
    pub subject_id: SubjectId,
    pub day_of_week: i16,
    pub period: u16,
}

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub teachers: usize,
    /// Classes per grade, for grades 10 to 12.
    pub classes_per_grade: usize,
    pub students_per_class: usize,
    /// Lesson periods per school day, starting at 07:00.
    pub periods_per_day: u16,
    pub period_minutes: u16,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            teachers: 12,
            classes_per_grade: 2,
            students_per_class: 25,
            periods_per_day: 6,
            period_minutes: 45,
        }
    }
}

impl SeedConfig {
    pub fn total_classes(&self) -> usize {
        3 * self.classes_per_grade
    }

    pub fn total_students(&self) -> usize {
        self.total_classes() * self.students_per_class
    }
}

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub subjects: usize,
    pub teachers: Vec<TeacherId>,
    pub classes: Vec<ClassId>,
    pub students: Vec<StudentId>,
    pub slots: usize,
}
