//! Permission names and the role-to-permission mapping.
//!
//! Permissions travel inside the access token, so handlers decide access
//! from the claims alone. Use the constants rather than string literals:
//!
//! ```ignore
//! use classbook_core::permissions;
//!
//! if auth_user.has_permission(permissions::SCHEDULES_CREATE) {
//!     // ...
//! }
//! ```

pub const USERS_CREATE: &str = "users:create";
pub const USERS_READ: &str = "users:read";
pub const USERS_UPDATE: &str = "users:update";
pub const USERS_DELETE: &str = "users:delete";

pub const TERMS_CREATE: &str = "terms:create";
pub const TERMS_READ: &str = "terms:read";
pub const TERMS_UPDATE: &str = "terms:update";
pub const TERMS_DELETE: &str = "terms:delete";

pub const SUBJECTS_CREATE: &str = "subjects:create";
pub const SUBJECTS_READ: &str = "subjects:read";
pub const SUBJECTS_UPDATE: &str = "subjects:update";
pub const SUBJECTS_DELETE: &str = "subjects:delete";

pub const CLASSES_CREATE: &str = "classes:create";
pub const CLASSES_READ: &str = "classes:read";
pub const CLASSES_UPDATE: &str = "classes:update";
pub const CLASSES_DELETE: &str = "classes:delete";

pub const TEACHERS_CREATE: &str = "teachers:create";
pub const TEACHERS_READ: &str = "teachers:read";
pub const TEACHERS_UPDATE: &str = "teachers:update";
pub const TEACHERS_DELETE: &str = "teachers:delete";

pub const STUDENTS_CREATE: &str = "students:create";
pub const STUDENTS_READ: &str = "students:read";
pub const STUDENTS_UPDATE: &str = "students:update";
pub const STUDENTS_DELETE: &str = "students:delete";

/// Create single or bulk timetable slots.
pub const SCHEDULES_CREATE: &str = "schedules:create";
/// Read slots, weekly views and run dry-run conflict checks.
pub const SCHEDULES_READ: &str = "schedules:read";
pub const SCHEDULES_UPDATE: &str = "schedules:update";
pub const SCHEDULES_DELETE: &str = "schedules:delete";

pub const ATTENDANCE_RECORD: &str = "attendance:record";
pub const ATTENDANCE_READ: &str = "attendance:read";
pub const ATTENDANCE_UPDATE: &str = "attendance:update";
pub const ATTENDANCE_DELETE: &str = "attendance:delete";

pub const GRADES_RECORD: &str = "grades:record";
/// Read grades and report cards of any student.
pub const GRADES_READ: &str = "grades:read";
pub const GRADES_UPDATE: &str = "grades:update";
pub const GRADES_DELETE: &str = "grades:delete";

pub const PARENTS_CREATE: &str = "parents:create";
pub const PARENTS_READ: &str = "parents:read";
pub const PARENTS_UPDATE: &str = "parents:update";
pub const PARENTS_DELETE: &str = "parents:delete";

pub const ALL: &[&str] = &[
    USERS_CREATE,
    USERS_READ,
    USERS_UPDATE,
    USERS_DELETE,
    TERMS_CREATE,
    TERMS_READ,
    TERMS_UPDATE,
    TERMS_DELETE,
    SUBJECTS_CREATE,
    SUBJECTS_READ,
    SUBJECTS_UPDATE,
    SUBJECTS_DELETE,
    CLASSES_CREATE,
    CLASSES_READ,
    CLASSES_UPDATE,
    CLASSES_DELETE,
    TEACHERS_CREATE,
    TEACHERS_READ,
    TEACHERS_UPDATE,
    TEACHERS_DELETE,
    STUDENTS_CREATE,
    STUDENTS_READ,
    STUDENTS_UPDATE,
    STUDENTS_DELETE,
    SCHEDULES_CREATE,
    SCHEDULES_READ,
    SCHEDULES_UPDATE,
    SCHEDULES_DELETE,
    ATTENDANCE_RECORD,
    ATTENDANCE_READ,
    ATTENDANCE_UPDATE,
    ATTENDANCE_DELETE,
    GRADES_RECORD,
    GRADES_READ,
    GRADES_UPDATE,
    GRADES_DELETE,
    PARENTS_CREATE,
    PARENTS_READ,
    PARENTS_UPDATE,
    PARENTS_DELETE,
];

const PRINCIPAL: &[&str] = &[
    USERS_READ,
    TERMS_READ,
    SUBJECTS_READ,
    CLASSES_READ,
    TEACHERS_READ,
    STUDENTS_READ,
    SCHEDULES_READ,
    ATTENDANCE_READ,
    GRADES_READ,
    PARENTS_READ,
];

const TEACHER: &[&str] = &[
    TERMS_READ,
    SUBJECTS_READ,
    CLASSES_READ,
    TEACHERS_READ,
    STUDENTS_READ,
    SCHEDULES_READ,
    ATTENDANCE_RECORD,
    ATTENDANCE_READ,
    ATTENDANCE_UPDATE,
    GRADES_RECORD,
    GRADES_READ,
    GRADES_UPDATE,
];

const HOMEROOM_TEACHER: &[&str] = &[
    TERMS_READ,
    SUBJECTS_READ,
    CLASSES_READ,
    TEACHERS_READ,
    STUDENTS_READ,
    STUDENTS_UPDATE,
    SCHEDULES_READ,
    ATTENDANCE_RECORD,
    ATTENDANCE_READ,
    ATTENDANCE_UPDATE,
    ATTENDANCE_DELETE,
    GRADES_RECORD,
    GRADES_READ,
    GRADES_UPDATE,
    GRADES_DELETE,
    PARENTS_READ,
];

const STUDENT: &[&str] = &[TERMS_READ, SUBJECTS_READ];

const PARENT: &[&str] = &[TERMS_READ, SUBJECTS_READ];

/// Permissions granted to a role slug. Unknown slugs get nothing.
pub fn for_role(role_slug: &str) -> Vec<String> {
    let granted: &[&str] = match role_slug {
        "admin" => ALL,
        "principal" => PRINCIPAL,
        "teacher" => TEACHER,
        "homeroom_teacher" => HOMEROOM_TEACHER,
        "student" => STUDENT,
        "parent" => PARENT,
        _ => &[],
    };
    granted.iter().map(|p| (*p).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_everything() {
        assert_eq!(for_role("admin").len(), ALL.len());
    }

    #[test]
    fn test_teacher_cannot_write_timetable() {
        let granted = for_role("teacher");
        assert!(granted.iter().any(|p| p == SCHEDULES_READ));
        assert!(!granted.iter().any(|p| p == SCHEDULES_CREATE));
        assert!(granted.iter().any(|p| p == ATTENDANCE_RECORD));
    }

    #[test]
    fn test_homeroom_teacher_extends_teacher() {
        let teacher = for_role("teacher");
        let homeroom = for_role("homeroom_teacher");
        assert!(teacher.iter().all(|p| homeroom.contains(p)));
        assert!(homeroom.len() > teacher.len());
    }

    #[test]
    fn test_principal_is_read_only() {
        assert!(for_role("principal").iter().all(|p| p.ends_with(":read")));
    }

    #[test]
    fn test_unknown_role_gets_nothing() {
        assert!(for_role("janitor").is_empty());
        assert!(for_role("").is_empty());
    }

    #[test]
    fn test_grades_are_written_by_teachers_only() {
        assert!(for_role("teacher").iter().any(|p| p == GRADES_RECORD));
        assert!(!for_role("teacher").iter().any(|p| p == GRADES_DELETE));
        assert!(for_role("homeroom_teacher").iter().any(|p| p == GRADES_DELETE));
        assert!(!for_role("principal").iter().any(|p| p == GRADES_RECORD));
        assert!(!for_role("student").iter().any(|p| p.starts_with("grades:")));
    }

    #[test]
    fn test_parent_reads_only_the_catalogue() {
        assert_eq!(for_role("parent"), vec![TERMS_READ, SUBJECTS_READ]);
    }

    #[test]
    fn test_permission_names_are_unique() {
        let mut names = ALL.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }
}
