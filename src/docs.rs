use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use classbook_core::{PaginationMeta, PaginationParams};
use classbook_scheduling::{Conflict, ConflictKind, ConflictReport};

use crate::modules::attendance::model::{
    Attendance, AttendanceEntry, AttendanceRecap, AttendanceStatus, BulkAttendanceDto,
    BulkAttendanceItemResult, BulkAttendanceResponse, ClassAttendanceRecap,
    PaginatedAttendanceResponse, RecordAttendanceDto, UpdateAttendanceDto,
};
use crate::modules::auth::model::{
    ChangePasswordDto, LoginRequest, LoginResponse, MeResponse, MessageResponse,
    RefreshTokenRequest,
};
use crate::modules::classes::model::{
    ClassWithStats, CreateClassDto, PaginatedClassesResponse, UpdateClassDto,
};
use crate::modules::grades::model::{
    CreateGradeDto, Grade, GradeLetter, PaginatedGradesResponse, ReportCard, UpdateGradeDto,
};
use crate::modules::parents::model::{
    CreateParentDto, LinkChildDto, PaginatedParentsResponse, Parent, ParentChild,
    ParentWithChildren, Relationship, UpdateParentDto,
};
use crate::modules::schedules::model::{
    BulkCreateScheduleDto, BulkScheduleItemResult, BulkScheduleResponse, CreateScheduleDto,
    PaginatedSchedulesResponse, ScheduleSlot, UpdateScheduleDto, ValidateScheduleDto,
    WeeklyTimetableResponse,
};
use crate::modules::students::model::{
    CreateStudentDto, Gender, PaginatedStudentsResponse, Student, UpdateStudentDto,
};
use crate::modules::subjects::model::{
    CreateSubjectDto, PaginatedSubjectsResponse, Subject, UpdateSubjectDto,
};
use crate::modules::teachers::model::{
    CreateTeacherDto, PaginatedTeachersResponse, Teacher, UpdateTeacherDto,
};
use crate::modules::terms::model::{CreateTermDto, PaginatedTermsResponse, Term, UpdateTermDto};
use crate::modules::users::model::{CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::get_me,
        crate::modules::auth::controller::change_password,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::terms::controller::create_term,
        crate::modules::terms::controller::get_terms,
        crate::modules::terms::controller::get_active_term,
        crate::modules::terms::controller::get_term,
        crate::modules::terms::controller::update_term,
        crate::modules::terms::controller::delete_term,
        crate::modules::terms::controller::activate_term,
        crate::modules::subjects::controller::create_subject,
        crate::modules::subjects::controller::get_subjects,
        crate::modules::subjects::controller::get_subject,
        crate::modules::subjects::controller::update_subject,
        crate::modules::subjects::controller::delete_subject,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::classes::controller::get_class_students,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::delete_teacher,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::schedules::controller::get_schedules,
        crate::modules::schedules::controller::get_schedule,
        crate::modules::schedules::controller::create_schedule,
        crate::modules::schedules::controller::update_schedule,
        crate::modules::schedules::controller::delete_schedule,
        crate::modules::schedules::controller::bulk_create_schedules,
        crate::modules::schedules::controller::validate_schedule,
        crate::modules::schedules::controller::get_class_weekly,
        crate::modules::schedules::controller::get_teacher_weekly,
        crate::modules::schedules::controller::get_my_weekly,
        crate::modules::attendance::controller::record_attendance,
        crate::modules::attendance::controller::bulk_record_attendance,
        crate::modules::attendance::controller::get_attendance_list,
        crate::modules::attendance::controller::get_attendance,
        crate::modules::attendance::controller::update_attendance,
        crate::modules::attendance::controller::delete_attendance,
        crate::modules::attendance::controller::get_student_recap,
        crate::modules::attendance::controller::get_class_recap,
        crate::modules::attendance::controller::get_my_attendance,
        crate::modules::grades::controller::create_grade,
        crate::modules::grades::controller::get_grades,
        crate::modules::grades::controller::get_grade,
        crate::modules::grades::controller::update_grade,
        crate::modules::grades::controller::delete_grade,
        crate::modules::grades::controller::get_report_card,
        crate::modules::grades::controller::get_my_report_card,
        crate::modules::parents::controller::create_parent,
        crate::modules::parents::controller::get_parents,
        crate::modules::parents::controller::get_parent,
        crate::modules::parents::controller::update_parent,
        crate::modules::parents::controller::delete_parent,
        crate::modules::parents::controller::link_child,
        crate::modules::parents::controller::unlink_child,
        crate::modules::parents::controller::get_my_children,
    ),
    components(
        schemas(
            PaginationMeta,
            PaginationParams,
            LoginRequest,
            LoginResponse,
            RefreshTokenRequest,
            MeResponse,
            MessageResponse,
            ChangePasswordDto,
            User,
            CreateUserDto,
            UpdateUserDto,
            PaginatedUsersResponse,
            Term,
            CreateTermDto,
            UpdateTermDto,
            PaginatedTermsResponse,
            Subject,
            CreateSubjectDto,
            UpdateSubjectDto,
            PaginatedSubjectsResponse,
            ClassWithStats,
            CreateClassDto,
            UpdateClassDto,
            PaginatedClassesResponse,
            Teacher,
            CreateTeacherDto,
            UpdateTeacherDto,
            PaginatedTeachersResponse,
            Gender,
            Student,
            CreateStudentDto,
            UpdateStudentDto,
            PaginatedStudentsResponse,
            ScheduleSlot,
            CreateScheduleDto,
            UpdateScheduleDto,
            ValidateScheduleDto,
            BulkCreateScheduleDto,
            BulkScheduleItemResult,
            BulkScheduleResponse,
            PaginatedSchedulesResponse,
            WeeklyTimetableResponse,
            ConflictKind,
            Conflict,
            ConflictReport,
            AttendanceStatus,
            Attendance,
            RecordAttendanceDto,
            AttendanceEntry,
            BulkAttendanceDto,
            BulkAttendanceItemResult,
            BulkAttendanceResponse,
            UpdateAttendanceDto,
            PaginatedAttendanceResponse,
            AttendanceRecap,
            ClassAttendanceRecap,
            GradeLetter,
            Grade,
            CreateGradeDto,
            UpdateGradeDto,
            PaginatedGradesResponse,
            ReportCard,
            Relationship,
            Parent,
            ParentChild,
            ParentWithChildren,
            CreateParentDto,
            UpdateParentDto,
            LinkChildDto,
            PaginatedParentsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, token refresh and password changes"),
        (name = "Users", description = "Account management, admin only"),
        (name = "Terms", description = "Academic terms"),
        (name = "Subjects", description = "Subjects taught in timetable slots"),
        (name = "Classes", description = "Class sections and rosters"),
        (name = "Teachers", description = "Teacher profiles"),
        (name = "Students", description = "Student profiles"),
        (name = "Schedules", description = "Timetable slots, conflict checks and weekly views"),
        (name = "Attendance", description = "Attendance taken against timetable slots, and recaps"),
        (name = "Grades", description = "Subject grades and report cards"),
        (name = "Parents", description = "Parent profiles and their children")
    ),
    info(
        title = "Classbook API",
        version = "0.1.0",
        description = "School information API: timetables, attendance, grades and report cards. Timetable writes are checked for teacher and class double-booking.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
