pub mod attendance;
pub mod auth;
pub mod classes;
pub mod grades;
pub mod parents;
pub mod schedules;
pub mod students;
pub mod subjects;
pub mod teachers;
pub mod terms;
pub mod users;
