#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use classbook::router::init_router;
use classbook::state::AppState;
use classbook_config::{CorsConfig, JwtConfig, RateLimitConfig};
use classbook_core::hash_password_with_cost;
use classbook_models::{
    ClassId, ParentId, RoleId, StudentId, SubjectId, TeacherId, TermId, UserId, system_roles,
};

pub const TEST_PASSWORD: &str = "testpass123";

pub fn test_state(pool: PgPool, rate_limit_config: RateLimitConfig) -> AppState {
    AppState {
        db: pool,
        jwt_config: JwtConfig {
            secret: "classbook-test-secret".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604_800,
        },
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        rate_limit_config,
    }
}

pub fn setup_test_app(pool: PgPool) -> Router {
    init_router(test_state(pool, RateLimitConfig::disabled())).unwrap()
}

pub struct TestUser {
    pub id: UserId,
    pub email: String,
    pub password: String,
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub async fn create_test_user(pool: &PgPool, role_id: RoleId) -> TestUser {
    let email = generate_unique_email();
    let hashed = hash_password_with_cost(TEST_PASSWORD, 4).unwrap();

    let id = sqlx::query_scalar::<_, UserId>(
        r#"INSERT INTO users (first_name, last_name, email, password, role_id)
           VALUES ('Test', 'User', $1, $2, $3)
           RETURNING id"#,
    )
    .bind(&email)
    .bind(&hashed)
    .bind(role_id)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email,
        password: TEST_PASSWORD.to_string(),
    }
}

pub async fn get_auth_token(app: &Router, user: &TestUser) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": user.password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

/// Creates an admin and logs them in.
pub async fn admin_token(app: &Router, pool: &PgPool) -> String {
    let admin = create_test_user(pool, system_roles::ADMIN).await;
    get_auth_token(app, &admin).await
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn create_test_term(pool: &PgPool) -> TermId {
    sqlx::query_scalar::<_, TermId>(
        r#"INSERT INTO terms (name, academic_year, start_date, end_date)
           VALUES ('Odd Semester', '2025/2026', '2025-07-14', '2025-12-19')
           RETURNING id"#,
    )
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_subject(pool: &PgPool, code: &str, name: &str) -> SubjectId {
    sqlx::query_scalar::<_, SubjectId>(
        "INSERT INTO subjects (code, name) VALUES ($1, $2) RETURNING id",
    )
    .bind(code)
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_class(pool: &PgPool, name: &str) -> ClassId {
    sqlx::query_scalar::<_, ClassId>(
        r#"INSERT INTO classes (name, grade_level, academic_year)
           VALUES ($1, 10, '2025/2026')
           RETURNING id"#,
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub struct TestTeacher {
    pub id: TeacherId,
    pub user: TestUser,
}

pub async fn create_test_teacher(pool: &PgPool, full_name: &str) -> TestTeacher {
    let user = create_test_user(pool, system_roles::TEACHER).await;
    let id = sqlx::query_scalar::<_, TeacherId>(
        r#"INSERT INTO teachers (user_id, employee_number, full_name)
           VALUES ($1, $2, $3)
           RETURNING id"#,
    )
    .bind(user.id)
    .bind(format!("EMP-{}", &Uuid::new_v4().simple().to_string()[..8]))
    .bind(full_name)
    .fetch_one(pool)
    .await
    .unwrap();

    TestTeacher { id, user }
}

pub struct TestStudent {
    pub id: StudentId,
    pub user: TestUser,
}

pub async fn create_test_student(pool: &PgPool, class_id: Option<ClassId>) -> TestStudent {
    let user = create_test_user(pool, system_roles::STUDENT).await;
    let id = sqlx::query_scalar::<_, StudentId>(
        r#"INSERT INTO students (user_id, student_number, full_name, gender, class_id)
           VALUES ($1, $2, 'Test Student', 'female', $3)
           RETURNING id"#,
    )
    .bind(user.id)
    .bind(format!("STU-{}", &Uuid::new_v4().simple().to_string()[..8]))
    .bind(class_id)
    .fetch_one(pool)
    .await
    .unwrap();

    TestStudent { id, user }
}

pub struct TestParent {
    pub id: ParentId,
    pub user: TestUser,
}

/// A parent linked to `children` as their guardian.
pub async fn create_test_parent(pool: &PgPool, children: &[StudentId]) -> TestParent {
    let user = create_test_user(pool, system_roles::PARENT).await;
    let id = sqlx::query_scalar::<_, ParentId>(
        "INSERT INTO parents (user_id, full_name) VALUES ($1, 'Test Parent') RETURNING id",
    )
    .bind(user.id)
    .fetch_one(pool)
    .await
    .unwrap();

    for child in children {
        sqlx::query("INSERT INTO parent_students (parent_id, student_id) VALUES ($1, $2)")
            .bind(id)
            .bind(child)
            .execute(pool)
            .await
            .unwrap();
    }

    TestParent { id, user }
}

/// A term, a subject, two classes and two teachers.
pub struct Timetable {
    pub term: TermId,
    pub subject: SubjectId,
    pub class_a: ClassId,
    pub class_b: ClassId,
    pub teacher_a: TestTeacher,
    pub teacher_b: TestTeacher,
}

pub async fn create_timetable_fixture(pool: &PgPool) -> Timetable {
    Timetable {
        term: create_test_term(pool).await,
        subject: create_test_subject(pool, "MTK", "Mathematics").await,
        class_a: create_test_class(pool, "X IPA 1").await,
        class_b: create_test_class(pool, "X IPA 2").await,
        teacher_a: create_test_teacher(pool, "Budi Santoso").await,
        teacher_b: create_test_teacher(pool, "Siti Rahma").await,
    }
}

pub fn slot_body(
    term: TermId,
    class: ClassId,
    teacher: TeacherId,
    subject: SubjectId,
    day: i16,
    start: &str,
    end: &str,
) -> Value {
    json!({
        "term_id": term,
        "class_id": class,
        "teacher_id": teacher,
        "subject_id": subject,
        "day_of_week": day,
        "start_time": start,
        "end_time": end,
    })
}
