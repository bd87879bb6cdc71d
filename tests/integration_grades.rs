mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;

use classbook_models::{StudentId, SubjectId, TermId, system_roles};
use common::{
    admin_token, create_test_parent, create_test_student, create_test_subject, create_test_user,
    create_timetable_fixture, get_auth_token, send, setup_test_app, slot_body,
};

fn grade_body(
    student: StudentId,
    subject: SubjectId,
    term: TermId,
    daily: f64,
    midterm: f64,
    final_exam: f64,
) -> Value {
    json!({
        "student_id": student,
        "subject_id": subject,
        "term_id": term,
        "daily_score": daily,
        "midterm_score": midterm,
        "final_exam_score": final_exam,
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_records_weighted_grade(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let t = create_timetable_fixture(&pool).await;
    let student = create_test_student(&pool, Some(t.class_a)).await;
    let teacher = get_auth_token(&app, &t.teacher_a.user).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/grades",
        Some(&teacher),
        Some(grade_body(student.id, t.subject, t.term, 80.0, 70.0, 90.0)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["final_score"], 80.0);
    assert_eq!(body["letter_grade"], "B");
    assert_eq!(body["subject_name"], "Mathematics");
    assert_eq!(body["student_name"], "Test Student");
    assert_eq!(body["recorded_by"], json!(t.teacher_a.user.id));

    let (status, body) = send(
        &app,
        "POST",
        "/api/grades",
        Some(&teacher),
        Some(grade_body(student.id, t.subject, t.term, 60.0, 60.0, 60.0)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "Grade already recorded for this student, subject and term"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_grade_input_is_checked(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let student = create_test_student(&pool, Some(t.class_a)).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/grades",
        Some(&token),
        Some(grade_body(student.id, t.subject, t.term, 101.0, 70.0, 90.0)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        "POST",
        "/api/grades",
        Some(&token),
        Some(grade_body(StudentId::new(), t.subject, t.term, 80.0, 70.0, 90.0)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Student not found");

    let (status, body) = send(
        &app,
        "POST",
        "/api/grades",
        Some(&token),
        Some(grade_body(student.id, t.subject, TermId::new(), 80.0, 70.0, 90.0)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Term not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_recomputes_final_score(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let t = create_timetable_fixture(&pool).await;
    let student = create_test_student(&pool, Some(t.class_a)).await;
    let teacher = get_auth_token(&app, &t.teacher_a.user).await;

    let (_, grade) = send(
        &app,
        "POST",
        "/api/grades",
        Some(&teacher),
        Some(grade_body(student.id, t.subject, t.term, 80.0, 70.0, 90.0)),
    )
    .await;
    let uri = format!("/api/grades/{}", grade["id"].as_str().unwrap());

    // 32 + 21 + 30
    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&teacher),
        Some(json!({ "final_exam_score": 100.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["final_score"], 83.0);
    assert_eq!(body["letter_grade"], "B");
    assert_eq!(body["daily_score"], 80.0);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&teacher),
        Some(json!({ "daily_score": 100.0, "midterm_score": 100.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["final_score"], 100.0);
    assert_eq!(body["letter_grade"], "A");

    let (status, _) = send(
        &app,
        "PUT",
        &uri,
        Some(&teacher),
        Some(json!({ "midterm_score": -1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/grades/00000000-0000-0000-0000-000000000000",
        Some(&teacher),
        Some(json!({ "daily_score": 50.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_and_delete_grades(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let in_a = create_test_student(&pool, Some(t.class_a)).await;
    let in_b = create_test_student(&pool, Some(t.class_b)).await;

    let (_, grade_a) = send(
        &app,
        "POST",
        "/api/grades",
        Some(&admin),
        Some(grade_body(in_a.id, t.subject, t.term, 50.0, 50.0, 50.0)),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/grades",
        Some(&admin),
        Some(grade_body(in_b.id, t.subject, t.term, 95.0, 95.0, 95.0)),
    )
    .await;

    let uri = format!("/api/grades?class_id={}", t.class_a);
    let (status, body) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["letter_grade"], "E");

    let uri = format!("/api/grades?term_id={}", t.term);
    let (_, body) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(body["meta"]["total"], 2);

    let grade_uri = format!("/api/grades/{}", grade_a["id"].as_str().unwrap());
    let teacher = get_auth_token(&app, &t.teacher_a.user).await;
    let (status, _) = send(&app, "DELETE", &grade_uri, Some(&teacher), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let homeroom = create_test_user(&pool, system_roles::HOMEROOM_TEACHER).await;
    let homeroom = get_auth_token(&app, &homeroom).await;
    let (status, _) = send(&app, "DELETE", &grade_uri, Some(&homeroom), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &grade_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_report_card_averages_subjects(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let language = create_test_subject(&pool, "BIN", "Bahasa Indonesia").await;
    let student = create_test_student(&pool, Some(t.class_a)).await;

    send(
        &app,
        "POST",
        "/api/grades",
        Some(&admin),
        Some(grade_body(student.id, t.subject, t.term, 90.0, 90.0, 90.0)),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/grades",
        Some(&admin),
        Some(grade_body(student.id, language, t.term, 70.0, 70.0, 70.0)),
    )
    .await;

    let (_, slot) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&admin),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:30")),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/attendance",
        Some(&admin),
        Some(json!({
            "schedule_id": slot["id"],
            "student_id": student.id,
            "date": "2025-08-04",
            "status": "present",
        })),
    )
    .await;

    let uri = format!("/api/grades/report-card/{}?term_id={}", student.id, t.term);
    let (status, body) = send(&app, "GET", &uri, Some(&admin), None).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["class_name"], "X IPA 1");
    assert_eq!(body["term_name"], "Odd Semester");
    assert_eq!(body["subject_count"], 2);
    assert_eq!(body["average_score"], 80.0);
    assert_eq!(body["overall_grade"], "B");
    // ordered by subject name
    assert_eq!(body["grades"][0]["subject_name"], "Bahasa Indonesia");
    assert_eq!(body["grades"][0]["letter_grade"], "C");
    assert_eq!(body["grades"][1]["letter_grade"], "A");
    assert_eq!(body["attendance"]["present"], 1);
    assert_eq!(body["attendance"]["presence_percentage"], 100.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_report_card_edge_cases(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let student = create_test_student(&pool, None).await;

    let uri = format!("/api/grades/report-card/{}?term_id={}", student.id, t.term);
    let (status, body) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject_count"], 0);
    assert!(body["average_score"].is_null());
    assert!(body["overall_grade"].is_null());
    assert_eq!(body["attendance"]["total"], 0);

    let uri = format!("/api/grades/report-card/{}", student.id);
    let (status, _) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/grades/report-card/{}?term_id={}", student.id, TermId::new());
    let (status, body) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Term not found");

    let uri = format!("/api/grades/report-card/{}?term_id={}", StudentId::new(), t.term);
    let (status, _) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_my_report_card_for_student_and_parent(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let student = create_test_student(&pool, Some(t.class_a)).await;
    let stranger = create_test_student(&pool, Some(t.class_a)).await;
    let parent = create_test_parent(&pool, &[student.id]).await;

    send(
        &app,
        "POST",
        "/api/grades",
        Some(&admin),
        Some(grade_body(student.id, t.subject, t.term, 85.0, 85.0, 85.0)),
    )
    .await;

    let uri = format!("/api/grades/me?term_id={}", t.term);

    let student_token = get_auth_token(&app, &student.user).await;
    let (status, body) = send(&app, "GET", &uri, Some(&student_token), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["student_id"], json!(student.id));
    assert_eq!(body["overall_grade"], "B");

    let parent_token = get_auth_token(&app, &parent.user).await;
    let (status, body) = send(&app, "GET", &uri, Some(&parent_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student_id"], json!(student.id));

    let other = format!("{uri}&student_id={}", stranger.id);
    let (status, _) = send(&app, "GET", &other, Some(&parent_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // students read their own card only
    let (status, _) = send(&app, "GET", "/api/grades", Some(&student_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
