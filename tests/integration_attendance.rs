mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;

use classbook_models::{ClassId, StudentId, system_roles};
use common::{
    Timetable, admin_token, create_test_parent, create_test_student, create_test_user,
    create_timetable_fixture, get_auth_token, send, setup_test_app, slot_body,
};

async fn monday_slot(app: &axum::Router, token: &str, t: &Timetable) -> String {
    let (status, slot) = send(
        app,
        "POST",
        "/api/schedules",
        Some(token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:30")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    slot["id"].as_str().unwrap().to_string()
}

fn record_body(schedule_id: &str, student_id: impl serde::Serialize, status: &str) -> Value {
    json!({
        "schedule_id": schedule_id,
        "student_id": student_id,
        "date": "2025-08-04",
        "status": status,
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_records_attendance(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let slot = monday_slot(&app, &admin, &t).await;
    let student = create_test_student(&pool, Some(t.class_a)).await;

    let teacher_token = get_auth_token(&app, &t.teacher_a.user).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/attendance",
        Some(&teacher_token),
        Some(record_body(&slot, student.id, "sick")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], "sick");
    assert_eq!(body["student_name"], "Test Student");
    assert_eq!(body["recorded_by"], json!(t.teacher_a.user.id));

    let (status, body) = send(
        &app,
        "POST",
        "/api/attendance",
        Some(&teacher_token),
        Some(record_body(&slot, student.id, "present")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "Attendance already recorded for this student, slot and date"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_attendance_requires_enrollment(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let slot = monday_slot(&app, &admin, &t).await;
    let other_class = create_test_student(&pool, Some(t.class_b)).await;
    let unassigned = create_test_student(&pool, None).await;

    for student in [&other_class, &unassigned] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/attendance",
            Some(&admin),
            Some(record_body(&slot, student.id, "present")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Student is not enrolled in the scheduled class");
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/attendance",
        Some(&admin),
        Some(record_body(
            "00000000-0000-0000-0000-000000000000",
            other_class.id,
            "present",
        )),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Schedule not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_roll_call_upserts(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let slot = monday_slot(&app, &admin, &t).await;
    let first = create_test_student(&pool, Some(t.class_a)).await;
    let second = create_test_student(&pool, Some(t.class_a)).await;
    let outsider = create_test_student(&pool, Some(t.class_b)).await;

    let roll_call = |first_status: &str| {
        json!({
            "schedule_id": slot,
            "date": "2025-08-04",
            "entries": [
                { "student_id": first.id, "status": first_status },
                { "student_id": second.id, "status": "present" },
                { "student_id": outsider.id, "status": "present" },
            ]
        })
    };

    let (status, body) = send(
        &app,
        "POST",
        "/api/attendance/bulk",
        Some(&admin),
        Some(roll_call("absent")),
    )
    .await;
    assert_eq!(status, StatusCode::MULTI_STATUS, "{body}");
    assert_eq!(body["total"], 3);
    assert_eq!(body["recorded"], 2);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["results"][2]["success"], false);

    // taking the roll again overwrites instead of failing
    let (status, body) = send(
        &app,
        "POST",
        "/api/attendance/bulk",
        Some(&admin),
        Some(roll_call("excused")),
    )
    .await;
    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(body["results"][0]["attendance"]["status"], "excused");

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_update_and_delete_attendance(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let slot = monday_slot(&app, &admin, &t).await;
    let first = create_test_student(&pool, Some(t.class_a)).await;
    let second = create_test_student(&pool, Some(t.class_a)).await;

    let (_, record) = send(
        &app,
        "POST",
        "/api/attendance",
        Some(&admin),
        Some(record_body(&slot, first.id, "absent")),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/attendance",
        Some(&admin),
        Some(record_body(&slot, second.id, "present")),
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/attendance?class_id={}&status=absent", t.class_a),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], record["id"]);

    let (_, body) = send(
        &app,
        "GET",
        "/api/attendance?date_from=2025-08-05",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(body["meta"]["total"], 0);

    let uri = format!("/api/attendance/{}", record["id"].as_str().unwrap());
    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&admin),
        Some(json!({ "status": "excused", "note": "Letter from parent" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "excused");
    assert_eq!(body["note"], "Letter from parent");

    // plain teachers cannot delete records
    let teacher_token = get_auth_token(&app, &t.teacher_a.user).await;
    let (status, _) = send(&app, "DELETE", &uri, Some(&teacher_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let homeroom = create_test_user(&pool, system_roles::HOMEROOM_TEACHER).await;
    let homeroom_token = get_auth_token(&app, &homeroom).await;
    let (status, _) = send(&app, "DELETE", &uri, Some(&homeroom_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_students_cannot_touch_attendance(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let t = create_timetable_fixture(&pool).await;
    let student = create_test_student(&pool, Some(t.class_a)).await;
    let token = get_auth_token(&app, &student.user).await;

    let (status, _) = send(&app, "GET", "/api/attendance", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

fn dated_body(schedule_id: &str, student_id: StudentId, date: &str, status: &str) -> Value {
    json!({
        "schedule_id": schedule_id,
        "student_id": student_id,
        "date": date,
        "status": status,
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_recap_counts_statuses(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let slot = monday_slot(&app, &admin, &t).await;
    let student = create_test_student(&pool, Some(t.class_a)).await;

    for (date, status) in [
        ("2025-08-04", "present"),
        ("2025-08-11", "present"),
        ("2025-08-18", "present"),
        ("2025-08-25", "sick"),
    ] {
        let (code, body) = send(
            &app,
            "POST",
            "/api/attendance",
            Some(&admin),
            Some(dated_body(&slot, student.id, date, status)),
        )
        .await;
        assert_eq!(code, StatusCode::CREATED, "{body}");
    }

    let uri = format!("/api/attendance/recap/student/{}?term_id={}", student.id, t.term);
    let (status, body) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["student_name"], "Test Student");
    assert_eq!(body["total"], 4);
    assert_eq!(body["present"], 3);
    assert_eq!(body["sick"], 1);
    assert_eq!(body["absent"], 0);
    assert_eq!(body["presence_percentage"], 75.0);

    let uri = format!(
        "/api/attendance/recap/student/{}?date_from=2025-08-10&date_to=2025-08-20",
        student.id
    );
    let (_, body) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["presence_percentage"], 100.0);

    let uri = format!(
        "/api/attendance/recap/student/{}?date_from=2025-08-20&date_to=2025-08-10",
        student.id
    );
    let (status, body) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "date_from must not be after date_to");

    let uri = format!("/api/attendance/recap/student/{}", StudentId::new());
    let (status, body) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Student not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_class_recap_lists_every_student(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let slot = monday_slot(&app, &admin, &t).await;
    let attending = create_test_student(&pool, Some(t.class_a)).await;
    let missing = create_test_student(&pool, Some(t.class_a)).await;

    send(
        &app,
        "POST",
        "/api/attendance",
        Some(&admin),
        Some(record_body(&slot, attending.id, "absent")),
    )
    .await;

    let uri = format!("/api/attendance/recap/class/{}?term_id={}", t.class_a, t.term);
    let (status, body) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["class_name"], "X IPA 1");
    assert_eq!(body["student_count"], 2);

    let students = body["students"].as_array().unwrap();
    let row = |id: StudentId| {
        students
            .iter()
            .find(|s| s["student_id"] == json!(id))
            .unwrap()
            .clone()
    };
    assert_eq!(row(attending.id)["absent"], 1);
    assert_eq!(row(attending.id)["presence_percentage"], 0.0);
    assert_eq!(row(missing.id)["total"], 0);
    assert_eq!(row(missing.id)["presence_percentage"], 0.0);

    let uri = format!("/api/attendance/recap/class/{}", t.class_a);
    let (status, _) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/attendance/recap/class/{}?term_id={}", ClassId::new(), t.term);
    let (status, body) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Class not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_my_attendance_for_students_and_parents(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let slot = monday_slot(&app, &admin, &t).await;
    let student = create_test_student(&pool, Some(t.class_a)).await;
    let parent = create_test_parent(&pool, &[student.id]).await;

    send(
        &app,
        "POST",
        "/api/attendance",
        Some(&admin),
        Some(record_body(&slot, student.id, "excused")),
    )
    .await;

    let uri = format!("/api/attendance/me?term_id={}", t.term);

    let token = get_auth_token(&app, &student.user).await;
    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["student_id"], json!(student.id));
    assert_eq!(body["excused"], 1);

    let token = get_auth_token(&app, &parent.user).await;
    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let token = get_auth_token(&app, &t.teacher_a.user).await;
    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Only students and parents have personal records");
}
