mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use classbook_core::AppError;
use classbook_models::system_roles;
use common::{
    admin_token, create_test_student, create_test_user, create_timetable_fixture, get_auth_token,
    send, setup_test_app, slot_body,
};

async fn schedule_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM schedules")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_schedule(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:30")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["start_time"], "07:00");
    assert_eq!(body["end_time"], "08:30");
    assert_eq!(body["class_name"], "X IPA 1");
    assert_eq!(body["teacher_name"], "Budi Santoso");
    assert_eq!(body["subject_name"], "Mathematics");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_class_conflict_is_rejected_with_report(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    let (status, first) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:30")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_b.id, t.subject, 1, "08:00", "09:00")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().starts_with("Schedule conflict"));
    let details = &body["details"];
    assert_eq!(details["has_conflict"], true);
    assert_eq!(details["conflicts"].as_array().unwrap().len(), 1);
    assert_eq!(details["conflicts"][0]["type"], "class");
    assert_eq!(details["conflicts"][0]["blocking_slot_id"], first["id"]);
    assert_eq!(schedule_count(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_conflict_across_classes(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:30")),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_b, t.teacher_a.id, t.subject, 1, "07:15", "08:00")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["conflicts"][0]["type"], "teacher");

    // the same lesson on Tuesday is fine
    let (status, _) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_b, t.teacher_a.id, t.subject, 2, "07:15", "08:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_back_to_back_slots_do_not_conflict(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    for (start, end) in [("07:00", "08:30"), ("08:30", "09:30"), ("06:00", "07:00")] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/schedules",
            Some(&token),
            Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, start, end)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{start}-{end}: {body}");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_both_conflict_kinds_for_one_slot(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 3, "10:00", "11:00")),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 3, "10:30", "11:30")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    let kinds: Vec<&str> = body["details"]["conflicts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["teacher", "class"]);
    assert_eq!(body["error"], "Schedule conflict: Schedule has 2 conflicts");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_time_range_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    for (start, end) in [("09:00", "08:00"), ("09:00", "09:00")] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/schedules",
            Some(&token),
            Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, start, end)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "7:00", "08:00")),
    )
    .await;
    assert!(status.is_client_error());
    assert_eq!(schedule_count(&pool).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_reference_is_bad_request(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(
            t.term,
            classbook_models::ClassId::new(),
            t.teacher_a.id,
            t.subject,
            1,
            "07:00",
            "08:00",
        )),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Class not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_does_not_conflict_with_itself(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    let (_, slot) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:30")),
    )
    .await;
    let uri = format!("/api/schedules/{}", slot["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "start_time": "07:15", "end_time": "08:45" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["start_time"], "07:15");
    assert_eq!(body["end_time"], "08:45");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_into_occupied_time_conflicts(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:30")),
    )
    .await;
    let (_, tuesday) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_b.id, t.subject, 2, "07:00", "08:30")),
    )
    .await;

    let uri = format!("/api/schedules/{}", tuesday["id"].as_str().unwrap());
    let (status, body) = send(&app, "PUT", &uri, Some(&token), Some(json!({ "day_of_week": 1 }))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["conflicts"][0]["type"], "class");

    let (status, _) = send(&app, "PUT", "/api/schedules/00000000-0000-0000-0000-000000000000", Some(&token), Some(json!({ "day_of_week": 4 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_create_reports_per_item(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    let items = json!({
        "items": [
            slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:00"),
            slot_body(t.term, t.class_b, t.teacher_a.id, t.subject, 1, "07:30", "08:30"),
            slot_body(t.term, t.class_b, t.teacher_b.id, t.subject, 1, "07:30", "08:30"),
            slot_body(t.term, t.class_b, t.teacher_b.id, t.subject, 9, "07:30", "08:30"),
        ]
    });

    let (status, body) = send(&app, "POST", "/api/schedules/bulk", Some(&token), Some(items)).await;

    assert_eq!(status, StatusCode::MULTI_STATUS, "{body}");
    assert_eq!(body["total"], 4);
    assert_eq!(body["created"], 2);
    assert_eq!(body["failed"], 2);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[1]["success"], false);
    assert_eq!(results[1]["conflicts"]["conflicts"][0]["type"], "teacher");
    assert_eq!(results[2]["success"], true);
    assert_eq!(results[3]["success"], false);
    assert_eq!(schedule_count(&pool).await, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_create_all_succeed(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    let items = json!({
        "items": [
            slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:00"),
            slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "08:00", "09:00"),
        ]
    });
    let (status, body) = send(&app, "POST", "/api/schedules/bulk", Some(&token), Some(items)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"], 2);

    let (status, _) = send(&app, "POST", "/api/schedules/bulk", Some(&token), Some(json!({ "items": [] }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_validate_is_a_dry_run(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    let (_, slot) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:30")),
    )
    .await;

    let proposed = json!({
        "term_id": t.term,
        "class_id": t.class_a,
        "teacher_id": t.teacher_b.id,
        "day_of_week": 1,
        "start_time": "08:00",
        "end_time": "09:00",
    });
    let (status, body) = send(&app, "POST", "/api/schedules/validate", Some(&token), Some(proposed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_conflict"], true);
    assert_eq!(body["conflicts"][0]["type"], "class");

    // the slot checked against its own position is clear
    let own = json!({
        "term_id": t.term,
        "class_id": t.class_a,
        "teacher_id": t.teacher_a.id,
        "day_of_week": 1,
        "start_time": "07:00",
        "end_time": "08:30",
        "exclude_id": slot["id"],
    });
    let (status, body) = send(&app, "POST", "/api/schedules/validate", Some(&token), Some(own)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_conflict"], false);
    assert_eq!(body["conflicts"].as_array().unwrap().len(), 0);

    assert_eq!(schedule_count(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_weekly_timetable_groups_by_day(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    for (day, start, end) in [(3, "07:00", "08:00"), (1, "09:00", "10:00"), (1, "07:00", "08:00")] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/schedules",
            Some(&token),
            Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, day, start, end)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let uri = format!("/api/schedules/class/{}/weekly?term_id={}", t.class_a, t.term);
    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["owner_type"], "class");
    assert_eq!(body["total_slots"], 3);

    let schedule = body["schedule"].as_object().unwrap();
    let mut days: Vec<&String> = schedule.keys().collect();
    days.sort();
    assert_eq!(days, vec!["Monday", "Wednesday"]);

    let monday = schedule["Monday"].as_array().unwrap();
    assert_eq!(monday[0]["start_time"], "07:00");
    assert_eq!(monday[1]["start_time"], "09:00");

    let uri = format!("/api/schedules/teacher/{}/weekly?term_id={}", t.teacher_b.id, t.term);
    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_slots"], 0);
    assert_eq!(body["schedule"], json!({}));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_weekly_timetable_unknown_owner_or_missing_term(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    let uri = format!(
        "/api/schedules/class/{}/weekly?term_id={}",
        classbook_models::ClassId::new(),
        t.term
    );
    let (status, _) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/schedules/class/{}/weekly", t.class_a);
    let (status, _) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_my_weekly_for_teacher_student_and_admin(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let student = create_test_student(&pool, Some(t.class_b)).await;

    send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:00")),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_b, t.teacher_a.id, t.subject, 2, "07:00", "08:00")),
    )
    .await;

    let uri = format!("/api/schedules/me/weekly?term_id={}", t.term);

    let teacher_token = get_auth_token(&app, &t.teacher_a.user).await;
    let (status, body) = send(&app, "GET", &uri, Some(&teacher_token), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["owner_type"], "teacher");
    assert_eq!(body["total_slots"], 2);

    let student_token = get_auth_token(&app, &student.user).await;
    let (status, body) = send(&app, "GET", &uri, Some(&student_token), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["owner_type"], "class");
    assert_eq!(body["total_slots"], 1);
    assert!(body["schedule"].get("Tuesday").is_some());

    let (status, _) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_schedule(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let student = create_test_student(&pool, Some(t.class_a)).await;

    let (_, slot) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:00")),
    )
    .await;
    let uri = format!("/api/schedules/{}", slot["id"].as_str().unwrap());

    let (status, _) = send(
        &app,
        "POST",
        "/api/attendance",
        Some(&token),
        Some(json!({
            "schedule_id": slot["id"],
            "student_id": student.id,
            "date": "2025-07-14",
            "status": "present",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("attendance"));

    sqlx::query("DELETE FROM attendance").execute(&pool).await.unwrap();

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_referenced_slot_delete_maps_to_in_use(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;
    let student = create_test_student(&pool, Some(t.class_a)).await;

    let (_, slot) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:00")),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/attendance",
        Some(&token),
        Some(json!({
            "schedule_id": slot["id"],
            "student_id": student.id,
            "date": "2025-07-14",
            "status": "present",
        })),
    )
    .await;

    // the same statement the service runs once its attendance check has passed
    let id: uuid::Uuid = slot["id"].as_str().unwrap().parse().unwrap();
    let err = sqlx::query("DELETE FROM schedules WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap_err();

    let mapped = AppError::from_db_delete(err, "Schedule has attendance records");
    assert_eq!(mapped.status, StatusCode::BAD_REQUEST);
    assert_eq!(mapped.error.to_string(), "Schedule has attendance records");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_schedules_with_filters(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    for (class, teacher, day) in [
        (t.class_a, t.teacher_a.id, 1),
        (t.class_a, t.teacher_b.id, 2),
        (t.class_b, t.teacher_b.id, 1),
    ] {
        send(
            &app,
            "POST",
            "/api/schedules",
            Some(&token),
            Some(slot_body(t.term, class, teacher, t.subject, day, "07:00", "08:00")),
        )
        .await;
    }

    let (status, body) = send(&app, "GET", &format!("/api/schedules?class_id={}", t.class_a), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);

    let (_, body) = send(&app, "GET", "/api/schedules?day_of_week=1&limit=1", Some(&token), None).await;
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_schedule_writes_need_permission(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let t = create_timetable_fixture(&pool).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/schedules",
        None,
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:00")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let teacher_token = get_auth_token(&app, &t.teacher_a.user).await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&teacher_token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "07:00", "08:00")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let principal = create_test_user(&pool, system_roles::PRINCIPAL).await;
    let principal_token = get_auth_token(&app, &principal).await;
    let (status, _) = send(&app, "GET", "/api/schedules", Some(&principal_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_conflicting_creates_book_once(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        let token = token.clone();
        // alternate teachers so every pair clashes on the class
        let teacher = if i % 2 == 0 { t.teacher_a.id } else { t.teacher_b.id };
        let body = slot_body(t.term, t.class_a, teacher, t.subject, 4, "10:00", "11:00");
        handles.push(tokio::spawn(async move {
            send(&app, "POST", "/api/schedules", Some(&token), Some(body)).await.0
        }));
    }

    let mut created = 0;
    let mut conflicted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicted += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicted, 7);
    assert_eq!(schedule_count(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_move_and_create_into_same_day_book_once(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    let (_, monday) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "10:00", "11:00")),
    )
    .await;
    let uri = format!("/api/schedules/{}", monday["id"].as_str().unwrap());

    // moving Monday's slot to Tuesday races a new Tuesday slot for the same class and time
    let move_app = app.clone();
    let move_token = token.clone();
    let mover = tokio::spawn(async move {
        send(&move_app, "PUT", &uri, Some(&move_token), Some(json!({ "day_of_week": 2 }))).await.0
    });
    let create_app = app.clone();
    let create_token = token.clone();
    let tuesday = slot_body(t.term, t.class_a, t.teacher_b.id, t.subject, 2, "10:00", "11:00");
    let creator = tokio::spawn(async move {
        send(&create_app, "POST", "/api/schedules", Some(&create_token), Some(tuesday)).await.0
    });

    let moved = mover.await.unwrap();
    let created = creator.await.unwrap();

    let outcomes = [moved, created];
    let succeeded = outcomes
        .iter()
        .filter(|s| **s == StatusCode::OK || **s == StatusCode::CREATED)
        .count();
    let conflicted = outcomes.iter().filter(|s| **s == StatusCode::CONFLICT).count();
    assert_eq!(succeeded, 1, "move: {moved}, create: {created}");
    assert_eq!(conflicted, 1, "move: {moved}, create: {created}");

    let tuesday_slots = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM schedules WHERE class_id = $1 AND day_of_week = 2",
    )
    .bind(t.class_a)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(tuesday_slots, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_slot_moved_across_days_frees_its_old_position(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = admin_token(&app, &pool).await;
    let t = create_timetable_fixture(&pool).await;

    let (_, slot) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_a.id, t.subject, 1, "10:00", "11:00")),
    )
    .await;
    let uri = format!("/api/schedules/{}", slot["id"].as_str().unwrap());

    let (status, body) = send(&app, "PUT", &uri, Some(&token), Some(json!({ "day_of_week": 2 }))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["day_of_week"], 2);

    // Monday 10:00 is free again for the same class
    let (status, body) = send(
        &app,
        "POST",
        "/api/schedules",
        Some(&token),
        Some(slot_body(t.term, t.class_a, t.teacher_b.id, t.subject, 1, "10:00", "11:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    // and moving back onto Monday now clashes with the new slot, not with itself
    let (status, body) = send(&app, "PUT", &uri, Some(&token), Some(json!({ "day_of_week": 1 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["conflicts"].as_array().unwrap().len(), 1);
    assert_ne!(body["details"]["conflicts"][0]["blocking_slot_id"], slot["id"]);

    assert_eq!(schedule_count(&pool).await, 2);
}
