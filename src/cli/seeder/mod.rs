//! Demo data for local development.
//!
//! Seeds one term, a subject catalogue, teachers, classes with students and
//! a full weekly timetable, then audits the timetable with the conflict
//! engine. Every seeded row is marked (see [`models`]) so [`clear_seed`]
//! removes exactly what [`seed_all`] created.
//!
//! Generation runs on rayon, inserts are multi-row batches and all accounts
//! share one bcrypt hash computed at a low cost.

pub mod models;
pub mod people;
pub mod timetable;

pub use models::{SeedConfig, SeedSummary};

use std::time::Instant;

use anyhow::{Context, bail};
use chrono::{Datelike, NaiveDate, Utc};
use sqlx::PgPool;

use classbook_core::hash_password_with_cost;
use classbook_models::{ClassId, SubjectId, TeacherId, TermId};

use crate::modules::schedules::service::ScheduleService;

use models::{SEED_EMAIL_DOMAIN, SEED_PREFIX, SEED_SUBJECT_PREFIX};

pub const SEED_PASSWORD: &str = "Password@123";

const SUBJECTS: [(&str, &str); 8] = [
    ("MTK", "Mathematics"),
    ("PHY", "Physics"),
    ("CHM", "Chemistry"),
    ("BIO", "Biology"),
    ("ENG", "English"),
    ("HIS", "History"),
    ("GEO", "Geography"),
    ("ART", "Art"),
];

const GRADE_NAMES: [(i16, &str); 3] = [(10, "X"), (11, "XI"), (12, "XII")];
const SECTION_NAMES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> anyhow::Result<SeedSummary> {
    let start_time = Instant::now();

    if config.classes_per_grade > SECTION_NAMES.len() {
        bail!("at most {} classes per grade are supported", SECTION_NAMES.len());
    }

    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE email LIKE '%@' || $1",
    )
    .bind(SEED_EMAIL_DOMAIN)
    .fetch_one(db)
    .await?;
    if existing > 0 {
        bail!("seed data is already present; run clear-seed first");
    }

    println!("🌱 Seeding Classbook demo data...");
    println!(
        "   - {} teachers, {} classes, {} students",
        config.teachers,
        config.total_classes(),
        config.total_students()
    );

    println!("🔐 Hashing password...");
    let password_hash = hash_password_with_cost(SEED_PASSWORD, 4)
        .map_err(|e| anyhow::anyhow!("failed to hash seed password: {}", e.error))?;

    let (academic_year, term_start, term_end) = current_academic_year(Utc::now().date_naive());
    let term_id = seed_term(db, &academic_year, term_start, term_end).await?;
    let subject_ids = seed_subjects(db).await?;

    let teacher_seeds =
        people::generate_teachers(config.teachers, config.total_classes(), &password_hash);
    let teacher_ids = people::seed_teachers(db, &teacher_seeds).await?;

    let class_ids = seed_classes(db, &academic_year, config.classes_per_grade, &teacher_ids).await?;

    let student_seeds =
        people::generate_students(&class_ids, config.students_per_class, &password_hash);
    let student_ids = people::seed_students(db, &student_seeds).await?;

    let plan = {
        let mut rng = rand::thread_rng();
        timetable::plan_timetable(
            &mut rng,
            &class_ids,
            &teacher_ids,
            &subject_ids,
            config.periods_per_day,
        )
    };
    let slots = timetable::seed_timetable(db, term_id, &plan, &config).await?;

    let clashes = ScheduleService::audit_term(db, term_id)
        .await
        .map_err(|e| anyhow::anyhow!("conflict audit failed: {}", e.error))?;
    if !clashes.is_empty() {
        bail!("seeded timetable has {} conflict(s)", clashes.len());
    }
    println!("   ✓ Timetable audit found no conflicts");

    println!(
        "\n✅ Seeding complete in {:?}. Default password for all users: {}",
        start_time.elapsed(),
        SEED_PASSWORD
    );

    Ok(SeedSummary {
        subjects: subject_ids.len(),
        teachers: teacher_ids,
        classes: class_ids,
        students: student_ids,
        slots,
    })
}

/// Academic years run July to June; the seeded term covers the first half.
pub fn current_academic_year(today: NaiveDate) -> (String, NaiveDate, NaiveDate) {
    let first_year = if today.month() >= 7 {
        today.year()
    } else {
        today.year() - 1
    };
    let start = NaiveDate::from_ymd_opt(first_year, 7, 1).unwrap_or(today);
    let end = NaiveDate::from_ymd_opt(first_year, 12, 20).unwrap_or(today);
    (format!("{}/{}", first_year, first_year + 1), start, end)
}

async fn seed_term(
    db: &PgPool,
    academic_year: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<TermId> {
    let id = sqlx::query_scalar::<_, TermId>(
        r#"INSERT INTO terms (name, academic_year, start_date, end_date)
           VALUES ($1, $2, $3, $4)
           RETURNING id"#,
    )
    .bind(format!("{} Term", SEED_PREFIX))
    .bind(academic_year)
    .bind(start)
    .bind(end)
    .fetch_one(db)
    .await
    .context("failed to insert seed term")?;

    println!("🗓️  Created term {} ({} to {})", academic_year, start, end);
    Ok(id)
}

async fn seed_subjects(db: &PgPool) -> anyhow::Result<Vec<SubjectId>> {
    let mut ids = Vec::with_capacity(SUBJECTS.len());
    for (code, name) in SUBJECTS {
        let id = sqlx::query_scalar::<_, SubjectId>(
            "INSERT INTO subjects (code, name) VALUES ($1, $2) RETURNING id",
        )
        .bind(format!("{}{}", SEED_SUBJECT_PREFIX, code))
        .bind(name)
        .fetch_one(db)
        .await?;
        ids.push(id);
    }
    println!("📚 Created {} subjects", ids.len());
    Ok(ids)
}

/// One homeroom teacher per class, taken from the front of `teacher_ids`.
async fn seed_classes(
    db: &PgPool,
    academic_year: &str,
    per_grade: usize,
    teacher_ids: &[TeacherId],
) -> anyhow::Result<Vec<ClassId>> {
    let mut ids = Vec::with_capacity(GRADE_NAMES.len() * per_grade);
    let mut homerooms = teacher_ids.iter();

    for (grade, grade_name) in GRADE_NAMES {
        for section in SECTION_NAMES.iter().take(per_grade) {
            let id = sqlx::query_scalar::<_, ClassId>(
                r#"INSERT INTO classes (name, grade_level, academic_year, homeroom_teacher_id)
                   VALUES ($1, $2, $3, $4)
                   RETURNING id"#,
            )
            .bind(format!("{} {}-{}", SEED_PREFIX, grade_name, section))
            .bind(grade)
            .bind(academic_year)
            .bind(homerooms.next().copied())
            .fetch_one(db)
            .await?;
            ids.push(id);
        }
    }
    println!("🏫 Created {} classes", ids.len());
    Ok(ids)
}

/// Deletes everything [`seed_all`] created, children first.
pub async fn clear_seed(db: &PgPool) -> anyhow::Result<()> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let mut tx = db.begin().await?;
    let seed_term = format!("{} Term", SEED_PREFIX);
    let seed_class = format!("{} %", SEED_PREFIX);
    let seed_subject = format!("{}%", SEED_SUBJECT_PREFIX);

    // Grades hold seeded subjects and terms in place.
    sqlx::query(
        r#"DELETE FROM grades
           WHERE term_id IN (SELECT id FROM terms WHERE name = $1)
              OR subject_id IN (SELECT id FROM subjects WHERE code LIKE $2)"#,
    )
    .bind(&seed_term)
    .bind(&seed_subject)
    .execute(&mut *tx)
    .await?;

    let attendance = sqlx::query(
        r#"DELETE FROM attendance
           WHERE schedule_id IN (
               SELECT s.id FROM schedules s JOIN terms t ON t.id = s.term_id WHERE t.name = $1
           )"#,
    )
    .bind(&seed_term)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let slots = sqlx::query(
        "DELETE FROM schedules WHERE term_id IN (SELECT id FROM terms WHERE name = $1)",
    )
    .bind(&seed_term)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    // Teacher and student profiles cascade with their accounts.
    let users = sqlx::query("DELETE FROM users WHERE email LIKE '%@' || $1")
        .bind(SEED_EMAIL_DOMAIN)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let classes = sqlx::query("DELETE FROM classes WHERE name LIKE $1")
        .bind(&seed_class)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let subjects = sqlx::query("DELETE FROM subjects WHERE code LIKE $1")
        .bind(&seed_subject)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM terms WHERE name = $1")
        .bind(&seed_term)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    println!(
        "   ✓ Deleted {} attendance rows, {} slots, {} users, {} classes, {} subjects",
        attendance, slots, users, classes, subjects
    );
    println!("✅ Seeded data cleared in {:?}", start_time.elapsed());
    Ok(())
}
