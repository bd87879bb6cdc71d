//! Users with teacher and student profiles.

use std::time::Instant;

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rand::Rng;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};

use classbook_models::students::Gender;
use classbook_models::{ClassId, RoleId, StudentId, TeacherId, UserId, system_roles};

use super::models::{SEED_EMAIL_DOMAIN, StudentSeed, TeacherSeed, UserSeed};

const BATCH_SIZE: usize = 500;

fn generate_user(role_id: RoleId, role_prefix: &str, index: usize, password_hash: &str) -> UserSeed {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();

    let email = format!(
        "{}.{}+{}{}@{}",
        first_name.to_lowercase().replace(' ', ""),
        last_name.to_lowercase().replace(' ', ""),
        role_prefix,
        index,
        SEED_EMAIL_DOMAIN
    );

    UserSeed {
        first_name,
        last_name,
        email,
        password_hash: password_hash.to_string(),
        role_id,
    }
}

/// The first `homeroom` teachers get the homeroom role.
pub fn generate_teachers(count: usize, homeroom: usize, password_hash: &str) -> Vec<(UserSeed, TeacherSeed)> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let role = if i < homeroom {
                system_roles::HOMEROOM_TEACHER
            } else {
                system_roles::TEACHER
            };
            let user = generate_user(role, "teacher", i, password_hash);
            let teacher = TeacherSeed {
                employee_number: format!("SEED-T{:04}", i + 1),
                full_name: format!("{} {}", user.first_name, user.last_name),
            };
            (user, teacher)
        })
        .collect()
}

pub fn generate_students(
    class_ids: &[ClassId],
    per_class: usize,
    password_hash: &str,
) -> Vec<(UserSeed, StudentSeed)> {
    class_ids
        .par_iter()
        .enumerate()
        .flat_map(|(class_idx, &class_id)| {
            (0..per_class)
                .map(|i| {
                    let index = class_idx * 1000 + i;
                    let user = generate_user(system_roles::STUDENT, "student", index, password_hash);
                    let gender = if rand::thread_rng().gen_bool(0.5) {
                        Gender::Female
                    } else {
                        Gender::Male
                    };
                    let student = StudentSeed {
                        student_number: format!("SEED-S{:06}", index + 1),
                        full_name: format!("{} {}", user.first_name, user.last_name),
                        gender,
                        class_id,
                    };
                    (user, student)
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[&UserSeed],
) -> anyhow::Result<Vec<UserId>> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let mut query =
        String::from("INSERT INTO users (first_name, last_name, email, password, role_id) VALUES ");
    for i in 0..users.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 5;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${})",
            p + 1,
            p + 2,
            p + 3,
            p + 4,
            p + 5
        ));
    }
    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar::<_, UserId>(&query);
    for user in users {
        q = q
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role_id);
    }

    Ok(q.fetch_all(&mut **tx).await?)
}

pub async fn seed_teachers(
    db: &PgPool,
    seeds: &[(UserSeed, TeacherSeed)],
) -> anyhow::Result<Vec<TeacherId>> {
    let start_time = Instant::now();
    println!("👩‍🏫 Seeding {} teachers...", seeds.len());

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(seeds.len());

    for chunk in seeds.chunks(BATCH_SIZE) {
        let users: Vec<&UserSeed> = chunk.iter().map(|(u, _)| u).collect();
        let user_ids = insert_users_chunk(&mut tx, &users).await?;

        let mut query =
            String::from("INSERT INTO teachers (user_id, employee_number, full_name) VALUES ");
        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            let p = i * 3;
            query.push_str(&format!("(${}, ${}, ${})", p + 1, p + 2, p + 3));
        }
        query.push_str(" RETURNING id");

        let mut q = sqlx::query_scalar::<_, TeacherId>(&query);
        for (user_id, (_, teacher)) in user_ids.iter().zip(chunk) {
            q = q
                .bind(*user_id)
                .bind(&teacher.employee_number)
                .bind(&teacher.full_name);
        }
        ids.extend(q.fetch_all(&mut *tx).await?);
    }

    tx.commit().await?;
    println!("   ✓ Inserted {} teachers in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}

pub async fn seed_students(
    db: &PgPool,
    seeds: &[(UserSeed, StudentSeed)],
) -> anyhow::Result<Vec<StudentId>> {
    let start_time = Instant::now();
    println!("🎒 Seeding {} students...", seeds.len());

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(seeds.len());

    for chunk in seeds.chunks(BATCH_SIZE) {
        let users: Vec<&UserSeed> = chunk.iter().map(|(u, _)| u).collect();
        let user_ids = insert_users_chunk(&mut tx, &users).await?;

        let mut query = String::from(
            "INSERT INTO students (user_id, student_number, full_name, gender, class_id) VALUES ",
        );
        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            let p = i * 5;
            query.push_str(&format!(
                "(${}, ${}, ${}, ${}, ${})",
                p + 1,
                p + 2,
                p + 3,
                p + 4,
                p + 5
            ));
        }
        query.push_str(" RETURNING id");

        let mut q = sqlx::query_scalar::<_, StudentId>(&query);
        for (user_id, (_, student)) in user_ids.iter().zip(chunk) {
            q = q
                .bind(*user_id)
                .bind(&student.student_number)
                .bind(&student.full_name)
                .bind(student.gender)
                .bind(student.class_id);
        }
        ids.extend(q.fetch_all(&mut *tx).await?);
    }

    tx.commit().await?;
    println!("   ✓ Inserted {} students in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}
