//! Conflict-free timetable generation for seeded data.
//!
//! Slots sit on a fixed period grid, so two slots overlap exactly when they
//! share a day and a period. Filling each class period at most once and
//! tracking which teachers are busy per period keeps the plan free of double
//! bookings by construction.

use std::collections::HashSet;
use std::time::Instant;

use anyhow::Context;
use rand::Rng;
use rand::seq::SliceRandom;
use sqlx::{PgPool, Postgres, Transaction};

use classbook_models::{
    ClassId, SubjectId, TeacherId, TermId, TimeOfDay, TimeRange,
    schedules::{FIRST_SCHOOL_DAY, LAST_SCHOOL_DAY},
};

use super::models::{SeedConfig, SlotSeed};

/// 07:00
const FIRST_PERIOD_START: u16 = 7 * 60;

/// Each teacher teaches one subject, assigned round-robin.
pub fn plan_timetable<R: Rng + ?Sized>(
    rng: &mut R,
    classes: &[ClassId],
    teachers: &[TeacherId],
    subjects: &[SubjectId],
    periods_per_day: u16,
) -> Vec<SlotSeed> {
    if teachers.is_empty() || subjects.is_empty() {
        return Vec::new();
    }

    let mut busy: HashSet<(TeacherId, i16, u16)> = HashSet::new();
    let mut plan = Vec::new();
    // Saturday stays free.
    let days = FIRST_SCHOOL_DAY..LAST_SCHOOL_DAY;

    for &class_id in classes {
        for day in days.clone() {
            for period in 0..periods_per_day {
                let mut order: Vec<usize> = (0..teachers.len()).collect();
                order.shuffle(rng);

                let free = order
                    .into_iter()
                    .find(|&i| !busy.contains(&(teachers[i], day, period)));

                if let Some(i) = free {
                    busy.insert((teachers[i], day, period));
                    plan.push(SlotSeed {
                        class_id,
                        teacher_id: teachers[i],
                        subject_id: subjects[i % subjects.len()],
                        day_of_week: day,
                        period,
                    });
                }
            }
        }
    }

    plan
}

/// Wall-clock range of a period on the grid.
pub fn period_range(period: u16, period_minutes: u16) -> anyhow::Result<TimeRange> {
    let start = FIRST_PERIOD_START + period * period_minutes;
    let range = TimeRange::new(
        TimeOfDay::from_minutes(start)?,
        TimeOfDay::from_minutes(start + period_minutes)?,
    )?;
    Ok(range)
}

pub async fn seed_timetable(
    db: &PgPool,
    term_id: TermId,
    slots: &[SlotSeed],
    config: &SeedConfig,
) -> anyhow::Result<usize> {
    let start_time = Instant::now();
    println!("📅 Seeding {} timetable slots...", slots.len());

    let mut tx = db.begin().await?;
    const BATCH_SIZE: usize = 500;
    let mut inserted = 0;

    for chunk in slots.chunks(BATCH_SIZE) {
        inserted += insert_slots_chunk(&mut tx, term_id, chunk, config.period_minutes).await?;
    }

    tx.commit().await?;
    println!(
        "   ✓ Inserted {} slots in {:?}",
        inserted,
        start_time.elapsed()
    );
    Ok(inserted)
}

async fn insert_slots_chunk(
    tx: &mut Transaction<'_, Postgres>,
    term_id: TermId,
    slots: &[SlotSeed],
    period_minutes: u16,
) -> anyhow::Result<usize> {
    if slots.is_empty() {
        return Ok(0);
    }

    let mut query = String::from(
        "INSERT INTO schedules (term_id, class_id, teacher_id, subject_id, day_of_week, start_minute, end_minute) VALUES ",
    );
    for i in 0..slots.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 7;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${}, ${})",
            p + 1,
            p + 2,
            p + 3,
            p + 4,
            p + 5,
            p + 6,
            p + 7
        ));
    }

    let mut q = sqlx::query(&query);
    for slot in slots {
        let range = period_range(slot.period, period_minutes)
            .with_context(|| format!("period {} does not fit in a day", slot.period))?;
        q = q
            .bind(term_id)
            .bind(slot.class_id)
            .bind(slot.teacher_id)
            .bind(slot.subject_id)
            .bind(slot.day_of_week)
            .bind(range.start())
            .bind(range.end());
    }

    let result = q.execute(&mut **tx).await?;
    Ok(result.rows_affected() as usize)
}
