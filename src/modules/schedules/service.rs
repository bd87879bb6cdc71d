use anyhow::anyhow;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument, warn};
use validator::Validate;

use classbook_core::{AppError, PaginationMeta};
use classbook_models::{
    ClassId, ScheduleId, SubjectId, TeacherId, TermId, TimeRange, UserId,
};
use classbook_scheduling::{
    ConflictReport, ScheduleOwner, SlotClash, ProposedSlot, audit_term, detect_conflicts,
    group_by_day,
};

use crate::metrics::{track_schedule_conflict, track_schedule_write};
use crate::modules::schedules::model::{
    BulkCreateScheduleDto, BulkScheduleItemResult, BulkScheduleResponse, CreateScheduleDto,
    PaginatedSchedulesResponse, ScheduleFilterParams, ScheduleSlot, UpdateScheduleDto,
    ValidateScheduleDto, WeeklyTimetableResponse,
};
use crate::validator::format_errors;

const SLOT_SELECT: &str = r#"SELECT
        s.id, s.term_id,
        s.class_id, c.name AS class_name,
        s.teacher_id, t.full_name AS teacher_name,
        s.subject_id, sub.name AS subject_name,
        s.day_of_week, s.start_minute, s.end_minute,
        s.created_at, s.updated_at
    FROM schedules s
    JOIN classes c ON c.id = s.class_id
    JOIN teachers t ON t.id = s.teacher_id
    JOIN subjects sub ON sub.id = s.subject_id"#;

/// Result of a write that passed validation.
#[derive(Debug)]
pub enum WriteOutcome {
    Written(ScheduleSlot),
    Conflicted(ConflictReport),
}

pub struct ScheduleService;

impl ScheduleService {
    /// Stored slots in the proposed slot's term and day that overlap it.
    ///
    /// Touching ranges do not match. Ordered by start time, then id.
    pub async fn fetch_overlapping(
        conn: &mut PgConnection,
        proposed: &ProposedSlot,
    ) -> Result<Vec<ScheduleSlot>, AppError> {
        let sql = format!(
            r#"{SLOT_SELECT}
            WHERE s.term_id = $1
              AND s.day_of_week = $2
              AND ($3::uuid IS NULL OR s.id <> $3)
              AND s.start_minute < $4
              AND s.end_minute > $5
            ORDER BY s.start_minute, s.id"#
        );

        let slots = sqlx::query_as::<_, ScheduleSlot>(&sql)
            .bind(proposed.term_id)
            .bind(proposed.day_of_week)
            .bind(proposed.exclude_id)
            .bind(proposed.range.end())
            .bind(proposed.range.start())
            .fetch_all(conn)
            .await?;

        Ok(slots)
    }

    /// Runs the conflict detector against the store. Read only.
    #[instrument(skip(conn))]
    pub async fn check_conflicts(
        conn: &mut PgConnection,
        proposed: &ProposedSlot,
    ) -> Result<ConflictReport, AppError> {
        let candidates = Self::fetch_overlapping(conn, proposed).await?;
        let report = detect_conflicts(proposed, &candidates);

        if report.has_conflict {
            info!(
                term_id = %proposed.term_id,
                day_of_week = proposed.day_of_week,
                conflicts = report.conflicts.len(),
                "schedule conflict detected"
            );
        }

        Ok(report)
    }

    /// Serializes writers touching the same `(term, day)` scopes until the
    /// transaction ends. Keys are locked in sorted order.
    async fn lock_scopes(
        conn: &mut PgConnection,
        scopes: &[(TermId, i16)],
    ) -> Result<(), AppError> {
        let mut keys: Vec<String> = scopes
            .iter()
            .map(|(term, day)| format!("schedule:{term}:{day}"))
            .collect();
        keys.sort();
        keys.dedup();

        for key in keys {
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1)::bigint)")
                .bind(&key)
                .execute(&mut *conn)
                .await?;
        }

        Ok(())
    }

    async fn ensure_references(
        conn: &mut PgConnection,
        class_id: Option<ClassId>,
        teacher_id: Option<TeacherId>,
        subject_id: Option<SubjectId>,
        term_id: Option<TermId>,
    ) -> Result<(), AppError> {
        let (class_ok, teacher_ok, subject_ok, term_ok) =
            sqlx::query_as::<_, (bool, bool, bool, bool)>(
                r#"SELECT
                    $1::uuid IS NULL OR EXISTS(SELECT 1 FROM classes WHERE id = $1),
                    $2::uuid IS NULL OR EXISTS(SELECT 1 FROM teachers WHERE id = $2),
                    $3::uuid IS NULL OR EXISTS(SELECT 1 FROM subjects WHERE id = $3),
                    $4::uuid IS NULL OR EXISTS(SELECT 1 FROM terms WHERE id = $4)"#,
            )
            .bind(class_id)
            .bind(teacher_id)
            .bind(subject_id)
            .bind(term_id)
            .fetch_one(conn)
            .await?;

        let missing = [
            (class_ok, "Class"),
            (teacher_ok, "Teacher"),
            (subject_ok, "Subject"),
            (term_ok, "Term"),
        ]
        .into_iter()
        .find(|(ok, _)| !ok);

        match missing {
            Some((_, entity)) => Err(AppError::bad_request(anyhow!("{} not found", entity))),
            None => Ok(()),
        }
    }

    async fn fetch_slot(
        conn: &mut PgConnection,
        id: ScheduleId,
    ) -> Result<ScheduleSlot, AppError> {
        sqlx::query_as::<_, ScheduleSlot>(&format!("{SLOT_SELECT} WHERE s.id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Schedule not found")))
    }

    fn time_range(
        start: classbook_models::TimeOfDay,
        end: classbook_models::TimeOfDay,
    ) -> Result<TimeRange, AppError> {
        TimeRange::new(start, end).map_err(AppError::bad_request)
    }

    /// The 409 returned when a write is blocked.
    pub fn conflict_error(report: &ConflictReport) -> AppError {
        AppError::conflict(anyhow!("Schedule conflict: {}", report.summary())).with_details(report)
    }

    fn record_conflicts(report: &ConflictReport) {
        for conflict in &report.conflicts {
            track_schedule_conflict(conflict.kind);
        }
    }

    /// Validates and inserts one slot in its own transaction.
    #[instrument(skip(db))]
    pub async fn try_create(
        db: &PgPool,
        dto: &CreateScheduleDto,
    ) -> Result<WriteOutcome, AppError> {
        let range = dto.time_range().map_err(AppError::bad_request)?;

        let mut tx = db.begin().await?;

        Self::ensure_references(
            &mut tx,
            Some(dto.class_id),
            Some(dto.teacher_id),
            Some(dto.subject_id),
            Some(dto.term_id),
        )
        .await?;

        let proposed = ProposedSlot::new(
            dto.term_id,
            dto.class_id,
            dto.teacher_id,
            dto.day_of_week,
            range,
        );
        Self::lock_scopes(&mut tx, &[proposed.scope()]).await?;

        let report = Self::check_conflicts(&mut tx, &proposed).await?;
        if report.has_conflict {
            Self::record_conflicts(&report);
            return Ok(WriteOutcome::Conflicted(report));
        }

        let id = sqlx::query_scalar::<_, ScheduleId>(
            r#"INSERT INTO schedules
                (term_id, class_id, teacher_id, subject_id, day_of_week, start_minute, end_minute)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id"#,
        )
        .bind(dto.term_id)
        .bind(dto.class_id)
        .bind(dto.teacher_id)
        .bind(dto.subject_id)
        .bind(dto.day_of_week)
        .bind(range.start())
        .bind(range.end())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db_constraint(e, "Schedule already exists"))?;

        let slot = Self::fetch_slot(&mut tx, id).await?;
        tx.commit().await?;

        Ok(WriteOutcome::Written(slot))
    }

    #[instrument(skip(db))]
    pub async fn create_schedule(
        db: &PgPool,
        dto: CreateScheduleDto,
    ) -> Result<ScheduleSlot, AppError> {
        match Self::try_create(db, &dto).await? {
            WriteOutcome::Written(slot) => {
                track_schedule_write("create");
                info!(schedule_id = %slot.id, "schedule created");
                Ok(slot)
            }
            WriteOutcome::Conflicted(report) => Err(Self::conflict_error(&report)),
        }
    }

    /// Moves a slot. Class and term stay fixed; the slot never conflicts
    /// with its own previous position.
    #[instrument(skip(db))]
    pub async fn update_schedule(
        db: &PgPool,
        id: ScheduleId,
        dto: UpdateScheduleDto,
    ) -> Result<ScheduleSlot, AppError> {
        let mut tx = db.begin().await?;

        let existing = sqlx::query_as::<_, ScheduleSlot>(&format!(
            "{SLOT_SELECT} WHERE s.id = $1 FOR UPDATE OF s"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Schedule not found")))?;

        let teacher_id = dto.teacher_id.unwrap_or(existing.teacher_id);
        let subject_id = dto.subject_id.unwrap_or(existing.subject_id);
        let day_of_week = dto.day_of_week.unwrap_or(existing.day_of_week);
        let range = Self::time_range(
            dto.start_time.unwrap_or(existing.start_time),
            dto.end_time.unwrap_or(existing.end_time),
        )?;

        Self::ensure_references(&mut tx, None, dto.teacher_id, dto.subject_id, None).await?;

        let proposed = ProposedSlot::new(
            existing.term_id,
            existing.class_id,
            teacher_id,
            day_of_week,
            range,
        )
        .excluding(id);

        Self::lock_scopes(
            &mut tx,
            &[(existing.term_id, existing.day_of_week), proposed.scope()],
        )
        .await?;

        let report = Self::check_conflicts(&mut tx, &proposed).await?;
        if report.has_conflict {
            Self::record_conflicts(&report);
            return Err(Self::conflict_error(&report));
        }

        sqlx::query(
            r#"UPDATE schedules
               SET teacher_id = $1, subject_id = $2, day_of_week = $3,
                   start_minute = $4, end_minute = $5, updated_at = NOW()
               WHERE id = $6"#,
        )
        .bind(teacher_id)
        .bind(subject_id)
        .bind(day_of_week)
        .bind(range.start())
        .bind(range.end())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_db_constraint(e, "Schedule already exists"))?;

        let slot = Self::fetch_slot(&mut tx, id).await?;
        tx.commit().await?;

        track_schedule_write("update");
        Ok(slot)
    }

    #[instrument(skip(db))]
    pub async fn delete_schedule(db: &PgPool, id: ScheduleId) -> Result<(), AppError> {
        let (exists, attendance_count) = sqlx::query_as::<_, (bool, i64)>(
            r#"SELECT
                EXISTS(SELECT 1 FROM schedules WHERE id = $1),
                (SELECT COUNT(*) FROM attendance WHERE schedule_id = $1)"#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        if !exists {
            return Err(AppError::not_found(anyhow!("Schedule not found")));
        }
        if attendance_count > 0 {
            return Err(AppError::bad_request(anyhow!(
                "Cannot delete schedule with {} attendance record(s)",
                attendance_count
            )));
        }

        sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| AppError::from_db_delete(e, "Schedule has attendance records"))?;

        track_schedule_write("delete");
        Ok(())
    }

    /// Writes items one by one in request order, each in its own
    /// transaction, so later items see earlier ones.
    #[instrument(skip(db, dto), fields(items = dto.items.len()))]
    pub async fn bulk_create(
        db: &PgPool,
        dto: BulkCreateScheduleDto,
    ) -> Result<BulkScheduleResponse, AppError> {
        let mut results = Vec::with_capacity(dto.items.len());

        for (index, item) in dto.items.iter().enumerate() {
            if let Err(errors) = item.validate() {
                results.push(BulkScheduleItemResult {
                    index,
                    success: false,
                    message: format_errors(&errors),
                    conflicts: None,
                    schedule: None,
                });
                continue;
            }

            let result = match Self::try_create(db, item).await {
                Ok(WriteOutcome::Written(slot)) => {
                    track_schedule_write("bulk");
                    BulkScheduleItemResult {
                        index,
                        success: true,
                        message: "Schedule created".to_string(),
                        conflicts: None,
                        schedule: Some(slot),
                    }
                }
                Ok(WriteOutcome::Conflicted(report)) => BulkScheduleItemResult {
                    index,
                    success: false,
                    message: report.summary(),
                    conflicts: Some(report),
                    schedule: None,
                },
                Err(e) if e.status.is_client_error() => BulkScheduleItemResult {
                    index,
                    success: false,
                    message: e.error.to_string(),
                    conflicts: None,
                    schedule: None,
                },
                Err(e) => return Err(e),
            };
            results.push(result);
        }

        let created = results.iter().filter(|r| r.success).count();
        let failed = results.len() - created;
        if failed > 0 {
            warn!(created, failed, "bulk schedule create partially failed");
        }

        Ok(BulkScheduleResponse {
            total: results.len(),
            created,
            failed,
            results,
        })
    }

    /// Dry run of a create or move. Never writes.
    #[instrument(skip(db))]
    pub async fn validate_schedule(
        db: &PgPool,
        dto: ValidateScheduleDto,
    ) -> Result<ConflictReport, AppError> {
        let range = dto.time_range().map_err(AppError::bad_request)?;

        let mut proposed = ProposedSlot::new(
            dto.term_id,
            dto.class_id,
            dto.teacher_id,
            dto.day_of_week,
            range,
        );
        if let Some(exclude_id) = dto.exclude_id {
            proposed = proposed.excluding(exclude_id);
        }

        let mut conn = db.acquire().await?;
        Self::check_conflicts(&mut conn, &proposed).await
    }

    #[instrument(skip(db))]
    pub async fn get_schedule(db: &PgPool, id: ScheduleId) -> Result<ScheduleSlot, AppError> {
        let mut conn = db.acquire().await?;
        Self::fetch_slot(&mut conn, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_schedules(
        db: &PgPool,
        filters: ScheduleFilterParams,
    ) -> Result<PaginatedSchedulesResponse, AppError> {
        const FILTER: &str = r#"
            WHERE ($1::uuid IS NULL OR s.term_id = $1)
              AND ($2::uuid IS NULL OR s.class_id = $2)
              AND ($3::uuid IS NULL OR s.teacher_id = $3)
              AND ($4::smallint IS NULL OR s.day_of_week = $4)"#;

        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM schedules s {FILTER}"))
            .bind(filters.term_id)
            .bind(filters.class_id)
            .bind(filters.teacher_id)
            .bind(filters.day_of_week)
            .fetch_one(db)
            .await?;

        let data = sqlx::query_as::<_, ScheduleSlot>(&format!(
            "{SLOT_SELECT} {FILTER} ORDER BY s.day_of_week, s.start_minute, s.id LIMIT $5 OFFSET $6"
        ))
        .bind(filters.term_id)
        .bind(filters.class_id)
        .bind(filters.teacher_id)
        .bind(filters.day_of_week)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(PaginatedSchedulesResponse {
            data,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    /// Timetable of a class or teacher for one term, grouped by day.
    #[instrument(skip(db))]
    pub async fn get_weekly(
        db: &PgPool,
        owner: ScheduleOwner,
        term_id: TermId,
    ) -> Result<WeeklyTimetableResponse, AppError> {
        let (owner_exists, term_exists) = sqlx::query_as::<_, (bool, bool)>(match owner {
            ScheduleOwner::Class(_) => {
                "SELECT EXISTS(SELECT 1 FROM classes WHERE id = $1), EXISTS(SELECT 1 FROM terms WHERE id = $2)"
            }
            ScheduleOwner::Teacher(_) => {
                "SELECT EXISTS(SELECT 1 FROM teachers WHERE id = $1), EXISTS(SELECT 1 FROM terms WHERE id = $2)"
            }
        })
        .bind(owner.id())
        .bind(term_id)
        .fetch_one(db)
        .await?;

        if !owner_exists {
            let entity = match owner {
                ScheduleOwner::Class(_) => "Class",
                ScheduleOwner::Teacher(_) => "Teacher",
            };
            return Err(AppError::not_found(anyhow!("{} not found", entity)));
        }
        if !term_exists {
            return Err(AppError::not_found(anyhow!("Term not found")));
        }

        let owner_column = match owner {
            ScheduleOwner::Class(_) => "s.class_id",
            ScheduleOwner::Teacher(_) => "s.teacher_id",
        };
        let slots = sqlx::query_as::<_, ScheduleSlot>(&format!(
            "{SLOT_SELECT} WHERE s.term_id = $1 AND {owner_column} = $2
             ORDER BY s.day_of_week, s.start_minute, s.id"
        ))
        .bind(term_id)
        .bind(owner.id())
        .fetch_all(db)
        .await?;

        let schedule = group_by_day(slots);

        Ok(WeeklyTimetableResponse {
            owner_type: owner.kind().to_string(),
            owner_id: owner.id(),
            term_id,
            total_slots: schedule.total_slots(),
            schedule,
        })
    }

    #[instrument(skip(db))]
    pub async fn teacher_for_user(db: &PgPool, user_id: UserId) -> Result<TeacherId, AppError> {
        sqlx::query_scalar::<_, TeacherId>("SELECT id FROM teachers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Teacher profile not found")))
    }

    #[instrument(skip(db))]
    pub async fn class_for_student_user(
        db: &PgPool,
        user_id: UserId,
    ) -> Result<ClassId, AppError> {
        sqlx::query_scalar::<_, Option<ClassId>>("SELECT class_id FROM students WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student profile not found")))?
            .ok_or_else(|| AppError::not_found(anyhow!("Student is not assigned to a class")))
    }

    /// Every clashing pair among the stored slots of a term.
    #[instrument(skip(db))]
    pub async fn audit_term(db: &PgPool, term_id: TermId) -> Result<Vec<SlotClash>, AppError> {
        let slots = sqlx::query_as::<_, ScheduleSlot>(&format!(
            "{SLOT_SELECT} WHERE s.term_id = $1 ORDER BY s.day_of_week, s.start_minute, s.id"
        ))
        .bind(term_id)
        .fetch_all(db)
        .await?;

        Ok(audit_term(&slots))
    }
}
