use std::collections::HashSet;

use anyhow::anyhow;
use chrono::NaiveDate;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{info, instrument};

use classbook_core::{AppError, PaginationMeta};
use classbook_models::{AttendanceId, ClassId, ScheduleId, StudentId, TermId, UserId};

use crate::metrics::track_attendance_recorded;
use crate::modules::attendance::model::{
    Attendance, AttendanceCounts, AttendanceFilterParams, AttendanceRecap, BulkAttendanceDto,
    BulkAttendanceItemResult, BulkAttendanceResponse, ClassAttendanceRecap,
    PaginatedAttendanceResponse, RecordAttendanceDto, StudentRecapQuery, UpdateAttendanceDto,
};

const ATTENDANCE_SELECT: &str = r#"SELECT
        a.id, a.schedule_id, a.student_id, st.full_name AS student_name,
        a.date, a.status, a.note, a.recorded_by, a.created_at, a.updated_at
    FROM attendance a
    JOIN students st ON st.id = a.student_id"#;

/// Per-status counts of each student. Records are filtered in the join so
/// students without any still get a zero row. `$2` term, `$3`/`$4` date
/// bounds, all optional.
const RECAP_SELECT: &str = r#"SELECT
        st.id AS student_id, st.full_name AS student_name,
        COUNT(a.id) FILTER (WHERE a.status = 'present') AS present,
        COUNT(a.id) FILTER (WHERE a.status = 'excused') AS excused,
        COUNT(a.id) FILTER (WHERE a.status = 'sick') AS sick,
        COUNT(a.id) FILTER (WHERE a.status = 'absent') AS absent
    FROM students st
    LEFT JOIN (attendance a JOIN schedules sc ON sc.id = a.schedule_id)
        ON a.student_id = st.id
       AND ($2::uuid IS NULL OR sc.term_id = $2)
       AND ($3::date IS NULL OR a.date >= $3)
       AND ($4::date IS NULL OR a.date <= $4)"#;

#[derive(FromRow)]
struct RecapRow {
    student_id: StudentId,
    student_name: String,
    #[sqlx(flatten)]
    counts: AttendanceCounts,
}

impl From<RecapRow> for AttendanceRecap {
    fn from(row: RecapRow) -> Self {
        AttendanceRecap::new(row.student_id, row.student_name, row.counts)
    }
}

pub struct AttendanceService;

impl AttendanceService {
    async fn slot_class(conn: &mut PgConnection, schedule_id: ScheduleId) -> Result<ClassId, AppError> {
        sqlx::query_scalar::<_, ClassId>("SELECT class_id FROM schedules WHERE id = $1")
            .bind(schedule_id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::bad_request(anyhow!("Schedule not found")))
    }

    async fn fetch_attendance(
        conn: &mut PgConnection,
        id: AttendanceId,
    ) -> Result<Attendance, AppError> {
        sqlx::query_as::<_, Attendance>(&format!("{ATTENDANCE_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Attendance record not found")))
    }

    #[instrument(skip(db))]
    pub async fn record_attendance(
        db: &PgPool,
        dto: RecordAttendanceDto,
        recorded_by: UserId,
    ) -> Result<Attendance, AppError> {
        let mut conn = db.acquire().await?;

        let class_id = Self::slot_class(&mut conn, dto.schedule_id).await?;

        let student_class = sqlx::query_scalar::<_, Option<ClassId>>(
            "SELECT class_id FROM students WHERE id = $1",
        )
        .bind(dto.student_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow!("Student not found")))?;

        if student_class != Some(class_id) {
            return Err(AppError::bad_request(anyhow!(
                "Student is not enrolled in the scheduled class"
            )));
        }

        let id = sqlx::query_scalar::<_, AttendanceId>(
            r#"INSERT INTO attendance (schedule_id, student_id, date, status, note, recorded_by)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id"#,
        )
        .bind(dto.schedule_id)
        .bind(dto.student_id)
        .bind(dto.date)
        .bind(dto.status)
        .bind(&dto.note)
        .bind(recorded_by)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            AppError::from_db_constraint(
                e,
                "Attendance already recorded for this student, slot and date",
            )
        })?;

        track_attendance_recorded(1);
        Self::fetch_attendance(&mut conn, id).await
    }

    /// Roll call for one slot and date. Existing entries are overwritten;
    /// students outside the slot's class are reported as failed items.
    #[instrument(skip(db, dto), fields(schedule_id = %dto.schedule_id, date = %dto.date))]
    pub async fn bulk_record(
        db: &PgPool,
        dto: BulkAttendanceDto,
        recorded_by: UserId,
    ) -> Result<BulkAttendanceResponse, AppError> {
        let mut tx = db.begin().await?;

        let class_id = Self::slot_class(&mut tx, dto.schedule_id).await?;

        let roster: HashSet<StudentId> =
            sqlx::query_scalar::<_, StudentId>("SELECT id FROM students WHERE class_id = $1")
                .bind(class_id)
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .collect();

        let mut results = Vec::with_capacity(dto.entries.len());

        for entry in &dto.entries {
            if !roster.contains(&entry.student_id) {
                results.push(BulkAttendanceItemResult {
                    student_id: entry.student_id,
                    success: false,
                    message: "Student is not enrolled in the scheduled class".to_string(),
                    attendance: None,
                });
                continue;
            }

            let id = sqlx::query_scalar::<_, AttendanceId>(
                r#"INSERT INTO attendance (schedule_id, student_id, date, status, note, recorded_by)
                   VALUES ($1, $2, $3, $4, $5, $6)
                   ON CONFLICT (schedule_id, student_id, date) DO UPDATE
                   SET status = EXCLUDED.status,
                       note = EXCLUDED.note,
                       recorded_by = EXCLUDED.recorded_by,
                       updated_at = NOW()
                   RETURNING id"#,
            )
            .bind(dto.schedule_id)
            .bind(entry.student_id)
            .bind(dto.date)
            .bind(entry.status)
            .bind(&entry.note)
            .bind(recorded_by)
            .fetch_one(&mut *tx)
            .await?;

            let attendance = Self::fetch_attendance(&mut tx, id).await?;
            results.push(BulkAttendanceItemResult {
                student_id: entry.student_id,
                success: true,
                message: "Recorded".to_string(),
                attendance: Some(attendance),
            });
        }

        tx.commit().await?;

        let recorded = results.iter().filter(|r| r.success).count();
        track_attendance_recorded(recorded);
        info!(recorded, failed = results.len() - recorded, "bulk attendance recorded");

        Ok(BulkAttendanceResponse {
            total: results.len(),
            recorded,
            failed: results.len() - recorded,
            results,
        })
    }

    #[instrument(skip(db))]
    pub async fn get_attendance_list(
        db: &PgPool,
        filters: AttendanceFilterParams,
    ) -> Result<PaginatedAttendanceResponse, AppError> {
        const FILTER: &str = r#"
            JOIN schedules sc ON sc.id = a.schedule_id
            WHERE ($1::uuid IS NULL OR a.schedule_id = $1)
              AND ($2::uuid IS NULL OR a.student_id = $2)
              AND ($3::uuid IS NULL OR sc.class_id = $3)
              AND ($4::attendance_status IS NULL OR a.status = $4)
              AND ($5::date IS NULL OR a.date >= $5)
              AND ($6::date IS NULL OR a.date <= $6)"#;

        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM attendance a {FILTER}"
        ))
        .bind(filters.schedule_id)
        .bind(filters.student_id)
        .bind(filters.class_id)
        .bind(filters.status)
        .bind(filters.date_from)
        .bind(filters.date_to)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, Attendance>(&format!(
            "{ATTENDANCE_SELECT} {FILTER} ORDER BY a.date DESC, st.full_name LIMIT $7 OFFSET $8"
        ))
        .bind(filters.schedule_id)
        .bind(filters.student_id)
        .bind(filters.class_id)
        .bind(filters.status)
        .bind(filters.date_from)
        .bind(filters.date_to)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(PaginatedAttendanceResponse {
            data,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_attendance(db: &PgPool, id: AttendanceId) -> Result<Attendance, AppError> {
        let mut conn = db.acquire().await?;
        Self::fetch_attendance(&mut conn, id).await
    }

    #[instrument(skip(db))]
    pub async fn update_attendance(
        db: &PgPool,
        id: AttendanceId,
        dto: UpdateAttendanceDto,
        recorded_by: UserId,
    ) -> Result<Attendance, AppError> {
        let mut conn = db.acquire().await?;

        let result = sqlx::query(
            r#"UPDATE attendance
               SET status = COALESCE($1, status),
                   note = COALESCE($2, note),
                   recorded_by = $3,
                   updated_at = NOW()
               WHERE id = $4"#,
        )
        .bind(dto.status)
        .bind(&dto.note)
        .bind(recorded_by)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Attendance record not found")));
        }

        Self::fetch_attendance(&mut conn, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_attendance(db: &PgPool, id: AttendanceId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Attendance record not found")));
        }
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn student_recap(
        db: &PgPool,
        student_id: StudentId,
        query: StudentRecapQuery,
    ) -> Result<AttendanceRecap, AppError> {
        if let (Some(from), Some(to)) = (query.date_from, query.date_to) {
            if from > to {
                return Err(AppError::bad_request(anyhow!(
                    "date_from must not be after date_to"
                )));
            }
        }

        let row = sqlx::query_as::<_, RecapRow>(&format!(
            "{RECAP_SELECT} WHERE st.id = $1 GROUP BY st.id, st.full_name"
        ))
        .bind(student_id)
        .bind(query.term_id)
        .bind(query.date_from)
        .bind(query.date_to)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        Ok(row.into())
    }

    /// One row per student of the class for the term, ordered by name.
    #[instrument(skip(db))]
    pub async fn class_recap(
        db: &PgPool,
        class_id: ClassId,
        term_id: TermId,
    ) -> Result<ClassAttendanceRecap, AppError> {
        let class_name = sqlx::query_scalar::<_, String>("SELECT name FROM classes WHERE id = $1")
            .bind(class_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Class not found")))?;

        let students: Vec<AttendanceRecap> = sqlx::query_as::<_, RecapRow>(&format!(
            "{RECAP_SELECT} WHERE st.class_id = $1 GROUP BY st.id, st.full_name ORDER BY st.full_name, st.id"
        ))
        .bind(class_id)
        .bind(term_id)
        .bind(None::<NaiveDate>)
        .bind(None::<NaiveDate>)
        .fetch_all(db)
        .await?
        .into_iter()
        .map(AttendanceRecap::from)
        .collect();

        Ok(ClassAttendanceRecap {
            class_id,
            class_name,
            term_id,
            student_count: students.len(),
            students,
        })
    }
}
