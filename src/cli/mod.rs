//! Administrative commands behind the `classbook-cli` binary.

pub mod seeder;

use anyhow::{anyhow, bail};
use sqlx::PgPool;

use classbook_models::{Email, TermId, UserId, system_roles};
use classbook_scheduling::SlotClash;

use crate::modules::schedules::service::ScheduleService;
use crate::modules::users::service::UserService;

/// Creates an administrator account. Fails if the email is taken.
pub async fn create_admin(
    db: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<UserId> {
    let email = Email::new(email)?;
    if password.len() < 8 {
        bail!("password must be at least 8 characters");
    }

    let mut conn = db.acquire().await?;
    UserService::insert_user(
        &mut conn,
        first_name,
        last_name,
        &email,
        password,
        system_roles::ADMIN,
    )
    .await
    .map_err(|e| anyhow!("{}", e.error))
}

/// Audits every stored slot of a term for double bookings.
pub async fn check_conflicts(db: &PgPool, term_id: TermId) -> anyhow::Result<Vec<SlotClash>> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM terms WHERE id = $1)")
        .bind(term_id)
        .fetch_one(db)
        .await?;
    if !exists {
        bail!("term {} not found", term_id);
    }

    ScheduleService::audit_term(db, term_id)
        .await
        .map_err(|e| anyhow!("{}", e.error))
}
