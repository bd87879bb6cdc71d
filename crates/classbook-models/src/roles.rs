//! System roles.
//!
//! Roles are a fixed catalogue seeded by the first migration. Each role has a
//! constant id so tests, fixtures and the CLI can refer to it without a
//! lookup; permissions are derived from the slug in `classbook_core::permissions`.

use crate::ids::RoleId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    pub id: RoleId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
}

pub mod system_roles {
    use crate::ids::RoleId;

    pub mod slugs {
        pub const ADMIN: &str = "admin";
        pub const PRINCIPAL: &str = "principal";
        pub const TEACHER: &str = "teacher";
        pub const HOMEROOM_TEACHER: &str = "homeroom_teacher";
        pub const STUDENT: &str = "student";
        pub const PARENT: &str = "parent";
    }

    pub const ADMIN: RoleId = RoleId::from_u128(0x00000000_0000_0000_0000_000000000001);
    pub const PRINCIPAL: RoleId = RoleId::from_u128(0x00000000_0000_0000_0000_000000000002);
    pub const TEACHER: RoleId = RoleId::from_u128(0x00000000_0000_0000_0000_000000000003);
    /// Teacher who is also responsible for one class.
    pub const HOMEROOM_TEACHER: RoleId =
        RoleId::from_u128(0x00000000_0000_0000_0000_000000000004);
    pub const STUDENT: RoleId = RoleId::from_u128(0x00000000_0000_0000_0000_000000000005);
    /// Parent or guardian of one or more students.
    pub const PARENT: RoleId = RoleId::from_u128(0x00000000_0000_0000_0000_000000000006);

    const CATALOGUE: [(RoleId, &str, &str); 6] = [
        (ADMIN, slugs::ADMIN, "Administrator"),
        (PRINCIPAL, slugs::PRINCIPAL, "Principal"),
        (TEACHER, slugs::TEACHER, "Teacher"),
        (HOMEROOM_TEACHER, slugs::HOMEROOM_TEACHER, "Homeroom Teacher"),
        (STUDENT, slugs::STUDENT, "Student"),
        (PARENT, slugs::PARENT, "Parent"),
    ];

    pub fn all() -> Vec<RoleId> {
        CATALOGUE.iter().map(|(id, _, _)| *id).collect()
    }

    pub fn get_slug(role_id: &RoleId) -> Option<&'static str> {
        CATALOGUE
            .iter()
            .find(|(id, _, _)| id == role_id)
            .map(|(_, slug, _)| *slug)
    }

    pub fn get_name(role_id: &RoleId) -> Option<&'static str> {
        CATALOGUE
            .iter()
            .find(|(id, _, _)| id == role_id)
            .map(|(_, _, name)| *name)
    }

    pub fn get_id_by_slug(slug: &str) -> Option<RoleId> {
        CATALOGUE
            .iter()
            .find(|(_, s, _)| *s == slug)
            .map(|(id, _, _)| *id)
    }

    /// Roles whose holders own a teacher profile.
    pub fn is_teaching_role(slug: &str) -> bool {
        slug == slugs::TEACHER || slug == slugs::HOMEROOM_TEACHER
    }
}
