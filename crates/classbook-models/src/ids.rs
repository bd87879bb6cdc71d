//! Typed identifiers for every persisted entity.
//!
//! Each id wraps a `Uuid` so a `TeacherId` can never be passed where a
//! `ClassId` is expected. The conflict detector compares teachers and classes
//! on independent axes, and this keeps those axes from being swapped.
//!
//! ```ignore
//! use classbook_models::ids::{ClassId, TeacherId};
//!
//! fn weekly_for_class(id: ClassId) { /* ... */ }
//!
//! let teacher = TeacherId::new();
//! // weekly_for_class(teacher); // does not compile
//! ```

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
        #[schema(value_type = String, format = "uuid")]
        pub struct $name(pub Uuid);

        impl $name {
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Builds an id from a constant, used for the fixed system roles.
            #[inline]
            pub const fn from_u128(v: u128) -> Self {
                Self(Uuid::from_u128(v))
            }

            #[inline]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }

            #[inline]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            #[inline]
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            #[inline]
            fn from(id: $name) -> Uuid {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <Uuid as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <Uuid as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <Uuid as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <Uuid as Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }

        impl PgHasArrayType for $name {
            fn array_type_info() -> PgTypeInfo {
                <Uuid as PgHasArrayType>::array_type_info()
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                Uuid::deserialize(deserializer).map(Self)
            }
        }
    };
}

define_id!(
    /// Login account.
    UserId
);

define_id!(
    /// One of the fixed system roles.
    RoleId
);

define_id!(
    /// Academic term (semester) that scopes the timetable.
    TermId
);

define_id!(
    /// Class section, e.g. "X IPA 1".
    ClassId
);

define_id!(
    /// Teacher profile linked to a user account.
    TeacherId
);

define_id!(
    /// Student profile linked to a user account.
    StudentId
);

define_id!(SubjectId);

define_id!(
    /// One timetable slot.
    ScheduleId
);

define_id!(AttendanceId);

define_id!(
    /// One subject's grade for one student in one term.
    GradeId
);

define_id!(
    /// Parent or guardian profile linked to a user account.
    ParentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_u128() {
        let id = RoleId::from_u128(1);
        assert_eq!(id.into_inner(), Uuid::from_u128(1));
    }

    #[test]
    fn test_id_debug_names_the_type() {
        let id = ScheduleId::from_u128(0x12345678_1234_1234_1234_123456789abc);
        let debug = format!("{:?}", id);
        assert_eq!(debug, "ScheduleId(12345678-1234-1234-1234-123456789abc)");
    }

    #[test]
    fn test_id_display_is_bare_uuid() {
        let id = TermId::from_u128(0x12345678_1234_1234_1234_123456789abc);
        assert_eq!(id.to_string(), "12345678-1234-1234-1234-123456789abc");
    }

    #[test]
    fn test_id_parse() {
        let id: ClassId = "12345678-1234-1234-1234-123456789abc".parse().unwrap();
        assert_eq!(id, ClassId::from_u128(0x12345678_1234_1234_1234_123456789abc));
        assert!("not-a-uuid".parse::<ClassId>().is_err());
    }

    #[test]
    fn test_id_json_is_transparent() {
        let id = TeacherId::from_u128(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""00000000-0000-0000-0000-000000000007""#);
        let back: TeacherId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_ids_order_by_uuid() {
        let low = TermId::from_u128(1);
        let high = TermId::from_u128(2);
        assert!(low < high);
        let mut ids = vec![high, low];
        ids.sort();
        assert_eq!(ids, vec![low, high]);
    }
}
