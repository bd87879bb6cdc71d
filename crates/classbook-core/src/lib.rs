//! # Classbook Core
//!
//! Foundational pieces shared by every Classbook crate:
//!
//! - [`errors`]: [`AppError`] and its HTTP rendering
//! - [`pagination`]: list paging parameters and response metadata
//! - [`password`]: bcrypt hashing
//! - [`permissions`]: permission names and the role mapping
//! - [`serde`]: query-string deserialization helpers

pub mod errors;
pub mod pagination;
pub mod password;
pub mod permissions;
pub mod serde;

pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, hash_password_with_cost, verify_password};
