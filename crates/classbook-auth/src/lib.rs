//! # Classbook Auth
//!
//! JWT claims plus token creation and verification.
//!
//! ```ignore
//! use classbook_auth::{create_access_token, verify_token};
//!
//! let token = create_access_token(user_id, "guru@school.test", "teacher", permissions, &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::{Claims, RefreshTokenClaims};
pub use jwt::{create_access_token, create_refresh_token, verify_refresh_token, verify_token};
