//! Request authentication and authorization.
//!
//! - [`auth`]: the [`auth::AuthUser`] extractor and one permission extractor
//!   per permission string, e.g. [`auth::RequireSchedulesCreate`]
//! - [`role`]: role checks and the admin-only route layer
//!
//! ```ignore
//! use crate::middleware::auth::RequireSchedulesCreate;
//!
//! async fn create_schedule(
//!     RequireSchedulesCreate(auth_user): RequireSchedulesCreate,
//! ) -> impl IntoResponse {
//!     // only runs when the token carries "schedules:create"
//! }
//! ```

pub mod auth;
pub mod role;
