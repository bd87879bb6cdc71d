pub use classbook_models::auth::*;
pub use classbook_models::users::ChangePasswordDto;
