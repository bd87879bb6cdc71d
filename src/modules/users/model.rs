pub use classbook_models::users::*;
