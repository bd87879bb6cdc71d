pub use classbook_models::classes::*;
