pub use classbook_models::attendance::*;
