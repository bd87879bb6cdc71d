pub use classbook_models::grades::*;
