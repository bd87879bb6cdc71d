pub use classbook_models::parents::*;
