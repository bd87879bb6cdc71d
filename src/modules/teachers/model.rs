pub use classbook_models::teachers::*;
