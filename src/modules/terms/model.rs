pub use classbook_models::terms::*;
