//! Query-string helpers.
//!
//! Filter structs flatten [`PaginationParams`](crate::PaginationParams) in,
//! which makes serde buffer every value as a string. Non-string filters go
//! through [`optional_from_str`] so `?day_of_week=2` and `?day_of_week=` both
//! parse.

use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

pub fn optional_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}
