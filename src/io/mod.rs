//! Result export in CSV and JSON.

pub mod export;
