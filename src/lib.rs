//! EV charging-site power demand simulator.
//!
//! Simulates arrivals, charging sessions, and aggregate power draw of a
//! site with identical chargers in 15-minute ticks, and reports peak
//! demand and concurrency factor.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
/// CSV and JSON export.
pub mod io;
pub mod logging;
/// Simulation engine, random sources, and KPI modules.
pub mod sim;

pub use error::{Error, Result};
