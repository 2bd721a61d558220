//! CSV and JSON export for simulation results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;
use crate::sim::clock::{day_of, hour_of_day};
use crate::sim::types::{ChargerActivityLog, SimulationResult};

/// Column header for the per-tick power export.
const POWER_HEADER: [&str; 5] = ["tick", "day", "hour", "power_kw", "busy_chargers"];

/// Column header for the per-charger activity export.
const ACTIVITY_HEADER: [&str; 5] = ["charger", "tick", "busy", "power_kw", "ev"];

/// Exports the per-tick power series to a CSV file at the given path.
///
/// # Arguments
///
/// * `result` - Completed simulation result
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_power_csv(result: &SimulationResult, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_power_csv(result, io::BufWriter::new(file))
}

/// Writes one row per tick: tick, day, hour of day, aggregate kW, and busy
/// charger count.
///
/// Produces byte-identical output for identical results.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_power_csv(result: &SimulationResult, writer: impl Write) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(POWER_HEADER)?;

    for (tick, kw) in result.power_by_tick() {
        let busy = result.busy_chargers_per_tick.get(tick).copied().unwrap_or(0);
        wtr.write_record(&[
            tick.to_string(),
            day_of(tick).to_string(),
            hour_of_day(tick).to_string(),
            format!("{kw:.2}"),
            busy.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports a charger activity log to a CSV file at the given path.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_activity_csv(log: &ChargerActivityLog, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_activity_csv(log, io::BufWriter::new(file))
}

/// Writes one row per charger and tick, grouped by charger. The `ev`
/// column is empty while the charger is free.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_activity_csv(log: &ChargerActivityLog, writer: impl Write) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(ACTIVITY_HEADER)?;

    for history in &log.chargers {
        let charger = history.charger_id.to_string();
        for (tick, info) in history.ticks.iter().enumerate() {
            wtr.write_record(&[
                charger.clone(),
                tick.to_string(),
                info.is_busy.to_string(),
                format!("{:.2}", info.power_draw_kw),
                info.ev_id.map(|ev| ev.to_string()).unwrap_or_default(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the full result as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if file creation, serialization, or writing fails.
pub fn export_json(result: &SimulationResult, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_json(result, io::BufWriter::new(file))
}

/// Writes the full result as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(result: &SimulationResult, mut writer: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, result)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
