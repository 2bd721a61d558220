//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use ev_charge_sim::config::{ConfigError, ScenarioConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "EV charging-site power demand simulator")]
pub struct Args {
    /// Load the scenario from a TOML file.
    #[clap(long, value_name = "PATH", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset: baseline, small_site, evening_rush.
    #[clap(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Override the random seed.
    #[clap(long)]
    pub seed: Option<u64>,

    /// Override the number of chargers.
    #[clap(long)]
    pub chargers: Option<usize>,

    /// Override the charger power in kilowatts.
    #[clap(long = "power-kw")]
    pub power_kw: Option<f64>,

    /// Override the arrival probability multiplier.
    #[clap(long)]
    pub multiplier: Option<f64>,

    /// Override the horizon in days.
    #[clap(long)]
    pub days: Option<usize>,

    /// Write the per-tick power series to CSV.
    #[clap(long, value_name = "PATH")]
    pub telemetry_out: Option<PathBuf>,

    /// Write the per-charger activity log to CSV; enables activity recording.
    #[clap(long, value_name = "PATH")]
    pub activity_out: Option<PathBuf>,

    /// Write the full result to JSON.
    #[clap(long, value_name = "PATH")]
    pub json_out: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[clap(long)]
    pub log_json: bool,

    /// Start the REST API server after the run.
    #[cfg(feature = "api")]
    #[clap(long)]
    pub serve: bool,

    /// API server port.
    #[cfg(feature = "api")]
    #[clap(long, default_value = "3000", env = "EV_SIM_PORT")]
    pub port: u16,
}

impl Args {
    /// Resolves `--scenario` / `--preset`, falling back to the baseline.
    pub fn load_scenario(&self) -> Result<ScenarioConfig, ConfigError> {
        if let Some(path) = &self.scenario {
            ScenarioConfig::from_toml_file(path)
        } else if let Some(name) = &self.preset {
            ScenarioConfig::from_preset(name)
        } else {
            Ok(ScenarioConfig::baseline())
        }
    }

    /// Applies command-line overrides on top of a loaded scenario.
    pub fn apply_overrides(&self, scenario: &mut ScenarioConfig) {
        if let Some(seed) = self.seed {
            scenario.simulation.seed = Some(seed);
        }
        if let Some(chargers) = self.chargers {
            scenario.site.num_chargers = chargers;
        }
        if let Some(power_kw) = self.power_kw {
            scenario.site.charger_power_kw = power_kw;
        }
        if let Some(multiplier) = self.multiplier {
            scenario.ev.arrival_multiplier = multiplier;
        }
        if let Some(days) = self.days {
            scenario.simulation.days = days;
            scenario.simulation.ticks = None;
        }
        if self.activity_out.is_some() {
            scenario.simulation.record_activity = true;
        }
    }
}
