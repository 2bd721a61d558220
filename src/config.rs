//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::sim::clock::TICKS_PER_DAY;
use crate::sim::types::SimulationConfig;

/// Largest site [`ScenarioConfig::validate`] accepts.
pub const MAX_CHARGERS: usize = 10_000;

/// Longest horizon [`ScenarioConfig::validate`] accepts: 100 years of ticks.
pub const MAX_HORIZON_TICKS: usize = 100 * 365 * TICKS_PER_DAY;

/// Upper bound on `chargers x ticks` when the activity log is recorded.
pub const MAX_ACTIVITY_RECORDS: usize = 50_000_000;

/// Top-level scenario configuration parsed from TOML.
///
/// Omitted fields take baseline values, except `simulation.seed`, which
/// stays unset so the run draws from OS entropy. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Horizon, seed, and logging switches.
    #[serde(default)]
    pub simulation: SimulationSettings,
    /// Charging-site layout.
    #[serde(default)]
    pub site: SiteConfig,
    /// EV fleet behaviour.
    #[serde(default)]
    pub ev: EvConfig,
}

/// Horizon, seed, and logging switches.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    /// Number of days to simulate (96 ticks each).
    pub days: usize,
    /// Explicit tick count; takes precedence over `days` when set.
    pub ticks: Option<usize>,
    /// Seed for the reproducible generator. Absent means OS entropy.
    pub seed: Option<u64>,
    /// Keep a per-charger, per-tick activity log.
    pub record_activity: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            days: 365,
            ticks: None,
            seed: None,
            record_activity: false,
        }
    }
}

impl SimulationSettings {
    /// Horizon length in ticks.
    pub fn horizon_ticks(&self) -> usize {
        self.ticks
            .unwrap_or_else(|| self.days.saturating_mul(TICKS_PER_DAY))
    }
}

/// Charging-site layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Number of charging points (must be > 0).
    pub num_chargers: usize,
    /// Rated power per charging point (kW).
    pub charger_power_kw: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            num_chargers: 20,
            charger_power_kw: 11.0,
        }
    }
}

/// EV fleet behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvConfig {
    /// Vehicle consumption (kWh per 100 km).
    pub consumption_kwh_per_100km: f64,
    /// Scales every hourly arrival probability.
    pub arrival_multiplier: f64,
}

impl Default for EvConfig {
    fn default() -> Self {
        Self {
            consumption_kwh_per_100km: 18.0,
            arrival_multiplier: 1.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"site.num_chargers"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

impl ScenarioConfig {
    /// Seed shared by every built-in preset.
    pub const PRESET_SEED: u64 = 12345;

    /// Returns the reference site: 20 x 11 kW for one year, seeded.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationSettings {
                seed: Some(Self::PRESET_SEED),
                ..SimulationSettings::default()
            },
            site: SiteConfig::default(),
            ev: EvConfig::default(),
        }
    }

    /// Returns a 14-charger site with otherwise baseline parameters.
    pub fn small_site() -> Self {
        Self {
            site: SiteConfig {
                num_chargers: 14,
                ..SiteConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the baseline site with arrival probabilities doubled.
    pub fn evening_rush() -> Self {
        Self {
            ev: EvConfig {
                arrival_multiplier: 2.0,
                ..EvConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "small_site", "evening_rush"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "small_site" => Ok(Self::small_site()),
            "evening_rush" => Ok(Self::evening_rush()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let horizon = self.simulation.horizon_ticks();
        let horizon_field = if self.simulation.ticks.is_some() {
            "simulation.ticks"
        } else {
            "simulation.days"
        };
        if horizon == 0 {
            errors.push(ConfigError::new(horizon_field, "must be > 0"));
        } else if horizon > MAX_HORIZON_TICKS {
            errors.push(ConfigError::new(
                horizon_field,
                format!("horizon must be <= {MAX_HORIZON_TICKS} ticks (100 years)"),
            ));
        }

        let site = &self.site;
        if site.num_chargers == 0 {
            errors.push(ConfigError::new("site.num_chargers", "must be > 0"));
        } else if site.num_chargers > MAX_CHARGERS {
            errors.push(ConfigError::new(
                "site.num_chargers",
                format!("must be <= {MAX_CHARGERS}"),
            ));
        }
        if !(site.charger_power_kw.is_finite() && site.charger_power_kw > 0.0) {
            errors.push(ConfigError::new(
                "site.charger_power_kw",
                "must be a finite number > 0",
            ));
        }

        let ev = &self.ev;
        if !(ev.consumption_kwh_per_100km.is_finite() && ev.consumption_kwh_per_100km > 0.0) {
            errors.push(ConfigError::new(
                "ev.consumption_kwh_per_100km",
                "must be a finite number > 0",
            ));
        }
        if !(ev.arrival_multiplier.is_finite() && ev.arrival_multiplier >= 0.0) {
            errors.push(ConfigError::new(
                "ev.arrival_multiplier",
                "must be a finite number >= 0",
            ));
        }

        if self.simulation.record_activity
            && site.num_chargers.saturating_mul(horizon) > MAX_ACTIVITY_RECORDS
        {
            errors.push(ConfigError::new(
                "simulation.record_activity",
                format!("chargers x ticks must be <= {MAX_ACTIVITY_RECORDS} when recording activity"),
            ));
        }

        errors
    }

    /// Builds the engine input for this scenario.
    pub fn to_simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            num_chargers: self.site.num_chargers,
            charger_power_kw: self.site.charger_power_kw,
            ev_consumption_kwh_per_100km: self.ev.consumption_kwh_per_100km,
            arrival_probability_multiplier: self.ev.arrival_multiplier,
            duration_ticks: self.simulation.horizon_ticks(),
            rng_seed: self.simulation.seed,
            record_activity: self.simulation.record_activity,
        }
    }

    /// Whether this scenario is the one-year 20 x 11 kW reference site that
    /// has a documented peak and concurrency band.
    pub fn is_reference_site(&self) -> bool {
        self.site == SiteConfig::default()
            && self.ev == EvConfig::default()
            && self.simulation.horizon_ticks() == SimulationConfig::ONE_YEAR_TICKS
    }
}
