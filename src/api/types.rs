//! API request and response types.
//!
//! Field names are camelCase with unit suffixes spelled `KW` / `KWh`,
//! matching the JSON form of [`SimulationResult`](crate::sim::types::SimulationResult).

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, EvConfig, ScenarioConfig, SimulationSettings, SiteConfig};
use crate::sim::types::SimulationConfig;

use super::store::SimulationSummary;

/// Body of `POST /simulations`.
///
/// `numChargers` and `powerKW` are required; everything else falls back to
/// the defaults below.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSimulationRequest {
    pub num_chargers: Option<usize>,
    #[serde(rename = "powerKW")]
    pub power_kw: Option<f64>,
    pub arrival_multiplier: Option<f64>,
    /// kWh per 100 km.
    pub consumption: Option<f64>,
    pub rng_seed: Option<u64>,
    pub duration_days: Option<usize>,
    pub simulation_name: Option<String>,
}

impl CreateSimulationRequest {
    pub const DEFAULT_CONSUMPTION: f64 = 7.0;
    pub const DEFAULT_DURATION_DAYS: usize = 365;
    /// Upper bound on a single request's horizon (ten years).
    pub const MAX_DURATION_DAYS: usize = 3650;

    /// Validates the request and builds the engine input.
    ///
    /// # Errors
    ///
    /// Returns every violated constraint, using request field names.
    pub fn to_simulation_config(&self) -> Result<SimulationConfig, Vec<ConfigError>> {
        let mut errors = Vec::new();
        if self.num_chargers.is_none() {
            errors.push(missing("numChargers"));
        }
        if self.power_kw.is_none() {
            errors.push(missing("powerKW"));
        }
        let days = self.duration_days.unwrap_or(Self::DEFAULT_DURATION_DAYS);
        if days > Self::MAX_DURATION_DAYS {
            errors.push(ConfigError {
                field: "durationDays".into(),
                message: format!("must be <= {}", Self::MAX_DURATION_DAYS),
            });
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let scenario = ScenarioConfig {
            simulation: SimulationSettings {
                days,
                ticks: None,
                seed: self.rng_seed,
                record_activity: false,
            },
            site: SiteConfig {
                num_chargers: self.num_chargers.unwrap_or_default(),
                charger_power_kw: self.power_kw.unwrap_or_default(),
            },
            ev: EvConfig {
                consumption_kwh_per_100km: self.consumption.unwrap_or(Self::DEFAULT_CONSUMPTION),
                arrival_multiplier: self.arrival_multiplier.unwrap_or(1.0),
            },
        };

        let errors: Vec<ConfigError> = scenario
            .validate()
            .into_iter()
            .map(|e| ConfigError {
                field: request_field(&e.field).to_string(),
                message: e.message,
            })
            .collect();
        if errors.is_empty() {
            Ok(scenario.to_simulation_config())
        } else {
            Err(errors)
        }
    }
}

fn missing(field: &str) -> ConfigError {
    ConfigError {
        field: field.to_string(),
        message: "is required".to_string(),
    }
}

/// Maps a scenario field path to the request field that feeds it.
fn request_field(scenario_field: &str) -> &str {
    match scenario_field {
        "site.num_chargers" => "numChargers",
        "site.charger_power_kw" => "powerKW",
        "ev.consumption_kwh_per_100km" => "consumption",
        "ev.arrival_multiplier" => "arrivalMultiplier",
        "simulation.days" => "durationDays",
        other => other,
    }
}

/// Body of a successful `POST /simulations`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSimulationResponse {
    pub message: String,
    pub simulation_id: u64,
    pub data: SimulationSummary,
}

/// Optional inclusive tick range for the power endpoint.
#[derive(Debug, Deserialize)]
pub struct PowerQuery {
    pub from: Option<usize>,
    pub to: Option<usize>,
}

/// Aggregate draw at one tick.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerSample {
    pub tick: usize,
    #[serde(rename = "powerKW")]
    pub power_kw: f64,
    pub busy_chargers: usize,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
