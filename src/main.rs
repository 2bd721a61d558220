//! EV charging-site simulator entry point: CLI wiring and export.

mod cli;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{info, warn};

use ev_charge_sim::io::export;
use ev_charge_sim::logging;
use ev_charge_sim::sim;
use ev_charge_sim::sim::kpi::{ChargingKpis, REFERENCE_CONCURRENCY, REFERENCE_PEAK_KW};

use crate::cli::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.log_json);

    let mut scenario = args.load_scenario()?;
    args.apply_overrides(&mut scenario);

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        bail!("invalid scenario ({} error(s))", errors.len());
    }

    let config = scenario.to_simulation_config();
    let result = sim::run(&config);
    let kpi = ChargingKpis::from_result(&result);

    println!("{result}");
    println!("\n{kpi}");

    if scenario.is_reference_site() {
        if REFERENCE_PEAK_KW.contains(&result.actual_max_power_demand_kw) {
            info!("actual max power demand is within the expected range (77-121 kW)");
        } else {
            warn!(
                max_power_kw = result.actual_max_power_demand_kw,
                "actual max power demand is outside the expected range (77-121 kW)"
            );
        }
        if REFERENCE_CONCURRENCY.contains(&result.concurrency_factor) {
            info!("concurrency factor is within the expected range (35-55%)");
        } else {
            warn!(
                concurrency_factor = result.concurrency_factor,
                "concurrency factor is outside the expected range (35-55%)"
            );
        }
    }

    if let Some(path) = &args.telemetry_out {
        export::export_power_csv(&result, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "power series written");
    }

    if let Some(path) = &args.activity_out {
        if let Some(log) = &result.charger_activity_log {
            export::export_activity_csv(log, path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "activity log written");
        }
    }

    if let Some(path) = &args.json_out {
        export::export_json(&result, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "result written");
    }

    #[cfg(feature = "api")]
    if args.serve {
        serve(&args, result)?;
    }

    Ok(())
}

/// Serves the API with the CLI run pre-loaded as the first stored simulation.
#[cfg(feature = "api")]
fn serve(args: &Args, result: sim::SimulationResult) -> anyhow::Result<()> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use ev_charge_sim::api::{self, AppState};

    let state = Arc::new(AppState::new());
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    runtime.block_on(async {
        state
            .store
            .write()
            .await
            .insert(Some("CLI run".to_string()), result);
        api::serve(state, addr).await
    })?;
    Ok(())
}
