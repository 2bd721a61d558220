//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::{error, info};

use super::AppState;
use super::store::{SimulationSummary, StoredSimulation};
use super::types::{
    CreateSimulationRequest, CreateSimulationResponse, ErrorResponse, MessageResponse,
    PowerQuery, PowerSample,
};
use crate::sim;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn not_found(id: u64) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("simulation {id} not found"))
}

/// Runs a simulation and stores it.
///
/// `POST /simulations` → 201 + `CreateSimulationResponse`
/// Missing or invalid parameters → 400 + `ErrorResponse`
pub async fn create_simulation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateSimulationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateSimulationResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?;

    let config = request.to_simulation_config().map_err(|errors| {
        let message = errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        api_error(StatusCode::BAD_REQUEST, message)
    })?;

    let result = tokio::task::spawn_blocking(move || sim::run(&config))
        .await
        .map_err(|e| {
            error!(error = %e, "simulation task failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "simulation task failed")
        })?;

    let mut store = state.store.write().await;
    let stored = store.insert(request.simulation_name, result);
    info!(
        id = stored.id,
        name = %stored.name,
        max_kw = stored.result.actual_max_power_demand_kw,
        "simulation stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateSimulationResponse {
            message: "Simulation completed and results stored successfully".to_string(),
            simulation_id: stored.id,
            data: SimulationSummary::from(stored),
        }),
    ))
}

/// Lists stored simulations, newest first.
///
/// `GET /simulations` → 200 + `Vec<SimulationSummary>`
pub async fn list_simulations(State(state): State<Arc<AppState>>) -> Json<Vec<SimulationSummary>> {
    Json(state.store.read().await.summaries())
}

/// Returns one stored simulation with its full result.
///
/// `GET /simulations/{id}` → 200 + `StoredSimulation`, or 404
pub async fn get_simulation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<StoredSimulation>, ApiError> {
    state
        .store
        .read()
        .await
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// Returns the per-tick power series, optionally restricted to a range.
///
/// `GET /simulations/{id}/power?from=N&to=M` → inclusive range
/// `from > to` → 400, unknown id → 404
pub async fn get_power(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Query(query): Query<PowerQuery>,
) -> Result<Json<Vec<PowerSample>>, ApiError> {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);
    if from > to {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("`from` ({from}) must be <= `to` ({to})"),
        ));
    }

    let store = state.store.read().await;
    let stored = store.get(id).ok_or_else(|| not_found(id))?;
    let samples = stored
        .result
        .power_by_tick()
        .filter(|&(tick, _)| tick >= from && tick <= to)
        .map(|(tick, power_kw)| PowerSample {
            tick,
            power_kw,
            busy_chargers: stored
                .result
                .busy_chargers_per_tick
                .get(tick)
                .copied()
                .unwrap_or(0),
        })
        .collect();
    Ok(Json(samples))
}

/// Deletes a stored simulation.
///
/// `DELETE /simulations/{id}` → 200 + `MessageResponse`, or 404
pub async fn delete_simulation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .store
        .write()
        .await
        .remove(id)
        .map(|_| {
            Json(MessageResponse {
                message: "Simulation deleted successfully".to_string(),
            })
        })
        .ok_or_else(|| not_found(id))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;

    async fn send(state: &Arc<AppState>, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = router(Arc::clone(state)).oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/simulations")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn create_returns_201_with_summary() {
        let state = Arc::new(AppState::new());
        let (status, json) = send(
            &state,
            post(r#"{"numChargers": 4, "powerKW": 11, "rngSeed": 42, "durationDays": 7, "consumption": 18}"#),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["simulationId"], 1);
        assert_eq!(json["data"]["numChargers"], 4);
        assert_eq!(json["data"]["powerKW"], 11.0);
        assert_eq!(json["data"]["actualMaxPowerDemandKW"], 22.0);
        assert_eq!(json["data"]["concurrencyFactor"], 0.5);
        assert_eq!(state.store.read().await.len(), 1);
    }

    #[tokio::test]
    async fn create_without_required_fields_returns_400() {
        let state = Arc::new(AppState::new());
        let (status, json) = send(&state, post(r#"{"powerKW": 11}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("numChargers"));
        assert!(state.store.read().await.is_empty());
    }

    #[tokio::test]
    async fn create_with_malformed_body_returns_400() {
        let state = Arc::new(AppState::new());
        let (status, json) = send(&state, post(r#"{"numChargers": "many""#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn unknown_simulation_returns_404() {
        let state = Arc::new(AppState::new());
        let (status, _) = send(&state, get("/simulations/99")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&state, get("/simulations/99/power")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn power_range_is_inclusive() {
        let state = Arc::new(AppState::new());
        send(
            &state,
            post(r#"{"numChargers": 2, "powerKW": 11, "rngSeed": 3, "durationDays": 1}"#),
        )
        .await;

        let (status, json) = send(&state, get("/simulations/1/power?from=10&to=15")).await;
        assert_eq!(status, StatusCode::OK);
        let samples = json.as_array().unwrap();
        assert_eq!(samples.len(), 6);
        assert_eq!(samples[0]["tick"], 10);
        assert_eq!(samples[5]["tick"], 15);

        let (status, json) = send(&state, get("/simulations/1/power")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 96);
    }

    #[tokio::test]
    async fn power_inverted_range_returns_400() {
        let state = Arc::new(AppState::new());
        let (status, json) = send(&state, get("/simulations/1/power?from=10&to=5")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn delete_removes_simulation() {
        let state = Arc::new(AppState::new());
        send(
            &state,
            post(r#"{"numChargers": 1, "powerKW": 11, "rngSeed": 1, "durationDays": 1}"#),
        )
        .await;

        let req = Request::builder()
            .method("DELETE")
            .uri("/simulations/1")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&state, get("/simulations/1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
