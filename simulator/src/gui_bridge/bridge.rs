use crate::gui_bridge::model::{RegisterRequest, SessionView, StatusView, SummaryView};
use crate::workflow::runner::Runner;
use anyhow::Context;
use fleetcore::device::DeviceEdit;
use fleetcore::enrichment::ManualEntry;
use fleetcore::FleetError;
use log::{info, warn};
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Reply, Response};
use warp::{Filter, Rejection};

fn error_reply(err: &FleetError) -> Response {
    let status = match err {
        FleetError::UnknownDevice(_) => StatusCode::NOT_FOUND,
        FleetError::DuplicateDevice(_) => StatusCode::CONFLICT,
        FleetError::InvariantViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FleetError::Configuration(_) | FleetError::Runtime(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        warn!("bridge request failed: {}", err);
    }
    reply::with_status(reply::json(&json!({ "error": err.to_string() })), status).into_response()
}

fn respond<T: serde::Serialize>(result: Result<T, FleetError>, success: StatusCode) -> Response {
    match result {
        Ok(value) => reply::with_status(reply::json(&value), success).into_response(),
        Err(err) => error_reply(&err),
    }
}

/// HTTP surface consumed by the presentation layer.
pub fn routes(
    runner: Arc<Runner>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let with_runner = warp::any().map(move || runner.clone());

    let list = warp::path!("devices")
        .and(warp::get())
        .and(with_runner.clone())
        .map(|runner: Arc<Runner>| reply::json(&runner.devices()).into_response());

    let create = warp::path!("devices")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_runner.clone())
        .map(|entry: ManualEntry, runner: Arc<Runner>| {
            respond(runner.register_manual(&entry), StatusCode::CREATED)
        });

    let show = warp::path!("devices" / String)
        .and(warp::get())
        .and(with_runner.clone())
        .map(|id: String, runner: Arc<Runner>| {
            respond(
                runner.device(&id).ok_or(FleetError::UnknownDevice(id)),
                StatusCode::OK,
            )
        });

    let register = warp::path!("devices" / "register")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_runner.clone())
        .and_then(|request: RegisterRequest, runner: Arc<Runner>| async move {
            let result = runner.register(&request.identifier).await;
            Ok::<_, Rejection>(respond(result, StatusCode::CREATED))
        });

    let edit = warp::path!("devices" / String)
        .and(warp::put())
        .and(warp::body::json())
        .and(with_runner.clone())
        .map(|id: String, edit: DeviceEdit, runner: Arc<Runner>| {
            respond(runner.edit(&id, &edit), StatusCode::OK)
        });

    let remove = warp::path!("devices" / String)
        .and(warp::delete())
        .and(with_runner.clone())
        .map(|id: String, runner: Arc<Runner>| match runner.remove(&id) {
            Ok(_) => StatusCode::NO_CONTENT.into_response(),
            Err(err) => error_reply(&err),
        });

    let frame = warp::path!("frame")
        .and(warp::get())
        .and(with_runner.clone())
        .map(|runner: Arc<Runner>| reply::json(&runner.render_frame()).into_response());

    let summary = warp::path!("summary")
        .and(warp::get())
        .and(with_runner.clone())
        .and_then(|runner: Arc<Runner>| async move {
            let view = SummaryView {
                summary: runner.summary().await,
                counts: runner.counts(),
            };
            Ok::<_, Rejection>(reply::json(&view).into_response())
        });

    let start = warp::path!("session" / "start")
        .and(warp::post())
        .and(with_runner.clone())
        .map(|runner: Arc<Runner>| {
            let result = runner.activate().map(|changed| SessionView {
                active: true,
                changed,
            });
            respond(result, StatusCode::OK)
        });

    let stop = warp::path!("session" / "stop")
        .and(warp::post())
        .and(with_runner.clone())
        .map(|runner: Arc<Runner>| {
            let changed = runner.deactivate();
            reply::json(&SessionView {
                active: false,
                changed,
            })
            .into_response()
        });

    let status = warp::path!("status")
        .and(warp::get())
        .and(with_runner)
        .map(|runner: Arc<Runner>| {
            reply::json(&StatusView {
                active: runner.is_active(),
                counts: runner.counts(),
                metrics: runner.metrics(),
            })
            .into_response()
        });

    list.or(create)
        .unify()
        .or(register)
        .unify()
        .or(show)
        .unify()
        .or(edit)
        .unify()
        .or(remove)
        .unify()
        .or(frame)
        .unify()
        .or(summary)
        .unify()
        .or(start)
        .unify()
        .or(stop)
        .unify()
        .or(status)
        .unify()
}

/// Serves the bridge until `shutdown` resolves.
pub async fn serve<F>(runner: Arc<Runner>, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (bound, server) = warp::serve(routes(runner))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .with_context(|| format!("binding HTTP bridge on {}", addr))?;
    info!("HTTP bridge listening on {}", bound);
    server.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::runner::tests::runner_with;
    use fleetcore::device::Device;
    use fleetcore::enrichment::SUMMARY_UNCONFIGURED;
    use fleetcore::projection::ProjectionMode;
    use warp::test::request;

    fn bridge() -> (
        Arc<Runner>,
        impl Filter<Extract = (Response,), Error = Rejection> + Clone,
    ) {
        let (runner, _) = runner_with(ProjectionMode::Local);
        let runner = Arc::new(runner);
        (runner.clone(), routes(runner))
    }

    #[tokio::test]
    async fn lists_devices_in_insertion_order() {
        let (_, api) = bridge();
        let response = request().method("GET").path("/devices").reply(&api).await;
        assert_eq!(response.status(), StatusCode::OK);
        let devices: Vec<Device> = serde_json::from_slice(response.body()).unwrap();
        let ids: Vec<_> = devices.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn unknown_device_is_not_found() {
        let (_, api) = bridge();
        let response = request().method("GET").path("/devices/nope").reply(&api).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = request().method("DELETE").path("/devices/nope").reply(&api).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn register_then_frame_creates_marker() {
        let (runner, api) = bridge();
        request().method("GET").path("/frame").reply(&api).await;

        let response = request()
            .method("POST")
            .path("/devices/register")
            .json(&json!({ "identifier": "invalid-mac" }))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let device: Device = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(device.manufacturer, "Unknown");
        assert!(runner.device(&device.id).is_some());

        let response = request().method("GET").path("/frame").reply(&api).await;
        let frame: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(frame["mode"], "local");
        assert_eq!(frame["zones"].as_array().unwrap().len(), 6);
        let created = frame["plan"]["to_create"].as_array().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0]["device_id"], device.id.as_str());
    }

    #[tokio::test]
    async fn manual_entry_creates_device_with_fallback_name() {
        let (runner, api) = bridge();
        let response = request()
            .method("POST")
            .path("/devices")
            .json(&json!({ "macAddress": "", "zone": "Office North", "riskLevel": "Medium" }))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let device: Device = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(device.name, "Unnamed Device");
        assert_eq!(device.mac_address, "00:00:00:00:00:00");
        assert_eq!(device.zone, fleetcore::device::Zone::OfficeNorth);
        assert_eq!(runner.device(&device.id).unwrap().zone, device.zone);
        assert_eq!(runner.devices().len(), 6);
    }

    #[tokio::test]
    async fn edit_changes_descriptive_fields_only() {
        let (runner, api) = bridge();
        let before = runner.device("2").unwrap();
        let response = request()
            .method("PUT")
            .path("/devices/2")
            .json(&json!({ "name": "Lobby Sensor", "riskLevel": "High", "zone": "Parking Lot" }))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let after = runner.device("2").unwrap();
        assert_eq!(after.name, "Lobby Sensor");
        assert_eq!(after.zone, fleetcore::device::Zone::ParkingLot);
        assert_eq!(after.signal_strength, before.signal_strength);
        assert_eq!(after.first_seen, before.first_seen);
    }

    #[tokio::test]
    async fn delete_removes_device() {
        let (runner, api) = bridge();
        let response = request().method("DELETE").path("/devices/3").reply(&api).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(runner.device("3").is_none());
    }

    #[tokio::test]
    async fn summary_reports_counts_and_fallback() {
        let (_, api) = bridge();
        let response = request().method("GET").path("/summary").reply(&api).await;
        let view: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(view["summary"], SUMMARY_UNCONFIGURED);
        assert_eq!(view["counts"]["total"], 5);
        assert_eq!(view["counts"]["at_risk"], 2);
    }

    #[tokio::test]
    async fn session_endpoints_toggle_simulator() {
        let (runner, api) = bridge();
        let response = request().method("POST").path("/session/start").reply(&api).await;
        let view: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(view["changed"], true);
        assert!(runner.is_active());

        let response = request().method("POST").path("/session/start").reply(&api).await;
        let view: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(view["changed"], false);

        let response = request().method("POST").path("/session/stop").reply(&api).await;
        let view: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(view["changed"], true);
        assert!(!runner.is_active());

        let response = request().method("GET").path("/status").reply(&api).await;
        let view: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(view["active"], false);
    }
}
