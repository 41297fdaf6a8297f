use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::watch;
use tower::ServiceExt;

use bt_timer::{
    create_router,
    services::{Adapter, SimulatedAdapter},
    spawn_timer_service,
    state::{AppState, TimerEvent, TimerPhase},
    tasks::recv_event,
    TimerHandle,
};

struct Harness {
    app: Router,
    timer: TimerHandle,
    sim: SimulatedAdapter,
    _adapter_tx: watch::Sender<bt_timer::services::AdapterState>,
}

fn harness(sim: SimulatedAdapter) -> Harness {
    let adapter = Adapter::Simulated(sim.clone());
    let timer = spawn_timer_service(adapter.clone());
    let (adapter_tx, adapter_rx) = watch::channel(sim.state());
    let state = Arc::new(AppState::new(
        timer.clone(),
        adapter,
        adapter_rx,
        20554,
        "127.0.0.1".to_string(),
    ));

    Harness {
        app: create_router(state),
        timer,
        sim,
        _adapter_tx: adapter_tx,
    }
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn health_reports_ok() {
    let h = harness(SimulatedAdapter::new(true, true));
    let (status, body) = call(&h.app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn invalid_minutes_are_rejected_without_a_session() {
    let h = harness(SimulatedAdapter::new(true, true));

    for minutes in [json!(0), json!(""), json!(1000), json!("1000")] {
        let (status, body) =
            call(&h.app, "POST", "/timer/start", Some(json!({ "minutes": minutes }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "minutes={}", minutes);
        assert_eq!(body["status"], "error");
    }

    assert_eq!(h.timer.snapshot().phase, TimerPhase::Idle);
}

#[tokio::test]
async fn start_refused_when_bluetooth_is_off() {
    let h = harness(SimulatedAdapter::new(false, true));
    let (status, body) =
        call(&h.app, "POST", "/timer/start", Some(json!({ "minutes": 5 }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Bluetooth is already OFF");
    assert_eq!(h.timer.snapshot().phase, TimerPhase::Idle);
}

#[tokio::test]
async fn missing_adapter_is_unavailable() {
    let h = harness(SimulatedAdapter::absent());
    let (status, _) = call(&h.app, "POST", "/timer/start", Some(json!({ "minutes": 5 }))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test(start_paused = true)]
async fn start_is_idempotent_and_cancel_stops_it() {
    let h = harness(SimulatedAdapter::new(true, true));

    let (status, first) =
        call(&h.app, "POST", "/timer/start", Some(json!({ "minutes": "15" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "started");
    assert_eq!(first["session"]["duration_minutes"], 15);

    let (_, second) = call(&h.app, "POST", "/timer/start", Some(json!({ "minutes": 30 }))).await;
    assert_eq!(second["status"], "already_running");
    assert_eq!(second["session"]["ends_at"], first["session"]["ends_at"]);

    let (_, status_body) = call(&h.app, "GET", "/status", None).await;
    assert_eq!(status_body["timer"]["phase"], "running");
    assert_eq!(status_body["bluetooth"]["enabled"], true);
    assert_eq!(status_body["last_action"], "start");

    let (_, cancelled) = call(&h.app, "POST", "/timer/cancel", None).await;
    assert_eq!(cancelled["status"], "cancelled");
    let (_, again) = call(&h.app, "POST", "/timer/cancel", None).await;
    assert_eq!(again["status"], "not_running");

    assert_eq!(h.timer.snapshot().phase, TimerPhase::Cancelled);
    assert!(h.sim.state().enabled);
}

#[tokio::test(start_paused = true)]
async fn five_minute_session_turns_bluetooth_off() {
    let h = harness(SimulatedAdapter::new(true, true));
    let mut events = h.timer.subscribe();

    let (status, _) = call(&h.app, "POST", "/timer/start", Some(json!({ "minutes": 5 }))).await;
    assert_eq!(status, StatusCode::OK);

    let started = tokio::time::Instant::now();
    let mut completions = Vec::new();
    while let Some(event) = recv_event(&mut events).await {
        if let TimerEvent::Finished { success } = event {
            completions.push(success);
            break;
        }
    }

    assert_eq!(completions, [true]);
    assert_eq!(started.elapsed(), std::time::Duration::from_secs(300));
    assert!(!h.sim.state().enabled);

    let (_, status_body) = call(&h.app, "GET", "/status", None).await;
    assert_eq!(status_body["timer"]["phase"], "expired");
}

#[tokio::test(start_paused = true)]
async fn events_stream_follows_a_session_to_completion() {
    let h = harness(SimulatedAdapter::new(true, true));

    let request = Request::builder().uri("/events").body(Body::empty()).unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");
    let mut stream = response.into_body().into_data_stream();

    let (status, _) = call(&h.app, "POST", "/timer/start", Some(json!({ "minutes": 1 }))).await;
    assert_eq!(status, StatusCode::OK);

    let mut text = String::new();
    tokio::time::timeout(std::time::Duration::from_secs(120), async {
        while !text.contains("event: finished") {
            let chunk = stream.next().await.expect("stream ended").unwrap();
            text.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    })
    .await
    .expect("no finished event");

    let started = text.find("event: started").expect("no started event");
    let first_progress = text.find("event: progress").expect("no progress event");
    let finished = text.find("event: finished").unwrap();
    assert!(started < first_progress && first_progress < finished);
    assert!(text.contains(r#""remaining_ms":60000"#));
    assert!(text[finished..].contains(r#""success":true"#));
    assert!(!h.sim.state().enabled);
}
