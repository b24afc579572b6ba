//! HTTP surface tests driving the router in-process

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tomato_timer::{
    create_router,
    engine::EngineOptions,
    services::{AlertPolicy, BroadcastSink, NoFocus},
    spawn_engine, AppState, EngineParts, PresetStore,
};

fn app() -> Router {
    let engine = spawn_engine(EngineParts {
        presets: PresetStore::default(),
        policy: Box::new(AlertPolicy::default()),
        focus: Box::new(NoFocus),
        sink: Box::new(BroadcastSink::new(16)),
        options: EngineOptions::default(),
    });
    create_router(Arc::new(AppState::new(engine, 21025, "127.0.0.1".to_string())))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn start_pause_and_stop() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/start-stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "work");
    assert_eq!(body["timer"]["phase"], "work");
    assert_eq!(body["timer"]["currentWorkInterval"], 1);

    let (_, body) = send(&app, Method::POST, "/pause-resume", None).await;
    assert_eq!(body["status"], "paused");
    assert_eq!(body["timer"]["paused"], true);

    let (_, body) = send(&app, Method::POST, "/command/startstop", None).await;
    assert_eq!(body["timer"]["phase"], "idle");

    let (status, body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "idle");
    assert_eq!(body["last_action"], "start-stop");
    assert_eq!(body["port"], 21025);
}

#[tokio::test]
async fn skip_and_add_minutes() {
    let app = app();
    send(&app, Method::POST, "/start-stop", None).await;

    let (_, body) = send(&app, Method::POST, "/skip", None).await;
    assert_eq!(body["timer"]["phase"], "shortRest");
    assert_eq!(body["timer"]["timeLeft"], "05:00");

    let (_, body) = send(&app, Method::POST, "/add-minutes/2", None).await;
    assert_eq!(body["timer"]["timeLeft"], "07:00");

    let (_, body) = send(&app, Method::POST, "/command/addfiveminutes", None).await;
    assert_eq!(body["timer"]["timeLeft"], "12:00");
}

#[tokio::test]
async fn rejects_unknown_names() {
    let app = app();
    let (status, _) = send(&app, Method::POST, "/command/reboot", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, "/choice/later", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/intervals/nap/5", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn choice_without_pending_decision_is_noop() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/choice/next", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "idle");
}

#[tokio::test]
async fn preset_management() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/presets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current"], 0);
    assert_eq!(body["presets"].as_array().map(Vec::len), Some(4));

    let (status, body) = send(&app, Method::POST, "/presets/2/select", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["currentPreset"], 2);

    let (status, _) = send(&app, Method::POST, "/presets/7/select", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let preset = json!({ "workMinutes": 50.0, "shortRestMinutes": 10.0, "workIntervalsPerSet": 2 });
    let (status, body) = send(&app, Method::PUT, "/presets/current", Some(preset)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["timeLeft"], "50:00");
    assert_eq!(body["timer"]["display"], "50:00 (0/2)");

    let invalid = json!({ "workIntervalsPerSet": 0 });
    let (status, _) = send(&app, Method::PUT, "/presets/current", Some(invalid)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, Method::POST, "/intervals/work/45", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["timeLeft"], "45:00");

    let (status, _) = send(&app, Method::POST, "/intervals/work/121", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
