//! In-process HTTP doubles shared by the unit tests.

use crate::analysis::{ANALYZE_PATH, VIDEO_FIELD};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// What the fake engine (or fake relay) answers
#[derive(Clone)]
pub(crate) enum MockBehavior {
    Respond(serde_json::Value),
    Fail(StatusCode, serde_json::Value),
    Stall(Duration),
    NotJson,
}

/// One multipart upload as seen by the fake server
#[derive(Debug, Clone, Default)]
pub(crate) struct ReceivedUpload {
    pub field_name: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    /// Files present in the watched directory while the request was handled
    pub staged_files: Vec<String>,
}

#[derive(Clone)]
struct MockState {
    behavior: Arc<Mutex<MockBehavior>>,
    watch_dir: Option<PathBuf>,
    received: Arc<Mutex<Vec<ReceivedUpload>>>,
}

pub(crate) struct MockServer {
    pub addr: SocketAddr,
    behavior: Arc<Mutex<MockBehavior>>,
    received: Arc<Mutex<Vec<ReceivedUpload>>>,
}

impl MockServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.received.lock().len()
    }

    pub fn received(&self) -> Vec<ReceivedUpload> {
        self.received.lock().clone()
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock() = behavior;
    }
}

pub(crate) fn sample_result_json() -> serde_json::Value {
    serde_json::json!({
        "processedVideo": "AAA=",
        "avgUpperBodyAngle": 12.34,
        "avgBackLegAngle": 56.78,
        "avgFrontLegAngle": 90.12,
    })
}

/// Serve `app` on an ephemeral localhost port
pub(crate) async fn spawn_router(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A localhost address with nothing listening on it
pub(crate) async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Fake pose engine (or relay) answering `POST /analyze-pose-video`
pub(crate) async fn spawn_mock_server(
    behavior: MockBehavior,
    watch_dir: Option<PathBuf>,
) -> MockServer {
    let received = Arc::new(Mutex::new(Vec::new()));
    let behavior = Arc::new(Mutex::new(behavior));
    let state = MockState {
        behavior: Arc::clone(&behavior),
        watch_dir,
        received: Arc::clone(&received),
    };

    let app = Router::new()
        .route(ANALYZE_PATH, post(mock_analyze))
        .with_state(state);

    MockServer {
        addr: spawn_router(app).await,
        behavior,
        received,
    }
}

async fn mock_analyze(State(state): State<MockState>, mut multipart: Multipart) -> Response {
    let mut upload = ReceivedUpload::default();

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }
        upload.field_name = field.name().map(str::to_string);
        upload.file_name = field.file_name().map(str::to_string);
        upload.content_type = field.content_type().map(str::to_string);
        upload.data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
    }

    if let Some(dir) = &state.watch_dir {
        if let Ok(entries) = std::fs::read_dir(dir) {
            upload.staged_files = entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect();
        }
    }

    state.received.lock().push(upload);

    let behavior = state.behavior.lock().clone();
    match behavior {
        MockBehavior::Respond(body) => (StatusCode::OK, Json(body)).into_response(),
        MockBehavior::Fail(status, body) => (status, Json(body)).into_response(),
        MockBehavior::Stall(delay) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, Json(sample_result_json())).into_response()
        }
        MockBehavior::NotJson => (StatusCode::OK, "<html>oops</html>").into_response(),
    }
}
