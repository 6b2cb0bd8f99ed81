//! Fake push service standing in for the Expo API

use super::constants::*;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Default)]
struct Recorded {
    batches: Mutex<Vec<Vec<Value>>>,
    failing: AtomicBool,
}

/// Records every batch it receives and answers with one ticket per message.
pub struct FakePushService {
    pub send_url: String,
    recorded: Arc<Recorded>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

async fn receive(
    State(recorded): State<Arc<Recorded>>,
    Json(batch): Json<Vec<Value>>,
) -> (StatusCode, Json<Value>) {
    let size = batch.len();
    recorded.batches.lock().unwrap().push(batch);
    if recorded.failing.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"errors": [{"code": "INTERNAL_SERVER_ERROR"}]})),
        );
    }
    let tickets: Vec<Value> = (0..size)
        .map(|i| json!({"status": "ok", "id": format!("ticket-{}", i)}))
        .collect();
    (StatusCode::OK, Json(json!({ "data": tickets })))
}

impl FakePushService {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind push service port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let recorded = Arc::new(Recorded::default());
        let app = Router::new()
            .route(PUSH_SEND_PATH, post(receive))
            .with_state(recorded.clone());

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Push service failed");
        });

        Self {
            send_url: format!("http://127.0.0.1:{}{}", port, PUSH_SEND_PATH),
            recorded,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn batches(&self) -> Vec<Vec<Value>> {
        self.recorded.batches.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.recorded.failing.store(failing, Ordering::SeqCst);
    }
}

impl Drop for FakePushService {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
