use anyhow::{Context, Result};

use tracing::{error, info};

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;

use super::{error::RelayError, log_requests, state::*, ServerConfig};
use crate::push::{is_expo_push_token, send_in_chunks, PushMessage};

const DEFAULT_CALL_TYPE: &str = "voice";

#[derive(Deserialize, Debug)]
struct RegisterTokenBody {
    pub token: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SendCallBody {
    pub caller: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub target_token: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SendMessageBody {
    pub sender: Option<String>,
    pub message: Option<String>,
    pub target_token: Option<String>,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
    message: String,
}

#[derive(Serialize)]
struct SendResponse {
    success: bool,
    message: String,
    tickets: Vec<Value>,
}

#[derive(Serialize)]
struct TokensResponse {
    tokens: Vec<String>,
    count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    message: String,
    timestamp: String,
    registered_devices: usize,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// The explicit target if given, every registered token otherwise. Invalid
/// tokens are logged and left out.
fn recipients(state: &ServerState, target_token: Option<String>) -> Result<Vec<String>> {
    let candidates = match non_empty(target_token) {
        Some(token) => vec![token],
        None => state.tokens.tokens()?,
    };
    Ok(candidates
        .into_iter()
        .filter(|token| {
            let valid = is_expo_push_token(token);
            if !valid {
                error!("Push token {} is not a valid Expo push token", token);
            }
            valid
        })
        .collect())
}

async fn register_token(
    State(state): State<ServerState>,
    Json(body): Json<RegisterTokenBody>,
) -> Result<Json<SuccessResponse>, RelayError> {
    let token = body
        .token
        .filter(|t| is_expo_push_token(t))
        .ok_or(RelayError::InvalidToken)?;

    state.tokens.register(&token)?;
    info!("Registered token: {}", token);

    Ok(Json(SuccessResponse {
        success: true,
        message: "Token registered successfully".to_string(),
    }))
}

async fn send_call_notification(
    State(state): State<ServerState>,
    Json(body): Json<SendCallBody>,
) -> Result<Json<SendResponse>, RelayError> {
    let caller = non_empty(body.caller).ok_or(RelayError::MissingCaller)?;
    let kind = body.kind.unwrap_or_else(|| DEFAULT_CALL_TYPE.to_string());

    let messages: Vec<PushMessage> = recipients(&state, body.target_token)?
        .iter()
        .map(|token| PushMessage::incoming_call(token, &caller, &kind))
        .collect();
    let tickets = send_in_chunks(state.push_provider.as_ref(), &messages).await;

    Ok(Json(SendResponse {
        success: true,
        message: format!("Call notification sent to {} device(s)", messages.len()),
        tickets,
    }))
}

async fn send_message_notification(
    State(state): State<ServerState>,
    Json(body): Json<SendMessageBody>,
) -> Result<Json<SendResponse>, RelayError> {
    let (sender, message) = match (non_empty(body.sender), non_empty(body.message)) {
        (Some(sender), Some(message)) => (sender, message),
        _ => return Err(RelayError::MissingSenderOrMessage),
    };

    let messages: Vec<PushMessage> = recipients(&state, body.target_token)?
        .iter()
        .map(|token| PushMessage::new_message(token, &sender, &message))
        .collect();
    let tickets = send_in_chunks(state.push_provider.as_ref(), &messages).await;

    Ok(Json(SendResponse {
        success: true,
        message: format!("Message notification sent to {} device(s)", messages.len()),
        tickets,
    }))
}

async fn get_tokens(
    State(tokens): State<GuardedTokenRegistry>,
) -> Result<Json<TokensResponse>, RelayError> {
    let tokens = tokens.tokens()?;
    Ok(Json(TokensResponse {
        count: tokens.len(),
        tokens,
    }))
}

async fn get_status(
    State(tokens): State<GuardedTokenRegistry>,
) -> Result<Json<StatusResponse>, RelayError> {
    Ok(Json(StatusResponse {
        message: "Notification relay is running!".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        registered_devices: tokens.len()?,
    }))
}

pub fn make_app(config: ServerConfig, push_provider: GuardedPushProvider) -> Router {
    let state = ServerState::new(config.clone(), push_provider);

    let api_routes: Router = Router::new()
        .route("/register-token", post(register_token))
        .route("/send-call-notification", post(send_call_notification))
        .route("/send-message-notification", post(send_message_notification))
        .route("/tokens", get(get_tokens))
        .route("/test", get(get_status))
        .with_state(state.clone());

    let mut app: Router = Router::new().nest("/api", api_routes);

    if config.cors_enabled {
        app = app.layer(CorsLayer::permissive());
    }
    app.layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(config: ServerConfig, push_provider: GuardedPushProvider) -> Result<()> {
    let port = config.port;
    let app = make_app(config, push_provider);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    info!("Notification relay running on port {}", port);
    info!("   GET  http://localhost:{}/api/test", port);
    info!("   POST http://localhost:{}/api/register-token", port);
    info!("   POST http://localhost:{}/api/send-call-notification", port);
    info!("   POST http://localhost:{}/api/send-message-notification", port);
    info!("   GET  http://localhost:{}/api/tokens", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", err);
            }
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::PushProvider;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt; // for `oneshot`

    #[derive(Default)]
    struct RecordingProvider {
        sent: Mutex<Vec<Vec<PushMessage>>>,
    }

    #[async_trait]
    impl PushProvider for RecordingProvider {
        async fn send(&self, messages: &[PushMessage]) -> anyhow::Result<Vec<Value>> {
            self.sent.lock().unwrap().push(messages.to_vec());
            Ok(messages.iter().map(|_| json!({"status": "ok"})).collect())
        }
    }

    fn app() -> (Arc<RecordingProvider>, Router) {
        let provider = Arc::new(RecordingProvider::default());
        let config = ServerConfig {
            requests_logging_level: super::super::RequestsLoggingLevel::None,
            ..Default::default()
        };
        (provider.clone(), make_app(config, provider))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn register_token_validates() {
        let (_, app) = app();

        let (status, body) = send(&app, post_json("/api/register-token", json!({"token": "nope"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid token"}));

        let (status, _) = send(&app, post_json("/api/register-token", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            post_json("/api/register-token", json!({"token": "ExponentPushToken[abc]"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"success": true, "message": "Token registered successfully"})
        );
    }

    #[tokio::test]
    async fn tokens_are_a_set() {
        let (_, app) = app();
        for token in ["ExpoPushToken[a]", "ExpoPushToken[b]", "ExpoPushToken[a]"] {
            send(&app, post_json("/api/register-token", json!({ "token": token }))).await;
        }

        let (status, body) = send(&app, get("/api/tokens")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"tokens": ["ExpoPushToken[a]", "ExpoPushToken[b]"], "count": 2})
        );
    }

    #[tokio::test]
    async fn call_notification_requires_caller() {
        let (provider, app) = app();
        let (status, body) = send(
            &app,
            post_json("/api/send-call-notification", json!({"caller": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Caller name is required"}));
        assert!(provider.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn call_notification_fans_out_to_registered_tokens() {
        let (provider, app) = app();
        for token in ["ExpoPushToken[a]", "ExpoPushToken[b]"] {
            send(&app, post_json("/api/register-token", json!({ "token": token }))).await;
        }

        let (status, body) = send(
            &app,
            post_json("/api/send-call-notification", json!({"caller": "John Doe"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Call notification sent to 2 device(s)");
        assert_eq!(body["tickets"].as_array().unwrap().len(), 2);

        let sent = provider.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0][0].title, "Incoming voice call");
        assert_eq!(
            sent[0][1].data["deepLink"],
            "myapp://call/incoming?caller=John%20Doe&type=voice"
        );
    }

    #[tokio::test]
    async fn target_token_overrides_registry_and_invalid_is_skipped() {
        let (provider, app) = app();
        send(
            &app,
            post_json("/api/register-token", json!({"token": "ExpoPushToken[a]"})),
        )
        .await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/send-call-notification",
                json!({"caller": "Bob", "type": "video", "targetToken": "garbage"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Call notification sent to 0 device(s)");
        assert!(provider.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn message_notification_validates_and_sends() {
        let (provider, app) = app();

        let (status, body) = send(
            &app,
            post_json("/api/send-message-notification", json!({"sender": "Alice"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Sender and message are required"}));

        let (status, body) = send(
            &app,
            post_json(
                "/api/send-message-notification",
                json!({"sender": "Alice", "message": "Hi", "targetToken": "ExpoPushToken[t]"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Message notification sent to 1 device(s)");

        let sent = provider.sent.lock().unwrap();
        assert_eq!(sent[0][0].to, "ExpoPushToken[t]");
        assert_eq!(sent[0][0].channel_id.as_deref(), Some("message-notifications"));
    }

    #[tokio::test]
    async fn status_endpoint_reports_device_count() {
        let (_, app) = app();
        send(
            &app,
            post_json("/api/register-token", json!({"token": "ExpoPushToken[a]"})),
        )
        .await;

        let (status, body) = send(&app, get("/api/test")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["registeredDevices"], 1);
        assert!(body["message"].is_string());
        assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let (_, app) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/register-token")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert!(status.is_client_error());
    }
}
