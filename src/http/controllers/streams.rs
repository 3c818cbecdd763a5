use actix_web::web::{self, Bytes};
use actix_web::HttpResponse;
use chrono::Utc;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::http::error::Result;
use crate::http::Bearer;
use crate::streams;
use crate::App;

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    pub duration_seconds: u32,
}

/// Server push: one canned notification per second over SSE, closed
/// by a terminal `{"type":"end"}` event.
///
/// When the client goes away actix drops the response body stream,
/// which drops the feed receiver and shuts the producer down with it.
#[tracing::instrument(skip_all, name = "http.stream_notifications")]
pub async fn notifications(
    app: web::Data<App>,
    bearer: Bearer,
    query: web::Query<NotificationsQuery>,
) -> Result<HttpResponse> {
    app.auth.verify_token(&bearer.0)?;

    let feed = streams::feed(query.duration_seconds, CancellationToken::new());
    let body = feed
        .map(|notification| sse_event(&notification))
        .chain(futures::stream::once(async { sse_end() }))
        .map(Ok::<_, actix_web::Error>);

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(body))
}

fn sse_event(notification: &streams::Notification) -> Bytes {
    // This shape cannot fail to serialize.
    let payload = serde_json::to_string(notification).unwrap_or_default();
    Bytes::from(format!("data: {payload}\n\n"))
}

fn sse_end() -> Bytes {
    Bytes::from_static(b"data: {\"type\":\"end\"}\n\n")
}

#[derive(Debug, Deserialize)]
pub struct ClientMessage {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessagesRequest {
    #[serde(default)]
    pub messages: Vec<ClientMessage>,
}

#[derive(Debug, Serialize)]
pub struct SendMessagesResponse {
    pub total_messages: usize,
    pub status: &'static str,
    pub processed_messages: Vec<String>,
}

/// Batch intake: counts and echoes back everything the client sent.
#[tracing::instrument(skip_all, name = "http.send_messages")]
pub async fn send_messages(
    app: web::Data<App>,
    bearer: Bearer,
    form: web::Json<SendMessagesRequest>,
) -> Result<HttpResponse> {
    app.auth.verify_token(&bearer.0)?;

    let processed: Vec<String> = form
        .into_inner()
        .messages
        .into_iter()
        .map(|m| m.message)
        .collect();

    Ok(HttpResponse::Ok().json(SendMessagesResponse {
        total_messages: processed.len(),
        status: "success",
        processed_messages: processed,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub room: String,
}

/// Stateless echo with a rewritten sender identity.
#[tracing::instrument(skip_all, name = "http.chat_stream")]
pub async fn chat_stream(
    app: web::Data<App>,
    bearer: Bearer,
    form: web::Json<ChatMessageRequest>,
) -> Result<HttpResponse> {
    app.auth.verify_token(&bearer.0)?;

    let form = form.into_inner();
    Ok(HttpResponse::Ok().json(json!({
        "username": streams::echo_sender(&form.username),
        "message": streams::echo_body(&form.message),
        "timestamp": Utc::now().to_rfc3339(),
        "room": form.room,
    })))
}
