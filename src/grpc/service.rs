use chrono::Utc;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status, Streaming};

use super::proto;
use crate::auth::AuthError;
use crate::schema::UserProfile;
use crate::streams;
use crate::App;

/// The native RPC binding of the auth core.
#[derive(Debug, Clone)]
pub struct AuthGrpc {
    app: App,
}

impl AuthGrpc {
    #[must_use]
    pub fn new(app: App) -> Self {
        Self { app }
    }
}

fn to_proto_user(user: UserProfile) -> proto::User {
    proto::User {
        id: user.id.0,
        username: user.username,
        email: user.email,
        created_at: user.created_at.and_utc().to_rfc3339(),
    }
}

fn to_status(report: error_stack::Report<AuthError>) -> Status {
    match report.current_context() {
        AuthError::InvalidCredentials => Status::unauthenticated("Invalid credentials"),
        AuthError::InvalidToken | AuthError::TokenExpired | AuthError::UserNotFound => {
            Status::unauthenticated("Invalid or expired token")
        }
        AuthError::UsernameTaken => Status::invalid_argument("Username is already taken"),
        AuthError::Internal => {
            tracing::error!(report = ?report, "request failed unexpectedly");
            Status::internal("Internal server error")
        }
    }
}

fn bearer_from_metadata<T>(request: &Request<T>) -> Result<String, Status> {
    request
        .metadata()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            Status::unauthenticated("Authorization metadata with Bearer token is required")
        })
}

#[tonic::async_trait]
impl proto::auth_service_server::AuthService for AuthGrpc {
    #[tracing::instrument(skip_all, name = "grpc.login")]
    async fn login(
        &self,
        request: Request<proto::LoginRequest>,
    ) -> Result<Response<proto::LoginResponse>, Status> {
        let request = request.into_inner();
        if request.username.is_empty() || request.password.is_empty() {
            return Err(Status::invalid_argument(
                "Username and password are required",
            ));
        }

        let user = self
            .app
            .auth
            .authenticate(&request.username, &request.password)
            .await
            .map_err(to_status)?;
        let access_token = self.app.auth.login(&user).map_err(to_status)?;

        Ok(Response::new(proto::LoginResponse { access_token }))
    }

    #[tracing::instrument(skip_all, name = "grpc.get_profile")]
    async fn get_profile(
        &self,
        request: Request<proto::GetProfileRequest>,
    ) -> Result<Response<proto::GetProfileResponse>, Status> {
        let token = bearer_from_metadata(&request)?;
        let user = self.app.auth.get_profile(&token).await.map_err(to_status)?;

        Ok(Response::new(proto::GetProfileResponse {
            user: Some(to_proto_user(user)),
        }))
    }

    type StreamNotificationsStream = BoxStream<'static, Result<proto::Notification, Status>>;

    #[tracing::instrument(skip_all, name = "grpc.stream_notifications")]
    async fn stream_notifications(
        &self,
        request: Request<proto::StreamNotificationsRequest>,
    ) -> Result<Response<Self::StreamNotificationsStream>, Status> {
        let request = request.into_inner();

        // The feed does not consult the auth core; the access token is
        // carried along for the demo's sake only. A dropped response
        // stream takes the producer down with it.
        let stream = streams::feed(request.duration_seconds, CancellationToken::new())
            .map(|n| {
                Ok(proto::Notification {
                    id: n.id,
                    title: n.title,
                    message: n.message,
                    timestamp: n.timestamp,
                    r#type: n.kind,
                })
            })
            .boxed();

        Ok(Response::new(stream))
    }

    #[tracing::instrument(skip_all, name = "grpc.send_messages")]
    async fn send_messages(
        &self,
        request: Request<Streaming<proto::ClientMessage>>,
    ) -> Result<Response<proto::SendMessagesResponse>, Status> {
        let mut stream = request.into_inner();

        let mut processed = Vec::new();
        while let Some(message) = stream.message().await? {
            processed.push(message.message);
        }

        Ok(Response::new(proto::SendMessagesResponse {
            total_messages: processed.len() as u32,
            status: "success".to_owned(),
            processed_messages: processed,
        }))
    }

    type ChatStreamStream = BoxStream<'static, Result<proto::ChatMessage, Status>>;

    #[tracing::instrument(skip_all, name = "grpc.chat_stream")]
    async fn chat_stream(
        &self,
        request: Request<Streaming<proto::ChatMessage>>,
    ) -> Result<Response<Self::ChatStreamStream>, Status> {
        let stream = request
            .into_inner()
            .map(|message| {
                message.map(|m| proto::ChatMessage {
                    access_token: m.access_token,
                    username: streams::echo_sender(&m.username),
                    message: streams::echo_body(&m.message),
                    timestamp: Utc::now().to_rfc3339(),
                    room: m.room,
                })
            })
            .boxed();

        Ok(Response::new(stream))
    }
}
