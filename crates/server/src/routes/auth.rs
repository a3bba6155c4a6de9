use std::sync::Arc;

use axum::{
    extract::{Multipart, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use service::auth::domain::{LoginInput, SignupInput};
use service::auth::{AuthService, CredentialGate};
use service::domain::User;
use service::places::PlaceService;
use service::store::RecordStore;

use super::form::read_form;
use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService<dyn RecordStore>>,
    pub places: Arc<PlaceService>,
    pub gate: CredentialGate,
}

#[derive(Serialize)]
pub struct SessionOutput { pub user_id: Uuid, pub email: String, pub name: String, pub token: String }

#[derive(Serialize)]
pub struct UsersOutput { pub users: Vec<User> }

#[utoipa::path(get, path = "/api/users", tag = "users", responses((status = 200, description = "All users, without password hashes")))]
pub async fn list_users(State(state): State<ServerState>) -> Result<Json<UsersOutput>, JsonApiError> {
    let users = state.auth.list_users().await?;
    Ok(Json(UsersOutput { users }))
}

#[utoipa::path(post, path = "/api/users/signup", tag = "users", request_body(content = crate::openapi::SignupForm, content_type = "multipart/form-data"), responses((status = 201, description = "Signed up"), (status = 409, description = "Email already registered"), (status = 422, description = "Validation failed")))]
pub async fn signup(State(state): State<ServerState>, mp: Multipart) -> Result<(StatusCode, Json<SessionOutput>), JsonApiError> {
    let form = read_form(mp).await?;
    let input = SignupInput {
        name: form.text("name"),
        email: form.text("email"),
        password: form.text("password"),
        image: form.image,
    };
    let session = state.auth.signup(input).await?;
    let out = SessionOutput { user_id: session.user.id, email: session.user.email, name: session.user.name, token: session.token };
    Ok((StatusCode::CREATED, Json(out)))
}

#[utoipa::path(post, path = "/api/users/login", tag = "users", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged in"), (status = 401, description = "Invalid credentials")))]
pub async fn login(State(state): State<ServerState>, Json(input): Json<LoginInput>) -> Result<Json<SessionOutput>, JsonApiError> {
    let session = state.auth.login(input).await?;
    Ok(Json(SessionOutput { user_id: session.user.id, email: session.user.email, name: session.user.name, token: session.token }))
}

/// Gate middleware: verify `Authorization: Bearer <token>` and attach the
/// resulting `Identity` as a request extension. Pre-flight requests pass
/// through without one.
pub async fn require_identity(State(state): State<ServerState>, mut req: Request, next: Next) -> Result<Response, JsonApiError> {
    let outcome = state.gate.authenticate(
        req.method().as_str(),
        req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
    );
    match outcome {
        Ok(Some(identity)) => {
            req.extensions_mut().insert(identity);
            Ok(next.run(req).await)
        }
        Ok(None) => Ok(next.run(req).await),
        Err(e) => {
            warn!(path = %req.uri().path(), error = %e, "request rejected by credential gate");
            Err(e.into())
        }
    }
}
