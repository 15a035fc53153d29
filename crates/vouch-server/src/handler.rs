use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;
use vouch_protocol::{content_types, HealthResponse};
use vouch_types::{NewUser, TypeError, UserPatch, UserRecord};

use crate::error::{ApiError, ServerError, ServerResult};
use crate::response::Envelope;
use crate::state::AppState;
use crate::stats::{DayCount, GRAPH_DAYS};

type ApiResult<T> = Result<T, ApiError>;

fn parse_id(raw: &str) -> ServerResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| TypeError::InvalidId(raw.to_string()).into())
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ServerResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ServerError::BadRequest(e.body_text()))
}

pub async fn health() -> Json<Envelope<HealthResponse>> {
    Json(Envelope::ok("Service is healthy", HealthResponse::default()))
}

/// The server's public key as PEM text.
pub async fn public_key(State(state): State<AppState>, uri: Uri) -> ApiResult<impl IntoResponse> {
    let pem = state
        .keys()
        .public_key_pem()
        .map_err(|e| ServerError::from(e).at(uri.path()))?;
    Ok(([(header::CONTENT_TYPE, content_types::PUBLIC_KEY)], pem.to_string()))
}

pub async fn list_users(State(state): State<AppState>, uri: Uri) -> ApiResult<Json<Envelope<Vec<UserRecord>>>> {
    let users = state.users().list().map_err(|e| e.at(uri.path()))?;
    Ok(Json(Envelope::ok("Users retrieved", users)))
}

pub async fn get_user(
    State(state): State<AppState>,
    uri: Uri,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<UserRecord>>> {
    let user = parse_id(&id)
        .and_then(|id| state.users().get(id))
        .map_err(|e| e.at(uri.path()))?;
    Ok(Json(Envelope::ok("User retrieved", user)))
}

pub async fn create_user(
    State(state): State<AppState>,
    uri: Uri,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<UserRecord>>)> {
    let user = body(payload)
        .and_then(|input| state.users().create(&input))
        .map_err(|e| e.at(uri.path()))?;
    Ok((StatusCode::CREATED, Json(Envelope::ok("User created", user))))
}

pub async fn update_user(
    State(state): State<AppState>,
    uri: Uri,
    Path(id): Path<String>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> ApiResult<Json<Envelope<UserRecord>>> {
    let update = |id: &str| -> ServerResult<UserRecord> {
        let id = parse_id(id)?;
        let patch = body(payload)?;
        state.users().update(id, &patch)
    };
    let user = update(&id).map_err(|e| e.at(uri.path()))?;
    Ok(Json(Envelope::ok("User updated", user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    uri: Uri,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<()>>> {
    parse_id(&id)
        .and_then(|id| state.users().delete(id))
        .map_err(|e| e.at(uri.path()))?;
    Ok(Json(Envelope::ok("User deleted", ())))
}

/// Users created per day over the last week.
pub async fn user_stats(State(state): State<AppState>, uri: Uri) -> ApiResult<Json<Envelope<Vec<DayCount>>>> {
    let stats = state
        .users()
        .stats_last_days(GRAPH_DAYS)
        .map_err(|e| e.at(uri.path()))?;
    Ok(Json(Envelope::ok("User graph computed", stats)))
}

/// All users as one protobuf `Batch`.
pub async fn export_users(State(state): State<AppState>, uri: Uri) -> ApiResult<impl IntoResponse> {
    let bytes = state.users().export().map_err(|e| e.at(uri.path()))?;
    Ok(([(header::CONTENT_TYPE, content_types::EXPORT)], bytes))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ServerError::NotFound(format!("no route for {}", uri.path())).at(uri.path())
}
