//!
//! maintrack HTTP server
//! ---------------------
//! Axum-based API for the tracker: registration/login, user administration,
//! CRUD over the four tracked-entity kinds and the dashboard aggregates.
//!
//! Responsibilities:
//! - Bearer-token authentication on every gated endpoint.
//! - Ownership-or-admin mutation via the generic repository.
//! - Error mapping through `AppError` into structured JSON responses.
//!
//! Handlers are plain async functions over `AppState`, so integration tests
//! exercise them directly without a network listener.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::identity::{self, TokenService};
use crate::models::{
    Defect, DefectCreate, DefectPatch, LoginRequest, Proposal, ProposalCreate, ProposalPatch,
    RegisterRequest, Release, ReleaseCreate, ReleasePatch, Remediation, RemediationCreate,
    RemediationPatch, TokenResponse, User, UserResponse,
};
use crate::repo::Repository;
use crate::security;
use crate::stats::{self, Stats};
use crate::store::SharedStore;

/// Shared server state injected into all handlers: the collection store and
/// the token service built from the process-wide signing secret. Constructed
/// once at startup; no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_parts(SharedStore::new(), TokenService::new(&config.jwt_secret))
    }

    /// Assemble from explicit parts; tests use this to control token validity.
    pub fn with_parts(store: SharedStore, tokens: TokenService) -> Self {
        AppState { store, tokens: Arc::new(tokens) }
    }

    fn authenticate(&self, headers: &HeaderMap) -> AppResult<User> {
        identity::authenticate(&self.tokens, &self.store.0.users, headers)
    }
}

/// Mount all routes onto a router carrying the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "maintrack ok" }))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", axum::routing::delete(delete_user))
        .route("/api/defects", post(create_defect).get(list_defects))
        .route("/api/defects/{id}", get(get_defect).put(update_defect).delete(delete_defect))
        .route("/api/remediations", post(create_remediation).get(list_remediations))
        .route("/api/remediations/{id}", get(get_remediation).put(update_remediation))
        .route("/api/releases", post(create_release).get(list_releases))
        .route("/api/releases/{id}", get(get_release).put(update_release))
        .route("/api/proposals", post(create_proposal).get(list_proposals))
        .route("/api/proposals/{id}", get(get_proposal).put(update_proposal))
        .route("/api/dashboard", get(dashboard))
        .with_state(state)
}

/// Start the HTTP server bound to the configured port.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = AppState::new(&config);
    let app = router(state);
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!("Starting maintrack on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// --- auth & users ---

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<TokenResponse>> {
    let users = &state.store.0.users;
    if users.find_where(|u| u.username == req.username || u.email == req.email).is_some() {
        return Err(AppError::user("duplicate_user", "username or email already registered"));
    }
    let password_hash = security::hash_password(&req.password)?;
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: req.username,
        email: req.email,
        password_hash,
        role: req.role,
        created_at: Utc::now(),
    };
    users.insert_one(user.clone());
    info!("user.register id={} username={}", user.id, user.username);
    let access_token = state.tokens.issue(&user.id)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
        user: UserResponse::from(&user),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    // One failure message for unknown user and wrong password alike.
    let user = state
        .store
        .0
        .users
        .find_where(|u| u.username == req.username)
        .filter(|u| security::verify_password(&u.password_hash, &req.password))
        .ok_or_else(|| AppError::auth("bad_credentials", "invalid username or password"))?;
    info!("user.login id={} username={}", user.id, user.username);
    let access_token = state.tokens.issue(&user.id)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
        user: UserResponse::from(&user),
    }))
}

pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<UserResponse>> {
    let user = state.authenticate(&headers)?;
    Ok(Json(UserResponse::from(&user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<UserResponse>>> {
    state.authenticate(&headers)?;
    let out = state.store.0.users.find_all().iter().map(UserResponse::from).collect();
    Ok(Json(out))
}

pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let caller = state.authenticate(&headers)?;
    identity::require_admin(&caller)?;
    // No cascade: records created by the deleted user keep their created_by.
    if state.store.0.users.delete_one(&id) {
        info!("user.delete id={} by={}", id, caller.id);
        Ok(Json(json!({"status": "ok", "message": "user deleted"})))
    } else {
        Err(AppError::not_found("not_found", "user not found"))
    }
}

// --- defects ---

pub async fn create_defect(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<DefectCreate>,
) -> AppResult<Json<Defect>> {
    let user = state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.defects).create(&user, payload)))
}

pub async fn list_defects(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Defect>>> {
    state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.defects).list()))
}

pub async fn get_defect(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<Defect>> {
    state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.defects).get(&id)?))
}

pub async fn update_defect(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<DefectPatch>,
) -> AppResult<Json<Defect>> {
    let user = state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.defects).update(&user, &id, patch)?))
}

pub async fn delete_defect(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let user = state.authenticate(&headers)?;
    Repository::new(&state.store.0.defects).delete(&user, &id)?;
    Ok(Json(json!({"status": "ok", "message": "defect deleted"})))
}

// --- remediations ---

pub async fn create_remediation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RemediationCreate>,
) -> AppResult<Json<Remediation>> {
    let user = state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.remediations).create(&user, payload)))
}

pub async fn list_remediations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Remediation>>> {
    state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.remediations).list()))
}

pub async fn get_remediation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<Remediation>> {
    state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.remediations).get(&id)?))
}

pub async fn update_remediation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<RemediationPatch>,
) -> AppResult<Json<Remediation>> {
    let user = state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.remediations).update(&user, &id, patch)?))
}

// --- releases ---

pub async fn create_release(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ReleaseCreate>,
) -> AppResult<Json<Release>> {
    let user = state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.releases).create(&user, payload)))
}

pub async fn list_releases(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Release>>> {
    state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.releases).list()))
}

pub async fn get_release(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<Release>> {
    state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.releases).get(&id)?))
}

pub async fn update_release(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<ReleasePatch>,
) -> AppResult<Json<Release>> {
    let user = state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.releases).update(&user, &id, patch)?))
}

// --- proposals ---

pub async fn create_proposal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ProposalCreate>,
) -> AppResult<Json<Proposal>> {
    let user = state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.proposals).create(&user, payload)))
}

pub async fn list_proposals(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Proposal>>> {
    state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.proposals).list()))
}

pub async fn get_proposal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<Proposal>> {
    state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.proposals).get(&id)?))
}

pub async fn update_proposal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<ProposalPatch>,
) -> AppResult<Json<Proposal>> {
    let user = state.authenticate(&headers)?;
    Ok(Json(Repository::new(&state.store.0.proposals).update(&user, &id, patch)?))
}

// --- dashboard ---

pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Stats>> {
    state.authenticate(&headers)?;
    Ok(Json(stats::compute(&state.store.0, Utc::now())))
}
