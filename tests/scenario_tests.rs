//! End-to-end scenario across the whole surface: two registrations, an
//! ownership-scoped update, an unauthenticated dashboard attempt and user
//! deletion with the documented token-staleness behavior.

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::Json;

use maintrack::identity::TokenService;
use maintrack::models::{
    DefectCreate, DefectPatch, DefectStatus, Priority, RegisterRequest, Role, TokenResponse,
};
use maintrack::server::{self, AppState};
use maintrack::store::SharedStore;

fn auth_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
}

async fn register(state: &AppState, username: &str, password: &str, role: Role) -> TokenResponse {
    let req = RegisterRequest {
        username: username.into(),
        email: format!("{username}@example.com"),
        password: password.into(),
        role,
    };
    server::register(State(state.clone()), Json(req))
        .await
        .expect("register should succeed")
        .0
}

#[tokio::test]
async fn full_lifecycle_scenario() -> Result<()> {
    let state = AppState::with_parts(SharedStore::new(), TokenService::new("scenario-secret"));

    // Register admin "a" and contributor "b".
    let a = register(&state, "a", "pw1", Role::Admin).await;
    let b = register(&state, "b", "pw2", Role::Contributor).await;
    assert_eq!(a.user.role, Role::Admin);
    assert_eq!(b.user.role, Role::Contributor);

    // "b" creates a defect.
    let defect = server::create_defect(
        State(state.clone()),
        auth_headers(&b.access_token),
        Json(DefectCreate {
            title: "login page 500s".into(),
            description: "stack trace attached".into(),
            priority: Priority::High,
            assigned_to: None,
        }),
    )
    .await?
    .0;
    assert_eq!(defect.status, DefectStatus::Open);
    assert_eq!(defect.created_by, b.user.id);

    // "b" moves it to in_progress; the mutation succeeds as the owner.
    let updated = server::update_defect(
        State(state.clone()),
        auth_headers(&b.access_token),
        Path(defect.id.clone()),
        Json(DefectPatch { status: Some(DefectStatus::InProgress), ..Default::default() }),
    )
    .await?
    .0;
    assert_eq!(updated.status, DefectStatus::InProgress);
    assert_eq!(updated.title, "login page 500s");

    // An unauthenticated caller cannot fetch the dashboard.
    let err = server::dashboard(State(state.clone()), HeaderMap::new()).await.unwrap_err();
    assert_eq!(err.http_status(), 401);

    // Admin "a" deletes user "b".
    server::delete_user(
        State(state.clone()),
        auth_headers(&a.access_token),
        Path(b.user.id.clone()),
    )
    .await?;

    // The token issued to "b" is still inside its validity window, but the
    // resolver re-reads the user collection on every request, so it fails
    // immediately after deletion. That is the one deterministic behavior the
    // service commits to for stale identities.
    let err = server::me(State(state.clone()), auth_headers(&b.access_token)).await.unwrap_err();
    assert_eq!(err.http_status(), 401);

    // The defect "b" created is orphaned but still present and admin-mutable.
    let stats = server::dashboard(State(state.clone()), auth_headers(&a.access_token)).await?.0;
    assert_eq!(stats.total_defects, 1);
    assert_eq!(stats.total_users, 1);

    let resolved = server::update_defect(
        State(state.clone()),
        auth_headers(&a.access_token),
        Path(defect.id),
        Json(DefectPatch { status: Some(DefectStatus::Resolved), ..Default::default() }),
    )
    .await?
    .0;
    assert_eq!(resolved.status, DefectStatus::Resolved);
    assert_eq!(resolved.created_by, b.user.id);
    Ok(())
}
