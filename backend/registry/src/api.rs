//! Axum REST API handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::codec::OpaqueValue;
use crate::errors::RegistryError;
use crate::forum::ForumStore;
use crate::notice::Notice;
use crate::projects::{ProjectStats, ProjectStore};
use crate::records::{ForumPost, NewProject, Project};
use crate::reveal::{PresignedSigner, RevealProtocol, RevealSession};
use crate::store::OpaqueStore;

pub type SharedStore = Arc<dyn OpaqueStore>;

pub struct ApiState {
    pub projects: ProjectStore<SharedStore>,
    pub forum: ForumStore<SharedStore>,
    pub session: RevealSession,
    pub reveal_delay: Duration,
}

impl ApiState {
    pub fn new(store: SharedStore, session: RevealSession, reveal_delay: Duration) -> Self {
        Self {
            projects: ProjectStore::new(store.clone()),
            forum: ForumStore::new(store),
            session,
            reveal_delay,
        }
    }
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id/vote", post(vote_project))
        .route("/forum", get(list_posts).post(create_post))
        .route("/reveal/challenge", get(reveal_challenge))
        .route("/reveal", post(reveal))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub proposer: String,
    #[serde(flatten)]
    pub project: NewProject,
}

#[derive(Deserialize)]
pub struct VoteRequest {
    pub support: bool,
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub author: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct RevealRequest {
    pub value: OpaqueValue,
    /// Signature over the current challenge, produced by the caller's wallet.
    pub signature: Option<String>,
}

#[derive(Serialize)]
pub struct ProjectsResponse {
    pub count: usize,
    pub stats: ProjectStats,
    pub projects: Vec<Project>,
}

#[derive(Serialize)]
pub struct PostsResponse {
    pub count: usize,
    pub posts: Vec<ForumPost>,
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: String,
    pub notice: Notice,
}

#[derive(Serialize)]
pub struct VoteResponse {
    pub project: Project,
    pub notice: Notice,
}

#[derive(Serialize)]
pub struct ChallengeResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct RevealResponse {
    pub value: Option<f64>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub notice: Notice,
}

fn error_status(e: &RegistryError) -> StatusCode {
    match e {
        RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
        RegistryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        RegistryError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(action: &str, e: RegistryError) -> Response {
    (
        error_status(&e),
        Json(ErrorResponse {
            error: e.to_string(),
            notice: Notice::failure(action, &e),
        }),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /projects`
///
/// Every readable project, newest first, with status counts.
pub async fn list_projects(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let projects = state.projects.list().await;
    Json(ProjectsResponse {
        count: projects.len(),
        stats: ProjectStats::from_projects(&projects),
        projects,
    })
}

/// `POST /projects`
pub async fn create_project(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<CreateProjectRequest>,
) -> Response {
    match state.projects.create(&req.proposer, req.project).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(CreatedResponse {
                id,
                notice: Notice::success("Encrypted project submitted securely!"),
            }),
        )
            .into_response(),
        Err(e) => error_response("Submission", e),
    }
}

/// `POST /projects/:id/vote`
pub async fn vote_project(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> Response {
    match state.projects.vote(&id, req.support).await {
        Ok(project) => Json(VoteResponse {
            project,
            notice: Notice::success("Vote recorded successfully!"),
        })
        .into_response(),
        Err(e) => error_response("Voting", e),
    }
}

/// `GET /forum`
pub async fn list_posts(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let posts = state.forum.list().await;
    Json(PostsResponse {
        count: posts.len(),
        posts,
    })
}

/// `POST /forum`
pub async fn create_post(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<CreatePostRequest>,
) -> Response {
    match state.forum.create(&req.author, &req.content).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(CreatedResponse {
                id,
                notice: Notice::success("Post published"),
            }),
        )
            .into_response(),
        Err(e) => error_response("Post", e),
    }
}

/// `GET /reveal/challenge`
///
/// The message a wallet must sign before `POST /reveal` will decode a value.
pub async fn reveal_challenge(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    Json(ChallengeResponse {
        message: state.session.challenge(),
    })
}

/// `POST /reveal`
///
/// `value` is `null` unless a signature accompanies the request.
pub async fn reveal(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<RevealRequest>,
) -> impl IntoResponse {
    let protocol = RevealProtocol::new(state.session.clone(), PresignedSigner::new(req.signature))
        .with_delay(state.reveal_delay);
    Json(RevealResponse {
        value: protocol.reveal(&req.value).await,
    })
}
