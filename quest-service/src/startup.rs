use axum::{
    middleware::from_fn,
    routing::{delete, get, patch, post, put},
    Router,
};
use dashmap::DashMap;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use service_core::error::AppError;
use service_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};

use crate::config::QuestConfig;
use crate::handlers;
use crate::services::{CaseService, InvitationService, QuestService, QuizSession, Store};

#[derive(Clone)]
pub struct AppState {
    pub config: QuestConfig,
    pub store: Store,
    pub cases: CaseService,
    pub quests: QuestService,
    pub invitations: InvitationService,
    /// In-flight quiz sessions, keyed by session id. Ephemeral by design.
    pub sessions: Arc<DashMap<Uuid, QuizSession>>,
}

impl AppState {
    pub fn new(config: QuestConfig) -> Self {
        let store = Store::new();
        let quests = QuestService::new(store.clone());
        Self {
            cases: CaseService::new(store.clone()),
            invitations: InvitationService::new(store.clone(), quests.clone()),
            quests,
            store,
            config,
            sessions: Arc::new(DashMap::new()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/principals", put(handlers::principals::upsert_principal))
        .route("/api/principals/me", get(handlers::principals::get_me))
        .route(
            "/api/quests",
            post(handlers::quests::create_quest).get(handlers::quests::list_quests),
        )
        .route(
            "/api/quests/authorable",
            get(handlers::quests::list_authorable_quests),
        )
        .route("/api/quests/:quest_id", get(handlers::quests::get_quest))
        .route(
            "/api/quests/:quest_id/cases",
            get(handlers::quests::list_quest_cases).post(handlers::quests::add_case_to_quest),
        )
        .route(
            "/api/quests/:quest_id/cases/:case_id",
            delete(handlers::quests::remove_case_from_quest),
        )
        .route(
            "/api/quests/:quest_id/reorder",
            post(handlers::quests::reorder_quest),
        )
        .route(
            "/api/quests/:quest_id/access-tokens",
            get(handlers::invitations::list_quest_tokens),
        )
        .route(
            "/api/quest-access-tokens",
            post(handlers::invitations::issue_token),
        )
        .route(
            "/api/invitations/:token/redeem",
            post(handlers::invitations::redeem_token),
        )
        .route(
            "/api/cases",
            post(handlers::cases::create_case),
        )
        .route("/api/cases/mine", get(handlers::cases::my_cases))
        .route(
            "/api/cases/:case_id",
            patch(handlers::cases::update_case).delete(handlers::cases::delete_case),
        )
        .route(
            "/api/quests/:quest_id/sessions",
            post(handlers::sessions::start_session),
        )
        .route(
            "/api/sessions/:session_id",
            get(handlers::sessions::get_session).delete(handlers::sessions::abandon_session),
        )
        .route(
            "/api/sessions/:session_id/submit",
            post(handlers::sessions::submit_answer),
        )
        .route(
            "/api/sessions/:session_id/advance",
            post(handlers::sessions::advance_session),
        )
        .route(
            "/api/sessions/:session_id/previous",
            post(handlers::sessions::previous_session),
        )
        .route(
            "/api/sessions/:session_id/finish",
            post(handlers::sessions::finish_session),
        )
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: QuestConfig) -> Result<Self, AppError> {
        let state = AppState::new(config.clone());
        let app = build_router(state.clone());

        let addr = format!("{}:{}", config.common.host, config.common.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
