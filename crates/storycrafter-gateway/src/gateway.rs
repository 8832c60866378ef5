//! Main Gateway implementation
//!
//! Shared state, the axum router and the server lifecycle.

use axum::http::HeaderValue;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use storycrafter_agent::{ArtifactAssembler, InvokerFactory};
use storycrafter_core::storage::StoryStore;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth::TokenIssuer;
use crate::config::{CorsSettings, GatewayConfig};
use crate::{GatewayError, Result};

/// Gateway state shared across handlers
#[derive(Debug)]
pub struct GatewayState {
    pub config: GatewayConfig,
    /// Never held across an `.await`
    pub store: Mutex<StoryStore>,
    pub assembler: ArtifactAssembler,
    pub tokens: TokenIssuer,
}

impl GatewayState {
    pub fn new(config: GatewayConfig, store: StoryStore, factory: Arc<dyn InvokerFactory>) -> Self {
        let assembler = ArtifactAssembler::new(factory, config.generation.clone());
        let tokens = TokenIssuer::new(&config.auth);

        Self {
            config,
            store: Mutex::new(store),
            assembler,
            tokens,
        }
    }
}

/// Main Gateway
#[derive(Debug)]
pub struct Gateway {
    state: Arc<GatewayState>,
}

impl Gateway {
    pub fn new(config: GatewayConfig, store: StoryStore, factory: Arc<dyn InvokerFactory>) -> Self {
        if config.auth.is_insecure() {
            tracing::warn!("SECRET_KEY not set, signing tokens with the insecure development key");
        }
        Self {
            state: Arc::new(GatewayState::new(config, store, factory)),
        }
    }

    /// Get gateway state
    pub fn state(&self) -> Arc<GatewayState> {
        self.state.clone()
    }

    /// Build the Axum router
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/", get(Self::handle_index))
            .route("/health", get(Self::handle_health))
            .route("/signup", post(api::signup))
            .route("/token", post(api::login))
            .route("/projects", post(api::create_project).get(api::list_projects))
            .route("/projects/", post(api::create_project).get(api::list_projects))
            .route("/projects/:id", get(api::get_project))
            .route("/chats", post(api::create_chat).get(api::list_chats))
            .route("/chats/", post(api::create_chat).get(api::list_chats))
            .route("/chats/:id", get(api::get_chat))
            .route("/chats/:id/messages", post(api::create_message).get(api::list_messages))
            .route("/chats/:id/messages/", post(api::create_message).get(api::list_messages))
            .route("/api/generate-story", post(api::generate_story))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors_layer(&self.state.config.cors)),
            )
            .with_state(self.state.clone())
    }

    /// Start the gateway server, stopping on Ctrl-C
    pub async fn start(&self) -> Result<()> {
        self.start_with_shutdown(shutdown_signal()).await
    }

    pub async fn start_with_shutdown<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config.socket_addr()?;
        let router = self.build_router();

        tracing::info!("StoryCrafter Gateway starting on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    // HTTP handlers

    async fn handle_index() -> impl IntoResponse {
        axum::Json(serde_json::json!({
            "message": "Welcome to the StoryCrafter API"
        }))
    }

    async fn handle_health() -> impl IntoResponse {
        axum::Json(serde_json::json!({
            "status": "healthy",
            "version": crate::VERSION
        }))
    }
}

fn cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(settings.allow_credentials)
        .max_age(Duration::from_secs(settings.max_age_secs))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Gateway shutdown initiated");
}
