//! REST handlers: accounts, projects, chats, messages and artifact generation.
//!
//! Store access happens in short synchronous sections; the store lock is
//! released before any model call is awaited.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storycrafter_agent::LlmConfig;
use storycrafter_core::storage::{Chat, ChatMessage, NewProject, Project};
use storycrafter_core::{ArtifactBundle, GenerationMode, Requirement};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, CurrentUser};
use crate::extract::{ApiForm, ApiJson};
use crate::gateway::GatewayState;
use crate::{GatewayError, Result};

type AppState = State<Arc<GatewayState>>;

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub id: i64,
    pub email: String,
}

pub async fn signup(State(state): AppState, ApiJson(req): ApiJson<SignupRequest>) -> Result<Json<SignupResponse>> {
    let email = req.email.trim().to_string();
    if !email.contains('@') {
        return Err(GatewayError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.is_empty() {
        return Err(GatewayError::BadRequest("Password must not be empty".to_string()));
    }

    let password = req.password;
    let hashed = run_blocking(move || hash_password(&password)).await??;
    let store = state.store.lock();
    if store.find_user_by_email(&email)?.is_some() {
        warn!("Signup rejected, email already registered");
        return Err(GatewayError::Conflict("Email already registered".to_string()));
    }

    let user = store.create_user(&email, req.name.as_deref(), &hashed)?;
    info!(user_id = user.id, "User registered");

    Ok(Json(SignupResponse {
        id: user.id,
        email: user.email,
    }))
}

/// Runs CPU-heavy password work off the async workers.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| GatewayError::Internal(format!("password task failed: {}", e)))
}

/// OAuth2 password-flow form fields
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: i64,
}

pub async fn login(State(state): AppState, ApiForm(form): ApiForm<TokenForm>) -> Result<Json<TokenResponse>> {
    let user = state.store.lock().find_user_by_email(form.username.trim())?;

    let verified = match user {
        Some(user) => {
            let stored = user.hashed_password.clone();
            let password = form.password;
            run_blocking(move || verify_password(&password, &stored))
                .await?
                .then_some(user)
        }
        None => None,
    };
    let user = verified.ok_or_else(|| {
        GatewayError::AuthenticationFailed("Incorrect username or password".to_string())
    })?;

    let access_token = state.tokens.issue(&user)?;
    info!(user_id = user.id, "Access token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user_id: user.id,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────────

pub async fn create_project(
    State(state): AppState,
    CurrentUser(user): CurrentUser,
    ApiJson(project): ApiJson<NewProject>,
) -> Result<Json<Project>> {
    if project.name.trim().is_empty() {
        return Err(GatewayError::BadRequest("Project name must not be empty".to_string()));
    }
    let project = state.store.lock().create_project(user.id, &project)?;
    info!(user_id = user.id, project_id = project.id, "Project created");
    Ok(Json(project))
}

pub async fn list_projects(State(state): AppState, CurrentUser(user): CurrentUser) -> Result<Json<Vec<Project>>> {
    Ok(Json(state.store.lock().list_projects(user.id)?))
}

pub async fn get_project(
    State(state): AppState,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<i64>,
) -> Result<Json<Project>> {
    state
        .store
        .lock()
        .get_project(user.id, project_id)?
        .map(Json)
        .ok_or_else(|| GatewayError::NotFound("Project not found".to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Chats and messages
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CreateChatRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub project_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatFilter {
    pub project_id: Option<i64>,
}

fn default_chat_title() -> String {
    format!("Chat {}", Utc::now().format("%Y-%m-%d %H:%M"))
}

pub async fn create_chat(
    State(state): AppState,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<CreateChatRequest>,
) -> Result<Json<Chat>> {
    let title = req
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(default_chat_title);

    let store = state.store.lock();
    if let Some(project_id) = req.project_id {
        if store.get_project(user.id, project_id)?.is_none() {
            return Err(GatewayError::NotFound("Project not found".to_string()));
        }
    }

    let chat = store.create_chat(user.id, &title, req.project_id)?;
    info!(user_id = user.id, chat_id = chat.id, "Chat created");
    Ok(Json(chat))
}

pub async fn list_chats(
    State(state): AppState,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<ChatFilter>,
) -> Result<Json<Vec<Chat>>> {
    Ok(Json(state.store.lock().list_chats(user.id, filter.project_id)?))
}

pub async fn get_chat(
    State(state): AppState,
    CurrentUser(user): CurrentUser,
    Path(chat_id): Path<i64>,
) -> Result<Json<Chat>> {
    state
        .store
        .lock()
        .get_chat(user.id, chat_id)?
        .map(Json)
        .ok_or_else(chat_not_found)
}

fn chat_not_found() -> GatewayError {
    GatewayError::NotFound("Chat not found".to_string())
}

fn default_is_user() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub message: String,
    #[serde(default = "default_is_user")]
    pub is_user: bool,
}

pub async fn create_message(
    State(state): AppState,
    CurrentUser(user): CurrentUser,
    Path(chat_id): Path<i64>,
    ApiJson(req): ApiJson<CreateMessageRequest>,
) -> Result<Json<ChatMessage>> {
    let store = state.store.lock();
    store.get_chat(user.id, chat_id)?.ok_or_else(chat_not_found)?;
    Ok(Json(store.append_message(chat_id, user.id, &req.message, req.is_user)?))
}

pub async fn list_messages(
    State(state): AppState,
    CurrentUser(user): CurrentUser,
    Path(chat_id): Path<i64>,
) -> Result<Json<Vec<ChatMessage>>> {
    let store = state.store.lock();
    store.get_chat(user.id, chat_id)?.ok_or_else(chat_not_found)?;
    Ok(Json(store.list_messages(chat_id)?))
}

// ─────────────────────────────────────────────────────────────────────────────
// Generation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub chat_id: Option<i64>,
    /// `all`, `description`, `story` or `test_cases`; defaults to `all`
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub llm_config: Option<LlmConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub chat_id: i64,
    pub message_id: i64,
    /// The bundle as stored in the bot message
    pub story: String,
    pub bundle: ArtifactBundle,
}

/// Persists the prompt, assembles the requested artifacts and stores them
/// as one bot message. A failed assembly leaves only the prompt behind.
pub async fn generate_story(
    State(state): AppState,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let request_id = Uuid::new_v4();
    let requirement = Requirement::new(req.prompt)?;
    let mode = match req.mode.as_deref() {
        Some(mode) => mode.parse::<GenerationMode>()?,
        None => GenerationMode::default(),
    };

    info!(
        %request_id,
        user_id = user.id,
        ?mode,
        prompt_len = requirement.as_str().len(),
        "Generating artifacts"
    );

    let chat_id = {
        let store = state.store.lock();
        let chat = match req.chat_id {
            Some(chat_id) => store.get_chat(user.id, chat_id)?.ok_or_else(chat_not_found)?,
            None => store.create_chat(user.id, &default_chat_title(), None)?,
        };
        store.append_message(chat.id, user.id, requirement.as_str(), true)?;
        chat.id
    };

    let bundle = state
        .assembler
        .assemble_mode(&requirement, mode, req.llm_config.as_ref())
        .await
        .map_err(|e| {
            warn!(%request_id, chat_id, error = %e, "Generation failed, bot message not saved");
            e
        })?;

    let story = bundle.to_message_text()?;
    let message = state.store.lock().append_message(chat_id, user.id, &story, false)?;
    info!(%request_id, chat_id, message_id = message.id, "Artifacts saved");

    Ok(Json(GenerateResponse {
        chat_id,
        message_id: message.id,
        story,
        bundle,
    }))
}
