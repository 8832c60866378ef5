//! StoryCrafter Gateway - HTTP service
//!
//! Accounts, projects, chats and the artifact generation endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  StoryCrafter Gateway                   │
//! ├─────────────────────────────────────────────────────────┤
//! │   CORS ─► Trace ─► Router                               │
//! │                     │                                   │
//! │     ┌───────────────┼────────────────────┐              │
//! │     │               │                    │              │
//! │  /signup         /projects/       /api/generate-story   │
//! │  /token          /chats/               │                │
//! │     │               │          ┌───────▼─────────┐      │
//! │     │               │          │ArtifactAssembler│      │
//! │     │               │          └───────┬─────────┘      │
//! │  ┌──▼───────────────▼──┐       ┌───────▼────────┐       │
//! │  │   StoryStore (WAL)  │       │ ModelInvokers  │       │
//! │  └─────────────────────┘       └────────────────┘       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Protected routes take `Authorization: Bearer <token>` issued by `/token`.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod gateway;

pub use auth::{Claims, CurrentUser, TokenIssuer};
pub use config::{AuthSettings, CorsSettings, GatewayConfig};
pub use error::{GatewayError, Result};
pub use extract::{ApiForm, ApiJson};
pub use gateway::{Gateway, GatewayState};

/// Gateway version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Default host
pub const DEFAULT_HOST: &str = "127.0.0.1";
