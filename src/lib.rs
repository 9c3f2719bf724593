// ============================================================================
// contact_sync
// ============================================================================
//
// HTTP contact list whose reads are served from an in-memory mirror of the
// backing document store. Every write goes through a full
// connect -> mutate -> resync -> disconnect cycle.

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod model;
pub mod service;
pub mod state;

pub use app::build_router;
pub use cache::ContactCache;
pub use config::{AppConfig, BackendUrl, MutationPolicy};
pub use error::{AppError, AppResult};
pub use gateway::{ContactGateway, DocumentStore, GatewayError};
pub use model::ContactRecord;
pub use service::ContactService;
