use std::sync::Arc;

use bingoals_db::{DbPool, ProgressStore};
use bingoals_events::EventBus;

use crate::config::ServerConfig;
use crate::engine::CollaborationEngine;
use crate::ws::BoardHub;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Postgres pool, when the server runs against a database.
    pub pool: Option<DbPool>,
    /// Persistence behind every engine operation.
    pub store: Arc<dyn ProgressStore>,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Per-board realtime rooms.
    pub hub: Arc<BoardHub>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<EventBus>,
    /// Board, goal and mini-goal operations.
    pub engine: Arc<CollaborationEngine>,
}

impl AppState {
    /// Wire the engine to `store`, `hub` and `event_bus`.
    pub fn new(
        pool: Option<DbPool>,
        store: Arc<dyn ProgressStore>,
        config: ServerConfig,
        hub: Arc<BoardHub>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let engine = Arc::new(CollaborationEngine::new(
            Arc::clone(&store),
            Arc::clone(&hub),
            Arc::clone(&event_bus),
        ));
        Self {
            pool,
            store,
            config: Arc::new(config),
            hub,
            event_bus,
            engine,
        }
    }
}
