//! Process-wide application context.
//!
//! # Responsibility
//! - Own the database connection and the store/identity/session components.
//! - Hand those components to views by injection.
//!
//! # Invariants
//! - Components are usable only between `init` and `shutdown`.
//! - All components share one connection, so in-memory databases work.

use crate::board::{SyncMode, TaskBoard};
use crate::config::AppConfig;
use crate::db::{self, now_epoch_ms, open_db, open_db_in_memory, DbResult, SharedConnection};
use crate::identity::SqliteIdentityClient;
use crate::navigation::{self, Route};
use crate::session::{SessionGate, SessionMarkerStore};
use crate::store::SqliteDocumentStore;
use log::{info, warn};

pub struct AppContext {
    config: AppConfig,
    conn: SharedConnection,
    store: SqliteDocumentStore,
    identity: SqliteIdentityClient,
    markers: SessionMarkerStore,
}

impl AppContext {
    /// Opens the configured database and wires every component.
    pub fn init(config: AppConfig) -> DbResult<Self> {
        let conn = if config.is_in_memory() {
            open_db_in_memory()?
        } else {
            open_db(&config.db_path)?
        };
        let conn = db::share(conn);
        info!(
            "event=context_init module=context status=ok in_memory={} sync_mode={}",
            config.is_in_memory(),
            config.sync_mode.as_str()
        );
        Ok(Self {
            store: SqliteDocumentStore::new(conn.clone()),
            identity: SqliteIdentityClient::new(conn.clone()),
            markers: SessionMarkerStore::new(conn.clone()),
            conn,
            config,
        })
    }

    /// Context over a fresh in-memory database.
    pub fn in_memory(sync_mode: SyncMode) -> DbResult<Self> {
        Self::init(AppConfig {
            db_path: crate::config::IN_MEMORY_DB_PATH.into(),
            sync_mode,
            ..AppConfig::default()
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &SqliteDocumentStore {
        &self.store
    }

    pub fn identity(&self) -> &SqliteIdentityClient {
        &self.identity
    }

    pub fn markers(&self) -> &SessionMarkerStore {
        &self.markers
    }

    /// New task board bound to this context's store.
    pub fn task_board(&self) -> TaskBoard<SqliteDocumentStore> {
        TaskBoard::new(self.store.clone(), self.config.sync_mode)
    }

    /// New login/signup controller bound to this context's identity client.
    pub fn session_gate(&self) -> SessionGate<SqliteIdentityClient> {
        SessionGate::new(self.identity.clone(), self.markers.clone())
    }

    /// Applies the route guard against the current clock.
    pub fn resolve_route(&self, requested: Route) -> DbResult<Route> {
        navigation::guard(requested, &self.markers, now_epoch_ms())
    }

    /// Explicit teardown.
    ///
    /// Warns when views still hold live subscriptions; their callbacks stop
    /// firing once the last store handle is gone.
    pub fn shutdown(self) {
        let live = self.store.subscriber_count();
        if live > 0 {
            warn!("event=context_shutdown module=context status=warn live_subscriptions={live}");
        }
        drop(self.store);
        drop(self.identity);
        drop(self.markers);
        drop(self.conn);
        info!("event=context_shutdown module=context status=ok");
    }
}
