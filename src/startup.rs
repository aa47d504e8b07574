//! Application Startup
//!
//! Builds the shared state, wires the router, and runs the server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::domain::ChatStore;
use crate::infrastructure::database::{create_pool, run_migrations};
use crate::infrastructure::PgChatStore;
use crate::presentation::http::create_router;
use crate::presentation::middleware::{create_cors_layer, create_trace_layer};
use crate::realtime::RealtimeHub;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ChatStore>,
    pub hub: Arc<RealtimeHub>,
    pub settings: Arc<Settings>,
}

/// A built, unstarted server.
pub struct Application {
    local_addr: SocketAddr,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Connect to the database, run migrations, start the realtime engine,
    /// and bind the listener.
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let pool = create_pool(&settings.database).await?;
        run_migrations(&pool).await?;

        let store: Arc<dyn ChatStore> = Arc::new(PgChatStore::new(pool));
        let hub = RealtimeHub::new(settings.realtime.clone());
        hub.spawn_typing_sweeper();

        let cors = create_cors_layer(&settings.cors);
        let state = AppState {
            store,
            hub,
            settings: Arc::new(settings.clone()),
        };

        let router = create_router(state).layer(create_trace_layer()).layer(cors);

        let listener = TcpListener::bind(settings.server_addr()).await?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            local_addr,
            listener,
            router,
        })
    }

    /// Address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until the process is stopped.
    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!(addr = %self.local_addr, "Server listening");
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
