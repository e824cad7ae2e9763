//! Server Implementation
//!
//! HTTP server startup and lifecycle management

use crate::core::{Config, ServerState};
use crate::services::HttpService;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (tests, embedded runs)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        // Create application state if not provided
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        // Start background tasks (event publisher)
        state.start_background_tasks();

        let http = HttpService::new(self.config.clone());
        http.initialize(state.clone());

        tracing::info!(
            environment = %self.config.environment,
            port = self.config.http_port,
            "Booking server starting"
        );

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        http.start_server(shutdown).await?;

        Ok(())
    }
}
