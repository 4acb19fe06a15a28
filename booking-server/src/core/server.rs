//! Server Implementation
//!
//! HTTP 服务器和 bot 调度器的启动与关闭

use std::sync::Arc;

use anyhow::Context;

use crate::api::build_app;
use crate::bot::BotService;
use crate::core::{Config, Result, ServerError, ServerState};

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

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        // Bot 调度器与 HTTP 服务并行运行
        if let Some(bot) = state.bot.clone() {
            let service = Arc::new(BotService::new(
                bot,
                state.manager.clone(),
                state.users.clone(),
                self.config.telegram_bot_token.clone().unwrap_or_default(),
                self.config.web_app_url.clone(),
            ));
            tokio::spawn(service.run());
        }

        let app = build_app(&state).with_state(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(ServerError::Bind)?;
        tracing::info!("Booking server listening on {}", addr);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed")?;

        Ok(())
    }
}
