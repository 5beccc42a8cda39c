//! API module for the video finder
//!
//! Exposes tag-based short video discovery over HTTP.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::discovery::Discovery;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{router, AppState};

/// API server bound to the configured host and port
pub struct ApiServer {
    discovery: Arc<Discovery>,
    config: Arc<Config>,
}

impl ApiServer {
    pub fn new(discovery: Arc<Discovery>, config: Arc<Config>) -> Self {
        Self { discovery, config }
    }

    /// Serve until the listener fails
    pub async fn start(self) -> Result<()> {
        let host = self.config.server.host.clone();
        let port = self.config.server.port;
        info!("🚀 Starting API server on {}:{}", host, port);

        let state = AppState {
            discovery: self.discovery,
            config: self.config,
        };
        server::start_http_server(state, &host, port).await
    }
}
