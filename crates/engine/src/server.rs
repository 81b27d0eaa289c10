//! Server wrapper around the reception engine.
//!
//! Owns process lifecycle: builds the engine from configuration, runs the
//! background maintenance loops (session sweep, transfer-attempt sweep),
//! and shuts them down cleanly. The signaling transport (HTTP, SIP, a
//! provider webhook adapter) sits outside this crate and drives the
//! engine's event methods directly.
//!
//! ```no_run
//! use frontdesk_engine::prelude::*;
//!
//! # async fn run(profiles: Vec<TenantProfile>) -> anyhow::Result<()> {
//! let server = ReceptionServerBuilder::new()
//!     .with_config(ReceptionConfig::default())
//!     .with_profiles(profiles)
//!     .build()?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ReceptionConfig;
use crate::error::{ReceptionError, Result};
use crate::orchestrator::{Collaborators, ReceptionEngine};
use crate::tenant::{HookRegistry, TenantProfile, TenantRegistry};

/// Builder for [`ReceptionServer`].
pub struct ReceptionServerBuilder {
    config: ReceptionConfig,
    profiles: Vec<TenantProfile>,
    hooks: HookRegistry,
    collaborators: Collaborators,
}

impl Default for ReceptionServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceptionServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ReceptionConfig::default(),
            profiles: Vec::new(),
            hooks: HookRegistry::new(),
            collaborators: Collaborators::default(),
        }
    }

    pub fn with_config(mut self, config: ReceptionConfig) -> Self {
        self.config = config;
        self
    }

    /// Initial tenant profiles. More can be loaded later through
    /// [`ReceptionServer::reload_tenants`].
    pub fn with_profiles(mut self, profiles: Vec<TenantProfile>) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    pub fn build(self) -> Result<ReceptionServer> {
        if self.config.general.callback_base_url.trim().is_empty() {
            return Err(ReceptionError::config("callback_base_url must be set"));
        }
        if self.profiles.is_empty() {
            return Err(ReceptionError::config("at least one tenant profile is required"));
        }

        let registry = Arc::new(TenantRegistry::new());
        registry.reload(self.profiles);

        let engine = ReceptionEngine::with_collaborators(
            self.config,
            registry,
            self.hooks,
            self.collaborators,
        );
        Ok(ReceptionServer::new(engine))
    }
}

/// The running server: an engine handle plus its maintenance loops.
pub struct ReceptionServer {
    engine: Arc<ReceptionEngine>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl ReceptionServer {
    fn new(engine: Arc<ReceptionEngine>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            engine,
            shutdown_tx,
            shutdown_rx,
            tasks: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// The engine handle; the signaling transport drives this.
    pub fn engine(&self) -> Arc<ReceptionEngine> {
        self.engine.clone()
    }

    /// Replace the whole tenant table atomically. Calls in flight keep
    /// the profile snapshot they started with.
    pub fn reload_tenants(&self, profiles: Vec<TenantProfile>) {
        self.engine.registry().reload(profiles);
    }

    /// Start the background maintenance loops.
    pub async fn start(&self) -> Result<()> {
        info!("🚀 Reception server starting");

        {
            let engine = self.engine.clone();
            let mut shutdown = self.shutdown_rx.clone();
            self.tasks.lock().push(tokio::spawn(async move {
                session_sweep_loop(engine, &mut shutdown).await;
            }));
        }
        {
            let engine = self.engine.clone();
            let mut shutdown = self.shutdown_rx.clone();
            self.tasks.lock().push(tokio::spawn(async move {
                attempt_sweep_loop(engine, &mut shutdown).await;
            }));
        }

        info!("✅ Reception server ready");
        Ok(())
    }

    /// Signal the loops to stop and wait for them.
    pub async fn stop(&self) {
        info!("📴 Reception server stopping");
        let _ = self.shutdown_tx.send(true);
        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                warn!("Maintenance task ended abnormally: {}", e);
            }
        }
        let stats = self.engine.stats();
        info!(
            "Reception server stopped ({} live sessions, {} pending transfers abandoned)",
            stats.live_sessions, stats.pending_transfers
        );
    }

    /// Start, wait for ctrl-c, stop.
    pub async fn run(&self) -> Result<()> {
        self.start().await?;
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| ReceptionError::internal(format!("signal handler failed: {e}")))?;
        self.stop().await;
        Ok(())
    }
}

/// Evict idle sessions and their turn-lock and transfer bookkeeping.
async fn session_sweep_loop(engine: Arc<ReceptionEngine>, shutdown: &mut watch::Receiver<bool>) {
    let interval = engine.config().session.sweep_interval();
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => return,
        }
        let swept = engine.sweep_idle();
        if swept > 0 {
            info!("⏱️  Swept {} idle session(s)", swept);
        }
        let stats = engine.stats();
        debug!(
            "📊 {} live sessions, {} pending transfers",
            stats.live_sessions, stats.pending_transfers
        );
    }
}

/// Evict terminal transfer attempts whose sessions never cleaned up.
async fn attempt_sweep_loop(engine: Arc<ReceptionEngine>, shutdown: &mut watch::Receiver<bool>) {
    let interval = engine.config().session.sweep_interval();
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => return,
        }
        let swept = engine.coordinator().sweep_terminal(Duration::from_secs(3600));
        if swept > 0 {
            debug!("Swept {} terminal transfer attempt(s)", swept);
        }
    }
}

/// Initialize tracing from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
