//! Periodic maintenance of token events and expired sessions
//!
//! Token records and blacklist entries expire via store TTLs on their own;
//! this service drives the two sweeps that need a caller: security-event
//! retention and the expired-session scan.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::errors::DomainResult;
use crate::repositories::{SessionStore, TokenStore};
use crate::services::session::SessionManager;
use crate::services::token::TokenManager;

/// Configuration for the cleanup service
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            enabled: true,
        }
    }
}

/// Result of a cleanup cycle
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Number of expired sessions removed
    pub expired_sessions_removed: usize,
    /// Number of security-event day buckets removed
    pub event_buckets_removed: usize,
    /// Wall-clock duration of the cycle in milliseconds
    pub operation_time_ms: u128,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupReport {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get total number of items cleaned up
    pub fn total_cleaned(&self) -> usize {
        self.expired_sessions_removed + self.event_buckets_removed
    }
}

/// Service for sweeping expired sessions and stale security events
pub struct CleanupService<T: TokenStore, S: SessionStore> {
    tokens: Arc<TokenManager<T>>,
    sessions: Arc<SessionManager<S>>,
    config: CleanupConfig,
}

impl<T: TokenStore, S: SessionStore> CleanupService<T, S> {
    /// Create a new cleanup service
    pub fn new(
        tokens: Arc<TokenManager<T>>,
        sessions: Arc<SessionManager<S>>,
        config: CleanupConfig,
    ) -> Self {
        Self {
            tokens,
            sessions,
            config,
        }
    }

    /// Run a single cleanup cycle
    ///
    /// Each sweep runs even when the other fails; failures are collected
    /// in the report rather than aborting the cycle.
    pub async fn run_cleanup(&self) -> DomainResult<CleanupReport> {
        if !self.config.enabled {
            return Ok(CleanupReport::default());
        }

        info!("Starting cleanup cycle");
        let start = Instant::now();
        let mut report = CleanupReport::default();

        match self.sessions.cleanup_expired().await {
            Ok(count) => {
                report.expired_sessions_removed = count;
            }
            Err(e) => {
                error!("Failed to sweep expired sessions: {}", e);
                report.errors.push(format!("Session sweep error: {}", e));
            }
        }

        match self.tokens.cleanup_expired().await {
            Ok(stats) => {
                report.event_buckets_removed = stats.cleaned_events;
            }
            Err(e) => {
                error!("Failed to sweep security events: {}", e);
                report.errors.push(format!("Event sweep error: {}", e));
            }
        }

        report.operation_time_ms = start.elapsed().as_millis();
        info!(
            expired_sessions = report.expired_sessions_removed,
            event_buckets = report.event_buckets_removed,
            operation_time_ms = report.operation_time_ms,
            "Cleanup cycle finished"
        );
        Ok(report)
    }

    /// Start the cleanup service as a background task
    ///
    /// Spawns a tokio task that runs cleanup at the configured interval.
    pub fn start_background_task(self: Arc<Self>)
    where
        T: 'static,
        S: 'static,
    {
        if !self.config.enabled {
            warn!("Cleanup service is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "Cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(report) => {
                        if !report.is_success() {
                            warn!("Cleanup completed with errors: {:?}", report.errors);
                        }
                    }
                    Err(e) => {
                        error!("Cleanup cycle failed: {}", e);
                    }
                }
            }
        });
    }
}
