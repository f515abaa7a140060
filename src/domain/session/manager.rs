//! Process-wide table of in-flight batch sessions with an expiry sweeper.

use super::{BatchSession, SessionStatus};
use crate::domain::validation::BatchStatus;
use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant};

/// Idle time after which a session is dropped.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(30 * 60);
/// Period of the background expiry sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Tracks batch sessions by id.
///
/// The table lock only guards membership; every session has its own lock, so
/// updating one batch never waits on another.
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Mutex<BatchSession>>>>,
    retention: Duration,
    sweep_interval: Duration,
    /// Flips to `true` once; every sweeper watches it.
    shutdown: watch::Sender<bool>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_timing(DEFAULT_RETENTION, DEFAULT_SWEEP_INTERVAL)
    }

    pub fn with_timing(retention: Duration, sweep_interval: Duration) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            sessions: RwLock::new(HashMap::new()),
            retention,
            sweep_interval: sweep_interval.max(Duration::from_millis(1)),
            shutdown,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Starts a new session with zeroed counters.
    ///
    /// An id that is already tracked is refused with `SessionExists`.
    pub async fn create_session(
        &self,
        batch_id: &str,
        threshold: Option<f64>,
    ) -> Result<SessionStatus> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(batch_id) {
            return Err(EngineError::SessionExists(batch_id.to_string()));
        }
        let session = BatchSession::new(batch_id, threshold);
        let status = session.status();
        sessions.insert(batch_id.to_string(), Arc::new(Mutex::new(session)));
        tracing::info!(batch_id = %batch_id, ?threshold, "created batch session");
        Ok(status)
    }

    /// Returns the existing session, or creates it with `threshold`.
    pub async fn get_or_create_session(
        &self,
        batch_id: &str,
        threshold: Option<f64>,
    ) -> SessionStatus {
        if let Some(session) = self.handle(batch_id).await {
            return session.lock().await.status();
        }

        let session = {
            let mut sessions = self.sessions.write().await;
            sessions
                .entry(batch_id.to_string())
                .or_insert_with(|| {
                    tracing::info!(batch_id = %batch_id, ?threshold, "created batch session");
                    Arc::new(Mutex::new(BatchSession::new(batch_id, threshold)))
                })
                .clone()
        };
        let status = session.lock().await.status();
        status
    }

    /// Adds counts to a session and returns the resulting snapshot.
    ///
    /// A finalized session keeps its totals; the update is ignored.
    pub async fn update_session(
        &self,
        batch_id: &str,
        valid: u64,
        invalid: u64,
        warnings: u64,
    ) -> Result<SessionStatus> {
        let session = self
            .handle(batch_id)
            .await
            .ok_or_else(|| EngineError::SessionNotFound(batch_id.to_string()))?;
        let mut session = session.lock().await;
        if !session.apply(valid, invalid, warnings)? {
            tracing::warn!(batch_id = %batch_id, "ignoring update to finalized batch session");
        }
        Ok(session.status())
    }

    /// Marks a session final and returns its verdict.
    pub async fn finalize_session(&self, batch_id: &str) -> Result<BatchStatus> {
        let session = self
            .handle(batch_id)
            .await
            .ok_or_else(|| EngineError::SessionNotFound(batch_id.to_string()))?;
        let mut session = session.lock().await;
        let already_final = session.is_final;
        let status = session.finalize();
        if !already_final {
            tracing::info!(
                batch_id = %batch_id,
                total = session.total_records,
                valid = session.valid_records,
                success_rate = session.success_rate(),
                status = %status,
                "finalized batch session"
            );
        }
        Ok(status)
    }

    /// Copy of the session, if tracked.
    pub async fn get_session(&self, batch_id: &str) -> Option<BatchSession> {
        let session = self.handle(batch_id).await?;
        let copy = session.lock().await.clone();
        Some(copy)
    }

    pub async fn get_status(&self, batch_id: &str) -> Result<SessionStatus> {
        let session = self
            .handle(batch_id)
            .await
            .ok_or_else(|| EngineError::SessionNotFound(batch_id.to_string()))?;
        let status = session.lock().await.status();
        Ok(status)
    }

    /// Removes a session; returns whether it existed.
    pub async fn delete_session(&self, batch_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(batch_id).is_some();
        if removed {
            tracing::info!(batch_id = %batch_id, "deleted batch session");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drops every session idle for longer than the retention window.
    pub async fn cleanup_expired(&self) -> usize {
        let cutoff = chrono::Duration::from_std(self.retention)
            .ok()
            .and_then(|r| Utc::now().checked_sub_signed(r))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.cleanup_idle_since(cutoff).await
    }

    /// Drops every session whose last update is older than `cutoff`.
    pub async fn cleanup_idle_since(&self, cutoff: DateTime<Utc>) -> usize {
        let candidates: Vec<(String, Arc<Mutex<BatchSession>>)> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, s)| (id.clone(), s.clone()))
            .collect();

        let mut expired = Vec::new();
        for (id, session) in candidates {
            if session.lock().await.last_updated < cutoff {
                expired.push(id);
            }
        }
        if expired.is_empty() {
            return 0;
        }

        let mut sessions = self.sessions.write().await;
        let mut removed = 0;
        for id in expired {
            // Re-check: the session may have been touched or replaced since the scan.
            let still_idle = match sessions.get(&id) {
                Some(s) => s.try_lock().map(|s| s.last_updated < cutoff).unwrap_or(false),
                None => false,
            };
            if still_idle {
                sessions.remove(&id);
                removed += 1;
            }
        }
        drop(sessions);

        if removed > 0 {
            tracing::info!(removed, "expired idle batch sessions");
        }
        removed
    }

    /// Spawns the periodic expiry sweep. It runs until [`shutdown`](Self::shutdown).
    ///
    /// Every sweeper started on this manager stops on shutdown, including one
    /// started after it.
    pub fn start_expiry_sweeper(self: Arc<Self>) -> JoinHandle<()> {
        let period = self.sweep_interval;
        let mut shutdown = self.shutdown.subscribe();
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            while !*shutdown.borrow_and_update() {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = self.cleanup_expired().await;
                        tracing::debug!(removed, "session expiry sweep finished");
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::info!("session expiry sweeper shutting down");
        })
    }

    /// Stops every background sweeper.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    async fn handle(&self, batch_id: &str) -> Option<Arc<Mutex<BatchSession>>> {
        self.sessions.read().await.get(batch_id).cloned()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
