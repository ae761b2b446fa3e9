//! Process-wide, in-memory session registry. No file persistence, no
//! multi-channel routing — sessions are ephemeral and scoped to one
//! client socket for their entire lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use sg_domain::trace::TraceEvent;

use crate::session::Session;

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: Arc<Session>) {
        self.sessions.write().await.insert(session.id.clone(), session);
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Removes the session from the registry. Called once, at the end
    /// of a graceful or forced close, so late callbacks observing
    /// removal can short-circuit (§3 Lifecycle).
    pub async fn remove(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// C9: force-closes every session whose `lastActivity` exceeds
    /// `idle_timeout`. Returns the ids force-closed.
    pub async fn sweep_idle(&self, idle_timeout: Duration) -> Vec<String> {
        let sessions: Vec<Arc<Session>> = self.sessions.read().await.values().cloned().collect();
        let inspected = sessions.len();

        let mut swept = Vec::new();
        for session in sessions {
            if session.idle_for().await.to_std().unwrap_or_default() > idle_timeout {
                session.force_close("inactivity sweep").await;
                self.remove(&session.id).await;
                swept.push(session.id.clone());
            }
        }

        TraceEvent::SweeperSwept {
            inspected,
            force_closed: swept.len(),
        }
        .emit();

        swept
    }

    /// C9: graceful close of every session in parallel, bounded by
    /// `deadline`. Sessions that don't finish in time are force-closed.
    /// Returns whether any session had to be force-closed, so the caller
    /// can distinguish a clean shutdown from a timeout.
    pub async fn shutdown_all(&self, deadline: Duration) -> bool {
        let sessions: Vec<Arc<Session>> = self.sessions.read().await.values().cloned().collect();
        let open = sessions.len();
        let started = std::time::Instant::now();

        TraceEvent::ShutdownStarted {
            open_sessions: open,
        }
        .emit();

        let closes = sessions.iter().map(|session| {
            let session = session.clone();
            async move { session.send_session_end().await }
        });

        let mut forced = 0;
        if tokio::time::timeout(deadline, futures_util::future::join_all(closes))
            .await
            .is_err()
        {
            for session in &sessions {
                if !session.close.is_closed() {
                    session.force_close("shutdown deadline exceeded").await;
                    forced += 1;
                }
            }
        }

        for session in &sessions {
            self.remove(&session.id).await;
        }

        TraceEvent::ShutdownCompleted {
            forced_count: forced,
            duration_ms: started.elapsed().as_millis() as u64,
        }
        .emit();

        forced > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn new_session(id: &str) -> Arc<Session> {
        Session::new(id, mpsc::channel(8).0)
    }

    #[tokio::test]
    async fn insert_get_remove_round_trip() {
        let store = SessionStore::new();
        store.insert(new_session("s1")).await;
        assert!(store.get("s1").await.is_some());
        store.remove("s1").await;
        assert!(store.get("s1").await.is_none());
    }

    #[tokio::test]
    async fn sweep_idle_force_closes_and_removes_stale_sessions() {
        let store = SessionStore::new();
        store.insert(new_session("stale")).await;

        let swept = store.sweep_idle(Duration::from_secs(0)).await;
        assert_eq!(swept, vec!["stale".to_string()]);
        assert!(store.get("stale").await.is_none());
    }

    #[tokio::test]
    async fn sweep_idle_leaves_fresh_sessions_alone() {
        let store = SessionStore::new();
        store.insert(new_session("fresh")).await;

        let swept = store.sweep_idle(Duration::from_secs(300)).await;
        assert!(swept.is_empty());
        assert!(store.get("fresh").await.is_some());
    }

    #[tokio::test]
    async fn shutdown_all_empties_the_store() {
        let store = SessionStore::new();
        store.insert(new_session("a")).await;
        store.insert(new_session("b")).await;

        let forced = store.shutdown_all(Duration::from_secs(5)).await;
        assert!(!forced);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn shutdown_all_reports_forced_closes_past_deadline() {
        let store = SessionStore::new();
        store.insert(new_session("stuck")).await;

        // `send_session_end` always sleeps past this deadline, so the
        // session is guaranteed to be force-closed instead.
        let forced = store.shutdown_all(Duration::from_millis(0)).await;
        assert!(forced);
    }
}
