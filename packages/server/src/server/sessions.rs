use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::common::SessionId;
use crate::domains::analyzer::AnalyzerWidget;
use crate::domains::identity::IdentitySlot;
use crate::kernel::ServerDeps;

/// One visitor: an identity being established and the widget that uses it.
pub struct Session {
    pub id: SessionId,
    pub widget: Arc<AnalyzerWidget>,
    pub identity: IdentitySlot,
    pub created_at: DateTime<Utc>,
    last_active_ms: AtomicI64,
    sign_in: JoinHandle<()>,
}

impl Session {
    fn touch(&self) {
        self.last_active_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_active_ms.load(Ordering::Relaxed))
            .unwrap_or(self.created_at)
    }

    fn close(&self) {
        self.sign_in.abort();
        self.widget.teardown();
    }
}

/// In-memory session registry
///
/// Sessions idle for longer than the configured TTL are dropped by
/// `cleanup_expired`, which `main` runs periodically.
pub struct SessionRegistry {
    deps: ServerDeps,
    sessions: Arc<RwLock<HashMap<SessionId, Arc<Session>>>>,
}

impl SessionRegistry {
    pub fn new(deps: ServerDeps) -> Self {
        Self {
            deps,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Open a session and start its anonymous sign-in in the background.
    pub async fn create(&self) -> Arc<Session> {
        let id = SessionId::new();
        let identity = IdentitySlot::new();
        let sign_in = identity.spawn_sign_in(self.deps.identity_provider.clone());
        let widget = Arc::new(AnalyzerWidget::new(&self.deps, identity.watch()));
        let now = Utc::now();

        let session = Arc::new(Session {
            id,
            widget,
            identity,
            created_at: now,
            last_active_ms: AtomicI64::new(now.timestamp_millis()),
            sign_in,
        });

        self.sessions.write().await.insert(id, session.clone());
        debug!(session_id = %id, "Session opened");
        session
    }

    /// Look up a session and mark it active.
    pub async fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        let session = self.sessions.read().await.get(id).cloned()?;
        session.touch();
        Some(session)
    }

    /// Close a session, tearing down its widget. Returns false if unknown.
    pub async fn remove(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(id);
        match removed {
            Some(session) => {
                session.close();
                debug!(session_id = %id, "Session closed");
                true
            }
            None => false,
        }
    }

    /// Close every session idle for at least `ttl`. Returns how many were closed.
    pub async fn cleanup_expired(&self, ttl: Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, session| {
            let keep = now.signed_duration_since(session.last_active()) < ttl;
            if !keep {
                session.close();
            }
            keep
        });

        let closed = before - sessions.len();
        if closed > 0 {
            info!(closed, remaining = sessions.len(), "Expired sessions cleaned up");
        }
        closed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
