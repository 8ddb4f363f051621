//! In-memory store for website chat sessions.
//!
//! A session pins the extracted content of one page; exchanges accumulate
//! under a per-session lock so two concurrent messages to the same session
//! serialize against each other without blocking the rest of the map.
//! Sessions do not survive a restart, and an idle sweeper reclaims the ones
//! nobody is talking to.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, RwLock};

/// Sessions idle longer than this are reclaimed.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// How often the sweeper looks for idle sessions.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub url: String,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatExchange {
    pub user_message: String,
    pub ai_response: String,
    /// Unix seconds, fractional.
    pub timestamp: f64,
}

/// Point-in-time copy of a session and its transcript.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session: Session,
    pub exchanges: Vec<ChatExchange>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),
}

struct SessionEntry {
    meta: Session,
    exchanges: Mutex<Vec<ChatExchange>>,
    last_active: AtomicI64,
}

impl SessionEntry {
    fn touch(&self) {
        self.last_active.store(Utc::now().timestamp(), Ordering::Relaxed);
    }
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a page and returns its session metadata.
    pub async fn create(
        &self,
        url: &str,
        title: &str,
        content: &str,
        word_count: usize,
    ) -> Session {
        let created_at = Utc::now();
        let mut sessions = self.sessions.write().await;

        let mut id = session_id(url, created_at);
        while sessions.contains_key(&id) {
            id = session_id(url, created_at);
        }

        let meta = Session {
            id: id.clone(),
            url: url.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            word_count,
            created_at,
        };
        sessions.insert(
            id,
            Arc::new(SessionEntry {
                meta: meta.clone(),
                exchanges: Mutex::new(Vec::new()),
                last_active: AtomicI64::new(created_at.timestamp()),
            }),
        );
        meta
    }

    /// Snapshot of a session, or `None` if it does not exist. Reading counts
    /// as activity.
    pub async fn get(&self, id: &str) -> Option<SessionSnapshot> {
        let entry = { self.sessions.read().await.get(id).cloned() }?;
        entry.touch();
        let exchanges = entry.exchanges.lock().await.clone();
        Some(SessionSnapshot {
            session: entry.meta.clone(),
            exchanges,
        })
    }

    /// Appends a completed exchange to a session's transcript.
    pub async fn append_exchange(
        &self,
        id: &str,
        exchange: ChatExchange,
    ) -> Result<(), SessionError> {
        let entry = { self.sessions.read().await.get(id).cloned() }
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        entry.touch();
        entry.exchanges.lock().await.push(exchange);
        Ok(())
    }

    /// Drops a session. Returns whether it existed; removing an unknown id
    /// is not an error.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Removes sessions idle for longer than `ttl`; returns how many went.
    pub async fn purge_idle(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now().timestamp() - ttl.as_secs() as i64;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_active.load(Ordering::Relaxed) > cutoff);
        before - sessions.len()
    }
}

/// Background task reclaiming idle sessions every [`SWEEP_INTERVAL`].
pub fn spawn_sweeper(store: Arc<SessionStore>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(
            "session sweeper: started (ttl={}s, interval={}s)",
            SESSION_TTL.as_secs(),
            SWEEP_INTERVAL.as_secs()
        );
        loop {
            tokio::time::sleep(SWEEP_INTERVAL).await;
            let purged = store.purge_idle(SESSION_TTL).await;
            if purged > 0 {
                tracing::info!("session sweeper: reclaimed {} idle session(s)", purged);
            }
        }
    })
}

/// Current time as fractional Unix seconds, the timestamp format exchanges
/// are stored and served with.
pub fn unix_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// 16 hex chars of sha256 over url + creation instant + random salt. The
/// salt keeps ids unguessable even for repeated extractions of one URL.
fn session_id(url: &str, created_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(
        created_at
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_le_bytes(),
    );
    hasher.update(rand::random::<u64>().to_le_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}
