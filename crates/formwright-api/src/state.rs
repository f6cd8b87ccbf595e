//! Application state wiring services together.
//!
//! AppState holds the concrete service instances used by both the CLI and
//! the REST API. `FormLibrary` is generic over its repository; AppState pins
//! it to the backend chosen in `config.toml`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use formwright_core::builder::BuilderSession;
use formwright_core::service::library::FormLibrary;
use formwright_infra::config::load_global_config;
use formwright_infra::filesystem::resolve_data_dir;
use formwright_infra::store::FormStore;
use formwright_types::config::GlobalConfig;

/// Concrete type alias for the library pinned to the configured store.
pub type ConcreteFormLibrary = FormLibrary<FormStore>;

/// A builder session shared between HTTP requests.
///
/// The async mutex may be held across the save await; the map guard never is.
pub type SharedSession = Arc<Mutex<BuilderSession>>;

/// An open session and the last time a request reached it.
pub struct SessionSlot {
    session: SharedSession,
    last_active: Instant,
}

impl SessionSlot {
    fn new(session: SharedSession) -> Self {
        Self {
            session,
            last_active: Instant::now(),
        }
    }

    /// Idle past `limit` and not held by any in-flight request.
    fn is_expired(&self, limit: Duration) -> bool {
        self.last_active.elapsed() > limit && Arc::strong_count(&self.session) == 1
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub form_library: Arc<ConcreteFormLibrary>,
    /// Open builder sessions keyed by session id (REST API only).
    pub sessions: Arc<DashMap<Uuid, SessionSlot>>,
    /// Sessions idle longer than this are closed, unsaved edits included.
    pub session_idle: Duration,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Resolve the data directory, load `config.toml`, open the store.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_global_config(&data_dir).await;
        Self::with_config(config, data_dir).await
    }

    pub async fn with_config(config: GlobalConfig, data_dir: PathBuf) -> anyhow::Result<Self> {
        let store = FormStore::open(&config, &data_dir).await?;

        Ok(Self {
            form_library: Arc::new(FormLibrary::new(store)),
            sessions: Arc::new(DashMap::new()),
            session_idle: Duration::from_secs(config.server.session_idle_secs),
            config: Arc::new(config),
            data_dir,
        })
    }

    /// Register a session and return its id. Expired sessions are swept
    /// first so abandoned ones cannot pile up between timer ticks.
    pub fn insert_session(&self, session: BuilderSession) -> (Uuid, SharedSession) {
        self.sweep_idle_sessions();
        let id = Uuid::now_v7();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.insert(id, SessionSlot::new(Arc::clone(&shared)));
        (id, shared)
    }

    /// Look up a session and mark it active, cloning the handle out so no
    /// map guard escapes. An expired session is dropped and reported missing.
    pub fn session(&self, id: &Uuid) -> Option<SharedSession> {
        if self
            .sessions
            .remove_if(id, |_, slot| slot.is_expired(self.session_idle))
            .is_some()
        {
            tracing::debug!(session_id = %id, "builder session expired");
            return None;
        }
        let mut slot = self.sessions.get_mut(id)?;
        slot.last_active = Instant::now();
        Some(Arc::clone(&slot.session))
    }

    pub fn remove_session(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions.remove(id).map(|(_, slot)| slot.session)
    }

    /// Close every expired session. Returns how many were dropped.
    pub fn sweep_idle_sessions(&self) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, slot| !slot.is_expired(self.session_idle));
        let dropped = before.saturating_sub(self.sessions.len());
        if dropped > 0 {
            tracing::info!(dropped, "closed idle builder sessions");
        }
        dropped
    }

    /// Periodically sweep idle sessions for as long as the server runs.
    pub fn spawn_session_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        let period = (self.session_idle / 2).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                state.sweep_idle_sessions();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwright_types::config::StorageBackend;

    async fn memory_state(idle: Duration) -> AppState {
        let config = GlobalConfig {
            storage: StorageBackend::Memory,
            ..Default::default()
        };
        let mut state = AppState::with_config(config, std::env::temp_dir())
            .await
            .unwrap();
        state.session_idle = idle;
        state
    }

    fn open_session() -> BuilderSession {
        let mut session = BuilderSession::new();
        session.start_new().unwrap();
        session
    }

    #[tokio::test]
    async fn test_idle_session_is_swept() {
        let state = memory_state(Duration::from_millis(10)).await;
        let (id, shared) = state.insert_session(open_session());
        drop(shared);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(state.sweep_idle_sessions(), 1);
        assert!(state.session(&id).is_none());
    }

    #[tokio::test]
    async fn test_session_held_by_request_is_kept() {
        let state = memory_state(Duration::from_millis(10)).await;
        let (id, shared) = state.insert_session(open_session());

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(state.sweep_idle_sessions(), 0);
        drop(shared);
        assert!(state.session(&id).is_none());
    }

    #[tokio::test]
    async fn test_activity_keeps_session_open() {
        let state = memory_state(Duration::from_secs(60)).await;
        let (id, shared) = state.insert_session(open_session());
        drop(shared);

        assert!(state.session(&id).is_some());
        assert_eq!(state.sweep_idle_sessions(), 0);
        assert_eq!(state.sessions.len(), 1);
    }
}
