//! The process-wide session registry.

use crate::backend::{FileBackend, MemoryBackend, SessionBackend};
use crate::Result;
use playbooks_core::config::StorageBackend;
use playbooks_core::{Config, Session, SessionId};
use playbooks_runtime::RuntimeHandle;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// In-memory state of one session.
#[derive(Debug)]
pub struct SessionEntry {
    /// Durable session state.
    pub session: Session,

    /// Runtime bound to the session; `None` until first construction and
    /// after rehydration.
    pub handle: Option<RuntimeHandle>,

    last_active: Instant,
    removed: bool,

    /// Memory is ahead of the durable record; the entry must not be evicted.
    dirty: bool,
}

impl SessionEntry {
    fn new(session: Session, dirty: bool) -> Self {
        Self {
            session,
            handle: None,
            last_active: Instant::now(),
            removed: false,
            dirty,
        }
    }
}

type Slot = Arc<Mutex<SessionEntry>>;

/// Exclusive access to one session for the duration of a request.
///
/// Other requests for the same session wait until the lease is dropped.
pub struct SessionLease {
    guard: OwnedMutexGuard<SessionEntry>,
    created: bool,
}

impl SessionLease {
    /// Whether this lease created the session.
    pub fn is_new(&self) -> bool {
        self.created
    }
}

impl Deref for SessionLease {
    type Target = SessionEntry;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl DerefMut for SessionLease {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

/// Session registry with a durable backend.
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    slots: RwLock<HashMap<String, Slot>>,
}

impl SessionStore {
    /// Create a store over a backend.
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            backend,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store keeping records in process memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Create a store using the configured backend.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend: Arc<dyn SessionBackend> = match config.session.storage {
            StorageBackend::File => Arc::new(FileBackend::new(config.sessions_dir()?)),
            StorageBackend::Memory => Arc::new(MemoryBackend::new()),
        };
        info!("Session storage: {}", backend.name());
        Ok(Self::new(backend))
    }

    /// Name of the durable backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Acquire an existing session, rehydrating it from the backend if it is
    /// not in memory.
    ///
    /// Returns `Ok(None)` when no such session exists (or it was removed while
    /// this call waited). Backend read failures are returned as errors.
    pub async fn resolve(&self, id: &SessionId) -> Result<Option<SessionLease>> {
        loop {
            let cached = self.slots.read().await.get(id.as_str()).cloned();

            let slot = match cached {
                Some(slot) => slot,
                None => {
                    let Some(session) = self.backend.load(id).await? else {
                        return Ok(None);
                    };
                    debug!("Rehydrated session {} from {}", id, self.backend.name());

                    // Another request may have rehydrated or created it meanwhile.
                    self.slots
                        .write()
                        .await
                        .entry(id.to_string())
                        .or_insert_with(|| Arc::new(Mutex::new(SessionEntry::new(session, false))))
                        .clone()
                }
            };

            let guard = slot.clone().lock_owned().await;
            if guard.removed {
                return Ok(None);
            }
            if !self.is_current(id, &slot).await {
                // Evicted while we waited; the durable record is current.
                continue;
            }

            return Ok(Some(SessionLease {
                guard,
                created: false,
            }));
        }
    }

    /// Resume the session `id` if it exists, otherwise create a new session
    /// bound to `playbook_source`.
    ///
    /// Resuming ignores `playbook_source`: the stored session is authoritative.
    /// A record that exists but cannot be read is an error, never replaced.
    pub async fn create_or_resume(
        &self,
        id: Option<SessionId>,
        playbook_source: &str,
    ) -> Result<SessionLease> {
        let supplied = id.is_some();
        let id = id.unwrap_or_else(SessionId::generate);

        loop {
            if supplied {
                if let Some(lease) = self.resolve(&id).await? {
                    return Ok(lease);
                }
            }

            let (slot, created) = match self.slots.write().await.entry(id.to_string()) {
                Entry::Occupied(entry) => (entry.get().clone(), false),
                Entry::Vacant(entry) => {
                    let session = Session::new(id.clone(), playbook_source);
                    let slot = Arc::new(Mutex::new(SessionEntry::new(session, true)));
                    entry.insert(slot.clone());
                    (slot, true)
                }
            };

            let guard = slot.clone().lock_owned().await;
            if guard.removed || !self.is_current(&id, &slot).await {
                // Lost a race with remove or eviction; look again.
                continue;
            }

            if created {
                info!("Created session {}", id);
            }
            return Ok(SessionLease { guard, created });
        }
    }

    async fn is_current(&self, id: &SessionId, slot: &Slot) -> bool {
        self.slots
            .read()
            .await
            .get(id.as_str())
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    /// Persist the serializable state of a leased session.
    ///
    /// Commits of a session that was removed are skipped.
    pub async fn commit(&self, lease: &mut SessionLease) -> Result<()> {
        lease.guard.last_active = Instant::now();
        if lease.guard.removed {
            debug!("Skipping commit of removed session {}", lease.session.id);
            return Ok(());
        }

        let result = self.backend.save(&lease.session).await;
        lease.guard.dirty = result.is_err();
        result
    }

    /// Drop a session from memory and delete its durable record.
    ///
    /// Waits for any in-flight request on the session. Removing an unknown
    /// session succeeds.
    pub async fn remove(&self, id: &SessionId) -> Result<()> {
        let slot = self.slots.write().await.remove(id.as_str());
        if let Some(slot) = slot {
            slot.lock().await.removed = true;
        }
        self.backend.delete(id).await?;
        info!("Removed session {}", id);
        Ok(())
    }

    /// Ids of all known sessions, in memory or durable.
    pub async fn list(&self) -> Result<Vec<SessionId>> {
        let mut ids: BTreeSet<SessionId> = self.backend.list().await?.into_iter().collect();
        for key in self.slots.read().await.keys() {
            if let Ok(id) = SessionId::parse(key.as_str()) {
                ids.insert(id);
            }
        }
        Ok(ids.into_iter().collect())
    }

    /// Whether a session is currently held in memory.
    pub async fn is_cached(&self, id: &SessionId) -> bool {
        self.slots.read().await.contains_key(id.as_str())
    }

    /// Number of sessions held in memory.
    pub async fn cached_len(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Drop in-memory sessions idle for longer than `ttl`.
    ///
    /// Sessions with a request in flight, and sessions whose latest state
    /// never reached the backend, are kept. Durable records are left
    /// untouched and rehydrate on the next access. Returns the number evicted.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut slots = self.slots.write().await;
        let before = slots.len();
        let mut pinned = 0;

        slots.retain(|_, slot| match slot.try_lock() {
            Ok(entry) if entry.dirty => {
                pinned += 1;
                true
            }
            Ok(entry) => entry.last_active.elapsed() <= ttl,
            Err(_) => true,
        });

        if pinned > 0 {
            warn!("Keeping {} unpersisted sessions in memory", pinned);
        }
        let evicted = before - slots.len();
        if evicted > 0 {
            debug!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    /// Spawn a background task evicting idle sessions every `interval`.
    pub fn spawn_idle_sweeper(self: Arc<Self>, ttl: Duration, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.evict_idle(ttl).await;
            }
        })
    }
}
