use crate::error::{StorageError, StorageResult};
use crate::keys;
use crate::lease::{ReleaseOutcome, StorageLease};
use crate::scope::RequestScope;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::fs;
use uuid::Uuid;

const MAX_ALLOCATION_ATTEMPTS: usize = 8;

/// Construction parameters of an [`EphemeralStore`].
#[derive(Debug, Clone)]
pub struct EphemeralStoreConfig {
    /// Directory under which every handle is created.
    pub base_path: PathBuf,
}

impl EphemeralStoreConfig {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    File,
    Directory,
}

/// A location allocated for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageHandle {
    pub request_id: Uuid,
    pub kind: HandleKind,
    pub path: PathBuf,
}

impl StorageHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub(crate) struct StoreInner {
    base_path: PathBuf,
    live: Mutex<HashSet<PathBuf>>,
    allocations: AtomicU64,
}

impl StoreInner {
    fn live(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn deregister(&self, path: &Path) {
        self.live().remove(path);
    }
}

/// Allocates and releases per-request temporary storage.
///
/// Cloning is cheap; clones share the same base path and bookkeeping.
#[derive(Clone)]
pub struct EphemeralStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for EphemeralStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemeralStore")
            .field("base_path", &self.inner.base_path)
            .field("live_handles", &self.live_handles())
            .finish()
    }
}

impl EphemeralStore {
    /// Create the store, creating its base directory if needed.
    pub async fn new(config: EphemeralStoreConfig) -> StorageResult<Self> {
        let base_path = config.base_path;

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create temp directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        tracing::info!(path = %base_path.display(), "Ephemeral store initialized");

        Ok(Self {
            inner: Arc::new(StoreInner {
                base_path,
                live: Mutex::new(HashSet::new()),
                allocations: AtomicU64::new(0),
            }),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.inner.base_path
    }

    /// Allocate a new file or directory owned by `request_id`.
    ///
    /// The location is created before this returns, so two concurrent
    /// allocations can never be handed the same path.
    pub async fn allocate(
        &self,
        request_id: Uuid,
        kind: HandleKind,
        extension: Option<&str>,
    ) -> StorageResult<StorageLease> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let path = self
                .inner
                .base_path
                .join(keys::handle_name(request_id, extension));

            let created = match kind {
                HandleKind::File => fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&path)
                    .await
                    .map(|_| ()),
                HandleKind::Directory => fs::create_dir(&path).await,
            };

            match created {
                Ok(()) => {
                    self.inner.live().insert(path.clone());
                    self.inner.allocations.fetch_add(1, Ordering::Relaxed);

                    tracing::debug!(
                        request_id = %request_id,
                        kind = ?kind,
                        path = %path.display(),
                        "Allocated ephemeral storage"
                    );

                    return Ok(StorageLease::new(
                        StorageHandle {
                            request_id,
                            kind,
                            path,
                        },
                        Arc::clone(&self.inner),
                    ));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(
                        request_id = %request_id,
                        attempt = attempt,
                        "Ephemeral storage name collision, retrying"
                    );
                }
                Err(e) => {
                    return Err(StorageError::AllocationFailed(format!(
                        "{}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        Err(StorageError::Exhausted(MAX_ALLOCATION_ATTEMPTS))
    }

    /// Release a lease. Idempotent; failures are logged, never returned.
    pub async fn release(&self, lease: &StorageLease) -> ReleaseOutcome {
        lease.release().await
    }

    /// Open a scope that releases everything it allocated in one call.
    pub fn scope(&self, request_id: Uuid) -> RequestScope {
        RequestScope::new(self.clone(), request_id)
    }

    /// Number of handles allocated and not yet released.
    pub fn live_handles(&self) -> usize {
        self.inner.live().len()
    }

    /// Number of successful allocations since the store was created.
    pub fn total_allocations(&self) -> u64 {
        self.inner.allocations.load(Ordering::Relaxed)
    }

    /// Remove handles left under the base path by a previous process.
    ///
    /// Only entries named like a handle are touched; anything else under the
    /// base path is left alone. Live handles are skipped.
    pub async fn purge_stale(&self) -> StorageResult<usize> {
        let mut entries = fs::read_dir(&self.inner.base_path).await?;
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let owned = entry.file_name().to_str().is_some_and(keys::is_handle_name);
            if !owned || self.inner.live().contains(&path) {
                continue;
            }

            let result = if entry.file_type().await?.is_dir() {
                fs::remove_dir_all(&path).await
            } else {
                fs::remove_file(&path).await
            };

            match result {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove stale temporary entry"
                ),
            }
        }

        if removed > 0 {
            tracing::info!(removed = removed, "Purged stale temporary entries");
        }

        Ok(removed)
    }
}
