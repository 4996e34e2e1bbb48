use crate::store::{HandleKind, StorageHandle, StoreInner};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// What a call to [`StorageLease::release`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The location was removed (or was already gone from disk).
    Released,
    /// An earlier call already released this lease.
    AlreadyReleased,
    /// Removal failed; the error was logged.
    Failed,
}

/// Exclusive ownership of one allocated location.
///
/// `release` removes the location once; later calls are no-ops. A lease that
/// is dropped unreleased removes its location synchronously in `Drop`.
pub struct StorageLease {
    handle: StorageHandle,
    store: Arc<StoreInner>,
    released: AtomicBool,
}

impl StorageLease {
    pub(crate) fn new(handle: StorageHandle, store: Arc<StoreInner>) -> Self {
        Self {
            handle,
            store,
            released: AtomicBool::new(false),
        }
    }

    pub fn handle(&self) -> &StorageHandle {
        &self.handle
    }

    pub fn path(&self) -> &Path {
        &self.handle.path
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    pub async fn release(&self) -> ReleaseOutcome {
        if self.released.swap(true, Ordering::AcqRel) {
            return ReleaseOutcome::AlreadyReleased;
        }

        let start = Instant::now();
        let path = &self.handle.path;
        let result = match self.handle.kind {
            HandleKind::File => tokio::fs::remove_file(path).await,
            HandleKind::Directory => tokio::fs::remove_dir_all(path).await,
        };
        self.store.deregister(path);

        match result {
            Ok(()) => {
                tracing::debug!(
                    request_id = %self.handle.request_id,
                    path = %path.display(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Released ephemeral storage"
                );
                ReleaseOutcome::Released
            }
            Err(e) if e.kind() == ErrorKind::NotFound => ReleaseOutcome::Released,
            Err(e) => {
                tracing::warn!(
                    request_id = %self.handle.request_id,
                    path = %path.display(),
                    error = %e,
                    "Failed to release ephemeral storage"
                );
                ReleaseOutcome::Failed
            }
        }
    }
}

impl std::fmt::Debug for StorageLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageLease")
            .field("handle", &self.handle)
            .field("released", &self.is_released())
            .finish()
    }
}

impl Drop for StorageLease {
    fn drop(&mut self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }

        let path = &self.handle.path;
        let result = match self.handle.kind {
            HandleKind::File => std::fs::remove_file(path),
            HandleKind::Directory => std::fs::remove_dir_all(path),
        };
        self.store.deregister(path);

        tracing::warn!(
            request_id = %self.handle.request_id,
            path = %path.display(),
            "Ephemeral storage released on drop"
        );

        if let Err(e) = result {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to release ephemeral storage on drop"
                );
            }
        }
    }
}
