use crate::error::StorageResult;
use crate::lease::{ReleaseOutcome, StorageLease};
use crate::store::{EphemeralStore, HandleKind, StorageHandle};
use uuid::Uuid;

/// Totals of a [`RequestScope::release`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeReport {
    pub released: usize,
    pub failed: usize,
}

/// All storage allocated on behalf of one request.
///
/// `release` consumes the scope, so nothing can be allocated or used through
/// it afterwards. Dropping an unreleased scope falls back to each lease's
/// `Drop`.
#[derive(Debug)]
pub struct RequestScope {
    store: EphemeralStore,
    request_id: Uuid,
    leases: Vec<StorageLease>,
}

impl RequestScope {
    pub(crate) fn new(store: EphemeralStore, request_id: Uuid) -> Self {
        Self {
            store,
            request_id,
            leases: Vec::new(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn handle_count(&self) -> usize {
        self.leases.len()
    }

    pub async fn allocate_file(&mut self, extension: Option<&str>) -> StorageResult<StorageHandle> {
        self.allocate(HandleKind::File, extension).await
    }

    pub async fn allocate_dir(&mut self) -> StorageResult<StorageHandle> {
        self.allocate(HandleKind::Directory, None).await
    }

    async fn allocate(
        &mut self,
        kind: HandleKind,
        extension: Option<&str>,
    ) -> StorageResult<StorageHandle> {
        let lease = self.store.allocate(self.request_id, kind, extension).await?;
        let handle = lease.handle().clone();
        self.leases.push(lease);
        Ok(handle)
    }

    /// Release every handle, most recent first.
    pub async fn release(mut self) -> ScopeReport {
        let mut report = ScopeReport::default();

        while let Some(lease) = self.leases.pop() {
            match lease.release().await {
                ReleaseOutcome::Released | ReleaseOutcome::AlreadyReleased => report.released += 1,
                ReleaseOutcome::Failed => report.failed += 1,
            }
        }

        if report.released + report.failed > 0 {
            tracing::debug!(
                request_id = %self.request_id,
                released = report.released,
                failed = report.failed,
                "Request scope released"
            );
        }

        report
    }
}
