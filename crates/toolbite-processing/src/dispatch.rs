//! Strategy registry and the request dispatcher.
//!
//! The dispatcher validates a request before touching storage, allocates
//! what the chosen strategy asks for, runs it, and releases every
//! allocation before returning, whatever the outcome.

use crate::lifecycle::{LifecycleState, RequestLifecycle};
use crate::traits::{TransformStrategy, Workspace};
use std::collections::HashMap;
use std::sync::Arc;
use toolbite_core::{
    ErrorMetadata, IncomingFile, LogLevel, Operation, Payload, PayloadSummary, TransformError,
    TransformOptions, TransformRequest, TransformResult,
};
use toolbite_storage::{EphemeralStore, RequestScope};
use uuid::Uuid;

/// Maps each operation to the strategy that implements it.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: HashMap<Operation, Arc<dyn TransformStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy under its own operation, returning any strategy it replaced.
    pub fn register(
        &mut self,
        strategy: Arc<dyn TransformStrategy>,
    ) -> Option<Arc<dyn TransformStrategy>> {
        self.strategies.insert(strategy.operation(), strategy)
    }

    pub fn with(mut self, strategy: impl TransformStrategy + 'static) -> Self {
        self.register(Arc::new(strategy));
        self
    }

    pub fn get(&self, operation: Operation) -> Option<Arc<dyn TransformStrategy>> {
        self.strategies.get(&operation).cloned()
    }

    pub fn operations(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| self.strategies.contains_key(op))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// A successful dispatch. Storage has already been released; `result` holds
/// only owned bytes.
#[derive(Debug)]
pub struct Dispatched {
    pub request_id: Uuid,
    pub operation: Operation,
    pub payload: PayloadSummary,
    pub result: TransformResult,
    pub lifecycle: RequestLifecycle,
}

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<StrategyRegistry>,
    store: EphemeralStore,
}

impl Dispatcher {
    pub fn new(registry: StrategyRegistry, store: EphemeralStore) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
        }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn store(&self) -> &EphemeralStore {
        &self.store
    }

    pub async fn dispatch(&self, request: TransformRequest) -> Result<Dispatched, TransformError> {
        let TransformRequest {
            operation,
            file,
            options,
        } = request;
        let request_id = Uuid::new_v4();
        let mut lifecycle = RequestLifecycle::new(request_id, operation);

        let (strategy, file) = match self.validate(operation, file, &options) {
            Ok(validated) => validated,
            Err(err) => {
                // Nothing was allocated, so cleanup is a no-op transition.
                lifecycle.advance(LifecycleState::Failed)?;
                lifecycle.advance(LifecycleState::CleanedUp)?;
                log_failure(request_id, operation, &err);
                return Err(err);
            }
        };
        lifecycle.advance(LifecycleState::Validated)?;

        let mut scope = self.store.scope(request_id);
        lifecycle.advance(LifecycleState::Dispatched)?;

        let outcome = run(strategy.as_ref(), &mut scope, &mut lifecycle, file, options).await;

        lifecycle.advance(if outcome.is_ok() {
            LifecycleState::Succeeded
        } else {
            LifecycleState::Failed
        })?;

        let report = scope.release().await;
        lifecycle.advance(LifecycleState::CleanedUp)?;
        if report.failed > 0 {
            tracing::warn!(
                request_id = %request_id,
                failed = report.failed,
                "Some temporary storage could not be removed"
            );
        }

        match outcome {
            Ok((payload, result)) => {
                tracing::info!(
                    request_id = %request_id,
                    operation = %operation,
                    size_bytes = payload.size_bytes,
                    output_bytes = result.total_bytes(),
                    artifacts = result.artifact_count(),
                    duration_ms = lifecycle.elapsed().as_millis() as u64,
                    "Transformation succeeded"
                );
                Ok(Dispatched {
                    request_id,
                    operation,
                    payload,
                    result,
                    lifecycle,
                })
            }
            Err(err) => {
                log_failure(request_id, operation, &err);
                Err(err)
            }
        }
    }

    fn validate(
        &self,
        operation: Operation,
        file: Option<IncomingFile>,
        options: &TransformOptions,
    ) -> Result<(Arc<dyn TransformStrategy>, IncomingFile), TransformError> {
        let strategy = self.registry.get(operation).ok_or_else(|| {
            TransformError::Internal(format!("no strategy registered for {}", operation))
        })?;

        let file = match file {
            Some(file) if !file.is_empty() => file,
            _ => return Err(TransformError::validation(operation.missing_file_message())),
        };

        if let Some(max) = strategy.max_payload_bytes() {
            if file.len() > max {
                return Err(TransformError::PayloadTooLarge {
                    size: file.len(),
                    max,
                });
            }
        }

        strategy.validate_options(options)?;
        Ok((strategy, file))
    }
}

/// Allocate per the strategy's plan, then run it. The caller releases `scope`.
async fn run(
    strategy: &dyn TransformStrategy,
    scope: &mut RequestScope,
    lifecycle: &mut RequestLifecycle,
    file: IncomingFile,
    options: TransformOptions,
) -> Result<(PayloadSummary, TransformResult), TransformError> {
    let plan = strategy.storage_plan();
    let request_id = scope.request_id();

    let payload = if plan.stage_input {
        let handle = scope.allocate_file(file.extension().as_deref()).await?;
        tokio::fs::write(handle.path(), &file.bytes)
            .await
            .map_err(|e| TransformError::Storage(format!("Failed to stage upload: {}", e)))?;
        Payload::staged(request_id, file, handle.path)
    } else {
        Payload::in_memory(request_id, file)
    };

    let scratch_dir = if plan.scratch_dir {
        Some(scope.allocate_dir().await?)
    } else {
        None
    };

    let summary = payload.summary();
    let workspace = Workspace {
        request_id,
        payload,
        options,
        scratch_dir,
    };

    lifecycle.advance(LifecycleState::Processing)?;
    let result = strategy.transform(&workspace).await?;
    Ok((summary, result))
}

fn log_failure(request_id: Uuid, operation: Operation, err: &TransformError) {
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            request_id = %request_id,
            operation = %operation,
            error = %err,
            "Transformation rejected"
        ),
        LogLevel::Warn => tracing::warn!(
            request_id = %request_id,
            operation = %operation,
            error = %err,
            "Transformation rejected"
        ),
        LogLevel::Error => tracing::error!(
            request_id = %request_id,
            operation = %operation,
            error = %err,
            "Transformation failed"
        ),
    }
}
