//! Per-request state machine.
//!
//! `Received -> Validated -> Dispatched -> Processing -> Succeeded | Failed
//! -> CleanedUp -> Responded`. A request rejected before validation goes
//! straight from `Received` to `Failed` and still passes through `CleanedUp`.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::{Duration, Instant};
use toolbite_core::{Operation, TransformError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Received,
    Validated,
    Dispatched,
    Processing,
    Succeeded,
    Failed,
    CleanedUp,
    Responded,
}

impl LifecycleState {
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Received, Validated)
                | (Received, Failed)
                | (Validated, Dispatched)
                | (Dispatched, Processing)
                | (Dispatched, Failed)
                | (Processing, Succeeded)
                | (Processing, Failed)
                | (Succeeded, CleanedUp)
                | (Failed, CleanedUp)
                | (CleanedUp, Responded)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Received => "received",
            LifecycleState::Validated => "validated",
            LifecycleState::Dispatched => "dispatched",
            LifecycleState::Processing => "processing",
            LifecycleState::Succeeded => "succeeded",
            LifecycleState::Failed => "failed",
            LifecycleState::CleanedUp => "cleaned_up",
            LifecycleState::Responded => "responded",
        }
    }
}

impl Display for LifecycleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RequestLifecycle {
    request_id: Uuid,
    operation: Operation,
    state: LifecycleState,
    history: Vec<LifecycleState>,
    started: Instant,
}

impl RequestLifecycle {
    pub fn new(request_id: Uuid, operation: Operation) -> Self {
        Self {
            request_id,
            operation,
            state: LifecycleState::Received,
            history: vec![LifecycleState::Received],
            started: Instant::now(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Every state visited so far, starting with `Received`.
    pub fn history(&self) -> &[LifecycleState] {
        &self.history
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn advance(&mut self, next: LifecycleState) -> Result<(), TransformError> {
        if !self.state.can_transition_to(next) {
            return Err(TransformError::Internal(format!(
                "illegal lifecycle transition {} -> {}",
                self.state, next
            )));
        }

        tracing::debug!(
            request_id = %self.request_id,
            operation = %self.operation,
            from = %self.state,
            to = %next,
            "Lifecycle transition"
        );

        self.state = next;
        self.history.push(next);
        Ok(())
    }
}
