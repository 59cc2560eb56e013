use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Correlates one submission with its response. Also sent as the
/// `Idempotency-Key` header.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MutationId(pub Uuid);

impl MutationId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("mutation {in_flight} is still pending")]
    AlreadyPending { in_flight: MutationId },
}

/// Pending/settled bookkeeping for one form's submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationPipeline {
    status: MutationStatus,
    in_flight: Option<MutationId>,
}

impl MutationPipeline {
    pub fn status(&self) -> &MutationStatus {
        &self.status
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<MutationId> {
        self.in_flight
    }

    pub fn begin(&mut self) -> Result<MutationId, PipelineError> {
        if let Some(in_flight) = self.in_flight {
            return Err(PipelineError::AlreadyPending { in_flight });
        }
        let id = MutationId::generate();
        self.in_flight = Some(id);
        self.status = MutationStatus::Pending;
        Ok(id)
    }

    /// Returns false when `id` is not the tracked submission (the pipeline was
    /// reset while it was in flight); status is left alone in that case.
    pub fn settle(&mut self, id: MutationId, result: Result<(), String>) -> bool {
        if self.in_flight != Some(id) {
            return false;
        }
        self.in_flight = None;
        self.status = match result {
            Ok(()) => MutationStatus::Succeeded,
            Err(message) => MutationStatus::Failed(message),
        };
        true
    }

    /// Forgets a settled outcome. A pending submission is left running.
    pub fn reset_if_settled(&mut self) {
        if !self.is_pending() {
            self.status = MutationStatus::Idle;
        }
    }
}
