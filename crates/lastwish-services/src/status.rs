//! Explicit status for long-running operations
//!
//! Discovery, resolution, and payment are awaited by the caller. The
//! tracker makes their in-flight state visible and refuses to start a
//! second run while one is pending.

use crate::error::ServiceError;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Status of a tracked operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum OpStatus {
    /// Never started
    #[default]
    Idle,
    /// Started and not yet finished
    Pending,
    /// Last run completed
    Succeeded,
    /// Last run failed with this message
    Failed(String),
}

impl OpStatus {
    /// Check if the operation is in flight
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Status holder for one named operation
#[derive(Debug, Clone, Default)]
pub struct OperationTracker {
    name: &'static str,
    status: OpStatus,
}

impl OperationTracker {
    /// Idle tracker
    #[inline]
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            status: OpStatus::Idle,
        }
    }

    /// Operation name used in log fields
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current status
    #[inline]
    #[must_use]
    pub fn status(&self) -> &OpStatus {
        &self.status
    }

    /// Mark as pending
    ///
    /// # Errors
    /// Returns [`ServiceError::Busy`] if already pending
    pub fn begin(&mut self) -> Result<(), ServiceError> {
        if self.status.is_pending() {
            tracing::warn!(operation = self.name, "operation already pending");
            return Err(ServiceError::Busy);
        }
        tracing::debug!(operation = self.name, "operation started");
        self.status = OpStatus::Pending;
        Ok(())
    }

    /// Mark the current run as completed
    pub fn succeed(&mut self) {
        tracing::debug!(operation = self.name, "operation succeeded");
        self.status = OpStatus::Succeeded;
    }

    /// Mark the current run as failed, keeping `reason` for display
    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(operation = self.name, %reason, "operation failed");
        self.status = OpStatus::Failed(reason);
    }

    /// Run `op` with status bookkeeping around it
    ///
    /// # Errors
    /// [`ServiceError::Busy`] if already pending, otherwise whatever `op`
    /// returns
    pub async fn run<T, F>(&mut self, op: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        self.begin()?;
        match op.await {
            Ok(value) => {
                self.succeed();
                Ok(value)
            }
            Err(e) => {
                self.fail(e.to_string());
                Err(e)
            }
        }
    }
}
