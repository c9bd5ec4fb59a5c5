//! Detached remote writes.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::{FunnelError, Result};

/// Handle to a remote write running in the background.
///
/// Dropping the handle detaches the write; it still runs to completion and
/// its failure is still logged. Awaiting [`PendingWrite::settled`] yields the
/// stored value, or `None` if the write failed.
#[derive(Debug)]
#[must_use = "drop the handle to detach the write, or await `settled()`"]
pub struct PendingWrite<T> {
    operation: &'static str,
    handle: JoinHandle<Option<T>>,
}

impl<T: Send + 'static> PendingWrite<T> {
    /// Spawn `write` on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `FunnelError::NoRuntime` outside a Tokio runtime; `write` is
    /// dropped without running.
    pub(crate) fn spawn<F>(operation: &'static str, write: F) -> Result<Self>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| FunnelError::NoRuntime(operation))?;
        let handle = runtime.spawn(async move {
            match write.await {
                Ok(value) => {
                    tracing::debug!(operation, "Remote write stored");
                    Some(value)
                }
                Err(e) => {
                    e.log_swallowed(operation);
                    None
                }
            }
        });

        Ok(Self { operation, handle })
    }

    /// Name of the write, for logs.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// Wait for the write to finish.
    pub async fn settled(self) -> Option<T> {
        match self.handle.await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(operation = self.operation, error = %e, "Remote write task failed");
                None
            }
        }
    }

    /// Let the write finish on its own.
    pub fn detach(self) {
        tracing::trace!(operation = self.operation, "Detached remote write");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;

    #[test]
    fn test_spawn_outside_runtime_is_an_error() {
        let err = PendingWrite::spawn("submit_feedback", async { Ok(1) }).unwrap_err();
        assert!(matches!(err, FunnelError::NoRuntime("submit_feedback")));
    }

    #[tokio::test]
    async fn test_settled_yields_value_or_none() {
        let ok = PendingWrite::spawn("ok", async { Ok(7) }).unwrap();
        assert_eq!(ok.operation(), "ok");
        assert_eq!(ok.settled().await, Some(7));

        let failed = PendingWrite::<i32>::spawn("failed", async {
            Err(GatewayError::NotConfigured.into())
        })
        .unwrap();
        assert_eq!(failed.settled().await, None);
    }
}
