//! Overall time limit for one install run.
//!
//! A [`Deadline`] is fixed when the run starts and every stage is awaited
//! against it, so a stalled connection or a slow disk cannot hang the parent
//! package manager. Without a limit the stages run unbounded.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::errors::{InstallError, Result};

/// Point in time by which the whole run must finish.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    limit: Option<Duration>,
    expires_at: Option<Instant>,
}

impl Deadline {
    /// Starts the clock now. `None` means no limit.
    ///
    /// A limit too large to be represented as a point in time never expires.
    #[must_use]
    pub fn start(limit: Option<Duration>) -> Self {
        Self {
            limit,
            expires_at: limit.and_then(|limit| Instant::now().checked_add(limit)),
        }
    }

    /// A deadline that never expires.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::start(None)
    }

    /// The configured limit, if any.
    #[must_use]
    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }

    /// Awaits `fut`, failing with [`InstallError::TimedOut`] if the deadline passes first.
    ///
    /// # Errors
    ///
    /// Returns the future's own error, or `TimedOut { stage }` on expiry.
    pub async fn run<T, F>(&self, stage: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let (Some(expires_at), Some(limit)) = (self.expires_at, self.limit) else {
            return fut.await;
        };

        match tokio::time::timeout_at(expires_at, fut).await {
            Ok(result) => result,
            Err(_) => Err(InstallError::TimedOut { stage, limit }),
        }
    }

    /// Runs blocking work on the blocking pool under the deadline.
    ///
    /// Blocking work cannot be cancelled. On expiry this waits for the closure
    /// to return before reporting `TimedOut`, so the caller may remove any
    /// files the closure was writing.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, `TimedOut { stage }` on expiry, or an I/O
    /// error if the blocking task panicked.
    pub async fn run_blocking<T, F>(&self, stage: &'static str, work: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut handle = tokio::task::spawn_blocking(work);

        let (Some(expires_at), Some(limit)) = (self.expires_at, self.limit) else {
            return joined(stage, handle.await);
        };

        match tokio::time::timeout_at(expires_at, &mut handle).await {
            Ok(result) => joined(stage, result),
            Err(_) => {
                let _ = handle.await;
                Err(InstallError::TimedOut { stage, limit })
            }
        }
    }
}

fn joined<T>(
    stage: &'static str,
    result: std::result::Result<Result<T>, tokio::task::JoinError>,
) -> Result<T> {
    result.map_err(|e| {
        InstallError::io(
            format!("Blocking task failed while trying to {stage}"),
            std::io::Error::other(e),
        )
    })?
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn run_passes_through_result_without_limit() {
        let deadline = Deadline::unbounded();
        let value = deadline.run("compute", async { Ok(42) }).await.unwrap();
        assert_eq!(value, 42);
        assert!(deadline.limit().is_none());
    }

    #[tokio::test]
    async fn run_passes_through_inner_error() {
        let deadline = Deadline::start(Some(Duration::from_secs(5)));
        let err = deadline
            .run::<(), _>("look up", async { Err(InstallError::checksum_not_found("a.zip")) })
            .await
            .unwrap_err();
        assert!(matches!(err, InstallError::ChecksumNotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn run_times_out_slow_stage() {
        let deadline = Deadline::start(Some(Duration::from_millis(50)));
        let err = deadline
            .run("download archive", async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await
            .unwrap_err();

        match err {
            InstallError::TimedOut { stage, limit } => {
                assert_eq!(stage, "download archive");
                assert_eq!(limit, Duration::from_millis(50));
            }
            other => panic!("Expected TimedOut, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_is_shared_across_stages() {
        let deadline = Deadline::start(Some(Duration::from_secs(10)));

        deadline
            .run("first", async {
                tokio::time::sleep(Duration::from_secs(7)).await;
                Ok(())
            })
            .await
            .unwrap();

        let err = deadline
            .run("second", async {
                tokio::time::sleep(Duration::from_secs(7)).await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, InstallError::TimedOut { stage: "second", .. }));
    }

    #[tokio::test]
    async fn start_with_huge_limit_never_expires() {
        let deadline = Deadline::start(Some(Duration::from_secs(u64::MAX)));
        assert_eq!(deadline.limit(), Some(Duration::from_secs(u64::MAX)));

        let value = deadline.run("compute", async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
        let value = deadline.run_blocking("hash", || Ok(8)).await.unwrap();
        assert_eq!(value, 8);
    }

    #[tokio::test]
    async fn run_blocking_waits_for_work_before_timing_out() {
        let finished = Arc::new(AtomicBool::new(false));
        let deadline = Deadline::start(Some(Duration::from_millis(20)));

        let flag = Arc::clone(&finished);
        let err = deadline
            .run_blocking("extract archive", move || {
                std::thread::sleep(Duration::from_millis(200));
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::TimedOut { stage: "extract archive", .. }));
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn run_blocking_reports_panicked_work() {
        let deadline = Deadline::start(Some(Duration::from_secs(5)));
        let err = deadline
            .run_blocking::<(), _>("extract archive", || panic!("boom"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("extract archive"));
    }

    #[tokio::test]
    async fn run_blocking_returns_closure_result() {
        let deadline = Deadline::start(Some(Duration::from_secs(5)));
        let value = deadline.run_blocking("hash", || Ok("done".to_string())).await.unwrap();
        assert_eq!(value, "done");
    }
}
