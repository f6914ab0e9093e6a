//! Single-run guard.

use std::sync::Arc;
use tokio::sync::watch;

/// Allows at most one ETL run at a time.
///
/// The flag lives in a watch channel so shutdown can wait for the active run
/// whether it came from the schedule or the manual trigger.
#[derive(Debug, Clone)]
pub struct RunGuard {
    running: Arc<watch::Sender<bool>>,
}

/// Held for the duration of a run; releases the guard on drop.
#[derive(Debug)]
pub struct RunPermit {
    running: Arc<watch::Sender<bool>>,
}

impl Default for RunGuard {
    fn default() -> Self {
        Self {
            running: Arc::new(watch::Sender::new(false)),
        }
    }
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` if a run is already in progress.
    pub fn try_acquire(&self) -> Option<RunPermit> {
        let acquired = self.running.send_if_modified(|running| {
            if *running {
                false
            } else {
                *running = true;
                true
            }
        });

        acquired.then(|| RunPermit {
            running: self.running.clone(),
        })
    }

    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    /// Resolve once no run holds the guard.
    pub async fn wait_idle(&self) {
        let mut rx = self.running.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|running| !*running).await;
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.running.send_replace(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let guard = RunGuard::new();

        let permit = guard.try_acquire().unwrap();
        assert!(guard.is_running());
        assert!(guard.try_acquire().is_none());

        drop(permit);
        assert!(!guard.is_running());
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let guard = RunGuard::new();
        let other = guard.clone();

        let _permit = guard.try_acquire().unwrap();
        assert!(other.try_acquire().is_none());
    }

    #[tokio::test]
    async fn test_wait_idle_returns_when_permit_dropped() {
        let guard = RunGuard::new();
        guard.wait_idle().await;

        let permit = guard.try_acquire().unwrap();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(permit);
        });

        tokio::time::timeout(Duration::from_secs(2), guard.wait_idle())
            .await
            .unwrap();
        assert!(!guard.is_running());
    }
}
