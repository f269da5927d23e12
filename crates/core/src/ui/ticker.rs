use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

/// Periodic caption rotation tied to one submission. Dropping the ticker
/// cancels it; [`CaptionTicker::stop`] also waits for the task to exit.
#[derive(Debug)]
pub struct CaptionTicker {
    token: CancellationToken,
    guard: DropGuard,
    handle: JoinHandle<()>,
}

impl CaptionTicker {
    /// `active` is incremented for as long as the task runs.
    pub fn spawn<F>(period: Duration, active: Arc<AtomicUsize>, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        active.fetch_add(1, Ordering::SeqCst);
        let running = Running(active);

        let handle = tokio::spawn(async move {
            let _running = running;
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => on_tick(),
                }
            }
        });

        Self {
            guard: token.clone().drop_guard(),
            token,
            handle,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn stop(self) {
        let CaptionTicker { guard, handle, .. } = self;
        drop(guard);
        if let Err(err) = handle.await {
            tracing::warn!(error = %err, "caption ticker task ended abnormally");
        }
        tracing::debug!("caption ticker stopped");
    }
}

struct Running(Arc<AtomicUsize>);

impl Drop for Running {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
