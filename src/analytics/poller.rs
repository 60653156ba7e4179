//! Periodic dashboard refresh.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Refresh period for the teacher and admin dashboards.
pub const DASHBOARD_REFRESH: Duration = Duration::from_secs(30);

/// Refresh period for relative timestamps on the community board.
pub const RELATIVE_TIME_REFRESH: Duration = Duration::from_secs(60);

/// Owns a refresh timer; dropping it stops the timer.
#[derive(Debug)]
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop refreshing; same as dropping the handle.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Run `refresh` now and then every `period`. A run always finishes before the next
/// one starts.
pub fn spawn_refresh<F, Fut>(period: Duration, mut refresh: F) -> RefreshHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            refresh().await;
        }
    });

    RefreshHandle { task }
}
