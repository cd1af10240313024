//! Periodic drivers for the board.
//!
//! Two independent timers: a refresh cycle (5 s by default) that rebuilds the
//! whole board from the current subscription list, and a clock tick (1 s)
//! that only reports the time. Neither waits on the other.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::arrivals::ArrivalsSource;
use crate::config::{ConfigStore, Storage};

use super::state::{Board, BoardSnapshot};

/// Timer configuration.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Interval between full refresh cycles.
    pub refresh_interval: Duration,

    /// Interval between clock ticks.
    pub clock_interval: Duration,
}

impl PollerConfig {
    pub fn new(refresh_interval: Duration, clock_interval: Duration) -> Self {
        Self {
            refresh_interval,
            clock_interval,
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_clock_interval(mut self, interval: Duration) -> Self {
        self.clock_interval = interval;
        self
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(5),
            clock_interval: Duration::from_secs(1),
        }
    }
}

/// Running timers. Dropping the handle also stops them.
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    refresh_task: JoinHandle<()>,
    clock_task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop both timers. Work already in flight may still finish; its result
    /// is applied to the board but no callback fires.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Stop both timers and wait for their tasks to exit.
    pub async fn join(self) {
        self.shutdown();
        let _ = self.refresh_task.await;
        let _ = self.clock_task.await;
    }
}

/// Starts the refresh and clock timers.
pub struct Poller;

impl Poller {
    /// Spawn both timers on the current runtime.
    ///
    /// Each refresh cycle reads a fresh subscription snapshot from `store`
    /// on the blocking pool, rebuilds `board`, then calls `on_refresh` with
    /// the board as it stands. The first cycle and the first clock tick fire
    /// immediately.
    pub fn start<S, St, R, C>(
        config: &PollerConfig,
        board: Board,
        source: Arc<S>,
        store: Arc<ConfigStore<St>>,
        on_refresh: R,
        on_clock: C,
    ) -> PollerHandle
    where
        S: ArrivalsSource + 'static,
        St: Storage + 'static,
        R: Fn(&BoardSnapshot) + Send + 'static,
        C: Fn(DateTime<Local>) + Send + 'static,
    {
        let (shutdown, _) = watch::channel(false);

        let refresh_task = {
            let mut stop = shutdown.subscribe();
            let period = config.refresh_interval;
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {}
                        _ = stop.changed() => break,
                    }

                    let listing = {
                        let store = Arc::clone(&store);
                        tokio::task::spawn_blocking(move || store.list()).await
                    };
                    let subscriptions = match listing {
                        Ok(subscriptions) => subscriptions,
                        Err(e) => {
                            warn!(error = %e, "reading subscriptions failed, skipping cycle");
                            continue;
                        }
                    };
                    board.refresh_all(&*source, &subscriptions).await;

                    if *stop.borrow() {
                        break;
                    }
                    let snapshot = board.snapshot().await;
                    on_refresh(&snapshot);
                }
                debug!("refresh timer stopped");
            })
        };

        let clock_task = {
            let mut stop = shutdown.subscribe();
            let period = config.clock_interval;
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = interval.tick() => on_clock(Local::now()),
                        _ = stop.changed() => break,
                    }
                }
                debug!("clock timer stopped");
            })
        };

        info!(
            refresh_secs = config.refresh_interval.as_secs_f64(),
            clock_secs = config.clock_interval.as_secs_f64(),
            "poller started"
        );

        PollerHandle {
            shutdown,
            refresh_task,
            clock_task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::arrivals::mock::{MockArrivalsSource, response, service};
    use crate::config::{MemoryStorage, NewSubscription};

    #[test]
    fn default_config() {
        let config = PollerConfig::default();
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert_eq!(config.clock_interval, Duration::from_secs(1));
    }

    #[test]
    fn config_builder() {
        let config = PollerConfig::default()
            .with_refresh_interval(Duration::from_secs(30))
            .with_clock_interval(Duration::from_millis(500));
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.clock_interval, Duration::from_millis(500));
    }

    async fn fixture() -> (Arc<MockArrivalsSource>, Arc<ConfigStore<MemoryStorage>>) {
        let mock = MockArrivalsSource::new();
        mock.set_arrivals("67009", response(vec![service("371", &[120_000])]))
            .await;

        let store = ConfigStore::new(MemoryStorage::new());
        store
            .add(NewSubscription::new("67009", "SengKang", vec!["371".into()]))
            .unwrap();

        (Arc::new(mock), Arc::new(store))
    }

    #[tokio::test(start_paused = true)]
    async fn timers_run_independently_and_stop_on_shutdown() {
        let (mock, store) = fixture().await;
        let refreshes = Arc::new(AtomicUsize::new(0));
        let ticks = Arc::new(AtomicUsize::new(0));

        let handle = {
            let (refreshes, ticks) = (refreshes.clone(), ticks.clone());
            Poller::start(
                &PollerConfig::default(),
                Board::new(),
                mock.clone(),
                store,
                move |snapshot: &BoardSnapshot| {
                    assert_eq!(snapshot.entries.len(), 1);
                    assert!(snapshot.last_refreshed.is_some());
                    refreshes.fetch_add(1, Ordering::SeqCst);
                },
                move |_| {
                    ticks.fetch_add(1, Ordering::SeqCst);
                },
            )
        };

        // Ticks at 0..=10 s for the clock, 0/5/10 s for refresh.
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(refreshes.load(Ordering::SeqCst), 3);
        assert_eq!(ticks.load(Ordering::SeqCst), 11);
        assert_eq!(mock.calls(), 3);

        handle.join().await;
        let (r, t) = (refreshes.load(Ordering::SeqCst), ticks.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(refreshes.load(Ordering::SeqCst), r);
        assert_eq!(ticks.load(Ordering::SeqCst), t);
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn each_cycle_uses_current_subscriptions() {
        let (mock, store) = fixture().await;
        let board = Board::new();

        let handle = Poller::start(
            &PollerConfig::default(),
            board.clone(),
            mock,
            store.clone(),
            |_: &BoardSnapshot| {},
            |_| {},
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(board.entries().await.len(), 1);

        store
            .add(NewSubscription::new("67661", "Home", vec!["371".into()]))
            .unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        let entries = board.entries().await;
        let names: Vec<&str> = entries.iter().map(|e| e.stop_name.as_str()).collect();
        assert_eq!(names, vec!["SengKang", "Home"]);

        handle.join().await;
    }
}
