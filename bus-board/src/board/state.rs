//! Shared, refreshable board state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::RwLock;
use tracing::debug;

use crate::arrivals::ArrivalsSource;
use crate::config::Subscription;

use super::aggregate::{self, BoardEntry};

#[derive(Debug, Default)]
struct BoardInner {
    entries: Vec<BoardEntry>,
    /// Manual refreshes in flight, per subscription id.
    refreshing: HashMap<String, usize>,
    last_refreshed: Option<DateTime<Local>>,
}

/// Everything a renderer needs, read under one lock.
#[derive(Debug, Clone, Default)]
pub struct BoardSnapshot {
    pub entries: Vec<BoardEntry>,
    pub refreshing: HashSet<String>,
    pub last_refreshed: Option<DateTime<Local>>,
}

/// The last-known board, shared between the periodic cycle, manual
/// refreshes and whoever renders it.
///
/// Fetches run without holding the lock; results are applied afterwards,
/// and the last result applied wins.
#[derive(Clone, Default)]
pub struct Board {
    inner: Arc<RwLock<BoardInner>>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current rows.
    pub async fn entries(&self) -> Vec<BoardEntry> {
        self.inner.read().await.entries.clone()
    }

    /// Ids of subscriptions currently being refreshed on their own.
    pub async fn refreshing(&self) -> HashSet<String> {
        self.inner.read().await.refreshing.keys().cloned().collect()
    }

    pub async fn is_refreshing(&self, id: &str) -> bool {
        self.inner.read().await.refreshing.contains_key(id)
    }

    /// When the last full cycle was applied.
    pub async fn last_refreshed(&self) -> Option<DateTime<Local>> {
        self.inner.read().await.last_refreshed
    }

    pub async fn snapshot(&self) -> BoardSnapshot {
        let inner = self.inner.read().await;
        BoardSnapshot {
            entries: inner.entries.clone(),
            refreshing: inner.refreshing.keys().cloned().collect(),
            last_refreshed: inner.last_refreshed,
        }
    }

    /// Run a full cycle over `subscriptions` and replace the board.
    pub async fn refresh_all<S: ArrivalsSource>(&self, source: &S, subscriptions: &[Subscription]) {
        let entries = aggregate::refresh_all(source, subscriptions).await;

        let mut inner = self.inner.write().await;
        debug!(rows = entries.len(), "applying full refresh");
        inner.entries = entries;
        inner.last_refreshed = Some(Local::now());
    }

    /// Mark `id` as refreshing and return the board as it stands.
    ///
    /// Returns `None`, marking nothing, if `id` is not in `subscriptions`.
    /// Every call that returns `Some` must be paired with [`Board::finish_refresh`].
    pub async fn begin_refresh(
        &self,
        subscriptions: &[Subscription],
        id: &str,
    ) -> Option<BoardSnapshot> {
        if !subscriptions.iter().any(|s| s.id == id) {
            return None;
        }
        *self
            .inner
            .write()
            .await
            .refreshing
            .entry(id.to_string())
            .or_default() += 1;
        Some(self.snapshot().await)
    }

    /// Refresh a single subscription and put its rows on the board.
    ///
    /// Only rows of `id` are replaced, against whatever the board holds when
    /// the fetch completes; rows a full cycle applied in between are kept.
    /// `subscriptions` is only used to find the stop and, if the board has no
    /// rows for `id` yet, where to place them. Returns `false` if `id` is not
    /// in `subscriptions`.
    pub async fn refresh_stop<S: ArrivalsSource>(
        &self,
        source: &S,
        subscriptions: &[Subscription],
        id: &str,
    ) -> bool {
        if self.begin_refresh(subscriptions, id).await.is_none() {
            return false;
        }
        self.finish_refresh(source, subscriptions, id).await;
        true
    }

    /// Second half of [`Board::refresh_stop`] for callers that rendered the
    /// marker from [`Board::begin_refresh`] in between.
    pub async fn finish_refresh<S: ArrivalsSource>(
        &self,
        source: &S,
        subscriptions: &[Subscription],
        id: &str,
    ) {
        let fresh = match subscriptions.iter().find(|s| s.id == id) {
            Some(target) => Some(aggregate::fetch_entries(source, target).await),
            None => None,
        };

        let mut inner = self.inner.write().await;
        if let Some(fresh) = fresh {
            inner.entries = aggregate::replace_rows(subscriptions, &inner.entries, id, fresh);
        }
        if let Some(count) = inner.refreshing.get_mut(id) {
            *count -= 1;
            if *count == 0 {
                inner.refreshing.remove(id);
            }
        }
    }
}
