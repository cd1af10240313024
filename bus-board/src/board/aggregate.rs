//! Per-subscription aggregation and splicing.

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::arrivals::{ArrivalsResponse, ArrivalsSource, RouteStatus, filter_services};
use crate::config::Subscription;

/// One row of the board: a monitored route at a saved stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardEntry {
    pub subscription_id: String,
    pub stop_code: String,
    pub stop_name: String,
    pub route_id: String,
    pub status: RouteStatus,
}

/// Board rows for one subscription.
///
/// One row per monitored route, in the subscription's route order. `None`
/// means the fetch failed, and every route becomes [`RouteStatus::NotFound`].
pub fn entries_for(
    subscription: &Subscription,
    response: Option<&ArrivalsResponse>,
) -> Vec<BoardEntry> {
    let matching = response
        .map(|r| filter_services(&r.services, &subscription.monitored_routes))
        .unwrap_or_default();

    subscription
        .monitored_routes
        .iter()
        .map(|route| {
            let service = matching.iter().copied().find(|s| &s.no == route);
            BoardEntry {
                subscription_id: subscription.id.clone(),
                stop_code: subscription.stop_code.clone(),
                stop_name: subscription.display_name.clone(),
                route_id: route.clone(),
                status: RouteStatus::from_service(service),
            }
        })
        .collect()
}

/// Fetch one subscription's stop and build its rows.
///
/// Fetch failures are logged and degrade to not-found rows.
pub async fn fetch_entries<S: ArrivalsSource>(
    source: &S,
    subscription: &Subscription,
) -> Vec<BoardEntry> {
    match source.fetch_arrivals(&subscription.stop_code).await {
        Ok(response) => {
            debug!(
                stop = %subscription.stop_code,
                services = response.services.len(),
                "fetched arrivals"
            );
            entries_for(subscription, Some(&response))
        }
        Err(e) => {
            warn!(
                stop = %subscription.stop_code,
                name = %subscription.display_name,
                error = %e,
                "failed to fetch arrivals"
            );
            entries_for(subscription, None)
        }
    }
}

/// Rebuild the whole board.
///
/// Stops are fetched concurrently; results are matched back to their
/// subscription by position, so completion order does not matter.
pub async fn refresh_all<S: ArrivalsSource>(
    source: &S,
    subscriptions: &[Subscription],
) -> Vec<BoardEntry> {
    let fetches: Vec<_> = subscriptions
        .iter()
        .map(|s| fetch_entries(source, s))
        .collect();
    let per_stop = join_all(fetches).await;
    per_stop.into_iter().flatten().collect()
}

/// Recompute one subscription and splice it into `current`.
///
/// Returns `None` if `id` is not in `subscriptions`.
pub async fn refresh_one<S: ArrivalsSource>(
    source: &S,
    subscriptions: &[Subscription],
    current: &[BoardEntry],
    id: &str,
) -> Option<Vec<BoardEntry>> {
    let target = subscriptions.iter().find(|s| s.id == id)?;
    let fresh = fetch_entries(source, target).await;
    Some(splice(subscriptions, current, id, fresh))
}

/// Place `fresh` rows for `id` into `current`, following subscription order.
///
/// Rows of every other subscription are kept as they are; rows belonging to
/// subscriptions no longer in the list are dropped.
pub fn splice(
    subscriptions: &[Subscription],
    current: &[BoardEntry],
    id: &str,
    fresh: Vec<BoardEntry>,
) -> Vec<BoardEntry> {
    let mut fresh = Some(fresh);
    let mut board = Vec::with_capacity(current.len());

    for subscription in subscriptions {
        if subscription.id == id {
            board.extend(fresh.take().unwrap_or_default());
        } else {
            board.extend(
                current
                    .iter()
                    .filter(|e| e.subscription_id == subscription.id)
                    .cloned(),
            );
        }
    }

    board
}

/// Swap the rows of `id` in `current` for `fresh`, keeping every other row.
///
/// Rows of `id` already on the board are replaced where they stand. When the
/// board has none, `fresh` goes in front of the first row belonging to a
/// subscription listed after `id` in `subscriptions`, or at the end.
pub fn replace_rows(
    subscriptions: &[Subscription],
    current: &[BoardEntry],
    id: &str,
    fresh: Vec<BoardEntry>,
) -> Vec<BoardEntry> {
    let at = match current.iter().position(|e| e.subscription_id == id) {
        Some(at) => at,
        None => {
            let later: Vec<&str> = subscriptions
                .iter()
                .skip_while(|s| s.id != id)
                .skip(1)
                .map(|s| s.id.as_str())
                .collect();
            current
                .iter()
                .position(|e| later.contains(&e.subscription_id.as_str()))
                .unwrap_or(current.len())
        }
    };

    let mut board: Vec<BoardEntry> = current[..at]
        .iter()
        .filter(|e| e.subscription_id != id)
        .cloned()
        .collect();
    board.extend(fresh);
    board.extend(
        current[at..]
            .iter()
            .filter(|e| e.subscription_id != id)
            .cloned(),
    );
    board
}
