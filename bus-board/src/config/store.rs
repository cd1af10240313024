//! Ordered, persisted subscription store.

use chrono::Utc;
use tracing::{error, info, warn};

use super::error::ConfigError;
use super::storage::Storage;
use super::subscription::{NewSubscription, StoredSubscription, Subscription, SubscriptionPatch};

/// Storage key holding the JSON array of subscriptions.
pub const STOPS_KEY: &str = "bus_stops";

/// Storage key marking that defaults have been seeded.
pub const INIT_KEY: &str = "bus_stops_initialized";

/// Stops seeded on first run: (name, stop code, routes).
const DEFAULT_STOPS: [(&str, &str, &[&str]); 2] = [
    ("Home 371", "67661", &["371"]),
    ("SengKang 371", "67009", &["371"]),
];

/// The default subscription set, stamped with `now` (epoch millis).
pub fn default_subscriptions(now: i64) -> Vec<Subscription> {
    DEFAULT_STOPS
        .iter()
        .enumerate()
        .map(|(index, (name, code, routes))| Subscription {
            id: format!("default-{now}-{index}"),
            stop_code: code.to_string(),
            display_name: name.to_string(),
            monitored_routes: routes.iter().map(|r| r.to_string()).collect(),
            sort_order: index as i64,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Subscription store over a [`Storage`] port.
///
/// Reads never fail: unreadable or corrupt data is logged and treated as an
/// empty collection. Failed writes are logged; the operation still reports
/// its in-memory outcome.
pub struct ConfigStore<S> {
    storage: S,
}

impl<S: Storage> ConfigStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// All subscriptions, sorted by `sort_order`.
    ///
    /// Orders are normalised on every read: records without one take their
    /// stored position, ties keep stored order, and the result is renumbered
    /// `0..n`.
    pub fn list(&self) -> Vec<Subscription> {
        self.load()
    }

    /// Look up one subscription.
    pub fn get(&self, id: &str) -> Option<Subscription> {
        self.load().into_iter().find(|s| s.id == id)
    }

    /// Append a new subscription at the end of the list.
    pub fn add(&self, input: NewSubscription) -> Result<Subscription, ConfigError> {
        let input = input.validated()?;
        let mut subscriptions = self.load();

        let now = now_millis();
        let sort_order = subscriptions
            .iter()
            .map(|s| s.sort_order)
            .max()
            .map_or(0, |max| max + 1);

        let subscription = Subscription {
            id: fresh_id(&subscriptions, now),
            stop_code: input.stop_code,
            display_name: input.display_name,
            monitored_routes: input.monitored_routes,
            sort_order,
            created_at: now,
            updated_at: now,
        };

        subscriptions.push(subscription.clone());
        self.save(&subscriptions);
        info!(id = %subscription.id, stop = %subscription.stop_code, "added subscription");

        Ok(subscription)
    }

    /// Merge `patch` into the subscription with `id`.
    ///
    /// Returns `Ok(None)` when no such subscription exists.
    pub fn update(
        &self,
        id: &str,
        patch: SubscriptionPatch,
    ) -> Result<Option<Subscription>, ConfigError> {
        let patch = patch.validated()?;
        let mut subscriptions = self.load();

        let Some(subscription) = subscriptions.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        patch.apply(subscription);
        subscription.updated_at = now_millis().max(subscription.created_at);
        let updated = subscription.clone();

        self.save(&subscriptions);
        Ok(Some(updated))
    }

    /// Remove the subscription with `id`. Returns whether one was removed.
    pub fn delete(&self, id: &str) -> bool {
        let mut subscriptions = self.load();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);

        if subscriptions.len() == before {
            return false;
        }

        self.save(&subscriptions);
        true
    }

    /// Swap with the previous subscription. `false` if first or unknown.
    pub fn move_up(&self, id: &str) -> bool {
        let mut subscriptions = self.load();
        match subscriptions.iter().position(|s| s.id == id) {
            Some(index) if index > 0 => {
                swap_order(&mut subscriptions, index - 1, index);
                self.save(&subscriptions);
                true
            }
            _ => false,
        }
    }

    /// Swap with the next subscription. `false` if last or unknown.
    pub fn move_down(&self, id: &str) -> bool {
        let mut subscriptions = self.load();
        match subscriptions.iter().position(|s| s.id == id) {
            Some(index) if index + 1 < subscriptions.len() => {
                swap_order(&mut subscriptions, index, index + 1);
                self.save(&subscriptions);
                true
            }
            _ => false,
        }
    }

    /// Put the listed ids first, in the given order.
    ///
    /// Unknown and repeated ids are ignored; unlisted subscriptions follow
    /// in their current order.
    pub fn reorder(&self, ordered_ids: &[String]) -> Vec<Subscription> {
        let mut remaining = self.load();
        let mut reordered = Vec::with_capacity(remaining.len());

        for id in ordered_ids {
            if let Some(index) = remaining.iter().position(|s| &s.id == id) {
                reordered.push(remaining.remove(index));
            }
        }
        reordered.append(&mut remaining);

        for (index, subscription) in reordered.iter_mut().enumerate() {
            subscription.sort_order = index as i64;
        }

        self.save(&reordered);
        reordered
    }

    /// Seed the default stops, at most once per storage lifetime.
    ///
    /// Gated by [`INIT_KEY`] rather than by emptiness, so a user who deletes
    /// every stop is not re-seeded. If stops already exist on the first run,
    /// only the marker is written. Returns whether defaults were added.
    pub fn seed_defaults(&self) -> bool {
        match self.storage.get(INIT_KEY) {
            Ok(Some(_)) => return false,
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "cannot read init marker; skipping default seeding");
                return false;
            }
        }

        let mut subscriptions = self.load();
        let seeded = subscriptions.is_empty();

        if seeded {
            subscriptions = default_subscriptions(now_millis());
            self.save(&subscriptions);
            info!(count = subscriptions.len(), "seeded default stops");
        }

        if let Err(e) = self.storage.set(INIT_KEY, "true") {
            error!(error = %e, "failed to write init marker");
        }

        seeded
    }

    fn load(&self) -> Vec<Subscription> {
        let raw = match self.storage.get(STOPS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read saved stops; treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<StoredSubscription>>(&raw) {
            Ok(stored) => normalise(stored),
            Err(e) => {
                warn!(error = %e, "saved stops are corrupt; treating as empty");
                Vec::new()
            }
        }
    }

    fn save(&self, subscriptions: &[Subscription]) {
        let json = match serde_json::to_string(subscriptions) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "failed to serialize stops");
                return;
            }
        };

        if let Err(e) = self.storage.set(STOPS_KEY, &json) {
            error!(error = %e, "failed to save stops");
        }
    }
}

/// Sort stored records and renumber them densely.
fn normalise(stored: Vec<StoredSubscription>) -> Vec<Subscription> {
    let mut keyed: Vec<(i64, usize, StoredSubscription)> = stored
        .into_iter()
        .enumerate()
        .map(|(position, s)| (s.sort_order.unwrap_or(position as i64), position, s))
        .collect();

    keyed.sort_by_key(|(order, position, _)| (*order, *position));

    keyed
        .into_iter()
        .enumerate()
        .map(|(rank, (_, _, s))| s.into_subscription(rank as i64))
        .collect()
}

fn swap_order(subscriptions: &mut [Subscription], a: usize, b: usize) {
    let order_a = subscriptions[a].sort_order;
    subscriptions[a].sort_order = subscriptions[b].sort_order;
    subscriptions[b].sort_order = order_a;
    subscriptions.swap(a, b);
}

/// Millisecond-timestamp id, bumped past any id already in use.
fn fresh_id(existing: &[Subscription], now: i64) -> String {
    let mut candidate = now;
    loop {
        let id = candidate.to_string();
        if !existing.iter().any(|s| s.id == id) {
            return id;
        }
        candidate += 1;
    }
}
