//! Saved stop subscriptions.
//!
//! The subscription list is small, ordered by the user, and persisted as
//! one JSON blob through a [`Storage`] port. Every mutation reads the whole
//! collection, changes it, and writes the whole collection back.
//!
//! Known limitation: there is no cross-process locking, so two writers
//! racing on the same storage can lose an update.

mod error;
mod storage;
mod store;
mod subscription;

pub use error::{ConfigError, StorageError};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{ConfigStore, INIT_KEY, STOPS_KEY, default_subscriptions};
pub use subscription::{NewSubscription, Subscription, SubscriptionPatch, parse_routes};
