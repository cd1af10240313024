//! Subscription records and edit inputs.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// A saved stop and the routes the user watches there.
///
/// Serialized with the field names the stored collection has always used
/// (`code`, `name`, `buses`, camelCase timestamps).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,

    /// Upstream stop code, opaque to us.
    #[serde(rename = "code")]
    pub stop_code: String,

    #[serde(rename = "name")]
    pub display_name: String,

    /// Route numbers to show, in display order. Never empty.
    #[serde(rename = "buses")]
    pub monitored_routes: Vec<String>,

    /// Position in the list; lower comes first.
    pub sort_order: i64,

    /// Unix epoch milliseconds.
    pub created_at: i64,

    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

/// Stored form, tolerant of records written before ordering existed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StoredSubscription {
    pub id: String,
    #[serde(rename = "code")]
    pub stop_code: String,
    #[serde(rename = "name", default)]
    pub display_name: String,
    #[serde(rename = "buses", default)]
    pub monitored_routes: Vec<String>,
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl StoredSubscription {
    pub(super) fn into_subscription(self, sort_order: i64) -> Subscription {
        Subscription {
            id: self.id,
            stop_code: self.stop_code,
            display_name: self.display_name,
            monitored_routes: self.monitored_routes,
            sort_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for adding a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub stop_code: String,
    pub display_name: String,
    pub monitored_routes: Vec<String>,
}

impl NewSubscription {
    pub fn new(
        stop_code: impl Into<String>,
        display_name: impl Into<String>,
        monitored_routes: Vec<String>,
    ) -> Self {
        Self {
            stop_code: stop_code.into(),
            display_name: display_name.into(),
            monitored_routes,
        }
    }

    /// Trim every field and reject blanks.
    pub(super) fn validated(self) -> Result<Self, ConfigError> {
        Ok(Self {
            stop_code: required("stop code", self.stop_code)?,
            display_name: required("name", self.display_name)?,
            monitored_routes: routes(self.monitored_routes)?,
        })
    }
}

/// Partial update. `None` fields are left unchanged.
///
/// `id`, `created_at` and ordering cannot be changed through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionPatch {
    pub stop_code: Option<String>,
    pub display_name: Option<String>,
    pub monitored_routes: Option<Vec<String>>,
}

impl SubscriptionPatch {
    pub(super) fn validated(self) -> Result<Self, ConfigError> {
        Ok(Self {
            stop_code: self.stop_code.map(|c| required("stop code", c)).transpose()?,
            display_name: self.display_name.map(|n| required("name", n)).transpose()?,
            monitored_routes: self.monitored_routes.map(routes).transpose()?,
        })
    }

    pub(super) fn apply(self, subscription: &mut Subscription) {
        if let Some(code) = self.stop_code {
            subscription.stop_code = code;
        }
        if let Some(name) = self.display_name {
            subscription.display_name = name;
        }
        if let Some(routes) = self.monitored_routes {
            subscription.monitored_routes = routes;
        }
    }
}

fn required(field: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn routes(raw: Vec<String>) -> Result<Vec<String>, ConfigError> {
    let mut routes: Vec<String> = Vec::with_capacity(raw.len());
    for route in raw {
        let route = route.trim();
        if !route.is_empty() && !routes.iter().any(|r| r == route) {
            routes.push(route.to_string());
        }
    }
    if routes.is_empty() {
        return Err(ConfigError::NoRoutes);
    }
    Ok(routes)
}

/// Split a comma-separated route list such as `"371, 5"`.
///
/// Blank items are dropped and duplicates keep their first position.
pub fn parse_routes(input: &str) -> Vec<String> {
    routes(input.split(',').map(str::to_string).collect()).unwrap_or_default()
}
