//! Environment-driven settings for the binaries.
//!
//! | Variable                 | Default                          |
//! |--------------------------|----------------------------------|
//! | `BUS_BOARD_ADDR`         | `127.0.0.1:3000`                 |
//! | `BUS_BOARD_UPSTREAM_URL` | `https://arrivelah2.busrouter.sg/` |
//! | `BUS_BOARD_PROXY_URL`    | `http://127.0.0.1:3000`          |
//! | `BUS_BOARD_DATA_DIR`     | `bus_board_data`                 |

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;

use crate::arrivals::ArrivalsConfig;
use crate::proxy::UpstreamConfig;

const DEFAULT_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);
const DEFAULT_DATA_DIR: &str = "bus_board_data";

/// Settings for the proxy server.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub upstream: UpstreamConfig,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let addr = match lookup("BUS_BOARD_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "invalid BUS_BOARD_ADDR; using default");
                SocketAddr::from(DEFAULT_ADDR)
            }),
            None => SocketAddr::from(DEFAULT_ADDR),
        };

        let upstream = lookup("BUS_BOARD_UPSTREAM_URL")
            .map(UpstreamConfig::new)
            .unwrap_or_default();

        Self { addr, upstream }
    }
}

/// Settings for the board client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub arrivals: ArrivalsConfig,
    pub data_dir: PathBuf,
}

impl ClientSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let arrivals = lookup("BUS_BOARD_PROXY_URL")
            .map(ArrivalsConfig::new)
            .unwrap_or_default();
        let data_dir = lookup("BUS_BOARD_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Self { arrivals, data_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn server_defaults() {
        let settings = ServerSettings::from_lookup(lookup(&[]));
        assert_eq!(settings.addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(settings.upstream.base_url, "https://arrivelah2.busrouter.sg/");
    }

    #[test]
    fn server_overrides() {
        let settings = ServerSettings::from_lookup(lookup(&[
            ("BUS_BOARD_ADDR", "0.0.0.0:8080"),
            ("BUS_BOARD_UPSTREAM_URL", "http://localhost:9000/"),
        ]));
        assert_eq!(settings.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(settings.upstream.base_url, "http://localhost:9000/");
    }

    #[test]
    fn invalid_addr_falls_back() {
        let settings = ServerSettings::from_lookup(lookup(&[("BUS_BOARD_ADDR", "nonsense")]));
        assert_eq!(settings.addr, "127.0.0.1:3000".parse().unwrap());
    }

    #[test]
    fn client_settings() {
        let defaults = ClientSettings::from_lookup(lookup(&[]));
        assert_eq!(defaults.arrivals.base_url, "http://127.0.0.1:3000");
        assert_eq!(defaults.data_dir, PathBuf::from("bus_board_data"));

        let custom = ClientSettings::from_lookup(lookup(&[
            ("BUS_BOARD_PROXY_URL", "https://bus.example.com"),
            ("BUS_BOARD_DATA_DIR", "/tmp/board"),
        ]));
        assert_eq!(custom.arrivals.base_url, "https://bus.example.com");
        assert_eq!(custom.data_dir, PathBuf::from("/tmp/board"));
    }
}
