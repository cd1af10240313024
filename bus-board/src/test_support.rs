//! Shared helpers for tests that need a real HTTP server.

use std::net::SocketAddr;

use axum::Router;

/// A trimmed-down upstream response for stop 67009.
pub const SAMPLE_ARRIVALS: &str = r#"{
    "services": [
        {
            "no": "371",
            "operator": "SBST",
            "next": {"time": "2024-05-01T08:02:10+08:00", "duration_ms": 130000, "monitored": 1},
            "subsequent": {"time": "2024-05-01T08:14:00+08:00", "duration_ms": 840000, "monitored": 0},
            "next2": {"time": "2024-05-01T08:14:00+08:00", "duration_ms": 840000, "monitored": 0},
            "next3": null
        },
        {
            "no": "3",
            "operator": "SBST",
            "next": {"time": "2024-05-01T08:00:40+08:00", "duration_ms": 40000, "monitored": 1},
            "next2": null,
            "next3": null
        },
        {
            "no": "80",
            "operator": "SBST",
            "next": null,
            "next2": null,
            "next3": null
        }
    ]
}"#;

/// Serve `app` on an ephemeral localhost port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
