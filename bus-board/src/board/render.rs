//! Plain-text rendering of the board for terminals.

use std::collections::HashSet;
use std::fmt::Write;

use crate::arrivals::{
    ArrivalRecord, RouteStatus, classify, format_arrival_time, format_duration, progress_percent,
};

use super::aggregate::BoardEntry;
use super::state::BoardSnapshot;

const BAR_WIDTH: usize = 10;

fn render_record(record: &ArrivalRecord) -> String {
    let mut text = format_duration(record.eta_millis);
    let clock = format_arrival_time(&record.estimated_timestamp);
    if !clock.is_empty() {
        let _ = write!(text, " ({clock})");
    }
    if !record.is_live_tracked {
        text.push_str(" sched");
    }
    text
}

/// Ten-cell bar filling up as the bus gets closer.
fn progress_bar(eta_ms: i64) -> String {
    let filled = usize::from(progress_percent(eta_ms)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// One line for one board row.
pub fn render_entry(entry: &BoardEntry) -> String {
    let detail = match &entry.status {
        RouteStatus::NotFound => "not found".to_string(),
        RouteStatus::NoData => "no data".to_string(),
        RouteStatus::Arrivals(records) => {
            let times: Vec<String> = records.iter().map(render_record).collect();
            match records.first() {
                Some(next) => format!(
                    "[{}] {} {}",
                    classify(next.eta_millis).label(),
                    progress_bar(next.eta_millis),
                    times.join(" | ")
                ),
                None => times.join(" | "),
            }
        }
    };
    format!("  {:>5}  {detail}", entry.route_id)
}

/// The whole board, grouped under stop headings.
///
/// Stops in `refreshing` get a marker next to their heading.
pub fn render_board(entries: &[BoardEntry], refreshing: &HashSet<String>) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;

    for entry in entries {
        if current != Some(entry.subscription_id.as_str()) {
            current = Some(entry.subscription_id.as_str());
            let marker = if refreshing.contains(&entry.subscription_id) {
                " (refreshing)"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "{} [{}] #{}{marker}",
                entry.stop_name, entry.stop_code, entry.subscription_id
            );
        }
        let _ = writeln!(out, "{}", render_entry(entry));
    }

    if out.is_empty() {
        out.push_str("No stops saved. Add one with `board add`.\n");
    }
    out
}

/// The board under a "last updated" line.
pub fn render_snapshot(snapshot: &BoardSnapshot) -> String {
    let updated = snapshot
        .last_refreshed
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    format!(
        "Last updated: {updated}\n{}",
        render_board(&snapshot.entries, &snapshot.refreshing)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(sub: &str, route: &str, status: RouteStatus) -> BoardEntry {
        BoardEntry {
            subscription_id: sub.to_string(),
            stop_code: "67009".to_string(),
            stop_name: "SengKang".to_string(),
            route_id: route.to_string(),
            status,
        }
    }

    fn record(eta_millis: i64, live: bool) -> ArrivalRecord {
        ArrivalRecord {
            route_id: "371".into(),
            operator: "SBST".into(),
            eta_millis,
            estimated_timestamp: String::new(),
            is_live_tracked: live,
        }
    }

    #[test]
    fn sentinel_rows() {
        assert_eq!(
            render_entry(&entry("a", "371", RouteStatus::NotFound)),
            "    371  not found"
        );
        assert_eq!(
            render_entry(&entry("a", "80", RouteStatus::NoData)),
            "     80  no data"
        );
    }

    #[test]
    fn arrival_row() {
        let status = RouteStatus::Arrivals(vec![record(45_000, true), record(400_000, false)]);
        assert_eq!(
            render_entry(&entry("a", "371", status)),
            "    371  [Arriving] [#########-] 45s | 6m 40s sched"
        );
    }

    #[test]
    fn progress_bar_bounds() {
        assert_eq!(progress_bar(0), "[##########]");
        assert_eq!(progress_bar(-5_000), "[##########]");
        assert_eq!(progress_bar(15 * 60 * 1000), "[----------]");
        assert_eq!(progress_bar(i64::MAX), "[----------]");
        assert_eq!(progress_bar(i64::MIN), "[##########]");
    }

    #[test]
    fn board_groups_by_stop() {
        let entries = vec![
            entry("a", "371", RouteStatus::NotFound),
            entry("a", "3", RouteStatus::NoData),
            entry("b", "5", RouteStatus::NotFound),
        ];
        let refreshing: HashSet<String> = ["b".to_string()].into_iter().collect();

        let text = render_board(&entries, &refreshing);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "SengKang [67009] #a");
        assert_eq!(lines[3], "SengKang [67009] #b (refreshing)");
    }

    #[test]
    fn empty_board() {
        assert!(render_board(&[], &HashSet::new()).contains("No stops saved"));
    }

    #[test]
    fn snapshot_has_update_line_and_marker() {
        use chrono::{Local, TimeZone};

        let mut snapshot = BoardSnapshot {
            entries: vec![entry("a", "371", RouteStatus::NotFound)],
            refreshing: ["a".to_string()].into_iter().collect(),
            last_refreshed: None,
        };
        let text = render_snapshot(&snapshot);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Last updated: never");
        assert_eq!(lines[1], "SengKang [67009] #a (refreshing)");

        snapshot.last_refreshed = Local.with_ymd_and_hms(2024, 5, 1, 8, 30, 5).single();
        assert!(render_snapshot(&snapshot).starts_with("Last updated: 08:30:05\n"));
    }
}
