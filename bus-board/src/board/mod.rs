//! The arrival board: merges per-stop arrivals into one ordered list.
//!
//! Output order always comes from the subscription list snapshot
//! (subscription order, then monitored-route order), never from the order
//! in which fetches complete or the order of the upstream response.

mod aggregate;
mod poller;
mod render;
mod state;

pub use aggregate::{
    BoardEntry, entries_for, fetch_entries, refresh_all, refresh_one, replace_rows, splice,
};
pub use poller::{Poller, PollerConfig, PollerHandle};
pub use render::{render_board, render_entry, render_snapshot};
pub use state::{Board, BoardSnapshot};
