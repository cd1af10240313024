//! Terminal client: manage saved stops and watch their arrivals.

use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use bus_board::arrivals::ArrivalsClient;
use bus_board::board::{Board, BoardSnapshot, Poller, PollerConfig, render_snapshot};
use bus_board::config::{
    ConfigStore, FileStorage, NewSubscription, Subscription, SubscriptionPatch, parse_routes,
};
use bus_board::settings::ClientSettings;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Live bus arrivals for your saved stops
#[derive(Debug, Parser)]
#[command(name = "board", version, about)]
struct Args {
    /// Directory holding saved stops (overrides BUS_BOARD_DATA_DIR)
    #[arg(long, value_name = "PATH", global = true)]
    data_dir: Option<PathBuf>,

    /// Base URL of the arrivals proxy (overrides BUS_BOARD_PROXY_URL)
    #[arg(long, value_name = "URL", global = true)]
    proxy_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show live arrivals, refreshing periodically (default)
    Watch {
        /// Seconds between full refreshes
        #[arg(long, default_value_t = 5)]
        refresh_secs: u64,
    },
    #[command(flatten)]
    Manage(ManageCommand),
}

#[derive(Debug, Subcommand)]
enum ManageCommand {
    /// List saved stops
    List,
    /// Save a new stop
    Add {
        /// Stop code, e.g. 67009
        #[arg(long)]
        code: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Comma-separated route numbers, e.g. "371,3"
        #[arg(long)]
        routes: String,
    },
    /// Change a saved stop
    Edit {
        id: String,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        routes: Option<String>,
    },
    /// Delete a saved stop
    Remove { id: String },
    /// Move a stop one place up
    Up { id: String },
    /// Move a stop one place down
    Down { id: String },
    /// Put stops in the given order
    Reorder { ids: Vec<String> },
}

type Store = ConfigStore<FileStorage>;

fn print_list(subscriptions: &[Subscription]) {
    if subscriptions.is_empty() {
        println!("No stops saved.");
        return;
    }
    for (index, s) in subscriptions.iter().enumerate() {
        println!(
            "{:>2}. {} [{}] routes {}  (id {})",
            index + 1,
            s.display_name,
            s.stop_code,
            s.monitored_routes.join(", "),
            s.id
        );
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    process::exit(1);
}

fn run_command(store: &Store, command: ManageCommand) {
    match command {
        ManageCommand::List => print_list(&store.list()),
        ManageCommand::Add { code, name, routes } => {
            match store.add(NewSubscription::new(code, name, parse_routes(&routes))) {
                Ok(s) => println!("Added {} (id {})", s.display_name, s.id),
                Err(e) => fail(e),
            }
        }
        ManageCommand::Edit {
            id,
            code,
            name,
            routes,
        } => {
            let patch = SubscriptionPatch {
                stop_code: code,
                display_name: name,
                monitored_routes: routes.as_deref().map(parse_routes),
            };
            match store.update(&id, patch) {
                Ok(Some(s)) => println!("Updated {} (id {})", s.display_name, s.id),
                Ok(None) => fail(format!("no stop with id {id}")),
                Err(e) => fail(e),
            }
        }
        ManageCommand::Remove { id } => {
            if !store.delete(&id) {
                fail(format!("no stop with id {id}"));
            }
            println!("Removed {id}");
        }
        ManageCommand::Up { id } => {
            if !store.move_up(&id) {
                println!("{id} is already first (or unknown)");
            }
            print_list(&store.list());
        }
        ManageCommand::Down { id } => {
            if !store.move_down(&id) {
                println!("{id} is already last (or unknown)");
            }
            print_list(&store.list());
        }
        ManageCommand::Reorder { ids } => print_list(&store.reorder(&ids)),
    }
}

/// Resolve a stdin line to a subscription id: either an id or a 1-based position.
fn resolve(line: &str, subscriptions: &[Subscription]) -> Option<String> {
    let line = line.trim();
    if let Ok(position) = line.parse::<usize>()
        && let Some(s) = position.checked_sub(1).and_then(|i| subscriptions.get(i))
    {
        return Some(s.id.clone());
    }
    subscriptions
        .iter()
        .find(|s| s.id == line)
        .map(|s| s.id.clone())
}

async fn watch(store: Arc<Store>, client: Arc<ArrivalsClient>, refresh_secs: u64) {
    let board = Board::new();
    let config =
        PollerConfig::default().with_refresh_interval(Duration::from_secs(refresh_secs.max(1)));

    let handle = Poller::start(
        &config,
        board.clone(),
        client.clone(),
        store.clone(),
        |snapshot: &BoardSnapshot| {
            println!();
            print!("{}", render_snapshot(snapshot));
        },
        |now| {
            print!(
                "\r{}  (type a stop number to refresh it, q to quit) ",
                now.format("%H:%M:%S")
            );
            let _ = std::io::stdout().flush();
        },
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "failed to read stdin");
                        break;
                    }
                };
                if line.trim() == "q" {
                    break;
                }
                let subscriptions = {
                    let store = Arc::clone(&store);
                    match tokio::task::spawn_blocking(move || store.list()).await {
                        Ok(subscriptions) => subscriptions,
                        Err(e) => {
                            warn!(error = %e, "failed to read saved stops");
                            continue;
                        }
                    }
                };
                let Some(id) = resolve(&line, &subscriptions) else {
                    println!("Unknown stop: {}", line.trim());
                    continue;
                };
                let Some(marked) = board.begin_refresh(&subscriptions, &id).await else {
                    continue;
                };
                println!();
                print!("{}", render_snapshot(&marked));

                let (board, client) = (board.clone(), client.clone());
                tokio::spawn(async move {
                    board.finish_refresh(&*client, &subscriptions, &id).await;
                    println!();
                    print!("{}", render_snapshot(&board.snapshot().await));
                });
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.join().await;
    println!();
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = ClientSettings::from_env();
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }
    if let Some(url) = args.proxy_url {
        settings.arrivals.base_url = url;
    }

    let store = ConfigStore::new(FileStorage::new(&settings.data_dir));
    store.seed_defaults();

    match args.command.unwrap_or(Command::Watch { refresh_secs: 5 }) {
        Command::Watch { refresh_secs } => {
            let client = ArrivalsClient::new(settings.arrivals)
                .unwrap_or_else(|e| fail(format!("failed to create arrivals client: {e}")));
            watch(Arc::new(store), Arc::new(client), refresh_secs).await;
        }
        Command::Manage(command) => run_command(&store, command),
    }
}
