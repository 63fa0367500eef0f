//! Entry point for the **launchgrid** host.
//!
//! Scans the catalog and listens for commands on background threads, and
//! runs the [`LaunchSession`](launchgrid::session::LaunchSession) on the main
//! thread.  The main loop wakes up at least every [`TICK`] to drive the
//! edge-hover timer.
//!
//! `launchgrid --reset` backs up and deletes the saved board, then exits.

use launchgrid::backend::catalog::ManifestCatalog;
use launchgrid::backend::launcher::OpenerLauncher;
use launchgrid::backend::store::JsonFileStore;
use launchgrid::command::Command;
use launchgrid::config::Config;
use launchgrid::ipc::listener::UnixSocketListener;
use launchgrid::item::Item;
use launchgrid::session::{LaunchSession, LoadOptions};
use launchgrid::traits::{CatalogSource, CommandSource, SessionEvent};
use log::{debug, error, info};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(50);

/// Default socket path for the command listener.
fn default_socket_path() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("launchgrid.sock")
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/launchgrid`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("launchgrid")
}

/// Try to load the config from `$XDG_CONFIG_HOME/launchgrid/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn open_store(config: &Config) -> JsonFileStore {
    let path = config
        .storage
        .data_file
        .clone()
        .unwrap_or_else(JsonFileStore::default_path);
    JsonFileStore::new(path)
}

//  Main

fn main() {
    env_logger::init();

    let config = load_config();
    let store = open_store(&config);

    if std::env::args().any(|a| a == "--reset") {
        reset_board(&store);
        return;
    }

    let catalog_rx = spawn_catalog_scan(&config);
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx);

    let launcher = OpenerLauncher::new(config.launch.opener.clone());
    let mut session = LaunchSession::new(store, launcher, config.drag.clone());
    session.set_events(spawn_event_logger());

    session.begin_loading();
    let catalog = catalog_rx.recv().unwrap_or_default();
    session.finish_loading(catalog, LoadOptions::from(&config.storage));

    info!("launchgrid running");
    loop {
        match cmd_rx.recv_timeout(TICK) {
            Ok(cmd) => {
                debug!("command: {}", cmd);
                if let Err(e) = session.handle(cmd) {
                    error!("command error: {}", e);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        session.tick(Instant::now());
    }
    info!("all command sources closed, exiting");
}

//  Helpers

fn reset_board(store: &JsonFileStore) {
    match store.backup() {
        Ok(Some(path)) => info!("previous board kept at {}", path.display()),
        Ok(None) => info!("nothing to reset at {}", store.path().display()),
        Err(e) => {
            error!("backup failed, not resetting: {}", e);
            std::process::exit(1);
        }
    }
    if let Err(e) = store.reset() {
        error!("reset failed: {}", e);
        std::process::exit(1);
    }
}

/// Scan the catalog once on a background thread and hand the result over.
fn spawn_catalog_scan(config: &Config) -> mpsc::Receiver<Vec<Item>> {
    let (tx, rx) = mpsc::channel();
    let path = config
        .catalog
        .manifest
        .clone()
        .unwrap_or_else(|| config_dir().join("apps.json"));
    std::thread::spawn(move || {
        let mut catalog = ManifestCatalog::new(&path);
        let items = catalog.scan().unwrap_or_else(|e| {
            error!("catalog scan failed: {}", e);
            Vec::new()
        });
        let _ = tx.send(items);
    });
    rx
}

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    let path = default_socket_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}

/// Without a renderer attached, session events only go to the log.
fn spawn_event_logger() -> mpsc::Sender<SessionEvent> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for event in rx {
            match event {
                SessionEvent::PageChanged { page, total_pages } => {
                    info!("page {} of {}", page + 1, total_pages)
                }
                SessionEvent::LayoutChanged(layout) => {
                    debug!("page {} relaid, first item {}", layout.page + 1, layout.first_item)
                }
                SessionEvent::EdgeCountdown { edge, remaining } => {
                    debug!("turning towards {:?} edge in {:?}", edge, remaining)
                }
                SessionEvent::Notice(notice) => info!("notice: {:?}", notice),
            }
        }
    });
    tx
}
