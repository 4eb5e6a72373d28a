//! File system watcher for live rebuilds in serve mode.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Event Loop                          │
//! │                                                          │
//! │  ┌──────────┐    ┌──────────────┐    ┌────────────────┐  │
//! │  │ notify   │───▶│ is_relevant()│───▶│  build_site()  │  │
//! │  │ events   │    │ (files only) │    │  (one / event) │  │
//! │  └──────────┘    └──────────────┘    └────────────────┘  │
//! │        ▲                                                 │
//! │        └── recv_timeout(1s), exits when Ctrl+C sets stop │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no debouncing: every relevant event triggers its own full
//! rebuild, even when an editor emits several events for one save.

use crate::{build::build_site, config::SiteConfig, error::SiteError, log, serve};
use anyhow::{Context, Result};
use notify::{
    Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::{CreateKind, RemoveKind},
};
use std::{
    fs,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, RecvTimeoutError, Sender, channel},
    },
    thread,
    time::Duration,
};

// =============================================================================
// Constants
// =============================================================================

/// How often the loop wakes up to check for shutdown.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

// =============================================================================
// Event Filtering
// =============================================================================

/// Any non-access event concerning at least one non-directory.
///
/// Access events and directory-only events never trigger a rebuild. `Any`
/// and `Other` count as changes: some backends report real writes that way.
pub fn is_relevant(event: &Event) -> bool {
    let kind_matches = match event.kind {
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => false,
        EventKind::Access(_) => false,
        EventKind::Create(_)
        | EventKind::Modify(_)
        | EventKind::Remove(_)
        | EventKind::Any
        | EventKind::Other => true,
    };

    // Removed paths no longer exist and count as files
    kind_matches && event.paths.iter().any(|p| !p.is_dir())
}

/// Relative, comma-separated paths of an event for log display.
fn describe(event: &Event, root: &Path) -> String {
    event
        .paths
        .iter()
        .map(|p| p.strip_prefix(root).unwrap_or(p).display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Event Loop
// =============================================================================

/// Consume watcher events until `stop` is set or the channel closes.
///
/// Calls `rebuild` once per relevant event, in arrival order. A failed
/// rebuild ends the loop with its error. Returns the number of rebuilds.
pub fn rebuild_loop<F>(
    rx: &Receiver<notify::Result<Event>>,
    stop: &AtomicBool,
    mut rebuild: F,
) -> Result<usize>
where
    F: FnMut(&Event) -> Result<()>,
{
    let mut rebuilds = 0;

    while !stop.load(Ordering::SeqCst) {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(event)) if is_relevant(&event) => {
                rebuild(&event)?;
                rebuilds += 1;
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Disconnected) => break,
            // Irrelevant events and timeouts
            _ => {}
        }
    }

    Ok(rebuilds)
}

/// Block until `stop` is set.
fn wait_for_stop(stop: &AtomicBool) {
    while !stop.load(Ordering::SeqCst) {
        thread::sleep(POLL_INTERVAL);
    }
}

// =============================================================================
// Watcher Setup
// =============================================================================

/// Start a recursive watcher on `path`, sending events into `tx`.
///
/// The watcher stops when the returned handle is dropped.
fn arm_watcher(
    path: &Path,
    tx: Sender<notify::Result<Event>>,
) -> Result<RecommendedWatcher, SiteError> {
    let setup_error = |source: notify::Error| SiteError::WatchSetup {
        path: path.to_path_buf(),
        source,
    };

    let mut watcher = notify::recommended_watcher(tx).map_err(setup_error)?;
    watcher
        .watch(path, RecursiveMode::Recursive)
        .map_err(setup_error)?;
    Ok(watcher)
}

/// Log an error with its full cause chain.
fn log_error(err: &anyhow::Error) {
    log!("error"; "{err}");
    for cause in err.chain().skip(1) {
        log!("error"; "caused by: {cause}");
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Build, serve the output and rebuild on every source change.
///
/// Blocks until Ctrl+C. If the source directory cannot be watched, the
/// server keeps running without rebuilds.
pub fn watch_and_serve(config: &'static SiteConfig) -> Result<()> {
    let build = &config.build;
    for dir in [&build.source, &build.content] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }

    build_site(config)?;

    let addr = config.serve_addr()?;
    let server = serve::bind(addr)?;
    log!("serve"; "http://{addr}");
    serve::spawn(server, build.output.clone());

    let stop = Arc::new(AtomicBool::new(false));
    let stop_for_signal = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        stop_for_signal.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let (tx, rx) = channel();
    let _watcher = match arm_watcher(&build.source, tx) {
        Ok(watcher) => watcher,
        Err(e) => {
            log_error(&anyhow::Error::from(e));
            log!("watch"; "live rebuild disabled, still serving {}", build.output.display());
            wait_for_stop(&stop);
            return Ok(());
        }
    };
    log!("watch"; "watching {}", rel_display(&build.source, &config.root));

    rebuild_loop(&rx, &stop, |event| {
        log!("watch"; "{} changed, rebuilding...", describe(event, &config.root));
        build_site(config).map(|_| ())
    })?;

    Ok(())
}

/// `/proj/src` → `src/`
fn rel_display(path: &Path, root: &Path) -> String {
    format!("{}/", path.strip_prefix(root).unwrap_or(path).display())
}

// =============================================================================
// Tests
// =============================================================================
