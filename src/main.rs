#![forbid(unsafe_code)]

mod cli;
mod constants;
mod geometry;
mod placement;
mod settings;
mod term_window;

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use cli::CliRequest;
use constants::config::{DEFAULT_CENTER, KEY_CENTER, KEY_HEIGHT, KEY_WIDTH};
use geometry::centered_origin;
use placement::{Anchor, PlacementRequest, ScreenContext};
use settings::SettingsStore;
use term_window::TermWindow;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse log level from environment variable
    let log_level = match env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "warn".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "info" => TraceLevel::INFO,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = env::args().skip(1).collect();
    let request = match cli::parse(&args) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("** error | {err}");
            cli::print_usage();
            process::exit(err.exit_code());
        }
    };

    if let Some(page) = request.info {
        println!("{}", page.url());
        return Ok(());
    }

    let path = settings_path();
    let mut store = SettingsStore::new();
    match store.read(&path) {
        Ok(true) => debug!(path = %path.display(), entries = store.len(), "loaded settings"),
        Ok(false) => debug!(path = %path.display(), "no settings file; using built-in defaults"),
        Err(err) => warn!(error = ?err, "could not read the settings file; using built-in defaults"),
    }

    // window queries are best-effort; config-only invocations still work
    // on a box with no display
    let window = match TermWindow::connect() {
        Ok(window) => Some(window),
        Err(err) => {
            warn!(error = ?err, "cannot reach the terminal window; geometry will not change");
            None
        }
    };

    if request.show_help {
        cli::print_usage();
        show_config(&store, window.as_ref());
        return Ok(());
    }

    if request.clear {
        store.clear();
        persist(&store, &path)?;
    }

    // `--config` alone only reports the saved values
    if request.write_config
        && request.width.is_none()
        && request.height.is_none()
        && request.anchor.is_none()
    {
        show_config(&store, window.as_ref());
        return Ok(());
    }

    // persist the raw values before clamping touches them
    if request.write_config {
        if let Some(width) = request.width {
            store.set(KEY_WIDTH, width);
        }
        if let Some(height) = request.height {
            store.set(KEY_HEIGHT, height);
        }
        if let Some(anchor) = request.anchor {
            store.set(KEY_CENTER, anchor == Anchor::Center);
        }
        persist(&store, &path)?;
    }

    let placement_request = build_placement_request(&request, &store);
    debug!(request = ?placement_request, "resolved placement request");

    if let Some(window) = window {
        apply(&window, &placement_request)?;
    }

    if request.debug {
        pause_for_enter()?;
    }

    Ok(())
}

/// Combine the arguments with the saved config: an argument wins, then a
/// saved value, and a `-` sentinel pins the dimension to "leave alone".
fn build_placement_request(request: &CliRequest, store: &SettingsStore) -> PlacementRequest {
    let saved = |key: &str| store.contains(key).then(|| store.get::<i32>(key));

    let anchor = if request.skip_anchor {
        Anchor::NotSet
    } else if let Some(anchor) = request.anchor {
        anchor
    } else if store.contains(KEY_CENTER) {
        if store.get::<bool>(KEY_CENTER) { Anchor::Center } else { Anchor::NotSet }
    } else if DEFAULT_CENTER {
        Anchor::Center
    } else {
        Anchor::NotSet
    };

    PlacementRequest {
        width: if request.skip_width { None } else { request.width.or_else(|| saved(KEY_WIDTH)) },
        height: if request.skip_height { None } else { request.height.or_else(|| saved(KEY_HEIGHT)) },
        anchor,
        keep_width: request.skip_width,
        keep_height: request.skip_height,
    }
}

/// Resolve and apply the geometry. Each step failing is a warning, not an
/// abort: a resize the window manager refuses should not stop the move.
fn apply(window: &TermWindow, request: &PlacementRequest) -> Result<()> {
    let rect = window.rect().context("Failed to query the window rectangle")?;
    let work_area = window.work_area().context("Failed to query the working area")?;
    let (columns, rows) = window.size().context("Failed to query the terminal size")?;
    let limits = window.limits(&work_area);
    debug!(?rect, ?work_area, columns, rows, ?limits, "screen state");

    let screen = ScreenContext { window: rect, work_area, columns, rows };
    let placement = placement::resolve(request, &screen, &limits)?;

    for warning in &placement.warnings {
        warn!("{warning}");
    }

    // width before height; the window manager applies each on its own
    if let Some(columns) = placement.columns
        && let Err(err) = window.set_columns(columns)
    {
        warn!(error = ?err, "could not set the width");
    }
    if let Some(rows) = placement.rows
        && let Err(err) = window.set_rows(rows)
    {
        warn!(error = ?err, "could not set the height");
    }

    if placement.recenter {
        // the resize just changed the pixel rectangle; center what we
        // actually ended up with
        match window.rect() {
            Ok(rect) => {
                let (x, y) = centered_origin(&rect, &screen.work_area);
                if let Err(err) = window.move_to(x, y, rect.width, rect.height) {
                    warn!(error = ?err, "could not center the window");
                }
            }
            Err(err) => warn!(error = ?err, "could not center the window"),
        }
    } else if let Some((x, y)) = placement.origin {
        match window.rect() {
            Ok(rect) => {
                if let Err(err) = window.move_to(x, y, rect.width, rect.height) {
                    warn!(error = ?err, "could not move the window");
                }
            }
            Err(err) => warn!(error = ?err, "could not move the window"),
        }
    }

    Ok(())
}

fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(constants::config::APP_DIR);
    path.push(constants::config::FILENAME);
    path
}

fn persist(store: &SettingsStore, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .context(format!("Failed to create config directory {}", parent.display()))?;
    }
    store.write(path)
}

fn show_config(store: &SettingsStore, window: Option<&TermWindow>) {
    println!("\nCURRENT WINDOW:");
    match window.and_then(|w| w.size().ok()) {
        Some((columns, rows)) => {
            println!("  width  = {columns:3}");
            println!("  height = {rows:3}");
        }
        None => println!("  (terminal window unavailable)"),
    }

    let saved = |key: &str| {
        if store.contains(key) {
            store.get::<String>(key)
        } else {
            "not set".to_string()
        }
    };
    println!("\nSAVED CONFIG:");
    println!("  width  = {}", saved(KEY_WIDTH));
    println!("  height = {}", saved(KEY_HEIGHT));
    println!(
        "  center = {}",
        if store.contains(KEY_CENTER) { store.get::<bool>(KEY_CENTER) } else { DEFAULT_CENTER }
    );
}

/// `--debug` holds the window still until the user has had a look
fn pause_for_enter() -> Result<()> {
    print!("press enter to continue: ");
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_win_over_saved_config() {
        let mut store = SettingsStore::new();
        store.set(KEY_WIDTH, 100i32);
        store.set(KEY_HEIGHT, 30i32);

        let request = CliRequest { width: Some(130), ..Default::default() };
        let placement = build_placement_request(&request, &store);
        assert_eq!(placement.width, Some(130));
        assert_eq!(placement.height, Some(30));
    }

    #[test]
    fn test_sentinel_ignores_saved_config() {
        let mut store = SettingsStore::new();
        store.set(KEY_WIDTH, 100i32);

        let request = CliRequest { skip_width: true, ..Default::default() };
        let placement = build_placement_request(&request, &store);
        assert_eq!(placement.width, None);
        assert!(placement.keep_width);
    }

    #[test]
    fn test_centering_defaults_on_without_config() {
        let store = SettingsStore::new();
        let placement = build_placement_request(&CliRequest::default(), &store);
        assert_eq!(placement.anchor, Anchor::Center);
    }

    #[test]
    fn test_saved_center_false_disables_centering() {
        let mut store = SettingsStore::new();
        store.set(KEY_CENTER, false);
        let placement = build_placement_request(&CliRequest::default(), &store);
        assert_eq!(placement.anchor, Anchor::NotSet);
    }

    #[test]
    fn test_anchor_argument_wins_over_saved_center() {
        let mut store = SettingsStore::new();
        store.set(KEY_CENTER, true);
        let request = CliRequest { anchor: Some(Anchor::TopLeft), ..Default::default() };
        let placement = build_placement_request(&request, &store);
        assert_eq!(placement.anchor, Anchor::TopLeft);
    }

    #[test]
    fn test_anchor_sentinel_suppresses_saved_center() {
        let mut store = SettingsStore::new();
        store.set(KEY_CENTER, true);
        let request = CliRequest { skip_anchor: true, ..Default::default() };
        let placement = build_placement_request(&request, &store);
        assert_eq!(placement.anchor, Anchor::NotSet);
    }
}
