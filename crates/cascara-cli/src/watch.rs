//! Recompile-on-change loop for `build --watch`.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use cascara_core::pipeline::Pipeline;
use notify::RecursiveMode;
use notify_debouncer_mini::{DebouncedEventKind, new_debouncer};

/// Watch the input stylesheet and rebuild on every debounced change.
///
/// The first build happens before watching starts. A failing rebuild is
/// reported and the loop keeps running; only watcher setup failures abort.
pub fn run(
    pipeline: &Pipeline,
    input: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    rebuild(pipeline, input, output);

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(100), tx)?;
    debouncer
        .watcher()
        .watch(input, RecursiveMode::NonRecursive)?;
    tracing::info!("watching {}", input.display());

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                if events.iter().any(|e| e.kind == DebouncedEventKind::Any) {
                    tracing::info!("change detected, rebuilding");
                    rebuild(pipeline, input, output);
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("file watcher error: {e}");
            }
            Err(_) => {
                tracing::error!("file watcher disconnected");
                return Ok(());
            }
        }
    }
}

fn rebuild(pipeline: &Pipeline, input: &Path, output: Option<&Path>) {
    match crate::build_once(pipeline, input, output) {
        Ok(()) => tracing::info!("built {}", input.display()),
        Err(e) => tracing::error!("build failed: {e}"),
    }
}
