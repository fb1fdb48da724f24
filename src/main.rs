use std::path::PathBuf;
use std::process::ExitCode;

use bevy::prelude::*;

use geoforge::config::load_config;
use geoforge::draw::DrawingOrchestrator;
use geoforge::paths;
use geoforge::plugin::GeoEditPlugin;
use geoforge::script::{ReplayScript, ScriptInput};

/// Stderr logging, plus a log file in debug builds.
///
/// Stdout is reserved for the snapshot JSON.
fn setup_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::prelude::*;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true);

    // Default to info for dependencies, debug for geoforge
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,geoforge=debug"));

    let (file_layer, guard) = match file_writer() {
        Some((writer, guard)) => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_level(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    guard
}

#[cfg(debug_assertions)]
fn file_writer() -> Option<(
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
)> {
    use std::fs::OpenOptions;
    use std::io::Write;

    let logs_dir = paths::logs_dir();
    if std::fs::create_dir_all(&logs_dir).is_err() {
        eprintln!("Failed to create logs directory");
        return None;
    }

    let log_file_path = logs_dir.join("geoforge.log");

    // Append session separator to existing log file
    if let Ok(mut file) = OpenOptions::new().append(true).open(&log_file_path) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let separator = "=".repeat(80);
        let _ = writeln!(
            file,
            "\n\n{}\n=== New Session Started at {} ===\n{}\n",
            separator, timestamp, separator
        );
    }

    let file_appender = tracing_appender::rolling::never(&logs_dir, "geoforge.log");
    Some(tracing_appender::non_blocking(file_appender))
}

#[cfg(not(debug_assertions))]
fn file_writer() -> Option<(
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
)> {
    None
}

fn run(script_path: PathBuf) -> Result<String, String> {
    paths::ensure_directories().map_err(|e| format!("Failed to create directories: {}", e))?;

    let loaded = load_config();
    if let Some(reason) = &loaded.reset_reason {
        warn!("{}; using default configuration", reason);
    }

    let script = ReplayScript::load(&script_path)?;
    info!("Replaying {} steps from {:?}", script.steps.len(), script_path);

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        GeoEditPlugin {
            config: loaded.config,
        },
    ));

    // One frame per step so requests and pointer events keep script order
    for step in &script.steps {
        for input in step.inputs(script.resolution) {
            match input {
                ScriptInput::Pointer(pointer) => {
                    app.world_mut().write_message(pointer);
                }
                ScriptInput::Request(request) => {
                    app.world_mut().write_message(request);
                }
            }
            app.update();
        }
    }

    app.world()
        .resource::<DrawingOrchestrator>()
        .create_snapshot()
        .to_json()
}

fn main() -> ExitCode {
    // Keep the guard alive for the duration of the program
    let _log_guard = setup_logging();

    let Some(script_path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: geoforge <script.json>");
        return ExitCode::FAILURE;
    };

    match run(script_path) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
