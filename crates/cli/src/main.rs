//! Command-line runner for behavior trees.
//!
//! Loads a node graph (from the first argument or `BT_GRAPH`), runs it on
//! the reference pawn at a fixed frame rate, and prints every node
//! transition followed by the outcome. Ctrl-C stops the tree cleanly.

use std::path::PathBuf;

use anyhow::Result;
use behavior_tree::NodeState;
use runtime::{SimConfig, Simulation, StateEvent, StopReason, load_agent};
use tokio::sync::{mpsc, oneshot};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let mut config = SimConfig::from_env();
    if let Some(graph) = std::env::args_os().nth(1) {
        config.graph = PathBuf::from(graph);
    }

    let log_guard = setup_logging(config.session_id.as_deref())?;

    let agent = load_agent(&config)?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = oneshot::channel();

    let simulation = Simulation::new(agent, config.frame_period())?
        .with_max_frames(config.max_frames)
        .with_shutdown(stop_rx)
        .observe(event_tx);

    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event);
        }
    });
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
            let _ = stop_tx.send(());
        }
    });

    let outcome = simulation.run().await;
    interrupt.abort();
    // The observer, and with it the sender, is dropped with the simulation.
    printer.await?;

    let [x, y, z] = outcome.pawn.position();
    match outcome.reason {
        StopReason::Finished(state) => println!("tree finished: {state}"),
        StopReason::FrameLimit => println!("frame limit reached; tree still running"),
        StopReason::Shutdown => println!("interrupted"),
    }
    println!(
        "frames: {}  position: ({x:.2}, {y:.2}, {z:.2})  heading: {:.1}°",
        outcome.frames,
        outcome.pawn.heading_deg()
    );

    if outcome.reason == StopReason::Finished(NodeState::False) {
        drop(log_guard);
        std::process::exit(1);
    }
    Ok(())
}

fn print_event(event: &StateEvent) {
    println!("{:<24} {:<22} {}", event.key, event.kind, event.state);
}

/// Setup logging to stderr and to a session log file
fn setup_logging(session_id: Option<&str>) -> Result<WorkerGuard> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let session_id = match session_id {
        Some(id) => id.to_owned(),
        None => {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or_default();
            format!("session_{}", timestamp)
        }
    };

    let session_log_dir = log_directory().join(&session_id);
    std::fs::create_dir_all(&session_log_dir)?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "bt.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}/bt.log", session_log_dir.display());

    Ok(guard)
}

/// Platform cache directory for logs, or the temp dir if there is none.
fn log_directory() -> PathBuf {
    directories::ProjectDirs::from("", "", "behavior-tree")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("behavior-tree").join("logs"))
}
