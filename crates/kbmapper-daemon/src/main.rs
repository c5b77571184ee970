//! kbmapper daemon
//!
//! Watches keyboards, lid switches and headphone jacks and runs the command
//! bound to each chord or switch transition.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use kbmapper_config::{ConfigStore, DEFAULT_FRAGMENTS_DIR, DEFAULT_PRIMARY_PATH};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use kbmapper_daemon::dispatcher::{CommandDispatcher, DryRunDispatcher, ShellDispatcher};
use kbmapper_daemon::engine::{DeviceEvent, Engine, EVENT_CHANNEL_CAPACITY};
use kbmapper_daemon::keysym::{self, KeysymResolver};
use kbmapper_daemon::lifecycle::Shutdown;
use kbmapper_daemon::resolver::StimulusResolver;
use kbmapper_daemon::{device, reader};

#[derive(Parser, Debug)]
#[command(name = "kbmapperd")]
#[command(about = "Run commands on key chords and hardware switch changes")]
#[command(version)]
struct Args {
    /// Path to the primary configuration file
    #[arg(short, long, default_value = DEFAULT_PRIMARY_PATH)]
    config: String,

    /// Directory of configuration fragments, consulted before the primary file
    #[arg(short, long, default_value = DEFAULT_FRAGMENTS_DIR)]
    fragments: String,

    /// Log level used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Log matched commands instead of running them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let mut shutdown = Shutdown::install()?;

    // Expand tilde in config paths
    let primary: PathBuf = shellexpand::tilde(&args.config).into_owned().into();
    let fragments: PathBuf = shellexpand::tilde(&args.fragments).into_owned().into();

    let report = kbmapper_config::load_store(&primary, &fragments)
        .context("Failed to load configuration")?;

    tracing::info!(
        "Loaded {} section(s) from {} file(s), skipped {} file(s) and {} invalid section(s)",
        report.store.section_count(),
        report.store.collections().len(),
        report.skipped.len(),
        report.store.error_count()
    );
    for collection in report.store.collections() {
        tracing::debug!("  {} ({} section(s))", collection.source.display(), collection.len());
    }

    let devices = device::enumerate_devices().context("Failed to enumerate input devices")?;
    if devices.is_empty() {
        bail!("No input devices with key or switch events found. Is /dev/input readable?");
    }

    let keysyms = keysym::default_resolver();
    tracing::info!("Resolving key names with {}", keysyms.describe());

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    for (info, device) in devices {
        tracing::info!(
            "Monitoring '{}' at {} (keys: {}, switches: {})",
            info.name,
            info.path.display(),
            info.capabilities.key,
            info.capabilities.switch
        );
        reader::spawn_reader(info, device, tx.clone());
    }
    // Readers hold the only senders, so the channel closes once all of them stop
    drop(tx);

    if args.dry_run {
        tracing::info!("Dry run: commands will be logged, not executed");
        serve(report.store, DryRunDispatcher, keysyms, rx, &mut shutdown).await
    } else {
        serve(report.store, ShellDispatcher, keysyms, rx, &mut shutdown).await
    }
}

async fn serve<D: CommandDispatcher>(
    store: ConfigStore,
    dispatcher: D,
    keysyms: Box<dyn KeysymResolver>,
    events: mpsc::Receiver<DeviceEvent>,
    shutdown: &mut Shutdown,
) -> Result<()> {
    let engine = Engine::new(keysyms, StimulusResolver::new(store, dispatcher));

    tracing::info!("kbmapper daemon running");

    tokio::select! {
        signal = shutdown.wait() => {
            tracing::info!("Received {}, shutting down", signal);
            Ok(())
        }
        () = engine.run(events) => {
            bail!("All input device readers stopped")
        }
    }
}
