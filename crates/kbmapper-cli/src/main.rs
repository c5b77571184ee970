//! kbmapper CLI
//!
//! Offline inspection tool for kbmapper configuration and devices.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use kbmapper_config::{LoadReport, DEFAULT_FRAGMENTS_DIR, DEFAULT_PRIMARY_PATH};
use kbmapper_daemon::device::{self, DeviceInfo};

#[derive(Parser, Debug)]
#[command(name = "kbmapper")]
#[command(about = "Inspect kbmapper configuration and input devices")]
#[command(version)]
struct Cli {
    /// Path to the primary configuration file
    #[arg(short, long, default_value = DEFAULT_PRIMARY_PATH)]
    config: String,

    /// Directory of configuration fragments
    #[arg(short, long, default_value = DEFAULT_FRAGMENTS_DIR)]
    fragments: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate every configuration file
    Validate,

    /// List input devices and whether the daemon would watch them
    Devices,

    /// Show which section a stimulus resolves to, without running it
    Resolve {
        /// Stimulus, e.g. "LidClose" or "Control+Alt+t"
        stimulus: String,
    },
}

fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // Expand tilde in config paths
    let primary: PathBuf = shellexpand::tilde(&cli.config).into_owned().into();
    let fragments: PathBuf = shellexpand::tilde(&cli.fragments).into_owned().into();

    match cli.command {
        Commands::Validate => cmd_validate(&primary, &fragments),
        Commands::Devices => cmd_devices(),
        Commands::Resolve { stimulus } => cmd_resolve(&primary, &fragments, &stimulus),
    }
}

fn load(primary: &Path, fragments: &Path) -> miette::Result<LoadReport> {
    tracing::debug!(
        "Loading {} and fragments under {}",
        primary.display(),
        fragments.display()
    );
    Ok(kbmapper_config::load_store(primary, fragments)?)
}

fn cmd_validate(primary: &Path, fragments: &Path) -> miette::Result<()> {
    println!(
        "Validating configuration: {} and {}",
        fragments.display(),
        primary.display()
    );

    let report = load(primary, fragments)?;

    println!("Loaded files, in precedence order:");
    for collection in report.store.collections() {
        println!(
            "  {} ({} section(s))",
            collection.source.display(),
            collection.len()
        );

        let mut stimuli: Vec<_> = collection.sections.values().collect();
        stimuli.sort_by(|a, b| a.stimulus.cmp(&b.stimulus));
        for section in stimuli {
            match section.command() {
                Some(command) => println!("    {} -> {}", section.stimulus, command),
                None => println!("    {} (no Exec, inert)", section.stimulus),
            }
        }
    }

    let invalid = report.store.error_count();
    let skipped = report.skipped.len();

    for file in report.skipped {
        eprintln!("\nSkipped {}:", file.path.display());
        eprintln!("{:?}", miette::Report::new(file.error));
    }

    for collection in report.store.into_collections() {
        if collection.errors.is_empty() {
            continue;
        }
        eprintln!("\nInvalid sections in {}:", collection.source.display());
        for error in collection.errors {
            eprintln!("{:?}", miette::Report::new(error));
        }
    }

    if skipped == 0 && invalid == 0 {
        println!("Configuration is valid!");
        return Ok(());
    }

    Err(miette::miette!(
        "{} configuration file(s) failed to load, {} invalid section(s) left out",
        skipped,
        invalid
    ))
}

fn cmd_devices() -> miette::Result<()> {
    println!("Available input devices:\n");

    let devices = device::open_all().map_err(|e| miette::miette!("{:#}", e))?;

    for (path, opened) in devices {
        match opened {
            Ok(device) => {
                let info = DeviceInfo::of(path, &device);
                let watched = if info.capabilities.is_monitored() {
                    "watched"
                } else {
                    "ignored"
                };

                println!("  {} [{}]", info.name, watched);
                println!("    Path: {}", info.path.display());
                println!(
                    "    Keys: {}, switches: {}",
                    info.capabilities.key, info.capabilities.switch
                );
                println!();
            }
            Err(e) => {
                println!("  {} [cannot open: {}]", path.display(), e);
                println!();
            }
        }
    }

    Ok(())
}

fn cmd_resolve(primary: &Path, fragments: &Path, stimulus: &str) -> miette::Result<()> {
    let report = load(primary, fragments)?;

    let Some(found) = report.store.lookup(stimulus) else {
        return Err(miette::miette!("No section binds '{}'", stimulus));
    };

    println!("{}", stimulus);
    println!("  File: {}", found.source.display());
    println!("  Exec: {}", found.section.command().unwrap_or_default());
    if let Some(user) = &found.section.user {
        println!("  User: {} (not enforced)", user);
    }
    if let Some(dir) = &found.section.working_directory {
        println!("  WorkingDirectory: {}", dir.display());
    }

    Ok(())
}
