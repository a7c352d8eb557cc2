use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use village_chronicle::cli::commands::{self, InspectOptions};
use village_chronicle::config::simulation::SimulationConfig;
use village_chronicle::ending::score::FinalReport;
use village_chronicle::persistence;
use village_chronicle::rules::Difficulty;
use village_chronicle::world::generation::print_village_summary;

#[derive(Parser)]
#[command(name = "village-chronicle")]
#[command(about = "A ten-year village simulation with weighted narrative events and rationed harvests")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Found a new village and save its first snapshot
    New {
        /// easy, normal or hard
        #[arg(short, long, value_parser = parse_difficulty)]
        difficulty: Option<Difficulty>,

        /// Seed for a reproducible village (overrides the config)
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Run the game loop, reading commands from stdin
    Run {
        /// Path to a specific snapshot to load
        #[arg(short, long)]
        snapshot: Option<String>,

        /// Start a fresh game at this difficulty instead of loading
        #[arg(long, value_parser = parse_difficulty)]
        new: Option<Difficulty>,
    },

    /// Inspect the village in the latest snapshot
    Inspect {
        /// Load this snapshot instead of the latest
        #[arg(short, long)]
        snapshot: Option<String>,

        /// Show one villager and their biography
        #[arg(short, long)]
        villager: Option<u64>,

        /// Show the last N chronicle entries
        #[arg(short, long)]
        log: Option<usize>,

        /// Show the score report
        #[arg(long)]
        report: bool,
    },

    /// Manage village snapshots
    Snapshots {
        #[command(subcommand)]
        action: SnapshotAction,
    },
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// List available snapshots
    List {
        /// Snapshot directory (defaults to the configured one)
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Restore and display a village from a snapshot file
    Restore {
        /// Path to the snapshot file
        file: String,
    },
}

fn parse_difficulty(name: &str) -> Result<Difficulty, String> {
    Difficulty::parse(name).ok_or_else(|| format!("unknown difficulty '{}', expected easy, normal or hard", name))
}

/// A missing default config file means "use defaults"; anything else must load.
fn load_config(path: &str) -> SimulationConfig {
    let config_path = Path::new(path);
    let result = if !config_path.exists() && path == "config.toml" {
        Ok(SimulationConfig::default())
    } else {
        SimulationConfig::from_file(config_path)
    };
    match result {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(config: &SimulationConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("village_chronicle={}", config.log_level)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(&cli.config);
    init_logging(&config);

    match cli.command {
        Commands::New { difficulty, seed } => {
            let difficulty = difficulty.unwrap_or(config.difficulty);
            if let Err(e) = commands::new_village(&config, difficulty, seed) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Run { snapshot, new } => {
            if let Err(e) = commands::run_simulation(&config, snapshot.as_deref(), new).await {
                eprintln!("Simulation error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Inspect {
            snapshot,
            villager,
            log,
            report,
        } => {
            let options = InspectOptions {
                snapshot,
                villager,
                log,
                report,
            };
            if let Err(e) = commands::inspect(&config, &options) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Snapshots { action } => match action {
            SnapshotAction::List { dir } => {
                let dir = dir.unwrap_or_else(|| config.snapshot_directory.clone());
                let snapshot_dir = Path::new(&dir);
                match persistence::list_snapshots(snapshot_dir) {
                    Ok(snapshots) => {
                        if snapshots.is_empty() {
                            println!("No snapshots found in {}", snapshot_dir.display());
                        } else {
                            println!("{:<40} {:>8} {:>12}", "File", "Tick", "Size");
                            println!("{}", "-".repeat(62));
                            for s in &snapshots {
                                let name = s.path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
                                let size_kb = s.file_size / 1024;
                                println!("{:<40} {:>8} {:>9} KB", name, s.tick, size_kb);
                            }
                            println!("\n{} snapshot(s) in {}", snapshots.len(), snapshot_dir.display());
                        }
                    }
                    Err(e) => {
                        eprintln!("Error listing snapshots: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            SnapshotAction::Restore { file } => {
                let path = Path::new(&file);
                match persistence::load_snapshot(path) {
                    Ok(state) => {
                        println!("Restored village from {}", path.display());
                        print_village_summary(&state);
                        if state.ending.is_some() {
                            println!("\n{}", FinalReport::new(&state));
                        }
                    }
                    Err(e) => {
                        eprintln!("Error restoring snapshot: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        },
    }
}
