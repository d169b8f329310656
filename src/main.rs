//! wasmlane CLI
//!
//! Entry point for the `wasmlane` command-line tool.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use wasmlane::config::{cli_overrides, default_host_path, EffectiveConfig};
use wasmlane::scaffold::ScaffoldOutcome;
use wasmlane::{FileEventKind, LaneConfig, Orchestrator, Severity, SystemToolchains};

#[derive(Parser)]
#[command(name = "wasmlane")]
#[command(about = "WebAssembly compilation mode orchestrator", version)]
struct Cli {
    /// Project root (default: current directory)
    #[arg(long, short = 'r', global = true)]
    root: Option<PathBuf>,

    /// Path to repo config file (default: <root>/.wasmlane/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Override a config value (repeatable), e.g. --set modes.small=P
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the project and the mode it was last built with
    Detect,

    /// Switch compilation mode (e.g. L, M, S)
    Mode {
        token: String,
    },

    /// Compile now with the active mode's builder
    Recompile,

    /// Report the compiled module's size for the current mode
    Size,

    /// Print the effective configuration and its sources
    Config {
        /// Print a single value by dot-separated key
        #[arg(long)]
        get: Option<String>,
    },

    /// Print the runtime-init script for the current mode
    Script {
        /// Write it to the configured artifact path instead
        #[arg(long)]
        write: bool,
    },

    /// Explain whether a file change triggers a compile
    Classify {
        file_name: String,

        /// Path of the changed file (defaults to the file name)
        #[arg(long)]
        path: Option<String>,
    },

    /// Feed one file event through the orchestrator
    Event {
        path: String,

        /// Event kind: create, write, remove, rename
        #[arg(long, default_value = "write")]
        kind: String,
    },

    /// Create the entry file from the bundled template if missing
    Scaffold,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("WASMLANE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = cli.root.unwrap_or_else(|| PathBuf::from("."));

    let effective = match load_config(&root, cli.config, &cli.overrides) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };
    let config = match effective.lane() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Config { get } => run_config(&effective, get.as_deref()),
        Commands::Classify { file_name, path } => {
            run_classify(&config, &file_name, path.as_deref());
        }
        command => {
            let mut orchestrator = match Orchestrator::with_system_builders(
                &root,
                config.clone(),
                Box::new(SystemToolchains::new(config.resolved_payload_paths(&root))),
            ) {
                Ok(o) => o,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            };
            run_command(&mut orchestrator, command);
        }
    }
}

fn load_config(
    root: &Path,
    config_path: Option<PathBuf>,
    overrides: &[String],
) -> Result<EffectiveConfig, String> {
    let cli = cli_overrides(overrides).map_err(|e| e.to_string())?;
    let effective = match config_path {
        Some(repo) => EffectiveConfig::build(default_host_path().as_deref(), Some(&repo), cli),
        None => EffectiveConfig::for_root(root, cli),
    };
    effective.map_err(|e| e.to_string())
}

fn run_config(effective: &EffectiveConfig, key: Option<&str>) {
    let Some(key) = key else {
        match effective.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                process::exit(1);
            }
        }
        return;
    };

    if let Some(value) = effective.get_str(key) {
        println!("{}", value);
    } else if let Some(value) = effective.get(key) {
        println!("{}", value);
    } else {
        eprintln!("No config value at {}", key);
        process::exit(1);
    }
}

fn run_command(orchestrator: &mut Orchestrator, command: Commands) {
    match command {
        Commands::Detect => {
            let detection = orchestrator.redetect();
            let report = serde_json::json!({
                "detection": detection,
                "state": orchestrator.state(),
                "current_mode": orchestrator.current_mode(),
                "output": orchestrator.output_relative_path(),
                "unobserved": orchestrator.unobserved_files(),
            });
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing output: {}", e);
                    process::exit(1);
                }
            }
        }
        Commands::Mode { token } => {
            let mut failed = false;
            orchestrator.change_mode(&token, |progress| {
                match progress.severity {
                    Severity::Error => {
                        failed = true;
                        eprintln!("{}", progress.message);
                    }
                    Severity::Warning => eprintln!("{}", progress.message),
                    _ => println!("{}", progress.message),
                }
            });
            if failed {
                process::exit(1);
            }
        }
        Commands::Recompile => match orchestrator.recompile() {
            Ok(path) => println!("Compiled {} ({} mode)", path.display(), orchestrator.current_mode()),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Commands::Size => match orchestrator.module_size() {
            Ok(Some(bytes)) => println!("{} bytes ({} mode)", bytes, orchestrator.current_mode()),
            Ok(None) => {
                eprintln!("No compiled module for {} mode yet", orchestrator.current_mode());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Commands::Script { write } => {
            if write {
                match orchestrator.write_init_script() {
                    Ok(Some(path)) => println!("Wrote {}", path.display()),
                    Ok(None) => {
                        eprintln!("Not a WebAssembly project; nothing written");
                        process::exit(1);
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        process::exit(1);
                    }
                }
            } else {
                match orchestrator.generate_runtime_init_script() {
                    Ok(script) => print!("{}", script),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        process::exit(1);
                    }
                }
            }
        }
        Commands::Event { path, kind } => {
            let kind: FileEventKind = match kind.parse() {
                Ok(k) => k,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(2);
                }
            };
            let event = match wasmlane_classifier::parse_event_path(&path) {
                Ok(event) => event,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            };

            if let Err(e) = orchestrator.handle_file_event(&event.file_name, &event.extension, &event.path, kind) {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
            println!("{} {}: ok", kind, path);
        }
        Commands::Scaffold => match orchestrator.scaffold_entry_file() {
            Ok(ScaffoldOutcome::Created(path)) => println!("Created {}", path.display()),
            Ok(ScaffoldOutcome::Exists(path)) => println!("Already exists: {}", path.display()),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Commands::Classify { file_name, path } => {
            run_classify(orchestrator.config(), &file_name, path.as_deref());
        }
        // Answered from the effective config before detection runs
        Commands::Config { .. } => {}
    }
}

fn run_classify(config: &LaneConfig, file_name: &str, path: Option<&str>) {
    let classifier = wasmlane::Classifier::new(config.classifier_config());
    let verdict = classifier.classify(file_name, path.unwrap_or(file_name));
    println!("{}", verdict.to_code());
    process::exit(if verdict.relevant { 0 } else { 1 });
}
