//! Command-line entry point for the component store.
//!
//! # Responsibility
//! - Run one guarded store operation per invocation.
//! - Print results as JSON for scripting.
//!
//! Every invocation starts the store, runs its command and stops the store,
//! so the database file is never held open between invocations.

use clap::{Args, Parser, Subcommand};
use componentstore_core::{
    core_version, init_logging, Component, ComponentQuery, ComponentStore, EntityId, Lifecycle,
    StoreConfig, StoreError,
};
use log::{info, warn};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_NOT_FOUND: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "componentstore")]
#[command(about = "Inspect and edit a component store database", long_about = None)]
struct Cli {
    /// Database file; overrides COMPONENTSTORE_DB_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when absent
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Store a new component and print its id
    Add(AddArgs),
    /// Print one component
    Get { id: EntityId },
    /// List components matching the filters
    Browse(BrowseArgs),
    /// Delete one component
    Delete { id: EntityId },
    /// Print the core crate version
    Version,
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(long)]
    repository: String,
    #[arg(long)]
    format: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    group: Option<String>,
    #[arg(long)]
    version: Option<String>,
    /// Attribute as `key=value`; repeatable
    #[arg(long = "attr", value_parser = parse_attribute)]
    attributes: Vec<(String, String)>,
}

#[derive(Debug, Args)]
struct BrowseArgs {
    #[arg(long)]
    repository: Option<String>,
    #[arg(long)]
    format: Option<String>,
    #[arg(long)]
    group: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long, default_value_t = 0)]
    offset: u32,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    if matches!(cli.command, Commands::Version) {
        println!("{}", core_version());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = StoreConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(log_dir) = &cli.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let store = ComponentStore::from_config(&config);
    store.start()?;
    info!(
        "event=cli_command module=cli status=start db_path={}",
        config.db_path.display()
    );
    let outcome = run_command(&store, cli.command);
    let stopped = store.stop();
    settle(outcome, stopped)
}

/// Combines the command result with the stop result. A command failure wins
/// over a stop failure; the stop failure is still reported on stderr.
fn settle(
    outcome: Result<(), StoreError>,
    stopped: Result<(), StoreError>,
) -> Result<ExitCode, Box<dyn Error>> {
    match (outcome, stopped) {
        (Ok(()), Ok(())) => Ok(ExitCode::SUCCESS),
        (Ok(()), Err(stop_err)) => Err(stop_err.into()),
        (Err(StoreError::NotFound(id)), stopped) => {
            report_stop_failure(stopped);
            println!("{}", serde_json::json!({ "found": false, "id": id }));
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        }
        (Err(err), stopped) => {
            report_stop_failure(stopped);
            Err(err.into())
        }
    }
}

fn report_stop_failure(stopped: Result<(), StoreError>) {
    if let Err(err) = stopped {
        warn!("event=cli_command module=cli status=error phase=stop error={err}");
        eprintln!("Error: store did not stop cleanly: {err}");
    }
}

fn run_command(store: &ComponentStore, command: Commands) -> Result<(), StoreError> {
    match command {
        Commands::Add(args) => {
            let mut component = Component::new(args.repository, args.format, args.name);
            component.group = args.group;
            component.version = args.version;
            component.attributes.extend(args.attributes);
            let id = store.create(&component)?;
            print_json(&serde_json::json!({ "id": id }));
        }
        Commands::Get { id } => print_json(&store.read(id)?),
        Commands::Browse(args) => {
            let query = ComponentQuery {
                repository: args.repository,
                format: args.format,
                group: args.group,
                name: args.name,
                limit: args.limit,
                offset: args.offset,
            };
            print_json(&store.browse(&query)?);
        }
        Commands::Delete { id } => {
            store.delete(id)?;
            print_json(&serde_json::json!({ "deleted": id }));
        }
        Commands::Version => println!("{}", core_version()),
    }
    Ok(())
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("Error: cannot render output: {err}"),
    }
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("attribute `{raw}` must look like key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("attribute `{raw}` has an empty key"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{parse_attribute, settle, Cli, EXIT_NOT_FOUND};
    use clap::CommandFactory;
    use componentstore_core::{EntityId, LifecyclePhase, StoreError};
    use std::process::ExitCode;

    fn stop_failure() -> StoreError {
        StoreError::IllegalTransition {
            from: LifecyclePhase::Failed,
            to: LifecyclePhase::Stopping,
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_key_value_attributes() {
        assert_eq!(
            parse_attribute("packaging=jar").unwrap(),
            ("packaging".to_string(), "jar".to_string())
        );
        assert_eq!(
            parse_attribute("checksum=sha1=abc").unwrap(),
            ("checksum".to_string(), "sha1=abc".to_string())
        );
        assert!(parse_attribute("no-separator").is_err());
        assert!(parse_attribute("=value").is_err());
    }

    #[test]
    fn command_error_is_kept_when_stop_also_fails() {
        let err = settle(
            Err(StoreError::ConnectionUnavailable("disk gone".to_string())),
            Err(stop_failure()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn stop_error_surfaces_after_successful_command() {
        let err = settle(Ok(()), Err(stop_failure())).unwrap_err();
        assert!(err.to_string().contains("STOPPING"));
    }

    #[test]
    fn not_found_exit_code_survives_stop_failure() {
        let code = settle(Err(StoreError::NotFound(EntityId::generate())), Err(stop_failure()))
            .unwrap();
        assert_eq!(code, ExitCode::from(EXIT_NOT_FOUND));
    }
}
