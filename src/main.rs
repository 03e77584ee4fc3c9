use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use textpipe::error::describe_error_code;
use textpipe::{Engine, EngineConfig, FilterRegistry, GlobalVariables, PipelineError};
use tracing::{debug, error, trace};

#[derive(Parser)]
#[command(name = "textpipe")]
#[command(about = "Run sequential text-transformation pipelines", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a pipeline script and print the final text
    Run {
        /// Script file, or `-` to read from stdin
        script: PathBuf,

        /// Seed a pipeline variable (name=value)
        #[arg(long = "var", value_parser = parse_assignment)]
        vars: Vec<(String, String)>,

        /// Seed a global variable (name=value)
        #[arg(long = "global", value_parser = parse_assignment)]
        globals: Vec<(String, String)>,
    },
    /// List registered filters
    Filters {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn parse_assignment(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if textpipe::parser::is_identifier(name) => {
            Ok((name.to_string(), value.to_string()))
        }
        Some((name, _)) => Err(format!("'{name}' is not a valid variable name")),
        None => Err(format!("expected name=value, got '{raw}'")),
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    let log_level = match cli.verbose {
        0 => config.log_level.as_deref().unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .with_thread_ids(cli.verbose >= 3)
        .with_line_number(cli.verbose >= 3)
        .init();

    debug!("textpipe started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = match cli.command {
        Commands::Run {
            script,
            vars,
            globals,
        } => run_script(&config, &script, vars, globals),
        Commands::Filters { json } => list_filters(&config, json),
    };

    if let Err(e) = result {
        error!("Fatal error: {}", e);
        eprintln!("Error: {}", report(&e));
        std::process::exit(1);
    }
}

/// Render an error for the terminal
///
/// Pipeline errors already embed their inner error in the message, so only
/// the innermost cause (such as an I/O error) and a code hint are appended.
fn report(e: &anyhow::Error) -> String {
    let Some(pipeline_error) = e.downcast_ref::<PipelineError>() else {
        return format!("{e:#}");
    };

    let message = match std::error::Error::source(pipeline_error.root()) {
        Some(cause) => format!("{pipeline_error}: {cause}"),
        None => pipeline_error.to_string(),
    };
    format!(
        "{message}\n  hint: {}",
        describe_error_code(pipeline_error.code())
    )
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path),
        None => EngineConfig::load_default(),
    }
}

fn read_script(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut script = String::new();
        std::io::stdin()
            .read_to_string(&mut script)
            .context("Failed to read script from stdin")?;
        return Ok(script);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))
}

fn run_script(
    config: &EngineConfig,
    path: &Path,
    vars: Vec<(String, String)>,
    globals: Vec<(String, String)>,
) -> Result<()> {
    let script = read_script(path)?;
    let engine = Engine::from_config(config)?;
    for (name, value) in globals {
        engine.set_global_variable(name, value);
    }

    let mut pipeline = engine.pipeline();
    for (name, value) in vars {
        pipeline.set_variable(name, value);
    }

    let added = pipeline.add_script(&script)?;
    debug!(commands = added, script = %path.display(), "script loaded");

    let output = pipeline.execute()?;
    println!("{output}");
    Ok(())
}

fn list_filters(config: &EngineConfig, json: bool) -> Result<()> {
    let registry = FilterRegistry::with_defaults(config, &GlobalVariables::new())?;
    let availability = registry.availability();

    if json {
        println!("{}", serde_json::to_string_pretty(&availability)?);
        return Ok(());
    }

    for entry in availability {
        let marker = if entry.available { "" } else { " (unavailable)" };
        println!("{:<20} {}{}", entry.info.name, entry.info.description, marker);
    }
    Ok(())
}
