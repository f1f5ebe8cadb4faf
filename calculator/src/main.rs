//! Online calculator: a registry of self-testing numerical algorithms.
//!
//! Builds the catalog (`catalog/` by default) at startup and answers one
//! request per invocation with JSON on stdout.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calculator::algorithms::EntryTable;
use calculator::collection::AlgorithmCollection;
use calculator::core::answer::{Answer, Parameters};
use calculator::exit_codes;
use calculator::io::config::{CalculatorConfig, load_config};
use calculator::io::worker::serve;
use calculator::logging;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "calculator",
    version,
    about = "Registry of self-testing numerical algorithms"
)]
struct Cli {
    /// Path to the calculator config.
    #[arg(long, global = true, default_value = "calculator.toml")]
    config: PathBuf,

    /// Override the catalog root from the config.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every admitted definition as a JSON array.
    List,
    /// Print the definition of one algorithm.
    Describe {
        /// Declared algorithm name.
        name: String,
    },
    /// Run one algorithm on parameters read from a file or stdin.
    Execute {
        /// Declared algorithm name.
        name: String,
        /// `{"parameters": [...]}` JSON; stdin when omitted.
        #[arg(long)]
        params: Option<PathBuf>,
    },
    /// Build the catalog and report how many algorithms were admitted.
    Check,
    /// Serve one job from stdin to stdout.
    #[command(hide = true)]
    Worker,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let Cli {
        config,
        catalog,
        command,
    } = Cli::parse();
    let collection = || build_collection(&config, catalog.as_deref());

    match command {
        Command::Worker => {
            serve(&EntryTable::builtin(), io::stdin().lock(), io::stdout().lock())?;
            Ok(exit_codes::OK)
        }
        Command::List => {
            print_json(&collection()?.list())?;
            Ok(exit_codes::OK)
        }
        Command::Describe { name } => print_answer(&collection()?.answer_definition(&name)),
        Command::Execute { name, params } => {
            let collection = collection()?;
            let params = read_parameters(params.as_deref())?;
            print_answer(&collection.answer_execute(&name, params))
        }
        Command::Check => {
            println!("{} algorithms admitted", collection()?.len());
            Ok(exit_codes::OK)
        }
    }
}

/// Workers never build the catalog; every other command starts from it.
fn build_collection(path: &Path, catalog: Option<&Path>) -> Result<AlgorithmCollection> {
    let config = resolve_config(path, catalog)?;
    AlgorithmCollection::from_config(&config)
        .with_context(|| format!("build catalog {}", config.catalog_root.display()))
}

fn resolve_config(path: &Path, catalog: Option<&Path>) -> Result<CalculatorConfig> {
    let mut config = load_config(path)?;
    if let Some(catalog) = catalog {
        config.catalog_root = catalog.to_path_buf();
    }
    Ok(config)
}

fn read_parameters(path: Option<&Path>) -> Result<Parameters> {
    let raw = match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?
        }
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("read parameters from stdin")?;
            raw
        }
    };
    serde_json::from_str(&raw).context("parse parameters")
}

fn print_answer<T: Serialize>(answer: &Answer<T>) -> Result<i32> {
    print_json(answer)?;
    if answer.is_ok() {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::ANSWERED_WITH_ERRORS)
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize json")?;
    println!("{payload}");
    Ok(())
}
