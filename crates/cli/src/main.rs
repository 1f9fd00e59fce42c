mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use output::{OutputFormat, print_error};

/// kiln - build, connect and inspect logic blueprints
#[derive(Parser)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(long, global = true, value_enum, default_value = "text")]
  format: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build one declared logic and print it
  Build {
    /// Path to the blueprint file
    blueprint: PathBuf,

    /// Name of the declared logic
    name: String,

    /// Props as a JSON object
    #[arg(short, long)]
    props: Option<String>,
  },

  /// Build every declared logic and print the connection graph
  Graph {
    /// Path to the blueprint file
    blueprint: PathBuf,

    /// Props as a JSON object, passed to every declaration
    #[arg(short, long)]
    props: Option<String>,
  },

  /// Show version and effective engine options
  Info,
}

fn main() {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(err) = run(cli) {
    print_error(&format!("{:#}", err));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Build { blueprint, name, props } => cmd::cmd_build(&blueprint, &name, props.as_deref(), cli.format),
    Commands::Graph { blueprint, props } => cmd::cmd_graph(&blueprint, props.as_deref(), cli.format),
    Commands::Info => cmd::cmd_info(cli.format),
  }
}
