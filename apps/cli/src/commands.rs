//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::info;

use anyload_core::{Input, Loader, Value};
use anyload_shared::{AnyloadError, FetchPolicy, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// anyload — normalize JSON, markup, plain strings, and remote references
/// into one uniform value.
#[derive(Parser)]
#[command(
    name = "anyload",
    version,
    about = "Load heterogeneous content (JSON, markup, strings, remote references) into uniform JSON.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Remote-failure policy flag.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum PolicyArg {
    /// Broken references resolve to their literal text.
    Degrade,
    /// Broken references abort the load with an error.
    Fail,
}

impl From<PolicyArg> for FetchPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Degrade => FetchPolicy::DegradeToLiteral,
            PolicyArg::Fail => FetchPolicy::Fail,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Load one or more inputs and print the normalized result as JSON.
    Load {
        /// Inputs: literal text, or `@path` to read a file.
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Override the configured remote-failure policy.
        #[arg(long)]
        policy: Option<PolicyArg>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Create a default config file at ~/.anyload/anyload.toml.
    Init,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing from CLI flags (RUST_LOG takes precedence).
pub(crate) fn init_tracing(cli: &Cli) {
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

// ---------------------------------------------------------------------------
// Command routing
// ---------------------------------------------------------------------------

/// Run the parsed CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Load {
            inputs,
            policy,
            pretty,
        } => cmd_load(inputs, policy, pretty).await,
        Command::Init => {
            let path = init_config()?;
            println!("created {}", path.display());
            Ok(())
        }
    }
}

async fn cmd_load(inputs: Vec<String>, policy: Option<PolicyArg>, pretty: bool) -> Result<()> {
    let config = load_config()?;
    let mut fetch = config.fetch;
    if let Some(policy) = policy {
        fetch.policy = policy.into();
    }

    let loader = Loader::builder().fetch_config(fetch).build()?;

    let mut args: Vec<Input> = Vec::with_capacity(inputs.len());
    for raw in inputs {
        if let Some(path) = raw.strip_prefix('@') {
            let text =
                std::fs::read_to_string(path).map_err(|e| AnyloadError::io(path, e))?;
            args.push(Input::from(text));
        } else {
            args.push(Input::from(raw));
        }
    }

    info!(count = args.len(), "loading inputs");
    let result = loader.load(args).await?;

    // One input prints its value directly; several print as a list; a load
    // that produced nothing prints null.
    let output = match result {
        None => Value::Null,
        Some(mut values) if values.len() == 1 => values.remove(0),
        Some(values) => Value::Array(values),
    };

    let rendered = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    Ok(())
}
