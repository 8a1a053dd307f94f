//! Bindery CLI - inspect path patterns and argument bindings

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use bindery::argument::{ArgumentBindingRegistry, ParameterDescriptor, QueueMessage};
use bindery::binding::{BindingData, PathResolver, ResourcePath, TriggerPathSource};
use bindery::config::BindingConfig;
use bindery::error::{BindingError, FixSuggestion};

/// Env var holding the tracing filter
const LOG_ENV_VAR: &str = "BINDERY_LOG";

#[derive(Parser)]
#[command(name = "bindery")]
#[command(about = "Bindery - resolve storage path patterns and trigger argument bindings")]
#[command(version)]
struct Cli {
    /// Storage conventions file (defaults to $BINDERY_CONFIG, then built-ins)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a path pattern and show its shape
    Resolve {
        /// Pattern, e.g. "input/{name}.txt"
        pattern: String,

        /// Pattern names a container only
        #[arg(long)]
        container_only: bool,
    },

    /// Resolve a pattern and bind it with parameter values
    Bind {
        pattern: String,

        /// Parameter value (repeatable)
        #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,

        /// Queue message body whose binding data is used as parameter values
        #[arg(short, long)]
        message: Option<PathBuf>,

        /// Pattern names a container only
        #[arg(long)]
        container_only: bool,
    },

    /// Match a concrete blob path against a blob-trigger pattern
    Match {
        /// Trigger pattern, e.g. "input/{name}.txt"
        trigger: String,

        /// Concrete path, e.g. "input/report.txt"
        path: String,
    },

    /// Convert a queue message body into a typed argument
    Convert {
        /// File holding the message body
        file: PathBuf,

        /// Parameter type to bind to
        #[arg(short = 't', long = "as", value_enum, default_value_t = ArgumentKind::Text)]
        kind: ArgumentKind,
    },

    /// List argument binding providers in selection order
    Providers,
}

#[derive(Clone, Copy, ValueEnum)]
enum ArgumentKind {
    Message,
    Bytes,
    Text,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(suggestion) = e
            .downcast_ref::<BindingError>()
            .and_then(FixSuggestion::fix_suggestion)
        {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = BindingConfig::discover(cli.config.as_deref())
        .context("Failed to load binding configuration")?;

    match cli.command {
        Commands::Resolve {
            pattern,
            container_only,
        } => resolve_pattern(&config, &pattern, container_only),
        Commands::Bind {
            pattern,
            params,
            message,
            container_only,
        } => bind_pattern(&config, &pattern, &params, message.as_deref(), container_only),
        Commands::Match { trigger, path } => match_trigger(&trigger, &path),
        Commands::Convert { file, kind } => convert_message(&file, kind),
        Commands::Providers => list_providers(),
    }
}

fn resolve_pattern(config: &BindingConfig, pattern: &str, container_only: bool) -> anyhow::Result<()> {
    let resolver = PathResolver::from_config(config);
    let path = resolver.resolve(pattern, container_only)?;

    println!("{} '{}' resolves to {}", "✓".green(), pattern, path.kind().cyan().bold());
    if let Some(container) = path.container_pattern() {
        println!("  Container: {}", container);
    }
    if let Some(item) = path.item_pattern() {
        println!("  Item: {}", item);
    }

    let names = path.required_parameter_names();
    if !names.is_empty() {
        let names: Vec<&str> = names.into_iter().collect();
        println!("  Parameters: {}", names.join(", "));
    }

    Ok(())
}

fn bind_pattern(
    config: &BindingConfig,
    pattern: &str,
    params: &[String],
    message: Option<&Path>,
    container_only: bool,
) -> anyhow::Result<()> {
    let resolver = PathResolver::from_config(config);
    let path = resolver.resolve(pattern, container_only)?;

    let mut values = parse_params(params)?;
    if let Some(file) = message {
        let body = fs::read(file)
            .with_context(|| format!("Failed to read message file '{}'", file.display()))?;
        values.merge_missing(BindingData::from_message(&QueueMessage::new("cli", body)));
    }

    let bound = path.bind(&values)?;
    println!("{}", bound);
    Ok(())
}

fn parse_params(params: &[String]) -> anyhow::Result<BindingData> {
    let mut values = BindingData::new();
    for param in params {
        let Some((name, value)) = param.split_once('=') else {
            bail!("parameter '{}' must be NAME=VALUE", param);
        };
        values.insert(name, value);
    }
    Ok(values)
}

fn match_trigger(trigger: &str, path: &str) -> anyhow::Result<()> {
    let source = TriggerPathSource::new(trigger)?;
    let path = ResourcePath::parse(path)?;

    let Some(data) = source.binding_data(&path) else {
        bail!("'{}' does not match trigger '{}'", path, source);
    };

    for (name, value) in data.iter() {
        println!("{}={}", name, value);
    }
    Ok(())
}

fn convert_message(file: &Path, kind: ArgumentKind) -> anyhow::Result<()> {
    let body = fs::read(file)
        .with_context(|| format!("Failed to read message file '{}'", file.display()))?;
    let message = QueueMessage::new("cli", body);

    let parameter = match kind {
        ArgumentKind::Message => ParameterDescriptor::new::<QueueMessage>("message"),
        ArgumentKind::Bytes => ParameterDescriptor::new::<Vec<u8>>("message"),
        ArgumentKind::Text => ParameterDescriptor::new::<String>("message"),
        ArgumentKind::Json => ParameterDescriptor::new::<serde_json::Value>("message"),
    };

    let registry = ArgumentBindingRegistry::standard();
    let binder = registry.select_binder(&parameter)?;
    let bound = binder.bind(&message)?;

    match kind {
        ArgumentKind::Message => {
            let message = bound.downcast::<QueueMessage>()?;
            println!("id: {}", message.id());
            println!("dequeueCount: {}", message.dequeue_count());
            println!("bytes: {}", message.body().len());
        }
        ArgumentKind::Bytes => println!("{} bytes", bound.downcast::<Vec<u8>>()?.len()),
        ArgumentKind::Text => println!("{}", bound.downcast::<String>()?),
        ArgumentKind::Json => {
            let value = bound.downcast::<serde_json::Value>()?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

fn list_providers() -> anyhow::Result<()> {
    let registry = ArgumentBindingRegistry::standard();
    for (i, name) in registry.provider_names().into_iter().enumerate() {
        println!("{}. {}", i + 1, name);
    }
    Ok(())
}
