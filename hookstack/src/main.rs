//! hookstack - SQS queue family hook generator
//!
//! Reads a hook configuration (one queue family, or an array of them) and
//! prints the derived descriptor tuples as JSON for the deployment
//! orchestrator.

mod config;

use anyhow::Context;
use clap::Parser;
use hookstack_core::HookError;
use hookstack_sqs::{Hook, QueueHookBuilder};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "hookstack")]
#[command(about = "Derive SQS queue family hooks from a hook configuration", long_about = None)]
struct Args {
    /// Hook configuration JSON file, `-` reads stdin
    #[arg(default_value = "-")]
    input: String,

    /// Settings file (toml, json or yaml)
    #[arg(short, long, env = "HOOKSTACK_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print the descriptor list
    #[arg(long)]
    pretty: bool,

    /// Prepend the queue IAM statement
    #[arg(long)]
    permissions: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "HOOKSTACK_LOG_LEVEL")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // stdout only carries the descriptor list
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "hookstack={0},hookstack_sqs={0},hookstack_core={0}",
                    args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            match err.downcast_ref::<HookError>() {
                Some(hook_error) => eprintln!("{}", hook_error.to_json()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<String> {
    let mut config = Config::load(args.config.as_deref())?;
    config.output.pretty |= args.pretty;
    config.output.permissions |= args.permissions;

    let raw = read_input(&args.input)?;
    let input: Value = serde_json::from_str(&raw)
        .with_context(|| format!("hook configuration `{}` is not valid JSON", args.input))?;

    render(&config, &input)
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read hook configuration from stdin")?;
        Ok(raw)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read hook configuration `{input}`"))
    }
}

/// Build the descriptors of every family in `input` and serialize them
fn render(config: &Config, input: &Value) -> anyhow::Result<String> {
    let builder = QueueHookBuilder::new(config.settings.clone());

    let families = match input {
        Value::Array(families) => families.as_slice(),
        single => std::slice::from_ref(single),
    };

    let mut hooks: Vec<Hook> = Vec::new();
    if config.output.permissions {
        hooks.push(builder.permissions());
    }

    for family in families {
        let family_hooks = builder.build_hooks_from_value(family)?;
        debug!(count = family_hooks.len(), "Family built");
        hooks.extend(family_hooks);
    }

    info!(families = families.len(), hooks = hooks.len(), "Rendering hooks");

    let output = if config.output.pretty {
        serde_json::to_string_pretty(&hooks)?
    } else {
        serde_json::to_string(&hooks)?
    };
    Ok(output)
}
