#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Geocoin in a terminal.

mod config;
mod input;
mod terminal;

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use geocoin_presentation::Presenter;
use geocoin_system_luck::Sha256Luck;
use geocoin_world::{self as world, query, World};
use tracing_subscriber::EnvFilter;

use crate::{
    config::Overrides,
    input::{Input, HELP},
    terminal::TerminalLayer,
};

/// Command-line arguments accepted by the Geocoin binary.
#[derive(Debug, Parser)]
#[command(name = "geocoin", about = "Collect and combine tokens from caches on a grid.")]
struct CliArgs {
    /// TOML file describing the world configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Window radius in cells, overriding the configuration file.
    #[arg(long, value_name = "CELLS")]
    radius: Option<u32>,
    /// Cache spawn probability, overriding the configuration file.
    #[arg(long, value_name = "P")]
    spawn_probability: Option<f64>,
    /// Forget cache tokens once they leave the window.
    #[arg(long)]
    discard_tokens: bool,
    /// Seed mixed into every luck key to generate a different world.
    #[arg(long)]
    seed: Option<u64>,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn", value_name = "FILTER")]
    log_level: String,
    /// Read commands from a file instead of standard input.
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
}

/// Entry point for the Geocoin command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_level)?;

    let overrides = Overrides {
        neighborhood_size: args.radius,
        spawn_probability: args.spawn_probability,
        discard_tokens: args.discard_tokens,
    };
    let config = config::load(args.config.as_deref(), overrides)?;
    let luck = match args.seed {
        Some(seed) => Sha256Luck::seeded(seed),
        None => Sha256Luck::new(),
    };

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut layer = TerminalLayer::new(stdout.lock());
    let mut events = Vec::new();
    let mut world = World::new(config, luck, &mut events).context("failed to create world")?;
    layer.notice(query::welcome_banner(&world));

    let mut presenter = Presenter::new();
    presenter.present(&events, &mut layer);
    run(reader, &mut world, &mut presenter, &mut layer)?;
    layer.flush().context("failed to write to stdout")
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log filter `{level}`"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

/// Feeds each input line to the world until `quit` or end of input.
fn run<R, W>(
    reader: R,
    world: &mut World,
    presenter: &mut Presenter,
    layer: &mut TerminalLayer<W>,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line.context("failed to read input")?;
        let command = match input::parse(&line) {
            Ok(Some(Input::Command(command))) => command,
            Ok(Some(Input::Look)) => {
                layer.describe(world);
                continue;
            }
            Ok(Some(Input::Help)) => {
                layer.notice(HELP);
                continue;
            }
            Ok(Some(Input::Quit)) => break,
            Ok(None) => continue,
            Err(error) => {
                layer.notice(&error.to_string());
                continue;
            }
        };

        events.clear();
        if let Err(error) = world::apply(world, command, &mut events) {
            tracing::debug!(%error, "command rejected");
            layer.notice(&error.to_string());
        }
        presenter.present(&events, layer);
        layer.flush().context("failed to write to stdout")?;
    }
    Ok(())
}
