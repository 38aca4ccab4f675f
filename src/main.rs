use clap::Parser;
use sortwise::cli::{Cli, run_cli};
use sortwise::output::OutputFormatter;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Sends `tracing` events to `path`, filtered by `RUST_LOG` or the `-v` level.
fn init_log_file(path: &Path, level: &str) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sortwise={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file
        && let Err(e) = init_log_file(path, cli.log_level())
    {
        OutputFormatter::warning(&format!(
            "Could not open log file {}: {}",
            path.display(),
            e
        ));
    }

    if let Err(e) = run_cli(cli) {
        OutputFormatter::error(&e);
        std::process::exit(1);
    }
}
