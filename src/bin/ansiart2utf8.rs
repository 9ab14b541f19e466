//! ansiart2utf8
//!
//! Converts CP437 ANSI art files (or stdin) into UTF-8 terminal output on
//! stdout. Logging goes to stderr.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use ansiart_utf8::{CliArgs, Config, Converter, Diagnostic};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let default_filter = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            let mut stdout = io::stdout();
            let _ = stdout.write_all(b"\x1b[0m");
            let _ = stdout.flush();
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_with_args(args)?;
    tracing::debug!(?config, "configuration loaded");

    let mut out = BufWriter::new(io::stdout().lock());
    if args.files.is_empty() {
        convert(&config, args.debug, io::stdin().lock(), &mut out)?;
        return Ok(());
    }

    for path in &args.files {
        if path == Path::new("-") {
            convert(&config, args.debug, io::stdin().lock(), &mut out)?;
        } else {
            let file = File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
            tracing::debug!(path = %path.display(), "converting");
            convert(&config, args.debug, file, &mut out)?;
        }
    }
    Ok(())
}

/// Convert one document, followed by a blank line
fn convert<R: Read, W: Write>(
    config: &Config,
    debug: bool,
    input: R,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut converter = Converter::new(config.clone())?;
    if debug {
        converter = converter.with_diagnostics(|diagnostic: &Diagnostic, offset: u64| {
            tracing::warn!(offset, "{diagnostic}");
        });
    }

    converter.convert(input, out)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
