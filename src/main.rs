use clap::{Parser, Subcommand};
use imgverify::decoder::RustDecoder;
use imgverify::verify::Verifier;
use imgverify::{config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Assets checked on every run, in report order.
const ASSETS: &[&str] = &[
    "public/company_logo_transparent.png",
    "public/company_logo.png",
];

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "imgverify")]
#[command(about = "Check that the site's logo assets exist and decode")]
#[command(long_about = "\
Check that the site's logo assets exist and decode

Verifies, relative to the working directory:

  public/company_logo_transparent.png
  public/company_logo.png

Each file is header-parsed and then fully decoded. One line is printed per
file:

  File not found: <path>
  Image <path> is valid. Format: <format>, Size: (<w>, <h>), Mode: <mode>
  Image <path> is invalid. Error: <message>

The exit status is 0 whatever the outcome. Diagnostics go to stderr; raise
them with -v/-vv or RUST_LOG.")]
#[command(version = version_string())]
struct Cli {
    /// TOML file with decoder limits (see `gen-config`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Verify the assets (default)
    Check,
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Command::Check) {
        Command::Check => {
            let config = config::load_config(cli.config.as_deref())?;
            let verifier = Verifier::new(RustDecoder::with_limits(
                config.limits.to_decode_limits(),
            ));
            let results = verifier.verify_all(ASSETS);
            output::print_results(&results);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout carries only report lines. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}
