use clap::Parser;
use dom_heal::cli::commands::{cmd_capture, cmd_diff, cmd_heal};
use dom_heal::cli::config::{load_config, resolve_diff_options, snapshot_source, Cli, Commands};
use dom_heal::error::HealError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `-v` steps from warn up to trace.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), HealError> {
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Heal {
            json,
            url,
            snapshot,
            report,
            trace,
        } => {
            let Some(source) = snapshot_source(url, snapshot) else {
                unreachable!("clap requires --url or --snapshot");
            };
            cmd_heal(&json, &source, report.as_deref(), trace.as_deref(), &config)?;
        }
        Commands::Diff {
            before,
            after,
            output,
            threshold,
            attributes,
        } => {
            let options = resolve_diff_options(&config.diff, threshold, attributes);
            cmd_diff(&before, &after, output.as_deref(), &options)?;
        }
        Commands::Capture {
            screen,
            url,
            snapshot,
            elements,
            store,
        } => {
            let Some(source) = snapshot_source(url, snapshot) else {
                unreachable!("clap requires --url or --snapshot");
            };
            cmd_capture(&screen, &source, elements.as_deref(), &store, &config)?;
        }
    }

    Ok(())
}
