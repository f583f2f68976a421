use clap::Parser;
use fglpool::adapter::inbound::cli::command::{Cli, ColorChoice};
use fglpool::adapter::inbound::cli::output::{self, OutputConfig};
use fglpool::adapter::inbound::cli::{self, diagnostic};
use fglpool::error::Error;
use fglpool::infrastructure::config::Config;
use tracing::info;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    let mut config = match Config::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(err) => fail(err, &cli),
    };
    match cli.verbose {
        0 => {}
        1 => config.logging.level = "info".into(),
        _ => config.logging.level = "debug".into(),
    }
    config.init_logging();
    info!(command = ?cli.command, "fglpool starting");

    if let Err(err) = cli::execute(&cli, &config).await {
        fail(err, &cli);
    }
}

fn fail(err: Error, cli: &Cli) -> ! {
    if output::is_json() {
        output::error(&err.to_string());
    } else {
        eprintln!("{:?}", diagnostic::report(err, &cli.config));
    }
    std::process::exit(1);
}
