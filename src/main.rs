//! QueryDeck - an interactive client for a remote query service.

use querydeck::api;
use querydeck::app::QueryController;
use querydeck::cli::Cli;
use querydeck::config::Config;
use querydeck::error::Result;
use querydeck::logging;
use querydeck::tui::{self, headless};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    logging::init(&logging::LogSink::for_mode(cli.headless));

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Runs the selected mode. Returns false when a headless run ended in failure.
async fn run(cli: Cli) -> Result<bool> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let server = config.resolve_server(cli.url.as_deref(), cli.server.as_deref(), cli.timeout)?;
    let service = api::connect(&server, cli.mock)?;
    let mut controller = QueryController::new(service, config.ui.locale);

    if cli.headless {
        let headless_config = headless::HeadlessConfig::from_cli(&cli)?;
        let result = headless::run(&mut controller, &cli.queries, &headless_config).await?;
        print!(
            "{}",
            headless::HeadlessOutput::new(headless_config.output_format).format(&result)
        );
        return Ok(result.succeeded());
    }

    tui::run_async(controller).await?;
    Ok(true)
}
