//! hyperbill - Tiered billing invoices from Trello card history

use clap::Parser;
use hyperbill::{
    cli::{Cli, Command},
    error::{HyperbillError, Result},
    invoice::{InvoiceBuilder, list_boards},
    output::get_formatter,
};
use hyperbill_trello::TrelloClient;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(verbose: bool) {
    // RUST_LOG wins over --verbose
    let default = if verbose { "hyperbill=info" } else { "hyperbill=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let tz_config = cli.timezone_args.to_config()?;
    info!("Using timezone: {}", tz_config.display_name());

    match &cli.command {
        Command::Boards => {
            info!("Listing boards");

            let (api_key, token) = cli.credentials()?;
            let client = TrelloClient::new(api_key, token);
            let boards = list_boards(&client).await?;

            let formatter = get_formatter(cli.json, tz_config.tz);
            println!("{}", formatter.format_boards(&boards));
        }

        Command::Invoice(args) => {
            info!("Running invoice for board {}", args.board);

            // Validate before any request is sent
            let request = args.to_request(&tz_config)?;
            let (api_key, token) = cli.credentials()?;
            let client = TrelloClient::new(api_key, token);

            let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
            let invoice = InvoiceBuilder::from_request(&request)
                .with_details(args.detailed)
                .with_progress(show_progress)
                .build_from_source(&client, request.board_id())
                .await?;

            let formatter = get_formatter(cli.json, tz_config.tz);
            println!("{}", formatter.format_invoice(&invoice));
        }
    }

    Ok(())
}

fn report(err: &HyperbillError) {
    eprintln!("Error: {err}");
    if err.is_unauthorized() {
        eprintln!(
            "Check your Trello API key and token (--api-key/--token or \
             TRELLO_API_KEY/TRELLO_TOKEN) before trying again."
        );
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        report(&err);
        std::process::exit(1);
    }
}
