use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands::*};
use colored::Colorize;
use dotenv::dotenv;
use log::{debug, error, info, trace};
use munq_fmp::endp::historical::{DateRange, Granularity, HistoricalRequest};
use munq_fmp::prelude::*;
use session::{download_csv, render, summary, View};

mod browse;
mod cards;
mod cli;
mod session;

fn preprocess(level: log::LevelFilter) {
    // grant access to .env
    dotenv().ok();

    // initialise logger; RUST_LOG wins over --log
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    preprocess(cli.log.into());
    trace!("Command line input recorded: {cli:#?}");

    let config = Config::from_env()?;
    let client = build_client(&config)?;

    ////////////////////////////////////////////////////////////////////////////////////////////////////

    // cli framework:
    // "> munq <COMMAND>"
    match &cli.command {
        // "> munq search tesla motors"
        Search { query } => {
            let search = session::search_stocks(&client, &config, &query.join(" ")).await;
            if let Some(message) = &search.error {
                println!("{}", message.red());
            } else if search.results.is_empty() {
                println!("{}", "No matches.".yellow());
            }
            for stock in &search.results {
                println!("{}  {stock}", format!("{:>10}", stock.symbol).bold());
            }
        }

        // "> munq fetch -s TSLA -g 1min --from 2021-01-01 --to 2021-01-05"
        Fetch(args) => {
            let range = DateRange::new(args.from, args.to)?;
            let request = HistoricalRequest::new(args.granularity, &args.symbol, range);
            info!("Fetching {} {} data", request.symbol, request.granularity);

            let view = match client.historical(&config, &request).await {
                Ok(response) => View::Data(response),
                Err(e) => {
                    error!("Error fetching data: {e}");
                    View::Error(format!("Error: {e}"))
                }
            };

            let View::Data(response) = &view else {
                println!("{}", render(&view).red());
                return Ok(());
            };
            if args.show {
                println!("{}", render(&view));
            }
            match munq_fmp::schema::normalize(response, Default::default()) {
                Ok(table) => println!("{}", summary(&table).cyan()),
                Err(e) => debug!("no table to summarise: {e}"),
            }
            if !args.no_export {
                match download_csv(response, &args.out).await? {
                    Some(path) => println!("{} {}", "Saved".green(), path.display()),
                    None => println!("{}", "Nothing to export.".yellow()),
                }
            }
        }

        // "> munq changes [AAPL NVDA ...]"
        Changes { tickers } => {
            let tickers: Vec<String> = if tickers.is_empty() {
                cards::LANDING_TICKERS.iter().map(|t| t.to_string()).collect()
            } else {
                tickers.iter().map(|t| t.trim().to_uppercase()).collect()
            };
            for card in cards::load_all(&client, &config, &tickers).await {
                println!("{}", card.render());
            }
        }

        // "> munq browse"
        Browse { out } => browse::run(&client, &config, out).await?,

        // "> munq templates"
        Templates => {
            for granularity in Granularity::ALL {
                println!("{} {}", format!("{:<12}", granularity.label()).bold(), granularity.template());
            }
        }
    }

    Ok(())
}
