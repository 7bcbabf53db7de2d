use crate::session::{download_csv, render, run_fetch, run_search, summary, FetchState, SearchState, View};
use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, FuzzySelect, Input, Select};
use log::{error, info};
use munq_common::ui::spinner;
use munq_fmp::endp::historical::{format_date, Granularity};
use munq_fmp::prelude::*;
use munq_fmp::schema::{normalize, RowOrder};
use std::path::Path;

enum Action {
    Stock,
    DataType,
    From,
    To,
    Go,
    Download,
    Quit,
}

const ACTIONS: [Action; 7] = [
    Action::Stock,
    Action::DataType,
    Action::From,
    Action::To,
    Action::Go,
    Action::Download,
    Action::Quit,
];

/// Interactive session over one search and one historical selection.
pub async fn run(client: &Client, config: &Config, out: &Path) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut search = SearchState::default();
    let mut fetch = FetchState::default();
    let mut cursor = 0;

    loop {
        let items: Vec<String> = ACTIONS.iter().map(|a| label(a, &fetch, out)).collect();
        cursor = Select::with_theme(&theme)
            .with_prompt("Historical data")
            .items(&items)
            .default(cursor)
            .interact()?;

        match ACTIONS[cursor] {
            Action::Stock => pick_stock(&theme, client, config, &mut search, &mut fetch).await?,
            Action::DataType => {
                let labels: Vec<&str> = Granularity::ALL.iter().map(Granularity::label).collect();
                let current = fetch
                    .selection
                    .granularity
                    .and_then(|g| Granularity::ALL.iter().position(|x| *x == g))
                    .unwrap_or(0);
                let index = Select::with_theme(&theme)
                    .with_prompt("Data type")
                    .items(&labels)
                    .default(current)
                    .interact()?;
                fetch.selection.granularity = Some(Granularity::ALL[index]);
            }
            Action::From => fetch.selection.from = Some(ask_date(&theme, "From (YYYY-MM-DD)")?),
            Action::To => fetch.selection.to = Some(ask_date(&theme, "To (YYYY-MM-DD)")?),
            Action::Go => {
                let pb = spinner("Fetching historical data...");
                run_fetch(&mut fetch, |request| async move {
                    client.historical(config, &request).await
                })
                .await;
                pb.finish_and_clear();
                show(&fetch.view);
            }
            Action::Download => match fetch.response() {
                None => println!("{}", "Fetch some data first.".yellow()),
                Some(response) => match download_csv(response, out).await {
                    Ok(Some(path)) => println!("{} {}", "Saved".green(), path.display()),
                    Ok(None) => println!("{}", "Nothing to export.".yellow()),
                    Err(e) => error!("Download failed: {e:#}"),
                },
            },
            Action::Quit => return Ok(()),
        }
    }
}

async fn pick_stock(
    theme: &ColorfulTheme,
    client: &Client,
    config: &Config,
    search: &mut SearchState,
    fetch: &mut FetchState,
) -> Result<()> {
    search.query = Input::<String>::with_theme(theme)
        .with_prompt("Search for a stock")
        .allow_empty(true)
        .interact_text()?;

    let pb = spinner("Searching...");
    let sent = run_search(search, |query| async move { client.search(config, &query).await }).await;
    pb.finish_and_clear();

    if !sent {
        return Ok(());
    }
    if let Some(message) = &search.error {
        println!("{}", message.red());
        return Ok(());
    }
    if search.results.is_empty() {
        println!("{}", "No matches.".yellow());
        return Ok(());
    }

    let items: Vec<String> = search.results.iter().map(ToString::to_string).collect();
    let picked = FuzzySelect::with_theme(theme)
        .with_prompt("Matches")
        .items(&items)
        .default(0)
        .interact_opt()?;
    if let Some(stock) = picked.and_then(|index| search.select(index)) {
        info!("selected {}", stock.symbol);
        fetch.selection.stock = Some(stock);
    }
    Ok(())
}

fn ask_date(theme: &ColorfulTheme, prompt: &str) -> Result<NaiveDate> {
    Ok(Input::<NaiveDate>::with_theme(theme)
        .with_prompt(prompt)
        .interact_text()?)
}

fn show(view: &View) {
    match view {
        View::Empty => println!("{}", "Pick a stock, a data type and both dates first.".yellow()),
        View::Error(_) => println!("{}", render(view).red()),
        View::Data(response) => {
            println!("{}", render(view));
            if let Ok(table) = normalize(response, RowOrder::Chronological) {
                println!("{}", summary(&table).cyan());
            }
        }
    }
}

fn label(action: &Action, fetch: &FetchState, out: &Path) -> String {
    let selection = &fetch.selection;
    let unset = || "-".to_string();
    match action {
        Action::Stock => format!(
            "Stock:     {}",
            selection.stock.as_ref().map_or_else(unset, ToString::to_string)
        ),
        Action::DataType => format!(
            "Data type: {}",
            selection.granularity.map_or_else(unset, |g| g.label().to_string())
        ),
        Action::From => format!("From:      {}", selection.from.map_or_else(unset, format_date)),
        Action::To => format!("To:        {}", selection.to.map_or_else(unset, format_date)),
        Action::Go => "Go".to_string(),
        Action::Download => format!("Download CSV ({})", out.display()),
        Action::Quit => "Quit".to_string(),
    }
}
