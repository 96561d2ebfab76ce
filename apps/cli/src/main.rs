use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, resolve, ClientSettings, DetailFetcher, DirectoryApi, HttpDirectoryClient,
    ListOptions, ListState, OperatorsController, RequestOutcome, Route, StatisticsFetcher,
};
use shared::protocol::OperatorSummary;
use tokio::sync::watch;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "directory", about = "Browse the health operator directory")]
struct Args {
    /// Client config file (defaults to ./client.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the configured API base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Print raw JSON payloads instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expense totals, top operators and per-region expenses.
    Stats,
    /// One page of the operator listing.
    List {
        #[arg(long)]
        query: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Operator record and its quarterly expenses.
    Show { external_id: String },
    /// Which screen a UI path leads to.
    Route { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        settings.api_base_url = base_url;
    }
    debug!(?settings, "loaded client settings");

    match args.command {
        Command::Stats => show_statistics(connect(&settings)?, args.json).await,
        Command::List { query, page, limit } => {
            let controller =
                OperatorsController::operators(connect(&settings)?, ListOptions::from(&settings));
            list_operators(controller, query, page, limit, args.json).await
        }
        Command::Show { external_id } => {
            show_operator(connect(&settings)?, external_id, args.json).await
        }
        Command::Route { path } => show_route(&path),
    }
}

fn connect(settings: &ClientSettings) -> Result<Arc<dyn DirectoryApi>> {
    let client = HttpDirectoryClient::from_settings(settings)?;
    info!(base_url = %client.base_url(), "directory client ready");
    Ok(Arc::new(client))
}

fn show_route(path: &str) -> Result<()> {
    let route = resolve(path).ok_or_else(|| anyhow!("no screen matches '{path}'"))?;
    match &route {
        Route::Operators => println!("{}", route.name()),
        Route::Operator { external_id } => {
            println!("{} external_id={external_id}", route.name())
        }
    }
    Ok(())
}

async fn show_statistics(api: Arc<dyn DirectoryApi>, json: bool) -> Result<()> {
    let fetcher = StatisticsFetcher::new(api);
    let mut rx = fetcher.subscribe();
    let outcome = rx
        .wait_for(|outcome| outcome.is_settled())
        .await
        .context("statistics fetcher stopped")?
        .clone();

    let stats = match outcome {
        RequestOutcome::Success(stats) => stats,
        RequestOutcome::Failure(message) => bail!(message),
        _ => bail!("statistics fetch did not settle"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("total expenses:   {:.2}", stats.total_expenses);
    println!("average expenses: {:.2}", stats.average_expenses);
    println!("top operators:");
    for (rank, top) in stats.top5_operators.iter().enumerate() {
        println!(
            "  {}. {} ({}) {:.2}",
            rank + 1,
            top.name.as_deref().unwrap_or("-"),
            top.external_id.as_ref().map_or("-", |id| id.as_str()),
            top.total_expenses
        );
    }
    println!("expenses by region:");
    for (region, amount) in &stats.expenses_by_region {
        println!("  {region}: {amount:.2}");
    }
    Ok(())
}

async fn list_operators(
    controller: Arc<OperatorsController>,
    query: Option<String>,
    page: u32,
    limit: Option<u32>,
    json: bool,
) -> Result<()> {
    let mut rx = controller.subscribe();
    let mut state = wait_for_fetch(&mut rx, 0).await?;

    // Search first: it resets the page.
    if let Some(query) = query {
        controller.set_search_text(query);
        state = wait_for_fetch(&mut rx, state.request_id).await?;
    }
    if let Some(limit) = limit {
        if controller.set_limit(limit).is_some() {
            state = wait_for_fetch(&mut rx, state.request_id).await?;
        }
    }
    if controller.set_page(page).is_some() {
        state = wait_for_fetch(&mut rx, state.request_id).await?;
    }

    if let Some(message) = state.error() {
        bail!(message.to_string());
    }
    if json {
        println!("{}", serde_json::to_string_pretty(state.items())?);
        return Ok(());
    }
    println!(
        "page {} ({} per page), {} operators in total",
        state.query.page,
        state.query.limit,
        state.total()
    );
    for operator in state.items() {
        print_operator_line(operator);
    }
    Ok(())
}

/// Waits until a request newer than `seen` has been issued and settled.
async fn wait_for_fetch(
    rx: &mut watch::Receiver<ListState<OperatorSummary>>,
    seen: u64,
) -> Result<ListState<OperatorSummary>> {
    let state = rx
        .wait_for(|state| state.request_id > seen && state.outcome.is_settled())
        .await
        .context("list controller stopped")?
        .clone();
    debug!(request_id = state.request_id, "list: settled");
    Ok(state)
}

fn print_operator_line(operator: &OperatorSummary) {
    println!(
        "  {:>8}  {:<18}  {:<2}  {}  [{}]",
        operator.registry_id.0,
        operator.external_id.as_ref().map_or("-", |id| id.as_str()),
        operator.region.as_deref().unwrap_or("-"),
        operator.name.as_deref().unwrap_or("-"),
        operator.category.as_deref().unwrap_or("-"),
    );
}

async fn show_operator(api: Arc<dyn DirectoryApi>, external_id: String, json: bool) -> Result<()> {
    let fetcher = DetailFetcher::new(api);
    fetcher.fetch_all(external_id).await;
    let state = fetcher.snapshot();

    if let Some(message) = state.error() {
        bail!(message.to_string());
    }
    let head = state
        .head()
        .ok_or_else(|| anyhow!("operator fetch did not settle"))?;

    if json {
        let payload = serde_json::json!({ "operator": head, "expenses": state.dependents() });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    print_operator_line(&head.summary);
    if let Some(trade_name) = &head.trade_name {
        println!("  trade name: {trade_name}");
    }
    if let Some(city) = &head.city {
        println!("  city: {city}");
    }
    println!("expenses:");
    for item in state.dependents() {
        println!("  {} {}: {:.2}", item.year, item.quarter, item.amount);
    }
    Ok(())
}
