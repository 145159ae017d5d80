//! Portfolio Quotes command line
//!
//! `serve` runs the quote proxy, `load` uploads a CSV portfolio through it
//! and prints the table, `template` writes the sample CSV.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};
use portfolio_quotes::config::{self, ClientConfig, ProxyConfig};
use portfolio_quotes::error::ErrorResponse;
use portfolio_quotes::portfolio::csv::TEMPLATE_CSV;
use portfolio_quotes::portfolio::table::{self, EntryStatus, PortfolioSummary, SortDirection};
use portfolio_quotes::portfolio::PortfolioEntry;
use portfolio_quotes::proxy::ProxyServer;
use portfolio_quotes::services::{HttpQuoteSource, PortfolioService};
use portfolio_quotes::state::PortfolioSession;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "portfolio-quotes", version, about = "CSV portfolio tracker with live quotes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the quote proxy
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Upload a CSV portfolio and print the quote table
    Load {
        /// CSV file with a symbol column
        file: PathBuf,
        /// Quote proxy endpoint (defaults to QUOTE_PROXY_URL)
        #[arg(long)]
        proxy_url: Option<String>,
        /// Only show rows whose symbol or company name contains this text
        #[arg(long)]
        filter: Option<String>,
        /// Column to sort by, e.g. changePercent
        #[arg(long)]
        sort: Option<String>,
        /// asc or desc
        #[arg(long, default_value = "asc")]
        direction: SortDirection,
        /// Fetch quotes a second time after loading
        #[arg(long)]
        refresh: bool,
        /// Print rows and summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the sample CSV
    Template {
        /// Output path; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();
    portfolio_quotes::init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { host, port } => serve(host, port).await,
        Command::Load {
            file,
            proxy_url,
            filter,
            sort,
            direction,
            refresh,
            json,
        } => {
            let client = match proxy_url {
                Some(url) => ClientConfig::with_proxy_url(url)?,
                None => ClientConfig::from_env()?,
            };
            load(file, client, filter, sort, direction, refresh, json).await
        }
        Command::Template { out } => template(out),
    }
}

async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = ProxyConfig::from_env()?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let mut server = ProxyServer::new(config);
    server.start().await?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    server.stop();
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn load(
    file: PathBuf,
    client: ClientConfig,
    filter: Option<String>,
    sort: Option<String>,
    direction: SortDirection,
    refresh: bool,
    json: bool,
) -> Result<()> {
    let session = PortfolioSession::new();
    let source = HttpQuoteSource::new(client.proxy_url);

    let mut snapshot = match PortfolioService::upload_file(&session, &source, &file).await {
        Ok(snapshot) => snapshot,
        Err(e) if json => {
            let message = e.to_string();
            println!("{}", serde_json::to_string_pretty(&ErrorResponse::from(e))?);
            anyhow::bail!(message);
        }
        Err(e) => return Err(e.into()),
    };
    if refresh {
        snapshot = PortfolioService::refresh(&session, &source).await?;
    }

    let mut rows = table::filter_entries(&snapshot.entries, filter.as_deref().unwrap_or(""));
    if let Some(field) = sort.as_deref() {
        table::sort_entries(&mut rows, field, direction);
    }
    let summary = table::summarize(&snapshot.entries);

    if json {
        let output = serde_json::json!({
            "batchId": snapshot.batch_id,
            "rows": rows.iter().map(|e| table::entry_row(e)).collect::<Vec<_>>(),
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", render_table(&rows));
        println!("{}", render_summary(&summary));
    }
    Ok(())
}

fn template(out: Option<PathBuf>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(&path, TEMPLATE_CSV)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Template written to {}", path.display());
        }
        None => print!("{}", TEMPLATE_CSV),
    }
    Ok(())
}

fn render_table(rows: &[&PortfolioEntry]) -> Table {
    let csv_columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|e| e.fields.keys().map(String::as_str))
        .filter(|k| !k.eq_ignore_ascii_case("symbol"))
        .collect();

    let mut header = vec![
        "#", "Symbol", "Company", "LTP", "Change", "Change %", "Volume", "Updated (IST)",
    ];
    header.extend(csv_columns.iter().copied());
    header.push("Status");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for entry in rows {
        let quote = &entry.quote;
        let color = if quote.change > 0.0 {
            Color::Green
        } else if quote.change < 0.0 {
            Color::Red
        } else {
            Color::Reset
        };
        let updated = entry
            .fetched_at
            .map(|t| {
                t.with_timezone(&chrono_tz::Asia::Kolkata)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| "-".to_string());

        let mut cells = vec![
            Cell::new(entry.position),
            Cell::new(entry.symbol.as_str()),
            Cell::new(&quote.company_name),
            Cell::new(format!("{:.2}", quote.ltp)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:+.2}", quote.change))
                .fg(color)
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{:+.2}%", quote.change_percent))
                .fg(color)
                .set_alignment(CellAlignment::Right),
            Cell::new(quote.volume).set_alignment(CellAlignment::Right),
            Cell::new(updated),
        ];
        for column in &csv_columns {
            cells.push(Cell::new(entry.fields.get(*column).map(String::as_str).unwrap_or("")));
        }
        cells.push(match table::entry_status(entry) {
            EntryStatus::Ok => Cell::new("ok"),
            EntryStatus::Failed(error) => Cell::new(error).fg(Color::Red),
            EntryStatus::StaleError(error) => {
                Cell::new(format!("stale: {}", error)).fg(Color::Yellow)
            }
        });

        table.add_row(cells);
    }

    table
}

fn render_summary(summary: &PortfolioSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Summary", ""]);
    table.add_row(vec![Cell::new("Entries"), Cell::new(summary.total_entries)]);
    table.add_row(vec![
        Cell::new("Gainers / Losers / Unchanged"),
        Cell::new(format!("{} / {} / {}", summary.gainers, summary.losers, summary.unchanged)),
    ]);
    table.add_row(vec![Cell::new("Failed"), Cell::new(summary.failed)]);
    table.add_row(vec![Cell::new("Invested"), Cell::new(format!("{:.2}", summary.invested))]);
    table.add_row(vec![
        Cell::new("Current value"),
        Cell::new(format!("{:.2}", summary.current_value)),
    ]);
    table.add_row(vec![
        Cell::new("Total gain/loss"),
        Cell::new(format!(
            "{:+.2} ({:+.2}%)",
            summary.total_gain_loss, summary.total_gain_loss_percent
        )),
    ]);
    table.add_row(vec![Cell::new("Day change"), Cell::new(format!("{:+.2}", summary.day_change))]);
    table
}
