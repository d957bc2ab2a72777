use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use community_events_lib::{logs, open_source, AppConfig, Backend, EnrichedEvent, EventBoard};
use log::error;
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "community-events", about = "Show community events with RSVP counts")]
struct Cli {
    /// Where to read events from; overrides the config file and EVENTS_BACKEND.
    #[arg(long, value_parser = parse_backend)]
    backend: Option<Backend>,

    /// Config file to load instead of the default in the data directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the board as JSON.
    #[arg(long)]
    json: bool,
}

fn parse_backend(value: &str) -> Result<Backend, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logs::init_logger() {
        eprintln!("logging disabled: {err:#}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            println!("No events to show.");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    let source = open_source(&config)?;
    let board = EventBoard::load(&source)
        .await
        .context("fetching events")?;

    if cli.json {
        let payload = json!({
            "stats": board.stats(),
            "upcoming": board.upcoming,
            "past": board.past,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", render(&board));
    }
    Ok(())
}

fn render(board: &EventBoard) -> String {
    let stats = board.stats();
    let mut out = format!(
        "Upcoming events: {}\nTotal attendees: {}\nEvents hosted: {}\n",
        stats.upcoming_events, stats.total_attendees, stats.events_hosted
    );

    out.push_str("\nUpcoming\n");
    if board.upcoming.is_empty() {
        out.push_str("  No upcoming events. Check back soon!\n");
    }
    for event in &board.upcoming {
        out.push_str(&upcoming_line(event));
    }

    if !board.past.is_empty() {
        out.push_str("\nPast\n");
        for event in &board.past {
            out.push_str(&format!(
                "  {}  {} ({:?}) - {} attended\n",
                event.event.date.format("%b %-d, %Y"),
                event.event.name,
                event.event.event_type,
                event.attendees
            ));
        }
    }
    out
}

fn upcoming_line(event: &EnrichedEvent) -> String {
    let e = &event.event;
    format!(
        "  {}  {}  {} ({:?}, {:?})\n      {}  {}/{} attendees ({:.0}%)\n",
        e.date.format("%b %-d, %Y"),
        e.time,
        e.name,
        e.event_type,
        e.difficulty,
        e.location,
        event.attendees,
        e.max_attendees,
        event.fill_ratio() * 100.0
    )
}
