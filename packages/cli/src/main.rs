//! Command-line runner for the ticket office simulation.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use office_actors::Office;
use office_core::{DurationRange, SimulationConfig, TicketNumber};
use tracing_subscriber::EnvFilter;

mod logger;

#[derive(Parser, Debug)]
#[command(name = "ticket-office", about = "Simulate customers queuing for service desks")]
struct Opts {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// number of service desks
    #[arg(long)]
    desks: Option<u32>,

    /// number of customers issued a ticket
    #[arg(long)]
    tickets: Option<u64>,

    /// number printed on the first ticket
    #[arg(long)]
    first_ticket: Option<i64>,

    /// service time per customer, e.g. 2000-3000 (ms)
    #[arg(long, value_parser = parse_range)]
    service_ms: Option<DurationRange>,

    /// delay between arrivals, e.g. 20-50 (ms)
    #[arg(long, value_parser = parse_range)]
    arrival_ms: Option<DurationRange>,

    /// bounded wait of an idle desk (ms)
    #[arg(long)]
    wait_ms: Option<u64>,

    /// seed for reproducible durations
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_range(s: &str) -> Result<DurationRange, String> {
    match s.split_once('-') {
        Some((min, max)) => {
            let min = min.trim().parse().map_err(|e| format!("bad minimum: {}", e))?;
            let max = max.trim().parse().map_err(|e| format!("bad maximum: {}", e))?;
            Ok(DurationRange::new(min, max))
        }
        None => s
            .trim()
            .parse()
            .map(DurationRange::fixed)
            .map_err(|e| format!("bad duration: {}", e)),
    }
}

impl Opts {
    fn into_config(self) -> anyhow::Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                SimulationConfig::from_json_str(&json)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => SimulationConfig::default(),
        };

        if let Some(desks) = self.desks {
            config.desk_count = desks;
        }
        if let Some(tickets) = self.tickets {
            config.ticket_count = tickets;
        }
        if let Some(first) = self.first_ticket {
            config.first_ticket = TicketNumber(first);
        }
        if let Some(range) = self.service_ms {
            config.service_time = range;
        }
        if let Some(range) = self.arrival_ms {
            config.arrival_interval = range;
        }
        if let Some(wait) = self.wait_ms {
            config.wait_timeout_ms = wait;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Opts::parse().into_config()?;
    let office = Office::new(config)?;
    let expected = office.config().ticket_count;
    let events = logger::spawn_event_logger(office.subscribe());

    let result = office.run().await;
    let _ = events.await;

    let report = result?;
    tracing::info!(
        "{} of {} customers served by {} desks in {}ms",
        report.total_served(),
        expected,
        report.closed_desks.len(),
        report.elapsed_ms
    );
    Ok(())
}
