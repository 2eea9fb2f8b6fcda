use std::fs;

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use riptide_config::AppConfig;
use riptide_core::types::{Side, TradeEvent};
use riptide_strategy::{PairPipeline, PipelineConfig, ScorerConfig, ScorerKind};

#[derive(Parser)]
#[command(name = "riptide", about = "Streaming trade-flow statistics and sequence prediction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a synthetic random-walk stream through the pipeline
    Simulate {
        /// Number of trade events to generate
        #[arg(long, default_value_t = 10_000)]
        events: usize,
        /// Starting price of the walk
        #[arg(long, default_value_t = 100.0)]
        price: f64,
        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Trading pair label (defaults to the first configured pair)
        #[arg(long)]
        pair: Option<String>,
    },
    /// Replay a CSV file of trades (unix_secs,price,volume,side per line)
    Replay {
        /// Path to the CSV file
        #[arg(short, long)]
        file: String,
        /// Trading pair label (defaults to the first configured pair)
        #[arg(long)]
        pair: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_file(&cli.config)?;

    match cli.command {
        Commands::Simulate {
            events,
            price,
            seed,
            pair,
        } => {
            let pair = pair.unwrap_or_else(|| config.pairs[0].clone());
            cmd_simulate(&config, &pair, events, price, seed)
        }
        Commands::Replay { file, pair } => {
            let pair = pair.unwrap_or_else(|| config.pairs[0].clone());
            cmd_replay(&config, &pair, &file)
        }
    }
}

fn build_pipeline(config: &AppConfig, pair: &str) -> anyhow::Result<PairPipeline> {
    let kind: ScorerKind = config
        .strategy
        .kind
        .parse()
        .map_err(anyhow::Error::msg)?;
    let pipeline = PairPipeline::new(
        pair,
        &PipelineConfig {
            interval_secs: config.engine.interval_secs,
            history_depth: config.engine.history_depth,
            context_lengths: config.engine.context_lengths.clone(),
            symbol_step_pct: config.engine.symbol_step_pct,
            symbol_clamp: config.engine.symbol_clamp,
        },
        kind,
        ScorerConfig {
            min_sample_size: config.strategy.min_sample_size,
            probability_threshold: config.strategy.probability_threshold,
            decay_factor: config.strategy.decay_factor,
            rating_threshold: config.strategy.rating_threshold,
            confidence_factor: config.strategy.confidence_factor,
        },
    )?;
    Ok(pipeline)
}

fn cmd_simulate(
    config: &AppConfig,
    pair: &str,
    events: usize,
    start_price: f64,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let mut pipeline = build_pipeline(config, pair)?;

    info!(pair, events, "starting synthetic feed");
    let mut price = start_price;
    let mut timestamp = Utc::now().naive_utc();
    let mut decisions = 0usize;
    for _ in 0..events {
        price *= 1.0 + rng.gen_range(-0.002..0.002);
        let volume = rng.gen_range(0.01..2.0);
        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        let event = TradeEvent {
            symbol: pair.to_string(),
            datetime: timestamp,
            price,
            volume,
            side,
        };
        if let Some(decision) = pipeline.on_trade(&event) {
            decisions += 1;
            println!("{}", serde_json::to_string(&decision)?);
        }
        timestamp += chrono::Duration::seconds(1);
    }

    print_summary(&pipeline, decisions);
    Ok(())
}

fn cmd_replay(config: &AppConfig, pair: &str, file: &str) -> anyhow::Result<()> {
    let content = fs::read_to_string(file)?;
    let mut pipeline = build_pipeline(config, pair)?;

    info!(pair, file, "replaying trade file");
    let mut decisions = 0usize;
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = parse_line(pair, line)
            .ok_or_else(|| anyhow::anyhow!("bad trade record at line {}", lineno + 1))?;
        if let Some(decision) = pipeline.on_trade(&event) {
            decisions += 1;
            println!("{}", serde_json::to_string(&decision)?);
        }
    }

    print_summary(&pipeline, decisions);
    Ok(())
}

fn parse_line(pair: &str, line: &str) -> Option<TradeEvent> {
    let mut fields = line.split(',');
    let secs: i64 = fields.next()?.trim().parse().ok()?;
    let price: f64 = fields.next()?.trim().parse().ok()?;
    let volume: f64 = fields.next()?.trim().parse().ok()?;
    let side = Side::parse(fields.next()?.trim())?;
    Some(TradeEvent {
        symbol: pair.to_string(),
        datetime: datetime_from_secs(secs)?,
        price,
        volume,
        side,
    })
}

fn datetime_from_secs(secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

fn print_summary(pipeline: &PairPipeline, decisions: usize) {
    let trend = pipeline.trend(|tb| (tb.start, tb.bucket.slots[0].stats.mean));
    println!("--- {} ---", pipeline.pair());
    println!("decisions emitted : {decisions}");
    println!("evaluations logged: {}", pipeline.audit().len());
    println!("distinct contexts : {}", pipeline.context_count());
    if let Some(flow) = pipeline.flow() {
        println!(
            "last flow cycle   : bid notional {:.2}, ask notional {:.2}",
            flow.slots[0].stats.sum, flow.slots[1].stats.sum
        );
    }
    println!("closed buckets    : {}", trend.len());
    for (start, mean) in trend.iter().rev().take(5).rev() {
        println!("  {start}  avg price {mean:.4}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let event = parse_line("BTC-USDT", "1700000000,42000.5,0.25,buy").unwrap();
        assert_eq!(event.price, 42000.5);
        assert_eq!(event.volume, 0.25);
        assert_eq!(event.side, Side::Buy);
        assert_eq!(event.datetime.and_utc().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_line_rejects_garbage() {
        assert!(parse_line("BTC-USDT", "not,a,trade").is_none());
        assert!(parse_line("BTC-USDT", "1700000000,42000.5,0.25,hold").is_none());
    }
}
