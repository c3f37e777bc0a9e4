use std::path::PathBuf;

use alloy_primitives::U256;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use perp_client::{
    config::ClientConfig,
    contract::decode_position_hex,
    snapshot::parse_snapshots,
};
use perp_engine::{
    decimal_price_to_sqrt_x96, decimal_price_to_tick, decimal_to_scaled6, decimal_to_x96,
    sqrt_x96_to_decimal_price, MarginRatios, PositionMetrics, PositionRawData,
};
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "perp-client", about = "Fixed-point conversions and position metrics for the perp protocol")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decimal price to Q96 sqrt-price
    PriceToSqrt { price: f64 },
    /// Q96 sqrt-price (decimal or 0x hex) to decimal price
    SqrtToPrice { sqrt_price_x96: String },
    PriceToTick {
        price: f64,
        #[arg(long)]
        round_up: bool,
    },
    /// Decimal amount to 6-decimal and X96 integers
    ToScaled {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
    /// Metrics for a position given its raw on-chain fields
    Position {
        /// Margin in USD
        #[arg(long)]
        margin: f64,
        #[arg(long, allow_negative_numbers = true)]
        perp_delta: i128,
        #[arg(long, allow_negative_numbers = true)]
        usd_delta: i128,
        #[arg(long)]
        min_ratio: u32,
        #[arg(long, default_value_t = 1_000_000)]
        max_ratio: u32,
        #[arg(long)]
        mark: f64,
    },
    /// Metrics for an ABI-encoded position as returned by the contract
    DecodePosition {
        payload: String,
        #[arg(long)]
        mark: f64,
    },
    /// Decode an indexer snapshot export (JSON array)
    Snapshots { path: PathBuf },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let config = ClientConfig::from_env()?;
    config.validate()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    debug!(?args, "parsed arguments");
    let out = run(args.command, &config)?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run(command: Command, config: &ClientConfig) -> Result<Value> {
    let out = match command {
        Command::PriceToSqrt { price } => {
            json!({ "price": price, "sqrtPriceX96": decimal_price_to_sqrt_x96(price)?.to_string() })
        }
        Command::SqrtToPrice { sqrt_price_x96 } => {
            let sqrt: U256 = sqrt_price_x96
                .trim()
                .parse()
                .with_context(|| format!("not an integer: {sqrt_price_x96}"))?;
            json!({ "sqrtPriceX96": sqrt.to_string(), "price": sqrt_x96_to_decimal_price(sqrt)? })
        }
        Command::PriceToTick { price, round_up } => {
            json!({ "price": price, "tick": decimal_price_to_tick(price, !round_up)? })
        }
        Command::ToScaled { amount } => json!({
            "amount": amount,
            "scaled6": decimal_to_scaled6(amount)?.to_string(),
            "x96": decimal_to_x96(amount)?.to_string(),
        }),
        Command::Position { margin, perp_delta, usd_delta, min_ratio, max_ratio, mark } => {
            let raw = PositionRawData {
                margin,
                entry_perp_delta: perp_delta,
                entry_usd_delta: usd_delta,
                margin_ratios: MarginRatios { min: min_ratio, max: max_ratio },
            };
            serde_json::to_value(PositionMetrics::compute(&raw, mark))?
        }
        Command::DecodePosition { payload, mark } => {
            let raw = decode_position_hex(&payload)?;
            json!({
                "raw": serde_json::to_value(raw)?,
                "metrics": serde_json::to_value(PositionMetrics::compute(&raw, mark))?,
            })
        }
        Command::Snapshots { path } => {
            let body = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let snaps = parse_snapshots(&body)?;
            info!(count = snaps.len(), "decoded snapshots");
            serde_json::to_value(snaps)?
        }
        Command::Config => serde_json::to_value(config)?,
    };
    Ok(out)
}
