//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::coinbase_adapter::{self, CoinbaseAdapter, Credentials};
use crate::adapters::coingecko_adapter::{self, CoinGeckoAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_store_adapter::{JsonCacheFile, RotationStateFile};
use crate::adapters::sleep_pacer::FixedPacer;
use crate::domain::engine::{EngineParams, TradeEngine};
use crate::domain::error::EngineError;
use crate::domain::order::DEFAULT_FEE_RATE;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "cryptodca", about = "Recurring crypto purchase engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay the buy schedule over past periods
    Simulate {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        /// Settlement currency spent per period
        #[arg(long, default_value_t = 50.0)]
        amount: f64,
        /// Days between buys
        #[arg(long, default_value_t = 7)]
        interval: i64,
        /// How many periods (of interval days) to replay
        #[arg(long, default_value_t = 20)]
        periods: i64,
        /// gainer | loser | volume | less-volume | marketcap | mixed
        #[arg(long, default_value = "gainer")]
        strategy: String,
        /// Max products per buy round, -1 for all of them
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Execute one live buy round
    Run {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(long, default_value_t = 50.0)]
        amount: f64,
        #[arg(long, default_value_t = 7)]
        interval: i64,
        #[arg(long, default_value = "gainer")]
        strategy: String,
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate {
            config,
            amount,
            interval,
            periods,
            strategy,
            limit,
        } => run_simulate(&config, amount, interval, periods, &strategy, limit),
        Command::Run {
            config,
            amount,
            interval,
            strategy,
            limit,
        } => run_live(&config, amount, interval, &strategy, limit),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = EngineError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Merge CLI flags with the `[engine]` config section.
pub fn build_params(
    config: &dyn ConfigPort,
    amount: f64,
    strategy: &str,
    limit: i64,
) -> Result<EngineParams, EngineError> {
    Ok(EngineParams {
        settlement_currency: config
            .get_string("engine", "settlement_currency")
            .unwrap_or_else(|| "EUR".to_string()),
        buy_amount: amount,
        fee_rate: config.get_double("engine", "fee_rate", DEFAULT_FEE_RATE),
        strategy: strategy.parse()?,
        limit_products: limit,
    })
}

/// Credentials are optional: the public surface (products, candles) works
/// without them.
pub fn build_exchange(config: &dyn ConfigPort) -> Result<CoinbaseAdapter, EngineError> {
    let api_url = config
        .get_string("exchange", "api_url")
        .unwrap_or_else(|| coinbase_adapter::DEFAULT_API_URL.to_string());
    let credentials = match config.get_string("exchange", "key") {
        Some(key) if !key.trim().is_empty() => Some(Credentials {
            key,
            secret: config.get_string("exchange", "secret").unwrap_or_default(),
            passphrase: config
                .get_string("exchange", "passphrase")
                .unwrap_or_default(),
        }),
        _ => None,
    };
    CoinbaseAdapter::new(&api_url, credentials)
}

/// Everything the engine plugs into, built from one config file.
struct Runtime {
    exchange: CoinbaseAdapter,
    market_caps: CoinGeckoAdapter,
    cache_store: JsonCacheFile,
    rotation_state: RotationStateFile,
    pacer: FixedPacer,
}

fn build_runtime(config: &FileConfigAdapter) -> Result<Runtime, EngineError> {
    let market_cap_url = config
        .get_string("marketcap", "api_url")
        .unwrap_or_else(|| coingecko_adapter::DEFAULT_API_URL.to_string());
    Ok(Runtime {
        exchange: build_exchange(config)?,
        market_caps: CoinGeckoAdapter::new(&market_cap_url)?,
        cache_store: JsonCacheFile::new(
            config
                .get_string("engine", "cache_file")
                .unwrap_or_else(|| "cache.json".to_string()),
        ),
        rotation_state: RotationStateFile::new(
            config
                .get_string("engine", "state_file")
                .unwrap_or_else(|| "strategy.state".to_string()),
        ),
        pacer: FixedPacer::default(),
    })
}

fn run_simulate(
    config_path: &PathBuf,
    amount: f64,
    interval: i64,
    periods: i64,
    strategy: &str,
    limit: i64,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let (params, runtime) = match build_params(&config, amount, strategy, limit)
        .and_then(|params| Ok((params, build_runtime(&config)?)))
    {
        Ok(built) => built,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };
    let configured_strategy = params.strategy;

    eprintln!("Simulating {periods} periods of {interval} days");
    let mut engine = TradeEngine::new(
        &runtime.exchange,
        &runtime.market_caps,
        &runtime.cache_store,
        &runtime.rotation_state,
        &runtime.pacer,
        params,
    );
    match engine.simulate(interval, periods) {
        Ok(gain) => {
            println!("{}", engine.portfolio().summary(engine.cache()));
            println!(
                "Strategy {configured_strategy} across last {periods} periods of {interval} days each: {gain:.2}%"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_live(
    config_path: &PathBuf,
    amount: f64,
    interval: i64,
    strategy: &str,
    limit: i64,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let (params, runtime) = match build_params(&config, amount, strategy, limit)
        .and_then(|params| Ok((params, build_runtime(&config)?)))
    {
        Ok(built) => built,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    eprintln!(
        "Executing run: {amount} {} every {interval} days",
        params.settlement_currency
    );
    let mut engine = TradeEngine::new(
        &runtime.exchange,
        &runtime.market_caps,
        &runtime.cache_store,
        &runtime.rotation_state,
        &runtime.pacer,
        params,
    );
    match engine.run(interval) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}
