/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Exchange data printed as JSON; live feed messages until interrupted
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or shutdown handling
*/

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use coinbase_exchange::{
    BlockingRestClient, FeedConsumer, FeedHandle, FeedHandlers, Params, Record,
};
use coinbase_exchange_cli::ExchangeConfig;

#[derive(Parser, Debug)]
#[command(name = "coinbase-exchange", version, about = "Coinbase Exchange REST and feed client")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Use the public sandbox endpoints
    #[arg(long)]
    sandbox: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the exchange server time
    Time,
    /// List tradable products
    Products,
    /// Print the last trade for a product
    Ticker { product: Option<String> },
    /// List orders (all statuses, all pages)
    Orders,
    /// List fills (all pages)
    Fills,
    /// List accounts
    Accounts,
    /// Stream feed messages until Ctrl-C
    Feed {
        #[arg(long)]
        product: Option<String>,
        /// Reconnect when the feed closes
        #[arg(long)]
        keepalive: bool,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let config = load_config(args.config_path.as_ref())?;
    info!(sandbox = args.sandbox, "configuration loaded");

    match args.command {
        Command::Feed { product, keepalive } => run_feed(&config, args.sandbox, product, keepalive),
        command => run_rest(&config, args.sandbox, command),
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<ExchangeConfig> {
    let config = match path {
        Some(path) => {
            let path_str = path.to_str().context("config path must be valid utf-8")?;
            ExchangeConfig::from_file(path_str).context("load config")?
        }
        None => ExchangeConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn run_rest(config: &ExchangeConfig, sandbox: bool, command: Command) -> Result<()> {
    let credentials = config.credentials()?;
    let client = BlockingRestClient::with_config(credentials, config.client_config(sandbox))
        .context("build REST client")?;

    match command {
        Command::Time => print_json(&client.server_time().context("fetch server time")?.data),
        Command::Products => print_json(&client.products().context("fetch products")?.data),
        Command::Ticker { product } => {
            let mut params = Params::new();
            if let Some(product) = product {
                params.set("product_id", product);
            }
            print_json(&client.last_trade(params).context("fetch ticker")?.data)
        }
        Command::Orders => print_json(&client.orders(Params::new()).context("fetch orders")?.data),
        Command::Fills => print_json(&client.fills(Params::new()).context("fetch fills")?.data),
        Command::Accounts => print_json(&client.accounts().context("fetch accounts")?.data),
        Command::Feed { .. } => Err(anyhow!("feed is not a REST command")),
    }
}

fn run_feed(
    config: &ExchangeConfig,
    sandbox: bool,
    product: Option<String>,
    keepalive: bool,
) -> Result<()> {
    let mut feed_config = config.feed_config(sandbox).with_keepalive(keepalive);
    if let Some(product) = product {
        feed_config.product_id = product;
    }
    info!(
        url = %feed_config.ws_url,
        product_id = %feed_config.product_id,
        keepalive,
        "starting feed"
    );

    let handlers = FeedHandlers::new()
        .on_message(|record: &Record| match serde_json::to_string(record) {
            Ok(line) => println!("{line}"),
            Err(err) => warn!(error = %err, "failed to encode feed message"),
        })
        .on_error(|record: &Record| warn!(message = ?record.str("message"), "feed error message"));

    let consumer = FeedConsumer::new(feed_config, handlers);
    setup_signal_handlers(consumer.handle());

    // No runtime is running here, so the consumer owns one and blocks
    consumer.start().context("run feed")?;
    info!("feed stopped");
    Ok(())
}

/// Stop the feed on SIGINT/SIGTERM from a watcher thread
fn setup_signal_handlers(handle: FeedHandle) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(error = %err, "failed to build signal runtime");
                return;
            }
        };

        runtime.block_on(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{SignalKind, signal};

                match signal(SignalKind::terminate()) {
                    Ok(mut terminate) => {
                        tokio::select! {
                            _ = tokio::signal::ctrl_c() => info!("received SIGINT"),
                            _ = terminate.recv() => info!("received SIGTERM"),
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "failed to install SIGTERM handler");
                        if let Err(err) = tokio::signal::ctrl_c().await {
                            warn!(error = %err, "failed to install SIGINT handler");
                            return;
                        }
                        info!("received SIGINT");
                    }
                }
            }

            #[cfg(not(unix))]
            {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    warn!(error = %err, "failed to install SIGINT handler");
                    return;
                }
                info!("received SIGINT");
            }

            handle.stop();
        });
    });
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("encode output")?;
    println!("{rendered}");
    Ok(())
}
