use clap::{Parser, Subcommand};

use crate::commands;
use crate::constants::DEFAULT_SCREENER_SYMBOLS;
use crate::utils::get_port;

#[derive(Parser)]
#[command(name = "stockdash")]
#[command(about = "Stock analyzer dashboard backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on (default: $STOCKDASH_PORT or 9876)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show a quote with sentiment and recent bars
    Quote {
        /// Ticker symbol (e.g. AAPL, TSLA, MSFT)
        symbol: String,
    },
    /// Screen a list of symbols
    Screener {
        /// Comma-separated symbols (e.g. "AAPL, TSLA, MSFT")
        #[arg(default_value = DEFAULT_SCREENER_SYMBOLS)]
        symbols: String,
    },
    /// Forecast a symbol 30 days forward
    Forecast {
        /// Ticker symbol
        symbol: String,
    },
    /// Check provider connectivity
    Status,
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            commands::serve::run(port.unwrap_or_else(get_port)).await;
        }
        Commands::Quote { symbol } => {
            commands::quote::run(&symbol).await;
        }
        Commands::Screener { symbols } => {
            commands::screener::run(&symbols).await;
        }
        Commands::Forecast { symbol } => {
            commands::forecast::run(&symbol).await;
        }
        Commands::Status => {
            commands::status::run().await;
        }
    }
}
